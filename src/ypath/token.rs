//! Tokens produced by the path lexer.

use std::fmt;

/// A position in the path text.
///
/// `pos` is a byte offset; `line` and `column` are zero-based and counted in
/// codepoints. [`Display`](fmt::Display) prints them one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mark {
    pub pos: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}

/// The source range of a token or expression, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Mark,
    pub end: Mark,
}

impl Span {
    pub fn new(start: Mark, end: Mark) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        let start = if other.start.pos < self.start.pos {
            other.start
        } else {
            self.start
        };
        let end = if other.end.pos > self.end.pos {
            other.end
        } else {
            self.end
        };
        Span { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `/`
    Slash,
    /// `^`
    Caret,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// Bare or quoted key, already unescaped
    Key(String),
    /// Raw text of a `{ ... }` key literal, without the braces
    FlowKey(String),
    /// Integer text, possibly with a leading `-`; range checked by the parser
    Number(String),
    /// `*name`, or `&name` in step position
    Alias(String),
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `$`
    ScalarFilter,
    /// `%`
    CollectionFilter,
    /// `[]`
    SequenceFilter,
    /// `{}`
    MappingFilter,
    /// `&` or `&&`
    And,
    /// `|` or `||`
    Or,
    /// `=`, reserved
    Equals,
    End,
}

impl TokenKind {
    /// True for tokens after which a following `&` means logical-and rather
    /// than an alias reference.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Caret
                | TokenKind::Dot
                | TokenKind::DotDot
                | TokenKind::Star
                | TokenKind::StarStar
                | TokenKind::Key(_)
                | TokenKind::FlowKey(_)
                | TokenKind::Number(_)
                | TokenKind::Alias(_)
                | TokenKind::RBracket
                | TokenKind::RParen
                | TokenKind::ScalarFilter
                | TokenKind::CollectionFilter
                | TokenKind::SequenceFilter
                | TokenKind::MappingFilter
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Caret => write!(f, "'^'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::DotDot => write!(f, "'..'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::StarStar => write!(f, "'**'"),
            TokenKind::Key(key) => write!(f, "key '{}'", key),
            TokenKind::FlowKey(text) => write!(f, "key literal '{{{}}}'", text),
            TokenKind::Number(text) => write!(f, "number {}", text),
            TokenKind::Alias(name) => write!(f, "alias '*{}'", name),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::ScalarFilter => write!(f, "'$'"),
            TokenKind::CollectionFilter => write!(f, "'%'"),
            TokenKind::SequenceFilter => write!(f, "'[]'"),
            TokenKind::MappingFilter => write!(f, "'{{}}'"),
            TokenKind::And => write!(f, "'&'"),
            TokenKind::Or => write!(f, "'|'"),
            TokenKind::Equals => write!(f, "'='"),
            TokenKind::End => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn mark(&self) -> Mark {
        self.span.start
    }
}
