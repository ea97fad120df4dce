//! Error types for path lexing, parsing and execution.
//!
//! Lexing and parsing errors carry the [`Mark`] where the problem was found.
//! Execution errors describe genuine failures only: a query that matches
//! nothing returns an empty result, never an error.

use super::token::Mark;
use thiserror::Error;

/// Result type for path execution
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors raised while splitting path text into tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("invalid UTF-8 sequence at {mark}")]
    InvalidUtf8 { mark: Mark },

    #[error("truncated UTF-8 sequence at {mark}")]
    PartialUtf8 { mark: Mark },

    /// A quoted key is missing its closing quote
    #[error("unterminated quoted key starting at {mark}")]
    UnterminatedQuote { mark: Mark },

    #[error("invalid escape sequence at {mark}")]
    InvalidEscape { mark: Mark },

    #[error("invalid tag at {mark}")]
    InvalidTag { mark: Mark },

    /// A `{` key literal is missing its closing brace
    #[error("unterminated key literal starting at {mark}")]
    UnterminatedKey { mark: Mark },

    #[error("unexpected character '{ch}' at {mark}")]
    UnexpectedChar { ch: String, mark: Mark },
}

impl LexError {
    pub fn mark(&self) -> Mark {
        match self {
            LexError::InvalidUtf8 { mark }
            | LexError::PartialUtf8 { mark }
            | LexError::UnterminatedQuote { mark }
            | LexError::InvalidEscape { mark }
            | LexError::InvalidTag { mark }
            | LexError::UnterminatedKey { mark }
            | LexError::UnexpectedChar { mark, .. } => *mark,
        }
    }
}

/// Errors raised while building an expression tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected {found} at {mark}")]
    UnexpectedToken { found: String, mark: Mark },

    #[error("unmatched '[' at {mark}")]
    UnmatchedBracket { mark: Mark },

    #[error("unmatched parenthesis at {mark}")]
    UnmatchedParen { mark: Mark },

    /// An operator lacks its left or right operand
    #[error("missing operand for operator at {mark}")]
    MissingOperand { mark: Mark },

    #[error("empty path expression at {mark}")]
    EmptyExpression { mark: Mark },

    /// More than one operand was left after folding every operator
    #[error("incomplete path expression at {mark}")]
    IncompleteExpression { mark: Mark },

    #[error("number {text} out of range at {mark}")]
    NumberOutOfRange { text: String, mark: Mark },

    #[error("slice stride of zero at {mark}")]
    ZeroStride { mark: Mark },

    /// A `{ ... }` key literal is not a valid YAML flow node
    #[error("invalid key literal at {mark}: {message}")]
    InvalidKey { message: String, mark: Mark },
}

impl ParseError {
    /// Position in the path text the error refers to.
    pub fn mark(&self) -> Mark {
        match self {
            ParseError::Lex(err) => err.mark(),
            ParseError::UnexpectedToken { mark, .. }
            | ParseError::UnmatchedBracket { mark }
            | ParseError::UnmatchedParen { mark }
            | ParseError::MissingOperand { mark }
            | ParseError::EmptyExpression { mark }
            | ParseError::IncompleteExpression { mark }
            | ParseError::NumberOutOfRange { mark, .. }
            | ParseError::ZeroStride { mark }
            | ParseError::InvalidKey { mark, .. } => *mark,
        }
    }
}

/// Errors raised while evaluating an expression tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// An alias names an anchor the document does not define
    #[error("unresolved alias *{name}")]
    UnresolvedAlias { name: String },

    #[error("recursion depth limit of {limit} exceeded")]
    DepthExceeded { limit: usize },
}

/// Any failure of [`query`](super::query): parsing or execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YPathError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("execution error: {0}")]
    Exec(#[from] ExecError),
}
