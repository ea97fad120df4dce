//! Path text to token stream.
//!
//! The lexer decodes one codepoint at a time with [`decode_one`], so multi-byte
//! characters in keys are handled and malformed UTF-8 is reported where it
//! occurs. Whitespace between tokens is ignored.
//!
//! Two characters depend on context:
//!
//! * `&` directly after something that ends an operand (a key, `]`, `)`, ...)
//!   is logical-and; elsewhere `&name` refers to an anchor.
//! * `*` followed by a name is an alias; otherwise it is `*` or `**`.
//!
//! # Example
//!
//! ```
//! use ypath::ypath::lexer::tokenize;
//! use ypath::ypath::token::TokenKind;
//!
//! let kinds: Vec<_> = tokenize(b"/a & *b").unwrap().into_iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::Slash,
//!         TokenKind::Key("a".to_string()),
//!         TokenKind::And,
//!         TokenKind::Alias("b".to_string()),
//!         TokenKind::End,
//!     ]
//! );
//! ```

use super::error::LexError;
use super::tag::scan_tag;
use super::token::{Mark, Span, Token, TokenKind};
use super::utf8::{decode_escape, decode_one, Decoded};

pub struct Lexer<'a> {
    input: &'a [u8],
    mark: Mark,
    prev_ends_operand: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            mark: Mark::default(),
            prev_ends_operand: false,
        }
    }

    /// Current position.
    pub fn mark(&self) -> Mark {
        self.mark
    }

    fn decode_at(&self, pos: usize) -> Result<Option<(char, usize)>, LexError> {
        match decode_one(self.input.get(pos..).unwrap_or(&[])) {
            Decoded::Char(c, width) => Ok(Some((c, width))),
            Decoded::End => Ok(None),
            Decoded::Invalid => Err(LexError::InvalidUtf8 { mark: self.mark }),
            Decoded::Partial => Err(LexError::PartialUtf8 { mark: self.mark }),
        }
    }

    fn peek(&self) -> Result<Option<char>, LexError> {
        Ok(self.decode_at(self.mark.pos)?.map(|(c, _)| c))
    }

    /// Returns the codepoint after the current one.
    fn peek_second(&self) -> Result<Option<char>, LexError> {
        match self.decode_at(self.mark.pos)? {
            Some((_, width)) => Ok(self.decode_at(self.mark.pos + width)?.map(|(c, _)| c)),
            None => Ok(None),
        }
    }

    fn bump(&mut self) -> Result<Option<char>, LexError> {
        let decoded = self.decode_at(self.mark.pos)?;
        if let Some((c, width)) = decoded {
            self.mark.pos += width;
            if c == '\n' {
                self.mark.line += 1;
                self.mark.column = 0;
            } else {
                self.mark.column += 1;
            }
        }
        Ok(decoded.map(|(c, _)| c))
    }

    fn skip_whitespace(&mut self) -> Result<(), LexError> {
        while let Some(c) = self.peek()? {
            if !c.is_whitespace() {
                break;
            }
            self.bump()?;
        }
        Ok(())
    }

    /// Produces the next token. At the end of input every call returns a
    /// [`TokenKind::End`] token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace()?;
        let start = self.mark;

        let c = match self.peek()? {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::End, Span::new(start, start))),
        };

        let kind = match c {
            '/' => self.single(TokenKind::Slash)?,
            '^' => self.single(TokenKind::Caret)?,
            ',' => self.single(TokenKind::Comma)?,
            ':' => self.single(TokenKind::Colon)?,
            '(' => self.single(TokenKind::LParen)?,
            ')' => self.single(TokenKind::RParen)?,
            ']' => self.single(TokenKind::RBracket)?,
            '$' => self.single(TokenKind::ScalarFilter)?,
            '%' => self.single(TokenKind::CollectionFilter)?,
            '=' => self.single(TokenKind::Equals)?,
            '.' => {
                self.bump()?;
                if self.peek()? == Some('.') {
                    self.bump()?;
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            '*' => {
                self.bump()?;
                match self.peek()? {
                    Some('*') => {
                        self.bump()?;
                        TokenKind::StarStar
                    }
                    Some(n) if is_name_start(n) => TokenKind::Alias(self.lex_name()?),
                    _ => TokenKind::Star,
                }
            }
            '&' => {
                self.bump()?;
                let next = self.peek()?;
                if self.prev_ends_operand {
                    if next == Some('&') {
                        self.bump()?;
                    }
                    TokenKind::And
                } else if next.is_some_and(is_name_start) {
                    TokenKind::Alias(self.lex_name()?)
                } else {
                    TokenKind::And
                }
            }
            '|' => {
                self.bump()?;
                if self.peek()? == Some('|') {
                    self.bump()?;
                }
                TokenKind::Or
            }
            '[' => {
                self.bump()?;
                self.skip_whitespace()?;
                if self.peek()? == Some(']') {
                    self.bump()?;
                    TokenKind::SequenceFilter
                } else {
                    TokenKind::LBracket
                }
            }
            '{' => {
                self.bump()?;
                self.skip_whitespace()?;
                if self.peek()? == Some('}') {
                    self.bump()?;
                    TokenKind::MappingFilter
                } else {
                    TokenKind::FlowKey(self.lex_flow_key(start)?)
                }
            }
            '"' => TokenKind::Key(self.lex_double_quoted(start)?),
            '\'' => TokenKind::Key(self.lex_single_quoted(start)?),
            '-' if self.peek_second()?.is_some_and(|d| d.is_ascii_digit()) => {
                TokenKind::Number(self.lex_number()?)
            }
            '0'..='9' => TokenKind::Number(self.lex_number()?),
            c if is_name_start(c) => TokenKind::Key(self.lex_name()?),
            c => {
                return Err(LexError::UnexpectedChar {
                    ch: c.to_string(),
                    mark: start,
                })
            }
        };

        self.prev_ends_operand = kind.ends_operand();
        Ok(Token::new(kind, Span::new(start, self.mark)))
    }

    fn single(&mut self, kind: TokenKind) -> Result<TokenKind, LexError> {
        self.bump()?;
        Ok(kind)
    }

    fn lex_name(&mut self) -> Result<String, LexError> {
        let mut name = String::new();
        while let Some(c) = self.peek()? {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                name.push(c);
                self.bump()?;
            } else {
                break;
            }
        }
        Ok(name)
    }

    fn lex_number(&mut self) -> Result<String, LexError> {
        let mut text = String::new();
        if self.peek()? == Some('-') {
            text.push('-');
            self.bump()?;
        }
        while let Some(c) = self.peek()? {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.bump()?;
        }
        Ok(text)
    }

    fn lex_double_quoted(&mut self, start: Mark) -> Result<String, LexError> {
        self.bump()?;
        let mut text = String::new();
        loop {
            let escape_mark = self.mark;
            match self.bump()? {
                None => return Err(LexError::UnterminatedQuote { mark: start }),
                Some('"') => break,
                Some('\\') => {
                    if self.mark.pos >= self.input.len() {
                        return Err(LexError::UnterminatedQuote { mark: start });
                    }
                    let (c, consumed) = decode_escape(&self.input[self.mark.pos..])
                        .ok_or(LexError::InvalidEscape { mark: escape_mark })?;
                    // escape bodies are ASCII, one column per byte
                    self.mark.pos += consumed;
                    self.mark.column += consumed;
                    text.push(c);
                }
                Some(c) => text.push(c),
            }
        }
        Ok(text)
    }

    fn lex_single_quoted(&mut self, start: Mark) -> Result<String, LexError> {
        self.bump()?;
        let mut text = String::new();
        loop {
            match self.bump()? {
                None => return Err(LexError::UnterminatedQuote { mark: start }),
                Some('\'') => {
                    if self.peek()? == Some('\'') {
                        self.bump()?;
                        text.push('\'');
                    } else {
                        break;
                    }
                }
                Some(c) => text.push(c),
            }
        }
        Ok(text)
    }

    /// Collects the raw text of a `{ ... }` literal up to the matching brace.
    /// Nested flow collections and quoted scalars are skipped over; tags are
    /// validated so a malformed one is reported at its own position.
    fn lex_flow_key(&mut self, start: Mark) -> Result<String, LexError> {
        let content_start = self.mark.pos;
        let mut depth = 0usize;
        let mut prev: Option<char> = None;

        let content_end = loop {
            let c = self
                .peek()?
                .ok_or(LexError::UnterminatedKey { mark: start })?;

            match c {
                '}' if depth == 0 => {
                    let end = self.mark.pos;
                    self.bump()?;
                    break end;
                }
                '{' | '[' => depth += 1,
                '}' | ']' => depth = depth.saturating_sub(1),
                '!' if prev.map_or(true, |p| p.is_whitespace() || matches!(p, '[' | '{' | ',')) => {
                    if scan_tag(&self.input[self.mark.pos..]).is_none() {
                        return Err(LexError::InvalidTag { mark: self.mark });
                    }
                }
                '"' => {
                    self.bump()?;
                    loop {
                        match self.bump()? {
                            None => return Err(LexError::UnterminatedKey { mark: start }),
                            Some('\\') => {
                                self.bump()?;
                            }
                            Some('"') => break,
                            Some(_) => {}
                        }
                    }
                    prev = Some('"');
                    continue;
                }
                '\'' => {
                    self.bump()?;
                    loop {
                        match self.bump()? {
                            None => return Err(LexError::UnterminatedKey { mark: start }),
                            Some('\'') if self.peek()? == Some('\'') => {
                                self.bump()?;
                            }
                            Some('\'') => break,
                            Some(_) => {}
                        }
                    }
                    prev = Some('\'');
                    continue;
                }
                _ => {}
            }

            self.bump()?;
            prev = Some(c);
        };

        let raw = String::from_utf8_lossy(&self.input[content_start..content_end]);
        Ok(raw.trim_end().to_string())
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Lexes the whole input, including the final [`TokenKind::End`] token.
pub fn tokenize(input: &[u8]) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::End;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
