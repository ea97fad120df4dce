//! Operator-precedence parser for path expressions.
//!
//! Tokens are folded into a tree with two explicit stacks: an operand stack
//! of partially built subexpressions and an operator stack of pending
//! combinators. Path steps are pushed as operands; a step read right after
//! another operand is merged with it into a chain. Infix operators pop and
//! fold every pending operator of higher or equal precedence before being
//! pushed, which makes them left associative:
//!
//! | Operator | Combinator | Precedence |
//! |---|---|---|
//! | adjacency | chain | highest |
//! | `,` | multi | |
//! | `&` `&&` | logical-and | |
//! | `\|` `\|\|` | logical-or | lowest |
//!
//! Operands of the same combinator kind are flattened, so `a,b,c` is one
//! multi with three children. Parentheses are a barrier on the operator stack;
//! bracket contents (`[...]`) are parsed separately into an index, an index
//! set or a slice, which then counts as a single step.
//!
//! The tree is built from owned [`Operand`]s and lowered into the
//! [`ExpressionTree`] arena once parsing succeeds, so a failed parse never
//! leaves a partial tree behind.

use super::ast::{ExprData, ExprId, ExprKind, ExprNode, ExpressionTree, MapKey, Slice};
use super::error::ParseError;
use super::lexer::Lexer;
use super::token::{Mark, Span, Token, TokenKind};
use crate::document::tree::Document;
use std::collections::VecDeque;

/// A subexpression under construction.
#[derive(Debug)]
struct Operand {
    data: ExprData,
    children: Vec<Operand>,
    span: Span,
}

impl Operand {
    fn leaf(data: ExprData, span: Span) -> Self {
        Self {
            data,
            children: Vec::new(),
            span,
        }
    }

    fn kind(&self) -> ExprKind {
        self.data.kind()
    }

    /// Combines `self` and `next` under a combinator, reusing either side
    /// when it already is a combinator of the same kind.
    fn join(self, data: ExprData, next: Operand) -> Operand {
        let kind = data.kind();
        let span = self.span.merge(next.span);

        let mut children = if self.kind() == kind {
            self.children
        } else {
            vec![self]
        };
        if next.kind() == kind {
            children.extend(next.children);
        } else {
            children.push(next);
        }

        Operand {
            data,
            children,
            span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Multi,
    And,
    Or,
    /// An open parenthesis; `base` is the operand stack height when it was read
    Group { follows_operand: bool, base: usize },
}

impl Operator {
    fn precedence(self) -> u8 {
        match self {
            Operator::Multi => 3,
            Operator::And => 2,
            Operator::Or => 1,
            Operator::Group { .. } => 0,
        }
    }

    fn combinator(self) -> Option<ExprData> {
        match self {
            Operator::Multi => ExprData::combinator(ExprKind::Multi),
            Operator::And => ExprData::combinator(ExprKind::LogicalAnd),
            Operator::Or => ExprData::combinator(ExprKind::LogicalOr),
            Operator::Group { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingOp {
    op: Operator,
    mark: Mark,
}

/// Parser state for one path expression.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    source: &'a [u8],
    lookahead: VecDeque<Token>,
    operands: Vec<Operand>,
    operators: Vec<PendingOp>,
    last_was_operand: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
            lookahead: VecDeque::new(),
            operands: Vec::new(),
            operators: Vec::new(),
            last_was_operand: false,
        }
    }

    /// Parses the whole input into an expression tree.
    pub fn parse(mut self) -> Result<ExpressionTree, ParseError> {
        let root = self.parse_expression()?;

        let mut nodes = Vec::new();
        let root = lower(root, None, &mut nodes);
        Ok(ExpressionTree {
            nodes,
            root,
            source: String::from_utf8_lossy(self.source).into_owned(),
        })
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => Ok(self.lexer.next_token()?),
        }
    }

    /// Returns the `n`-th upcoming token without consuming it.
    fn peek_nth(&mut self, n: usize) -> Result<&Token, ParseError> {
        while self.lookahead.len() <= n {
            let token = self.lexer.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(&self.lookahead[n])
    }

    fn parse_expression(&mut self) -> Result<Operand, ParseError> {
        let end_mark = loop {
            let token = self.next_token()?;
            let span = token.span;

            match token.kind {
                TokenKind::End => break span.start,
                TokenKind::Slash => self.slash(span)?,
                TokenKind::Caret => self.push_step(Operand::leaf(ExprData::Root, span)),
                TokenKind::Dot => self.push_step(Operand::leaf(ExprData::This, span)),
                TokenKind::DotDot => self.push_step(Operand::leaf(ExprData::Parent, span)),
                TokenKind::Star => self.push_step(Operand::leaf(ExprData::EveryChild, span)),
                TokenKind::StarStar => self.push_step(Operand::leaf(ExprData::EveryChildR, span)),
                TokenKind::ScalarFilter => {
                    self.push_step(Operand::leaf(ExprData::FilterScalar, span))
                }
                TokenKind::CollectionFilter => {
                    self.push_step(Operand::leaf(ExprData::FilterCollection, span))
                }
                TokenKind::SequenceFilter => {
                    self.push_step(Operand::leaf(ExprData::FilterSequence, span))
                }
                TokenKind::MappingFilter => {
                    self.push_step(Operand::leaf(ExprData::FilterMapping, span))
                }
                TokenKind::Key(key) => {
                    self.push_step(Operand::leaf(ExprData::MapKey(MapKey::Simple(key)), span))
                }
                TokenKind::FlowKey(text) => {
                    let step = flow_key(text, span)?;
                    self.push_step(step);
                }
                TokenKind::Alias(name) => self.push_step(Operand::leaf(ExprData::Alias(name), span)),
                TokenKind::Number(text) => self.bare_number(&text, span)?,
                TokenKind::Colon => self.sibling(span)?,
                TokenKind::LBracket => {
                    let step = self.bracket(span.start)?;
                    self.push_step(step);
                }
                TokenKind::Comma => self.push_operator(Operator::Multi, span.start)?,
                TokenKind::And => self.push_operator(Operator::And, span.start)?,
                TokenKind::Or => self.push_operator(Operator::Or, span.start)?,
                TokenKind::LParen => {
                    self.operators.push(PendingOp {
                        op: Operator::Group {
                            follows_operand: self.last_was_operand,
                            base: self.operands.len(),
                        },
                        mark: span.start,
                    });
                    self.last_was_operand = false;
                }
                TokenKind::RParen => self.close_group(span.start)?,
                kind @ (TokenKind::RBracket | TokenKind::Equals) => {
                    return Err(ParseError::UnexpectedToken {
                        found: kind.to_string(),
                        mark: span.start,
                    })
                }
            }
        };

        self.finish(end_mark)
    }

    /// Appends a step to the expression, chaining it to the preceding operand.
    fn push_step(&mut self, step: Operand) {
        let step = if self.last_was_operand {
            match self.operands.pop() {
                Some(prev) => prev.join(ExprData::Chain, step),
                None => step,
            }
        } else {
            step
        };
        self.operands.push(step);
        self.last_was_operand = true;
    }

    /// `/` is the root at the start of an expression, a collection filter at
    /// the end of one and a plain separator between two steps.
    fn slash(&mut self, span: Span) -> Result<(), ParseError> {
        if !self.last_was_operand {
            self.push_step(Operand::leaf(ExprData::Root, span));
            return Ok(());
        }

        let trailing = matches!(
            self.peek_nth(0)?.kind,
            TokenKind::End | TokenKind::RParen | TokenKind::Comma | TokenKind::And | TokenKind::Or
        );
        if trailing {
            self.push_step(Operand::leaf(ExprData::FilterCollection, span));
        }
        Ok(())
    }

    /// `:key` selects a sibling: the parent, then the key.
    fn sibling(&mut self, colon: Span) -> Result<(), ParseError> {
        let token = self.next_token()?;
        let key = match token.kind {
            TokenKind::Key(key) => Operand::leaf(ExprData::MapKey(MapKey::Simple(key)), token.span),
            TokenKind::FlowKey(text) => flow_key(text, token.span)?,
            other => {
                return Err(ParseError::UnexpectedToken {
                    found: other.to_string(),
                    mark: token.span.start,
                })
            }
        };
        self.push_step(Operand::leaf(ExprData::Parent, colon));
        self.push_step(key);
        Ok(())
    }

    /// A bare integer is an index; `a:b` with two integers is a slice.
    fn bare_number(&mut self, text: &str, span: Span) -> Result<(), ParseError> {
        let value = parse_int(text, span.start)?;

        let slice_end = if self.peek_nth(0)?.kind == TokenKind::Colon {
            match &self.peek_nth(1)?.kind {
                TokenKind::Number(end) => Some(end.clone()),
                _ => None,
            }
        } else {
            None
        };

        let step = match slice_end {
            Some(end) => {
                self.next_token()?;
                let end_token = self.next_token()?;
                let slice = Slice {
                    start: Some(value),
                    end: Some(parse_int(&end, end_token.mark())?),
                    stride: 1,
                };
                Operand::leaf(ExprData::SeqSlice(slice), span.merge(end_token.span))
            }
            None => Operand::leaf(ExprData::SeqIndex(value), span),
        };
        self.push_step(step);
        Ok(())
    }

    /// Parses the contents of `[ ... ]` into an index, an index set or a
    /// slice.
    fn bracket(&mut self, open: Mark) -> Result<Operand, ParseError> {
        let mut items = Vec::new();
        let close = loop {
            let token = self.next_token()?;
            match token.kind {
                TokenKind::RBracket => break token,
                TokenKind::End => return Err(ParseError::UnmatchedBracket { mark: open }),
                TokenKind::Number(_) | TokenKind::Colon | TokenKind::Comma => items.push(token),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        found: other.to_string(),
                        mark: token.span.start,
                    })
                }
            }
        };

        let span = Span::new(open, close.span.end);
        if items.iter().any(|t| t.kind == TokenKind::Colon) {
            slice_literal(&items, span)
        } else {
            index_set(&items, close.mark(), span)
        }
    }

    fn push_operator(&mut self, op: Operator, mark: Mark) -> Result<(), ParseError> {
        if !self.last_was_operand {
            return Err(ParseError::MissingOperand { mark });
        }

        while let Some(top) = self.operators.last().copied() {
            if matches!(top.op, Operator::Group { .. }) || top.op.precedence() < op.precedence() {
                break;
            }
            self.operators.pop();
            self.fold(top)?;
        }

        self.operators.push(PendingOp { op, mark });
        self.last_was_operand = false;
        Ok(())
    }

    /// Replaces the two topmost operands with the combinator of `pending`.
    fn fold(&mut self, pending: PendingOp) -> Result<(), ParseError> {
        let data = pending
            .op
            .combinator()
            .ok_or(ParseError::UnmatchedParen { mark: pending.mark })?;

        let rhs = self.operands.pop();
        let lhs = self.operands.pop();
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => {
                self.operands.push(lhs.join(data, rhs));
                Ok(())
            }
            _ => Err(ParseError::MissingOperand { mark: pending.mark }),
        }
    }

    fn close_group(&mut self, mark: Mark) -> Result<(), ParseError> {
        if !self.last_was_operand {
            return Err(match self.operators.last() {
                Some(PendingOp {
                    op: Operator::Group { .. },
                    mark,
                }) => ParseError::EmptyExpression { mark: *mark },
                Some(pending) => ParseError::MissingOperand { mark: pending.mark },
                None => ParseError::UnmatchedParen { mark },
            });
        }

        loop {
            let top = self
                .operators
                .pop()
                .ok_or(ParseError::UnmatchedParen { mark })?;

            if let Operator::Group {
                follows_operand,
                base,
            } = top.op
            {
                if self.operands.len() != base + 1 {
                    return Err(ParseError::IncompleteExpression { mark: top.mark });
                }
                if follows_operand {
                    match (self.operands.pop(), self.operands.pop()) {
                        (Some(inner), Some(outer)) => {
                            self.operands.push(outer.join(ExprData::Chain, inner))
                        }
                        _ => return Err(ParseError::IncompleteExpression { mark: top.mark }),
                    }
                }
                break;
            }

            self.fold(top)?;
        }

        self.last_was_operand = true;
        Ok(())
    }

    fn finish(&mut self, end: Mark) -> Result<Operand, ParseError> {
        if !self.last_was_operand {
            if let Some(top) = self.operators.last() {
                return Err(match top.op {
                    Operator::Group { .. } => ParseError::UnmatchedParen { mark: top.mark },
                    _ => ParseError::MissingOperand { mark: top.mark },
                });
            }
        }

        while let Some(top) = self.operators.pop() {
            if matches!(top.op, Operator::Group { .. }) {
                return Err(ParseError::UnmatchedParen { mark: top.mark });
            }
            self.fold(top)?;
        }

        if self.operands.len() > 1 {
            return Err(ParseError::IncompleteExpression {
                mark: self.operands[1].span.start,
            });
        }
        self.operands
            .pop()
            .ok_or(ParseError::EmptyExpression { mark: end })
    }
}

/// Moves an operand and its subtree into the arena in pre-order.
fn lower(operand: Operand, parent: Option<ExprId>, nodes: &mut Vec<ExprNode>) -> ExprId {
    let id = ExprId(nodes.len());
    nodes.push(ExprNode {
        data: operand.data,
        parent,
        children: Vec::new(),
        span: operand.span,
    });

    let children = operand
        .children
        .into_iter()
        .map(|child| lower(child, Some(id), nodes))
        .collect();
    nodes[id.0].children = children;
    id
}

fn parse_int(text: &str, mark: Mark) -> Result<i64, ParseError> {
    text.parse::<i64>()
        .map_err(|_| ParseError::NumberOutOfRange {
            text: text.to_string(),
            mark,
        })
}

/// Builds a map-key step from the text of a `{ ... }` literal.
fn flow_key(text: String, span: Span) -> Result<Operand, ParseError> {
    let key = Document::parse_str(&text).map_err(|err| ParseError::InvalidKey {
        message: err.to_string(),
        mark: span.start,
    })?;
    if key.root().is_none() {
        return Err(ParseError::InvalidKey {
            message: "empty key".to_string(),
            mark: span.start,
        });
    }
    Ok(Operand::leaf(
        ExprData::MapKey(MapKey::Complex { text, key }),
        span,
    ))
}

/// `[a:b]`, `[a:b:s]` and their forms with omitted parts.
fn slice_literal(items: &[Token], span: Span) -> Result<Operand, ParseError> {
    let mut fields: Vec<Vec<&Token>> = vec![Vec::new()];
    for token in items {
        match token.kind {
            TokenKind::Colon if fields.len() == 3 => {
                return Err(ParseError::UnexpectedToken {
                    found: token.kind.to_string(),
                    mark: token.mark(),
                })
            }
            TokenKind::Colon => fields.push(Vec::new()),
            TokenKind::Comma => {
                return Err(ParseError::UnexpectedToken {
                    found: token.kind.to_string(),
                    mark: token.mark(),
                })
            }
            _ => {
                if let Some(field) = fields.last_mut() {
                    field.push(token);
                }
            }
        }
    }

    let mut values = Vec::with_capacity(3);
    for field in &fields {
        let value = match field.as_slice() {
            [] => None,
            [token] => match &token.kind {
                TokenKind::Number(text) => Some((parse_int(text, token.mark())?, token.mark())),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        found: other.to_string(),
                        mark: token.mark(),
                    })
                }
            },
            [_, extra, ..] => {
                return Err(ParseError::UnexpectedToken {
                    found: extra.kind.to_string(),
                    mark: extra.mark(),
                })
            }
        };
        values.push(value);
    }

    let stride = match values.get(2).copied().flatten() {
        Some((0, mark)) => return Err(ParseError::ZeroStride { mark }),
        Some((stride, _)) => stride,
        None => 1,
    };
    let slice = Slice {
        start: values.first().copied().flatten().map(|(v, _)| v),
        end: values.get(1).copied().flatten().map(|(v, _)| v),
        stride,
    };
    Ok(Operand::leaf(ExprData::SeqSlice(slice), span))
}

/// `[i]` or `[i, j, ...]`; the latter becomes a multi of indices.
fn index_set(items: &[Token], close: Mark, span: Span) -> Result<Operand, ParseError> {
    let mut indices = Vec::new();
    let mut expecting = true;

    for token in items {
        match &token.kind {
            TokenKind::Number(text) if expecting => {
                let value = parse_int(text, token.mark())?;
                indices.push(Operand::leaf(ExprData::SeqIndex(value), token.span));
                expecting = false;
            }
            TokenKind::Comma if !expecting => expecting = true,
            TokenKind::Comma => return Err(ParseError::MissingOperand { mark: token.mark() }),
            other => {
                return Err(ParseError::UnexpectedToken {
                    found: other.to_string(),
                    mark: token.mark(),
                })
            }
        }
    }
    if expecting {
        return Err(ParseError::MissingOperand { mark: close });
    }

    if indices.len() == 1 {
        if let Some(mut index) = indices.pop() {
            index.span = span;
            return Ok(index);
        }
    }
    Ok(Operand {
        data: ExprData::Multi,
        children: indices,
        span,
    })
}
