//! Expression text parsing.
//!
//! Precedence-climbing over the fixed operator table in the parent module.
//! Identifiers resolve against a [`Context`]; the keywords `true`, `false`,
//! `none`, and `inactive` are reserved literals.

use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::expr::{BinaryOp, Expr, UnaryOp};
use crate::space::Context;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(&'static str),
}

fn err(reason: impl Into<String>) -> Error {
    Error::InvalidExpression {
        reason: reason.into(),
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            c if c.is_ascii_digit() => {
                let mut text = String::new();
                let mut is_float = false;
                while let Some(&c) = chars.peek() {
                    match c {
                        '0'..='9' => text.push(c),
                        '.' | 'e' | 'E' => {
                            is_float = true;
                            text.push(c);
                        }
                        '+' | '-' if matches!(text.chars().last(), Some('e' | 'E')) => {
                            text.push(c);
                        }
                        _ => break,
                    }
                    chars.next();
                }
                if is_float {
                    let v: f64 = text
                        .parse()
                        .map_err(|_| err(format!("malformed number '{text}'")))?;
                    tokens.push(Token::Float(v));
                } else {
                    let v: i64 = text
                        .parse()
                        .map_err(|_| err(format!("malformed number '{text}'")))?;
                    tokens.push(Token::Int(v));
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some(e) => s.push(e),
                            None => return Err(err("unterminated escape in string literal")),
                        },
                        Some(c) if c == quote => break,
                        Some(c) => s.push(c),
                        None => return Err(err("unterminated string literal")),
                    }
                }
                tokens.push(Token::Str(s));
            }
            '|' | '&' | '=' | '!' | '<' | '>' => {
                chars.next();
                let next = chars.peek().copied();
                let sym = match (c, next) {
                    ('|', Some('|')) => {
                        chars.next();
                        "||"
                    }
                    ('&', Some('&')) => {
                        chars.next();
                        "&&"
                    }
                    ('=', Some('=')) => {
                        chars.next();
                        "=="
                    }
                    ('!', Some('=')) => {
                        chars.next();
                        "!="
                    }
                    ('<', Some('=')) => {
                        chars.next();
                        "<="
                    }
                    ('>', Some('=')) => {
                        chars.next();
                        ">="
                    }
                    ('!', _) => "!",
                    ('<', _) => "<",
                    ('>', _) => ">",
                    _ => return Err(err(format!("unexpected character '{c}'"))),
                };
                tokens.push(Token::Symbol(sym));
            }
            '+' | '-' | '*' | '/' | '%' | '#' | '(' | ')' | '[' | ']' | ',' => {
                chars.next();
                let sym = match c {
                    '+' => "+",
                    '-' => "-",
                    '*' => "*",
                    '/' => "/",
                    '%' => "%",
                    '#' => "#",
                    '(' => "(",
                    ')' => ")",
                    '[' => "[",
                    ']' => "]",
                    _ => ",",
                };
                tokens.push(Token::Symbol(sym));
            }
            other => return Err(err(format!("unexpected character '{other}'"))),
        }
    }

    Ok(tokens)
}

fn binary_op(sym: &str) -> Option<BinaryOp> {
    Some(match sym {
        "||" => BinaryOp::Or,
        "&&" => BinaryOp::And,
        "==" => BinaryOp::Equal,
        "!=" => BinaryOp::NotEqual,
        "<" => BinaryOp::Less,
        "<=" => BinaryOp::LessOrEqual,
        ">" => BinaryOp::Greater,
        ">=" => BinaryOp::GreaterOrEqual,
        "#" => BinaryOp::In,
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Subtract,
        "*" => BinaryOp::Multiply,
        "/" => BinaryOp::Divide,
        "%" => BinaryOp::Modulo,
        _ => return None,
    })
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    context: &'a Context,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect_symbol(&mut self, sym: &str) -> Result<()> {
        match self.next() {
            Some(Token::Symbol(s)) if s == sym => Ok(()),
            other => Err(err(format!("expected '{sym}', found {other:?}"))),
        }
    }

    fn parse_expr(&mut self, min_prec: u8) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some(Token::Symbol(sym)) = self.peek() {
            let Some(op) = binary_op(sym) else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            // Left-associative: the right side must bind strictly tighter.
            let rhs = self.parse_expr(prec + 1)?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if let Some(Token::Symbol(sym)) = self.peek() {
            let op = match *sym {
                "!" => Some(UnaryOp::Not),
                "+" => Some(UnaryOp::Plus),
                "-" => Some(UnaryOp::Minus),
                _ => None,
            };
            if let Some(op) = op {
                self.pos += 1;
                let operand = self.parse_unary()?;
                return Ok(Expr::unary(op, operand));
            }
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::Int(v)) => Ok(Expr::Literal(Datum::Int(v))),
            Some(Token::Float(v)) => Ok(Expr::Literal(Datum::Float(v))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Datum::from(s.as_str()))),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Expr::Literal(Datum::Bool(true))),
                "false" => Ok(Expr::Literal(Datum::Bool(false))),
                "none" => Ok(Expr::Literal(Datum::None)),
                "inactive" => Ok(Expr::Literal(Datum::Inactive)),
                _ => match self.context.get_by_name(&name) {
                    Some(p) => Ok(Expr::variable(p)),
                    None => Err(err(format!(
                        "identifier '{name}' does not name a parameter in context '{}'",
                        self.context.name()
                    ))),
                },
            },
            Some(Token::Symbol("(")) => {
                let e = self.parse_expr(0)?;
                self.expect_symbol(")")?;
                Ok(e)
            }
            Some(Token::Symbol("[")) => {
                let mut items = Vec::new();
                if matches!(self.peek(), Some(Token::Symbol("]"))) {
                    self.pos += 1;
                    return Ok(Expr::List(items));
                }
                loop {
                    items.push(self.parse_expr(0)?);
                    match self.next() {
                        Some(Token::Symbol(",")) => {}
                        Some(Token::Symbol("]")) => break,
                        other => return Err(err(format!("expected ',' or ']', found {other:?}"))),
                    }
                }
                Ok(Expr::List(items))
            }
            other => Err(err(format!("unexpected token {other:?}"))),
        }
    }
}

pub(super) fn parse(text: &str, context: &Context) -> Result<Expr> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(err("empty expression"));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        context,
    };
    let expr = parser.parse_expr(0)?;
    if parser.pos != parser.tokens.len() {
        return Err(err(format!(
            "trailing input after expression: {:?}",
            parser.tokens[parser.pos]
        )));
    }
    Ok(expr)
}
