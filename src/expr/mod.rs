//! Typed expression AST used by conditions, forbidden clauses, and
//! objectives.
//!
//! An [`Expr`] is a closed tree of literals, parameter references, unary and
//! binary operators, and lists. The operator table (symbol, precedence,
//! associativity) is fixed and shared between [`Display`](core::fmt::Display)
//! rendering and [`Expr::parse`], so `parse(e.to_string())` reproduces `e`.
//!
//! Evaluation needs the current values of referenced parameters, supplied
//! through a [`VariableLookup`]. The [`Datum::Inactive`] sentinel is only
//! transparent to equality and inequality; every other operator rejects it,
//! so conditions over possibly-inactive parameters are written with equality
//! guards (`p == 'on' && q < 3` short-circuits before touching `q`).
//!
//! # Example
//!
//! ```
//! use confspace::expr::Expr;
//! use confspace::parameter::Parameter;
//! use confspace::space::Context;
//!
//! let ctx = Context::new(
//!     "params",
//!     vec![Parameter::int("n", 0, 10).unwrap()],
//! )
//! .unwrap();
//! let e = Expr::parse("n > 2 && n # [3, 4, 5]", &ctx).unwrap();
//! assert_eq!(e.to_string(), "n > 2 && n # [3, 4, 5]");
//! ```

mod parse;

use std::collections::HashMap;

use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::parameter::{ParamId, Parameter};
use crate::space::Context;

/// Prefix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    /// Boolean negation, `!`.
    Not,
    /// Numeric identity, `+`.
    Plus,
    /// Numeric negation, `-`.
    Minus,
}

impl UnaryOp {
    /// The operator's textual symbol.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

/// Infix operators, all left-associative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    /// Boolean or, `||`.
    Or,
    /// Boolean and, `&&`.
    And,
    /// Value equality, `==`.
    Equal,
    /// Value inequality, `!=`.
    NotEqual,
    /// Strict order, `<`.
    Less,
    /// Non-strict order, `<=`.
    LessOrEqual,
    /// Strict order, `>`.
    Greater,
    /// Non-strict order, `>=`.
    GreaterOrEqual,
    /// List membership, `#`.
    In,
    /// Addition, `+`.
    Add,
    /// Subtraction, `-`.
    Subtract,
    /// Multiplication, `*`.
    Multiply,
    /// Division, `/`.
    Divide,
    /// Remainder, `%`.
    Modulo,
}

impl BinaryOp {
    /// The operator's textual symbol.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::In => "#",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        }
    }

    /// Binding strength; higher binds tighter.
    #[must_use]
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Equal | BinaryOp::NotEqual => 3,
            BinaryOp::Less
            | BinaryOp::LessOrEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterOrEqual => 4,
            BinaryOp::In => 5,
            BinaryOp::Add | BinaryOp::Subtract => 6,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 7,
        }
    }
}

/// Binding strength of prefix operators.
const UNARY_PRECEDENCE: u8 = 8;
/// Binding strength of atoms (literals, variables, lists).
const ATOM_PRECEDENCE: u8 = 9;

/// Supplies current values for parameters referenced by an expression.
pub trait VariableLookup {
    /// Returns the current value bound to `param`, or `None` if unbound.
    fn value_of(&self, param: &Parameter) -> Option<Datum>;
}

impl VariableLookup for () {
    fn value_of(&self, _param: &Parameter) -> Option<Datum> {
        None
    }
}

impl VariableLookup for HashMap<ParamId, Datum> {
    fn value_of(&self, param: &Parameter) -> Option<Datum> {
        self.get(&param.id()).cloned()
    }
}

impl<T: VariableLookup + ?Sized> VariableLookup for &T {
    fn value_of(&self, param: &Parameter) -> Option<Datum> {
        (**self).value_of(param)
    }
}

/// Chains two lookups, trying `first` then `second`.
pub struct ChainLookup<A, B>(pub A, pub B);

impl<A: VariableLookup, B: VariableLookup> VariableLookup for ChainLookup<A, B> {
    fn value_of(&self, param: &Parameter) -> Option<Datum> {
        self.0.value_of(param).or_else(|| self.1.value_of(param))
    }
}

/// A typed expression tree.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// A constant value.
    Literal(Datum),
    /// A reference to a parameter's current value.
    Variable(Parameter),
    /// A prefix operator application.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
    },
    /// An infix operator application.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left operand.
        lhs: Box<Expr>,
        /// The right operand.
        rhs: Box<Expr>,
    },
    /// A list of expressions; valid only as the right operand of `#`.
    List(Vec<Expr>),
}

impl Expr {
    /// A literal expression.
    #[must_use]
    pub fn literal(value: impl Into<Datum>) -> Self {
        Expr::Literal(value.into())
    }

    /// A variable reference to `param`.
    #[must_use]
    pub fn variable(param: &Parameter) -> Self {
        Expr::Variable(param.clone())
    }

    /// Applies a prefix operator.
    #[must_use]
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Applies an infix operator.
    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Parses an expression, resolving identifiers against `context`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] on malformed input or an
    /// identifier with no parameter of that name in `context`.
    pub fn parse(text: &str, context: &Context) -> Result<Expr> {
        parse::parse(text, context)
    }

    /// Binding strength of this node; used for parenthesization.
    #[must_use]
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Literal(_) | Expr::Variable(_) | Expr::List(_) => ATOM_PRECEDENCE,
            Expr::Unary { .. } => UNARY_PRECEDENCE,
            Expr::Binary { op, .. } => op.precedence(),
        }
    }

    /// Evaluates the expression against the supplied variable values.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidExpression`] for an unbound variable or a list in
    ///   value position.
    /// - [`Error::InvalidValue`] when [`Datum::Inactive`] reaches any
    ///   operator other than `==`/`!=`, on integer division by zero, or on
    ///   integer overflow.
    /// - [`Error::InvalidType`] / [`Error::TypeNotComparable`] on operand
    ///   type mismatches.
    pub fn eval(&self, vars: &dyn VariableLookup) -> Result<Datum> {
        match self {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Variable(p) => vars.value_of(p).ok_or_else(|| Error::InvalidExpression {
                reason: format!("variable '{}' is not bound to a value", p.name()),
            }),
            Expr::List(_) => Err(Error::InvalidExpression {
                reason: "a list is not a value; lists only appear on the right of '#'"
                    .to_string(),
            }),
            Expr::Unary { op, operand } => {
                let v = operand.eval(vars)?;
                reject_inactive(&v)?;
                match op {
                    UnaryOp::Not => Ok(Datum::Bool(!v.as_bool()?)),
                    UnaryOp::Plus => match v {
                        Datum::Int(_) | Datum::Float(_) => Ok(v),
                        other => Err(Error::InvalidType {
                            expected: "number",
                            got: other.type_name(),
                        }),
                    },
                    UnaryOp::Minus => match v {
                        Datum::Int(i) => Ok(Datum::Int(-i)),
                        Datum::Float(f) => Ok(Datum::Float(-f)),
                        other => Err(Error::InvalidType {
                            expected: "number",
                            got: other.type_name(),
                        }),
                    },
                }
            }
            Expr::Binary { op, lhs, rhs } => Self::eval_binary(*op, lhs, rhs, vars),
        }
    }

    fn eval_binary(
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        vars: &dyn VariableLookup,
    ) -> Result<Datum> {
        match op {
            // Short-circuiting lets a guard like `p == 'on'` protect the
            // right operand from inactive values.
            BinaryOp::And => {
                let l = lhs.eval(vars)?;
                reject_inactive(&l)?;
                if !l.as_bool()? {
                    return Ok(Datum::Bool(false));
                }
                let r = rhs.eval(vars)?;
                reject_inactive(&r)?;
                Ok(Datum::Bool(r.as_bool()?))
            }
            BinaryOp::Or => {
                let l = lhs.eval(vars)?;
                reject_inactive(&l)?;
                if l.as_bool()? {
                    return Ok(Datum::Bool(true));
                }
                let r = rhs.eval(vars)?;
                reject_inactive(&r)?;
                Ok(Datum::Bool(r.as_bool()?))
            }
            BinaryOp::Equal => Ok(Datum::Bool(lhs.eval(vars)?.eq_value(&rhs.eval(vars)?))),
            BinaryOp::NotEqual => Ok(Datum::Bool(!lhs.eval(vars)?.eq_value(&rhs.eval(vars)?))),
            BinaryOp::Less
            | BinaryOp::LessOrEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterOrEqual => {
                let l = lhs.eval(vars)?;
                let r = rhs.eval(vars)?;
                reject_inactive(&l)?;
                reject_inactive(&r)?;
                let ord = l.compare(&r)?;
                Ok(Datum::Bool(match op {
                    BinaryOp::Less => ord.is_lt(),
                    BinaryOp::LessOrEqual => ord.is_le(),
                    BinaryOp::Greater => ord.is_gt(),
                    _ => ord.is_ge(),
                }))
            }
            BinaryOp::In => {
                let Expr::List(items) = rhs else {
                    return Err(Error::InvalidExpression {
                        reason: "the right operand of '#' must be a list".to_string(),
                    });
                };
                let needle = lhs.eval(vars)?;
                for item in items {
                    if item.eval(vars)?.eq_value(&needle) {
                        return Ok(Datum::Bool(true));
                    }
                }
                Ok(Datum::Bool(false))
            }
            BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide
            | BinaryOp::Modulo => {
                let l = lhs.eval(vars)?;
                let r = rhs.eval(vars)?;
                reject_inactive(&l)?;
                reject_inactive(&r)?;
                arithmetic(op, &l, &r)
            }
        }
    }

    /// Returns the referenced parameters, deduplicated, in first-use order.
    #[must_use]
    pub fn parameters(&self) -> Vec<Parameter> {
        let mut out: Vec<Parameter> = Vec::new();
        self.collect_parameters(&mut out);
        out
    }

    fn collect_parameters(&self, out: &mut Vec<Parameter>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Variable(p) => {
                if !out.iter().any(|q| q.id() == p.id()) {
                    out.push(p.clone());
                }
            }
            Expr::Unary { operand, .. } => operand.collect_parameters(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_parameters(out);
                rhs.collect_parameters(out);
            }
            Expr::List(items) => {
                for item in items {
                    item.collect_parameters(out);
                }
            }
        }
    }

    /// Verifies that every referenced parameter belongs to `context`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] naming the first parameter that
    /// does not.
    pub fn check_context(&self, context: &Context) -> Result<()> {
        for p in self.parameters() {
            if context.index_of(&p).is_none() {
                return Err(Error::InvalidExpression {
                    reason: format!("parameter '{}' is not part of the context", p.name()),
                });
            }
        }
        Ok(())
    }
}

fn reject_inactive(v: &Datum) -> Result<()> {
    if v.is_inactive() {
        return Err(Error::InvalidValue {
            reason: "inactive values only support equality and inequality".to_string(),
        });
    }
    Ok(())
}

/// Numeric arithmetic with Int→Float promotion on mixed operands.
fn arithmetic(op: BinaryOp, l: &Datum, r: &Datum) -> Result<Datum> {
    let type_error = |got: &Datum| Error::InvalidType {
        expected: "number",
        got: got.type_name(),
    };
    match (l, r) {
        (Datum::Int(a), Datum::Int(b)) => {
            let (a, b) = (*a, *b);
            if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && b == 0 {
                return Err(Error::InvalidValue {
                    reason: "integer division by zero".to_string(),
                });
            }
            match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Subtract => a.checked_sub(b),
                BinaryOp::Multiply => a.checked_mul(b),
                BinaryOp::Divide => a.checked_div(b),
                _ => a.checked_rem(b),
            }
            .map(Datum::Int)
            .ok_or_else(|| Error::InvalidValue {
                reason: "integer overflow".to_string(),
            })
        }
        _ => {
            let a = l.as_numeric().ok_or_else(|| type_error(l))?.as_f64();
            let b = r.as_numeric().ok_or_else(|| type_error(r))?.as_f64();
            Ok(Datum::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                _ => a % b,
            }))
        }
    }
}

impl core::fmt::Display for Expr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // A child is parenthesized when it binds more loosely than its
        // parent; right children of equal precedence are parenthesized too,
        // preserving left associativity (`a - (b - c)`).
        fn write_child(
            f: &mut core::fmt::Formatter<'_>,
            child: &Expr,
            parent_prec: u8,
            is_right: bool,
        ) -> core::fmt::Result {
            let needs_parens = if is_right {
                child.precedence() <= parent_prec
            } else {
                child.precedence() < parent_prec
            };
            if needs_parens {
                write!(f, "({child})")
            } else {
                write!(f, "{child}")
            }
        }

        match self {
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Variable(p) => write!(f, "{}", p.name()),
            Expr::Unary { op, operand } => {
                write!(f, "{}", op.symbol())?;
                write_child(f, operand, UNARY_PRECEDENCE, false)
            }
            Expr::Binary { op, lhs, rhs } => {
                write_child(f, lhs, op.precedence(), false)?;
                write!(f, " {} ", op.symbol())?;
                write_child(f, rhs, op.precedence(), true)
            }
            Expr::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}
