//! The tagged value type flowing through the whole engine.

use core::cmp::Ordering;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::interval::Numeric;

/// A single value as seen by parameters, expressions, and bindings.
///
/// `Datum` is the engine's universal value currency: parameter defaults,
/// sampled values, expression results, and objective values are all datums.
///
/// Two variants deserve a note:
///
/// - [`Datum::None`] is an ordinary "no value" marker, comparable only for
///   equality.
/// - [`Datum::Inactive`] is a distinguished sentinel meaning "this parameter
///   is conditionally disabled in this assignment". It is **not** the same
///   as `None`: a conditional parameter whose activation condition is false
///   holds exactly `Inactive`, and every operation other than equality and
///   inequality rejects it.
///
/// Strings are shared (`Arc<str>`), so cloning a datum never copies the
/// backing text.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Datum {
    /// No value.
    None,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer value.
    Int(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A shared string value.
    Str(Arc<str>),
    /// The sentinel for a conditionally disabled parameter.
    Inactive,
}

impl Datum {
    /// Returns the name of this datum's type tag, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Datum::None => "none",
            Datum::Bool(_) => "bool",
            Datum::Int(_) => "int",
            Datum::Float(_) => "float",
            Datum::Str(_) => "string",
            Datum::Inactive => "inactive",
        }
    }

    /// Returns `true` if this is the [`Datum::Inactive`] sentinel.
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        matches!(self, Datum::Inactive)
    }

    /// Returns the numeric content of an `Int` or `Float` datum.
    #[must_use]
    pub fn as_numeric(&self) -> Option<Numeric> {
        match self {
            Datum::Int(v) => Some(Numeric::Int(*v)),
            Datum::Float(v) => Some(Numeric::Float(*v)),
            _ => None,
        }
    }

    /// Returns the boolean content of a `Bool` datum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidType`] for any other variant.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Datum::Bool(b) => Ok(*b),
            other => Err(Error::InvalidType {
                expected: "bool",
                got: other.type_name(),
            }),
        }
    }

    /// Value equality with numeric promotion.
    ///
    /// `Int` and `Float` compare by value (`1 == 1.0`); all other variants
    /// compare only within their own type. Values of unrelated types are
    /// unequal rather than an error, so `Inactive == 3` is simply `false`
    /// while `Inactive == Inactive` is `true`.
    #[must_use]
    pub fn eq_value(&self, other: &Datum) -> bool {
        match (self, other) {
            (Datum::Int(a), Datum::Float(b)) | (Datum::Float(b), Datum::Int(a)) =>
            {
                #[allow(clippy::cast_precision_loss)]
                (*a as f64 == *b)
            }
            (a, b) => a == b,
        }
    }

    /// Orders two datums.
    ///
    /// Numbers order by value with `Int` promoting to `Float` when mixed;
    /// strings order lexicographically. Everything else, including any
    /// ordering attempt involving [`Datum::Inactive`], fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotComparable`] when no order is defined for the
    /// pair of type tags.
    pub fn compare(&self, other: &Datum) -> Result<Ordering> {
        let not_comparable = || Error::TypeNotComparable {
            lhs: self.type_name(),
            rhs: other.type_name(),
        };
        match (self, other) {
            (Datum::Str(a), Datum::Str(b)) => Ok(a.cmp(b)),
            _ => match (self.as_numeric(), other.as_numeric()) {
                (Some(a), Some(b)) => a.compare(&b).ok_or_else(not_comparable),
                _ => Err(not_comparable()),
            },
        }
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::Bool(v)
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Int(v)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Float(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Str(Arc::from(v))
    }
}

impl From<Numeric> for Datum {
    fn from(v: Numeric) -> Self {
        match v {
            Numeric::Int(i) => Datum::Int(i),
            Numeric::Float(f) => Datum::Float(f),
        }
    }
}

impl core::fmt::Display for Datum {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Datum::None => write!(f, "none"),
            Datum::Bool(b) => write!(f, "{b}"),
            Datum::Int(v) => write!(f, "{v}"),
            // Debug formatting keeps the decimal point ("1.0", not "1"),
            // which the expression parser relies on to keep the type tag.
            Datum::Float(v) => write!(f, "{v:?}"),
            Datum::Str(s) => {
                write!(f, "'")?;
                for c in s.chars() {
                    if c == '\'' || c == '\\' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "'")
            }
            Datum::Inactive => write!(f, "inactive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_value_promotes_numbers() {
        assert!(Datum::Int(1).eq_value(&Datum::Float(1.0)));
        assert!(Datum::Float(2.5).eq_value(&Datum::Float(2.5)));
        assert!(!Datum::Int(1).eq_value(&Datum::Float(1.5)));
    }

    #[test]
    fn test_eq_value_across_types_is_false() {
        assert!(!Datum::Int(0).eq_value(&Datum::Bool(false)));
        assert!(!Datum::Inactive.eq_value(&Datum::None));
        assert!(Datum::Inactive.eq_value(&Datum::Inactive));
    }

    #[test]
    fn test_compare_numbers_and_strings() {
        assert_eq!(
            Datum::Int(1).compare(&Datum::Float(1.5)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Datum::from("b").compare(&Datum::from("a")).unwrap(),
            Ordering::Greater
        );
    }

    #[test]
    fn test_compare_inactive_fails() {
        let err = Datum::Inactive.compare(&Datum::Int(1)).unwrap_err();
        assert!(matches!(err, Error::TypeNotComparable { .. }));
    }

    #[test]
    fn test_display_round_trip_shapes() {
        assert_eq!(Datum::Float(1.0).to_string(), "1.0");
        assert_eq!(Datum::Int(1).to_string(), "1");
        assert_eq!(Datum::from("it's").to_string(), "'it\\'s'");
    }
}
