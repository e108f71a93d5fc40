//! Typed numeric scalars and bounds-checked intervals.

use core::cmp::Ordering;

use crate::datum::Datum;
use crate::error::{Error, Result};

/// The numeric type carried by a [`Numeric`] scalar or an [`Interval`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericType {
    /// 64-bit signed integers.
    Int,
    /// 64-bit floating-point numbers.
    Float,
}

/// A typed numeric scalar.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Numeric {
    /// An integer scalar.
    Int(i64),
    /// A floating-point scalar.
    Float(f64),
}

impl Numeric {
    /// Returns the type tag of this scalar.
    #[must_use]
    pub fn numeric_type(&self) -> NumericType {
        match self {
            Numeric::Int(_) => NumericType::Int,
            Numeric::Float(_) => NumericType::Float,
        }
    }

    /// Returns the value as an `f64`, promoting integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match self {
            Numeric::Int(v) => *v as f64,
            Numeric::Float(v) => *v,
        }
    }

    /// Orders two scalars, promoting `Int` to `Float` when mixed.
    ///
    /// Returns `None` only when a float operand is NaN.
    #[must_use]
    pub fn compare(&self, other: &Numeric) -> Option<Ordering> {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl From<i64> for Numeric {
    fn from(v: i64) -> Self {
        Numeric::Int(v)
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric::Float(v)
    }
}

impl core::fmt::Display for Numeric {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Numeric::Int(v) => write!(f, "{v}"),
            Numeric::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// A typed numeric range with independently open or closed endpoints.
///
/// Both endpoints always carry the interval's [`NumericType`]; constructors
/// reject mixed tags. Distributions report their support as intervals, and
/// numerical parameters use them as their domain.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    lower: Numeric,
    upper: Numeric,
    lower_included: bool,
    upper_included: bool,
}

impl Interval {
    /// Creates an interval from two endpoints of the same numeric type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidType`] if the endpoint tags differ.
    pub fn new(
        lower: Numeric,
        upper: Numeric,
        lower_included: bool,
        upper_included: bool,
    ) -> Result<Self> {
        if lower.numeric_type() != upper.numeric_type() {
            return Err(Error::InvalidType {
                expected: match lower.numeric_type() {
                    NumericType::Int => "int",
                    NumericType::Float => "float",
                },
                got: match upper.numeric_type() {
                    NumericType::Int => "int",
                    NumericType::Float => "float",
                },
            });
        }
        Ok(Self {
            lower,
            upper,
            lower_included,
            upper_included,
        })
    }

    /// A half-open integer interval `[lower, upper)`.
    #[must_use]
    pub fn int(lower: i64, upper: i64) -> Self {
        Self {
            lower: Numeric::Int(lower),
            upper: Numeric::Int(upper),
            lower_included: true,
            upper_included: false,
        }
    }

    /// A half-open float interval `[lower, upper)`.
    #[must_use]
    pub fn float(lower: f64, upper: f64) -> Self {
        Self {
            lower: Numeric::Float(lower),
            upper: Numeric::Float(upper),
            lower_included: true,
            upper_included: false,
        }
    }

    /// The unbounded float interval `(-inf, +inf)`.
    #[must_use]
    pub fn unbounded_float() -> Self {
        Self {
            lower: Numeric::Float(f64::NEG_INFINITY),
            upper: Numeric::Float(f64::INFINITY),
            lower_included: false,
            upper_included: false,
        }
    }

    /// The full integer interval `[i64::MIN, i64::MAX]`.
    #[must_use]
    pub fn unbounded_int() -> Self {
        Self {
            lower: Numeric::Int(i64::MIN),
            upper: Numeric::Int(i64::MAX),
            lower_included: true,
            upper_included: true,
        }
    }

    /// Returns the numeric type shared by both endpoints.
    #[must_use]
    pub fn numeric_type(&self) -> NumericType {
        self.lower.numeric_type()
    }

    /// Returns the lower endpoint.
    #[must_use]
    pub fn lower(&self) -> Numeric {
        self.lower
    }

    /// Returns the upper endpoint.
    #[must_use]
    pub fn upper(&self) -> Numeric {
        self.upper
    }

    /// Returns `true` if the lower endpoint belongs to the interval.
    #[must_use]
    pub fn lower_included(&self) -> bool {
        self.lower_included
    }

    /// Returns `true` if the upper endpoint belongs to the interval.
    #[must_use]
    pub fn upper_included(&self) -> bool {
        self.upper_included
    }

    /// Returns `true` if no value satisfies both endpoint constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.lower.compare(&self.upper) {
            Some(Ordering::Less) => false,
            Some(Ordering::Equal) => !(self.lower_included && self.upper_included),
            Some(Ordering::Greater) | None => true,
        }
    }

    /// Returns `true` if `value` lies within the interval.
    ///
    /// The value's type promotes freely: an integer may be tested against a
    /// float interval and vice versa.
    #[must_use]
    pub fn contains(&self, value: Numeric) -> bool {
        let above_lower = match value.compare(&self.lower) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => self.lower_included,
            _ => false,
        };
        let below_upper = match value.compare(&self.upper) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => self.upper_included,
            _ => false,
        };
        above_lower && below_upper
    }

    /// Returns `true` if `value` is a numeric datum lying within the interval.
    #[must_use]
    pub fn contains_datum(&self, value: &Datum) -> bool {
        value.as_numeric().is_some_and(|n| self.contains(n))
    }

    /// Intersects two intervals of the same numeric type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidType`] if the numeric types differ.
    pub fn intersect(&self, other: &Interval) -> Result<Interval> {
        if self.numeric_type() != other.numeric_type() {
            return Err(Error::InvalidType {
                expected: "interval of matching numeric type",
                got: "interval of different numeric type",
            });
        }

        let (lower, lower_included) = match self.lower.compare(&other.lower) {
            Some(Ordering::Less) => (other.lower, other.lower_included),
            Some(Ordering::Greater) => (self.lower, self.lower_included),
            _ => (self.lower, self.lower_included && other.lower_included),
        };
        let (upper, upper_included) = match self.upper.compare(&other.upper) {
            Some(Ordering::Greater) => (other.upper, other.upper_included),
            Some(Ordering::Less) => (self.upper, self.upper_included),
            _ => (self.upper, self.upper_included && other.upper_included),
        };

        Ok(Interval {
            lower,
            upper,
            lower_included,
            upper_included,
        })
    }
}

impl core::fmt::Display for Interval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower_included { '[' } else { '(' },
            self.lower,
            self.upper,
            if self.upper_included { ']' } else { ')' },
        )
    }
}
