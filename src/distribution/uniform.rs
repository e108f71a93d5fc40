//! Uniform distribution over a half-open interval.

use crate::distribution::Scale;
use crate::error::{Error, Result};
use crate::interval::{Interval, Numeric, NumericType};
use crate::rng_util;

/// Uniform over `[lower, upper)`, optionally log-scaled and quantized.
///
/// With [`Scale::Logarithmic`] the unit draw is mapped uniformly in log
/// space, so each decade receives equal mass; the support must then be
/// strictly positive. A nonzero quantization snaps draws down onto the grid
/// `lower + k * quantization`; `None` disables snapping.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniformDistribution {
    lower: Numeric,
    upper: Numeric,
    scale: Scale,
    quantization: Option<Numeric>,
}

impl UniformDistribution {
    /// Creates a uniform distribution over `[lower, upper)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint types differ, `lower >= upper`,
    /// a logarithmic scale is combined with a non-positive lower bound,
    /// or the quantization is not positive (or has the wrong type).
    pub fn new(
        lower: Numeric,
        upper: Numeric,
        scale: Scale,
        quantization: Option<Numeric>,
    ) -> Result<Self> {
        if lower.numeric_type() != upper.numeric_type() {
            return Err(Error::InvalidDistribution {
                reason: "lower and upper bounds must share a numeric type".to_string(),
            });
        }
        if lower.as_f64() >= upper.as_f64() {
            return Err(Error::InvalidBounds {
                lower: lower.as_f64(),
                upper: upper.as_f64(),
            });
        }
        if scale == Scale::Logarithmic && lower.as_f64() <= 0.0 {
            return Err(Error::InvalidDistribution {
                reason: "logarithmic scale requires a strictly positive lower bound".to_string(),
            });
        }
        if let Some(q) = quantization {
            if q.numeric_type() != lower.numeric_type() {
                return Err(Error::InvalidDistribution {
                    reason: "quantization must share the bounds' numeric type".to_string(),
                });
            }
            if q.as_f64() <= 0.0 {
                return Err(Error::InvalidDistribution {
                    reason: "quantization must be positive".to_string(),
                });
            }
        }
        Ok(Self {
            lower,
            upper,
            scale,
            quantization,
        })
    }

    /// Uniform float distribution over `[lower, upper)`, linear, unquantized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `lower >= upper`.
    pub fn float(lower: f64, upper: f64) -> Result<Self> {
        Self::new(
            Numeric::Float(lower),
            Numeric::Float(upper),
            Scale::Linear,
            None,
        )
    }

    /// Uniform integer distribution over `[lower, upper)`, linear, unquantized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `lower >= upper`.
    pub fn int(lower: i64, upper: i64) -> Result<Self> {
        Self::new(Numeric::Int(lower), Numeric::Int(upper), Scale::Linear, None)
    }

    /// Returns the numeric type of draws.
    #[must_use]
    pub fn data_type(&self) -> NumericType {
        self.lower.numeric_type()
    }

    /// Returns the scale of this distribution.
    #[must_use]
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Returns the quantization grid step, if any.
    #[must_use]
    pub fn quantization(&self) -> Option<Numeric> {
        self.quantization
    }

    /// Returns the support, `[lower, upper)`.
    #[must_use]
    pub fn bounds(&self) -> Interval {
        Interval::new(self.lower, self.upper, true, false)
            .expect("constructor validated matching endpoint types")
    }

    /// Draws one value.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Numeric {
        match self.data_type() {
            NumericType::Float => {
                let (lo, hi) = (self.lower.as_f64(), self.upper.as_f64());
                let raw = match self.scale {
                    Scale::Linear => rng_util::f64_range(rng, lo, hi),
                    Scale::Logarithmic => rng_util::f64_range(rng, lo.ln(), hi.ln()).exp(),
                };
                let v = match self.quantization {
                    Some(q) => lo + ((raw - lo) / q.as_f64()).floor() * q.as_f64(),
                    None => raw,
                };
                Numeric::Float(v)
            }
            NumericType::Int => {
                let (Numeric::Int(lo), Numeric::Int(hi)) = (self.lower, self.upper) else {
                    unreachable!("data_type matched Int")
                };
                let v = match self.scale {
                    Scale::Logarithmic => {
                        let raw = rng_util::f64_range(rng, (lo as f64).ln(), (hi as f64).ln());
                        (raw.exp().floor() as i64).clamp(lo, hi - 1)
                    }
                    Scale::Linear => match self.quantization {
                        // Sample from the step grid directly so every grid
                        // point inside [lower, upper) is equally likely.
                        Some(Numeric::Int(q)) => {
                            let n_steps = (hi - 1 - lo) / q;
                            lo + rng.i64(0..=n_steps) * q
                        }
                        _ => rng.i64(lo..hi),
                    },
                };
                Numeric::Int(v)
            }
        }
    }
}
