//! Gaussian distribution with unbounded support.

use crate::distribution::Scale;
use crate::error::{Error, Result};
use crate::interval::{Interval, Numeric, NumericType};
use crate::rng_util;

/// A Gaussian law with mean `mu` and standard deviation `sigma`.
///
/// With [`Scale::Logarithmic`] the Gaussian draw is exponentiated, giving a
/// log-normal law. Integer output rounds to the nearest integer. A nonzero
/// quantization snaps draws to the nearest multiple of the grid step. The
/// support is unbounded in every case, so sampling a bounded parameter from
/// a normal distribution always goes through rejection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalDistribution {
    data_type: NumericType,
    mu: f64,
    sigma: f64,
    scale: Scale,
    quantization: Option<Numeric>,
}

impl NormalDistribution {
    /// Creates a Gaussian distribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if `sigma` is not strictly
    /// positive or the quantization is malformed.
    pub fn new(
        data_type: NumericType,
        mu: f64,
        sigma: f64,
        scale: Scale,
        quantization: Option<Numeric>,
    ) -> Result<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(Error::InvalidDistribution {
                reason: format!("sigma must be positive and finite, got {sigma}"),
            });
        }
        if let Some(q) = quantization {
            if q.numeric_type() != data_type || q.as_f64() <= 0.0 {
                return Err(Error::InvalidDistribution {
                    reason: "quantization must be positive and match the data type".to_string(),
                });
            }
        }
        Ok(Self {
            data_type,
            mu,
            sigma,
            scale,
            quantization,
        })
    }

    /// A linear float Gaussian, unquantized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if `sigma` is not positive.
    pub fn float(mu: f64, sigma: f64) -> Result<Self> {
        Self::new(NumericType::Float, mu, sigma, Scale::Linear, None)
    }

    /// Returns the numeric type of draws.
    #[must_use]
    pub fn data_type(&self) -> NumericType {
        self.data_type
    }

    /// Returns the mean.
    #[must_use]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Returns the standard deviation.
    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Returns the unbounded support for this data type.
    #[must_use]
    pub fn bounds(&self) -> Interval {
        match self.data_type {
            NumericType::Float => Interval::unbounded_float(),
            NumericType::Int => Interval::unbounded_int(),
        }
    }

    /// Draws one value via the Box-Muller transform.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Numeric {
        let raw = rng_util::normal(rng, self.mu, self.sigma);
        let v = match self.scale {
            Scale::Linear => raw,
            Scale::Logarithmic => raw.exp(),
        };
        let v = match self.quantization {
            Some(q) => (v / q.as_f64()).round() * q.as_f64(),
            None => v,
        };
        match self.data_type {
            NumericType::Float => Numeric::Float(v),
            NumericType::Int => Numeric::Int(v.round() as i64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_converges() {
        let d = NormalDistribution::float(3.0, 1.0).unwrap();
        let mut rng = fastrand::Rng::with_seed(11);
        let n = 20_000;
        let sum: f64 = (0..n).map(|_| d.sample(&mut rng).as_f64()).sum();
        assert!((sum / f64::from(n) - 3.0).abs() < 0.05);
    }

    #[test]
    fn test_lognormal_is_positive() {
        let d =
            NormalDistribution::new(NumericType::Float, 0.0, 1.0, Scale::Logarithmic, None)
                .unwrap();
        let mut rng = fastrand::Rng::with_seed(12);
        for _ in 0..1000 {
            assert!(d.sample(&mut rng).as_f64() > 0.0);
        }
    }

    #[test]
    fn test_quantization_snaps() {
        let d = NormalDistribution::new(
            NumericType::Float,
            0.0,
            1.0,
            Scale::Linear,
            Some(Numeric::Float(0.5)),
        )
        .unwrap();
        let mut rng = fastrand::Rng::with_seed(13);
        for _ in 0..200 {
            let v = d.sample(&mut rng).as_f64();
            assert!((v - (v / 0.5).round() * 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_sigma() {
        assert!(NormalDistribution::float(0.0, 0.0).is_err());
        assert!(NormalDistribution::float(0.0, -1.0).is_err());
    }
}
