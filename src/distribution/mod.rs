//! Distribution engine: the laws parameter values are drawn from.
//!
//! [`Distribution`] is a closed enum over the five supported laws. Every
//! law has a dimension (≥ 1), one numeric data type per dimension, and a
//! support bound ([`Interval`]) per dimension. Distributions are immutable
//! once constructed; constructors validate their inputs and malformed
//! weight vectors fail there, never at sampling time.
//!
//! # Examples
//!
//! ```
//! use confspace::distribution::{Distribution, UniformDistribution};
//! use confspace::interval::Numeric;
//!
//! let d = UniformDistribution::float(0.0, 1.0).unwrap();
//! let mut rng = fastrand::Rng::with_seed(42);
//! let v = Distribution::from(d).sample_scalar(&mut rng);
//! assert!(matches!(v, Numeric::Float(x) if (0.0..1.0).contains(&x)));
//! ```

pub mod mixture;
pub mod multivariate;
pub mod normal;
pub mod roulette;
pub mod uniform;

pub use mixture::MixtureDistribution;
pub use multivariate::MultivariateDistribution;
pub use normal::NormalDistribution;
pub use roulette::RouletteDistribution;
pub use uniform::UniformDistribution;

use crate::error::Result;
use crate::interval::{Interval, Numeric, NumericType};

/// How a continuous law maps the unit draw onto its support.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scale {
    /// Map the unit draw linearly onto the support.
    #[default]
    Linear,
    /// Map the unit draw uniformly in log space (the support must be
    /// strictly positive).
    Logarithmic,
}

/// A sampling law over one or more numeric dimensions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Distribution {
    /// Uniform over a half-open interval, optionally log-scaled and
    /// quantized.
    Uniform(UniformDistribution),
    /// Gaussian with unbounded support.
    Normal(NormalDistribution),
    /// Discrete over `n` weighted areas; samples the selected index.
    Roulette(RouletteDistribution),
    /// A weighted composition of same-shape sub-distributions.
    Mixture(MixtureDistribution),
    /// Independent sub-distributions concatenated into one vector.
    Multivariate(MultivariateDistribution),
}

impl Distribution {
    /// Returns the number of values produced by one draw.
    #[must_use]
    pub fn dimension(&self) -> usize {
        match self {
            Distribution::Uniform(_) | Distribution::Normal(_) | Distribution::Roulette(_) => 1,
            Distribution::Mixture(d) => d.dimension(),
            Distribution::Multivariate(d) => d.dimension(),
        }
    }

    /// Returns the numeric type of each output dimension.
    #[must_use]
    pub fn data_types(&self) -> Vec<NumericType> {
        match self {
            Distribution::Uniform(d) => vec![d.data_type()],
            Distribution::Normal(d) => vec![d.data_type()],
            Distribution::Roulette(_) => vec![NumericType::Int],
            Distribution::Mixture(d) => d.data_types(),
            Distribution::Multivariate(d) => d.data_types(),
        }
    }

    /// Returns the support bound of each output dimension.
    #[must_use]
    pub fn bounds(&self) -> Vec<Interval> {
        match self {
            Distribution::Uniform(d) => vec![d.bounds()],
            Distribution::Normal(d) => vec![d.bounds()],
            Distribution::Roulette(d) => vec![d.bounds()],
            Distribution::Mixture(d) => d.bounds(),
            Distribution::Multivariate(d) => d.bounds(),
        }
    }

    /// Draws one value per dimension.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec<Numeric> {
        match self {
            Distribution::Uniform(d) => vec![d.sample(rng)],
            Distribution::Normal(d) => vec![d.sample(rng)],
            Distribution::Roulette(d) => vec![Numeric::Int(d.sample_index(rng) as i64)],
            Distribution::Mixture(d) => d.sample(rng),
            Distribution::Multivariate(d) => d.sample(rng),
        }
    }

    /// Draws a single scalar from a one-dimensional law.
    ///
    /// Callers must only use this on distributions with `dimension() == 1`.
    pub fn sample_scalar(&self, rng: &mut fastrand::Rng) -> Numeric {
        debug_assert_eq!(self.dimension(), 1);
        match self {
            Distribution::Uniform(d) => d.sample(rng),
            Distribution::Normal(d) => d.sample(rng),
            Distribution::Roulette(d) => Numeric::Int(d.sample_index(rng) as i64),
            Distribution::Mixture(d) => d.sample(rng)[0],
            Distribution::Multivariate(d) => d.sample(rng)[0],
        }
    }

    /// Draws `n` vectors, marginally identical to `n` independent
    /// [`sample`](Self::sample) calls.
    pub fn samples(&self, rng: &mut fastrand::Rng, n: usize) -> Vec<Vec<Numeric>> {
        (0..n).map(|_| self.sample(rng)).collect()
    }

    /// Returns `true` if draws from this one-dimensional law can land
    /// outside `target`, so that sampling into `target` needs rejection.
    ///
    /// The rule: intersect the law's support with `target`; if the
    /// intersection is strictly smaller than the support, part of the
    /// probability mass falls outside and rejection sampling is required.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidType`](crate::Error::InvalidType) if the
    /// numeric types of support and target differ.
    pub fn oversampling(&self, target: &Interval) -> Result<bool> {
        debug_assert_eq!(self.dimension(), 1);
        let support = &self.bounds()[0];
        let intersection = support.intersect(target)?;
        Ok(intersection != *support)
    }
}

impl From<UniformDistribution> for Distribution {
    fn from(d: UniformDistribution) -> Self {
        Distribution::Uniform(d)
    }
}

impl From<NormalDistribution> for Distribution {
    fn from(d: NormalDistribution) -> Self {
        Distribution::Normal(d)
    }
}

impl From<RouletteDistribution> for Distribution {
    fn from(d: RouletteDistribution) -> Self {
        Distribution::Roulette(d)
    }
}

impl From<MixtureDistribution> for Distribution {
    fn from(d: MixtureDistribution) -> Self {
        Distribution::Mixture(d)
    }
}

impl From<MultivariateDistribution> for Distribution {
    fn from(d: MultivariateDistribution) -> Self {
        Distribution::Multivariate(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversampling_contained_support() {
        let d = Distribution::from(UniformDistribution::float(0.2, 0.8).unwrap());
        assert!(!d.oversampling(&Interval::float(0.0, 1.0)).unwrap());
    }

    #[test]
    fn test_oversampling_wider_support() {
        let d = Distribution::from(UniformDistribution::float(-1.0, 2.0).unwrap());
        assert!(d.oversampling(&Interval::float(0.0, 1.0)).unwrap());
    }

    #[test]
    fn test_samples_matches_sample_under_same_seed() {
        let d = Distribution::from(UniformDistribution::float(0.0, 1.0).unwrap());
        let mut a = fastrand::Rng::with_seed(9);
        let mut b = fastrand::Rng::with_seed(9);
        let batch = d.samples(&mut a, 5);
        let singles: Vec<_> = (0..5).map(|_| d.sample(&mut b)).collect();
        assert_eq!(batch, singles);
    }
}
