//! Weighted composition of same-shape sub-distributions.

use crate::distribution::{Distribution, RouletteDistribution};
use crate::error::{Error, Result};
use crate::interval::{Interval, Numeric, NumericType};

/// A mixture of `n` sub-distributions with selection weights.
///
/// Sampling first selects a component via an internal roulette over the
/// weights (uniform by default), then delegates the draw to it. All
/// components must agree on dimension and per-dimension data types; the
/// mixture reports that shared shape as its own.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MixtureDistribution {
    selector: RouletteDistribution,
    components: Vec<Distribution>,
}

impl MixtureDistribution {
    /// Creates a mixture with explicit selection weights.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if there are no components,
    /// the weight vector's length differs from the component count or is
    /// malformed, or the components disagree on dimension or data types.
    pub fn new(components: Vec<Distribution>, weights: &[f64]) -> Result<Self> {
        if components.is_empty() {
            return Err(Error::InvalidDistribution {
                reason: "mixture requires at least one component".to_string(),
            });
        }
        if weights.len() != components.len() {
            return Err(Error::InvalidDistribution {
                reason: format!(
                    "expected {} weights, got {}",
                    components.len(),
                    weights.len()
                ),
            });
        }
        let shape = components[0].data_types();
        for c in &components[1..] {
            if c.data_types() != shape {
                return Err(Error::InvalidDistribution {
                    reason: "mixture components must share dimension and data types".to_string(),
                });
            }
        }
        Ok(Self {
            selector: RouletteDistribution::new(weights)?,
            components,
        })
    }

    /// Creates a mixture selecting components uniformly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if there are no components or
    /// they disagree on shape.
    pub fn uniform(components: Vec<Distribution>) -> Result<Self> {
        let weights = vec![1.0; components.len()];
        Self::new(components, &weights)
    }

    /// Returns the sub-distributions.
    #[must_use]
    pub fn components(&self) -> &[Distribution] {
        &self.components
    }

    /// Returns the normalized selection weights.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        self.selector.areas()
    }

    /// Returns the shared output dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.components[0].dimension()
    }

    /// Returns the shared per-dimension data types.
    #[must_use]
    pub fn data_types(&self) -> Vec<NumericType> {
        self.components[0].data_types()
    }

    /// Returns the per-dimension support: the hull of the component bounds.
    #[must_use]
    pub fn bounds(&self) -> Vec<Interval> {
        let mut hull = self.components[0].bounds();
        for c in &self.components[1..] {
            for (h, b) in hull.iter_mut().zip(c.bounds()) {
                *h = union_hull(h, &b);
            }
        }
        hull
    }

    /// Draws one vector: select a component, then delegate.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec<Numeric> {
        let idx = self.selector.sample_index(rng);
        self.components[idx].sample(rng)
    }
}

/// Smallest interval covering both operands (same numeric type by
/// construction of the mixture).
fn union_hull(a: &Interval, b: &Interval) -> Interval {
    use core::cmp::Ordering;

    let (lower, lower_included) = match a.lower().compare(&b.lower()) {
        Some(Ordering::Greater) => (b.lower(), b.lower_included()),
        Some(Ordering::Less) => (a.lower(), a.lower_included()),
        _ => (a.lower(), a.lower_included() || b.lower_included()),
    };
    let (upper, upper_included) = match a.upper().compare(&b.upper()) {
        Some(Ordering::Less) => (b.upper(), b.upper_included()),
        Some(Ordering::Greater) => (a.upper(), a.upper_included()),
        _ => (a.upper(), a.upper_included() || b.upper_included()),
    };
    Interval::new(lower, upper, lower_included, upper_included)
        .expect("operands share a numeric type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::UniformDistribution;

    fn uniform(lo: f64, hi: f64) -> Distribution {
        Distribution::from(UniformDistribution::float(lo, hi).unwrap())
    }

    #[test]
    fn test_sample_stays_in_hull() {
        let m =
            MixtureDistribution::new(vec![uniform(0.0, 1.0), uniform(2.0, 3.0)], &[1.0, 1.0])
                .unwrap();
        assert_eq!(m.bounds(), vec![Interval::float(0.0, 3.0)]);
        let mut rng = fastrand::Rng::with_seed(31);
        for _ in 0..1000 {
            let v = m.sample(&mut rng)[0].as_f64();
            assert!((0.0..1.0).contains(&v) || (2.0..3.0).contains(&v));
        }
    }

    #[test]
    fn test_weight_validation() {
        assert!(MixtureDistribution::new(vec![uniform(0.0, 1.0)], &[1.0, 2.0]).is_err());
        assert!(MixtureDistribution::new(vec![], &[]).is_err());
        assert!(MixtureDistribution::new(vec![uniform(0.0, 1.0)], &[-1.0]).is_err());
    }

    #[test]
    fn test_shape_mismatch() {
        let int = Distribution::from(UniformDistribution::int(0, 10).unwrap());
        assert!(MixtureDistribution::new(vec![uniform(0.0, 1.0), int], &[1.0, 1.0]).is_err());
    }

    #[test]
    fn test_zero_weight_component_never_drawn() {
        let m =
            MixtureDistribution::new(vec![uniform(0.0, 1.0), uniform(5.0, 6.0)], &[0.0, 1.0])
                .unwrap();
        let mut rng = fastrand::Rng::with_seed(32);
        for _ in 0..500 {
            assert!(m.sample(&mut rng)[0].as_f64() >= 5.0);
        }
    }
}
