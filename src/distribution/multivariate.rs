//! Independent sub-distributions concatenated into one vector.

use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::interval::{Interval, Numeric, NumericType};

/// A product law: each component is sampled independently and the results
/// are concatenated, so the output dimension is the sum of the component
/// dimensions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultivariateDistribution {
    components: Vec<Distribution>,
}

impl MultivariateDistribution {
    /// Creates a multivariate distribution from its components.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if `components` is empty.
    pub fn new(components: Vec<Distribution>) -> Result<Self> {
        if components.is_empty() {
            return Err(Error::InvalidDistribution {
                reason: "multivariate requires at least one component".to_string(),
            });
        }
        Ok(Self { components })
    }

    /// Returns the sub-distributions.
    #[must_use]
    pub fn components(&self) -> &[Distribution] {
        &self.components
    }

    /// Returns the total output dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.components.iter().map(Distribution::dimension).sum()
    }

    /// Returns the concatenated per-dimension data types.
    #[must_use]
    pub fn data_types(&self) -> Vec<NumericType> {
        self.components
            .iter()
            .flat_map(Distribution::data_types)
            .collect()
    }

    /// Returns the concatenated per-dimension supports.
    #[must_use]
    pub fn bounds(&self) -> Vec<Interval> {
        self.components
            .iter()
            .flat_map(Distribution::bounds)
            .collect()
    }

    /// Draws one concatenated vector.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec<Numeric> {
        self.components
            .iter()
            .flat_map(|c| c.sample(rng))
            .collect()
    }
}
