//! Discrete distribution over weighted areas.

use crate::error::{Error, Result};
use crate::interval::Interval;

/// A discrete law over `n` areas, sampling the selected index.
///
/// Areas are normalized to sum to 1 at construction. A unit draw `u` in
/// `[0, 1)` selects the smallest index whose cumulative area exceeds `u`,
/// so an area's share of the mass is exactly its normalized weight. The
/// output dimension is always 1 and the data type is `Int` (the index).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouletteDistribution {
    areas: Vec<f64>,
}

impl RouletteDistribution {
    /// Creates a roulette distribution from unnormalized areas.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if `areas` is empty, contains
    /// a negative or non-finite weight, or sums to zero.
    pub fn new(areas: &[f64]) -> Result<Self> {
        if areas.is_empty() {
            return Err(Error::InvalidDistribution {
                reason: "roulette requires at least one area".to_string(),
            });
        }
        if areas.iter().any(|&a| !a.is_finite() || a < 0.0) {
            return Err(Error::InvalidDistribution {
                reason: "roulette areas must be finite and non-negative".to_string(),
            });
        }
        let total: f64 = areas.iter().sum();
        if total <= 0.0 {
            return Err(Error::InvalidDistribution {
                reason: "roulette areas must not sum to zero".to_string(),
            });
        }
        Ok(Self {
            areas: areas.iter().map(|a| a / total).collect(),
        })
    }

    /// A roulette with `n` equal areas.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if `n` is zero.
    pub fn uniform(n: usize) -> Result<Self> {
        Self::new(&vec![1.0; n])
    }

    /// Returns the normalized areas (they sum to 1).
    #[must_use]
    pub fn areas(&self) -> &[f64] {
        &self.areas
    }

    /// Returns the number of areas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Returns `false`; a roulette always has at least one area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the support, `[0, n)` over indices.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn bounds(&self) -> Interval {
        Interval::int(0, self.areas.len() as i64)
    }

    /// Draws one index.
    pub fn sample_index(&self, rng: &mut fastrand::Rng) -> usize {
        let u = rng.f64();
        let mut cumulative = 0.0;
        for (i, &a) in self.areas.iter().enumerate() {
            cumulative += a;
            if u < cumulative {
                return i;
            }
        }
        // Rounding in the cumulative sum can leave u just above the final
        // total; attribute that sliver to the last area.
        self.areas.len() - 1
    }
}
