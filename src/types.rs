//! Shared optimization vocabulary.

/// Which way an objective improves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Smaller objective values are better.
    Minimize,
    /// Larger objective values are better.
    Maximize,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            Direction::Minimize => Direction::Maximize,
            Direction::Maximize => Direction::Minimize,
        }
    }
}

/// The outcome of a Pareto comparison between two evaluations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    /// At least as good on every objective and strictly better on one.
    Better,
    /// Equal on every objective.
    Equivalent,
    /// At least as bad on every objective and strictly worse on one.
    Worse,
    /// Better on some objectives and worse on others, or not comparable at
    /// all (a failed evaluation, mismatched types, different spaces).
    NotComparable,
}

impl Comparison {
    /// Returns the comparison as seen from the other side.
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            Comparison::Better => Comparison::Worse,
            Comparison::Worse => Comparison::Better,
            other => other,
        }
    }
}

/// Whether an evaluation produced usable objective values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvaluationStatus {
    /// The trial ran and its objective values are valid.
    Success,
    /// The trial failed; the evaluation stays in history but never enters
    /// the optimum set and compares as not comparable.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversals() {
        assert_eq!(Direction::Minimize.reverse(), Direction::Maximize);
        assert_eq!(Comparison::Better.reverse(), Comparison::Worse);
        assert_eq!(Comparison::Equivalent.reverse(), Comparison::Equivalent);
        assert_eq!(
            Comparison::NotComparable.reverse(),
            Comparison::NotComparable
        );
    }
}
