//! Incremental Pareto optimum-set maintenance.
//!
//! Tuners keep their optimum sets current one evaluation at a time: a
//! candidate enters the set only if no member is better than or equivalent
//! to it, and entering evicts every member it dominates. The set therefore
//! always holds mutually non-comparable evaluations.

use crate::error::Result;
use crate::types::Comparison;

/// Offers `candidate` to the optimum set, updating it in place.
///
/// Returns `true` if the candidate was admitted. The comparison function is
/// asked `compare(member, candidate)` and must be antisymmetric under
/// [`Comparison::reverse`].
///
/// # Errors
///
/// Propagates comparison failures; the set is left untouched in that case.
pub fn update_optima<T, F>(optima: &mut Vec<T>, candidate: T, compare: F) -> Result<bool>
where
    F: Fn(&T, &T) -> Result<Comparison>,
{
    let mut dominated = Vec::new();
    for (i, member) in optima.iter().enumerate() {
        match compare(member, &candidate)? {
            Comparison::Better | Comparison::Equivalent => return Ok(false),
            Comparison::Worse => dominated.push(i),
            Comparison::NotComparable => {}
        }
    }
    for &i in dominated.iter().rev() {
        optima.swap_remove(i);
    }
    optima.push(candidate);
    Ok(true)
}
