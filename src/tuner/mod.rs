//! The ask/tell tuning protocol.
//!
//! A [`Tuner`] proposes configurations (`ask`), receives finished
//! evaluations (`tell`), and answers queries over what it has seen
//! (`history`, `optima`, `suggest`). The protocol is deliberately free of
//! strategy: a random searcher and a Bayesian optimizer expose the same
//! five operations. [`RandomTuner`] is the baseline implementation, and
//! [`RandomTreeTuner`] is its counterpart over tree spaces.
//!
//! User-written tuners run behind [`GuardedTuner`], which converts panics
//! into [`Error::External`] so a buggy strategy cannot take the caller down.

mod random;

pub use random::{RandomTreeTuner, RandomTuner, TreeEvaluation};

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{Error, Result};
use crate::objective::Evaluation;
use crate::space::{Configuration, Features};

/// The ask/tell protocol over configuration spaces.
pub trait Tuner: Send + Sync {
    /// Proposes `count` configurations to evaluate next, optionally for a
    /// specific feature context.
    ///
    /// # Errors
    ///
    /// Implementations fail when sampling fails or the features do not
    /// match their features space.
    fn ask(&self, count: usize, features: Option<&Features>) -> Result<Vec<Configuration>>;

    /// Reports finished evaluations back to the tuner.
    ///
    /// The batch is recorded as a whole or not at all; after an `Err` no
    /// part of it shows up in `history` or `optima`.
    ///
    /// # Errors
    ///
    /// Implementations reject evaluations drawn from foreign spaces.
    fn tell(&self, evaluations: Vec<Evaluation>) -> Result<()>;

    /// Returns every evaluation told so far, optionally restricted to one
    /// feature context.
    ///
    /// # Errors
    ///
    /// Implementations may fail on feature-space mismatches.
    fn history(&self, features: Option<&Features>) -> Result<Vec<Evaluation>>;

    /// Returns the current Pareto-optimal evaluations, optionally
    /// restricted to one feature context.
    ///
    /// # Errors
    ///
    /// Implementations may fail on feature-space mismatches.
    fn optima(&self, features: Option<&Features>) -> Result<Vec<Evaluation>>;

    /// Returns one good configuration: an optimum when any exists, a fresh
    /// proposal otherwise.
    ///
    /// # Errors
    ///
    /// Implementations fail when neither an optimum nor a fresh proposal is
    /// available.
    fn suggest(&self, features: Option<&Features>) -> Result<Configuration>;
}

/// The ask/tell protocol over tree spaces.
///
/// Tree walks have no feature context; the protocol is otherwise the same
/// as [`Tuner`]'s.
pub trait TreeTuner: Send + Sync {
    /// Proposes `count` tree walks to evaluate next.
    ///
    /// # Errors
    ///
    /// Implementations fail when tree sampling fails.
    fn ask(&self, count: usize) -> Result<Vec<crate::tree::TreeConfiguration>>;

    /// Reports finished tree evaluations back to the tuner.
    ///
    /// The batch is recorded as a whole or not at all, as in
    /// [`Tuner::tell`].
    ///
    /// # Errors
    ///
    /// Implementations reject evaluations over positions outside their tree.
    fn tell(&self, evaluations: Vec<TreeEvaluation>) -> Result<()>;

    /// Returns every evaluation told so far.
    ///
    /// # Errors
    ///
    /// Implementations may fail while reading their state.
    fn history(&self) -> Result<Vec<TreeEvaluation>>;

    /// Returns the current Pareto-optimal evaluations.
    ///
    /// # Errors
    ///
    /// Implementations may fail while reading their state.
    fn optima(&self) -> Result<Vec<TreeEvaluation>>;

    /// Returns one good tree walk: an optimum when any exists, a fresh
    /// proposal otherwise.
    ///
    /// # Errors
    ///
    /// Implementations fail when neither an optimum nor a fresh proposal is
    /// available.
    fn suggest(&self) -> Result<crate::tree::TreeConfiguration>;
}

/// Wraps a tuner so panics surface as [`Error::External`] instead of
/// unwinding into the caller.
pub struct GuardedTuner<T> {
    inner: T,
}

impl<T: Tuner> GuardedTuner<T> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Returns the wrapped tuner.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn guard<R>(f: impl FnOnce() -> Result<R>) -> Result<R> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "tuner panicked".to_string());
            Err(Error::External(message))
        }
    }
}

impl<T: Tuner> Tuner for GuardedTuner<T> {
    fn ask(&self, count: usize, features: Option<&Features>) -> Result<Vec<Configuration>> {
        guard(|| self.inner.ask(count, features))
    }

    fn tell(&self, evaluations: Vec<Evaluation>) -> Result<()> {
        guard(|| self.inner.tell(evaluations))
    }

    fn history(&self, features: Option<&Features>) -> Result<Vec<Evaluation>> {
        guard(|| self.inner.history(features))
    }

    fn optima(&self, features: Option<&Features>) -> Result<Vec<Evaluation>> {
        guard(|| self.inner.optima(features))
    }

    fn suggest(&self, features: Option<&Features>) -> Result<Configuration> {
        guard(|| self.inner.suggest(features))
    }
}
