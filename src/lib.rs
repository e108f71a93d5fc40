#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![allow(clippy::float_cmp)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]

//! Typed, constraint-aware configuration spaces for black-box tuning.
//!
//! The crate models search spaces as ordered collections of typed
//! parameters with activation conditions and forbidden clauses, scores
//! trials through objective expressions with Pareto comparison, and drives
//! the whole thing through an ask/tell tuner protocol. Tree-shaped spaces
//! get the same treatment.
//!
//! # Getting Started
//!
//! Sample a conditional space and feed a tuner:
//!
//! ```
//! use std::sync::Arc;
//! use confspace::prelude::*;
//!
//! // p2 only exists when p1 is 'on'.
//! let p1 = Parameter::categorical("p1", vec!["on".into(), "off".into()], 0).unwrap();
//! let p2 = Parameter::float("p2", 0.0, 1.0).unwrap();
//! let mut space = ConfigurationSpace::new("space", vec![p1, p2.clone()]).unwrap();
//! let cond = Expr::parse("p1 == 'on'", space.context()).unwrap();
//! space.set_condition(&p2, cond).unwrap();
//! let space = Arc::new(space.with_seed(42));
//!
//! let mut objectives =
//!     ObjectiveSpace::new("results", vec![Parameter::float("error", 0.0, 1.0).unwrap()])
//!         .unwrap();
//! let error = Expr::parse("error", objectives.context()).unwrap();
//! objectives.add_objective(error, Direction::Minimize).unwrap();
//! let objectives = Arc::new(objectives);
//!
//! let tuner = RandomTuner::new("random", Arc::clone(&space), Arc::clone(&objectives));
//! for config in tuner.ask(10, None).unwrap() {
//!     let measured = 0.5; // run the real trial here
//!     let eval = Evaluation::new(
//!         Arc::clone(&objectives),
//!         config,
//!         None,
//!         vec![Datum::Float(measured)],
//!     )
//!     .unwrap();
//!     tuner.tell(vec![eval]).unwrap();
//! }
//! assert_eq!(tuner.optima(None).unwrap().len(), 1);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Datum`] | The value universe: none, booleans, integers, floats, strings, and the inactive sentinel. |
//! | [`Parameter`](parameter::Parameter) | A named, typed dimension: numerical, categorical, ordinal, discrete, or string. |
//! | [`Distribution`](distribution::Distribution) | What to draw from: uniform, normal, roulette, mixture, multivariate. |
//! | [`Expr`](expr::Expr) | Typed expressions for conditions, forbidden clauses, and objectives. |
//! | [`ConfigurationSpace`](space::ConfigurationSpace) | Parameters plus conditions and forbidden clauses; the thing you sample. |
//! | [`ObjectiveSpace`](objective::ObjectiveSpace) | Result parameters plus directed objectives; evaluations Pareto-compare. |
//! | [`TreeSpace`](tree::TreeSpace) | Weighted trees sampled by walking, static or grown on demand. |
//! | [`Tuner`](tuner::Tuner) | The ask/tell protocol; [`RandomTuner`](tuner::RandomTuner) is the baseline. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on public types and tuner snapshots | on |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at sampling and tell points | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod datum;
pub mod distribution;
mod error;
pub mod expr;
pub mod interval;
pub mod objective;
pub mod parameter;
pub mod pareto;
mod rng_util;
pub mod space;
pub mod tree;
pub mod tuner;
mod types;

pub use datum::Datum;
pub use error::{Error, Result};
pub use interval::{Interval, Numeric, NumericType};
pub use types::{Comparison, Direction, EvaluationStatus};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use confspace::prelude::*;
/// ```
pub mod prelude {
    pub use crate::datum::Datum;
    pub use crate::distribution::{
        Distribution, MixtureDistribution, MultivariateDistribution, NormalDistribution,
        RouletteDistribution, Scale, UniformDistribution,
    };
    pub use crate::error::{Error, Result};
    pub use crate::expr::Expr;
    pub use crate::interval::{Interval, Numeric, NumericType};
    pub use crate::objective::{Evaluation, Objective, ObjectiveSpace};
    pub use crate::parameter::{Parameter, ParameterKind};
    pub use crate::space::{
        Binding, Configuration, ConfigurationSpace, Context, Features, FeaturesSpace,
    };
    pub use crate::tree::{Tree, TreeConfiguration, TreeSpace};
    pub use crate::tuner::{
        GuardedTuner, RandomTreeTuner, RandomTuner, TreeEvaluation, TreeTuner, Tuner,
    };
    pub use crate::types::{Comparison, Direction, EvaluationStatus};
}
