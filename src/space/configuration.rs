//! Conditional configuration spaces and the configurations drawn from them.
//!
//! A [`ConfigurationSpace`] owns an ordered [`Context`] of parameters plus
//! two kinds of constraints: per-parameter activation conditions and
//! space-wide forbidden clauses. Sampling walks the parameters in
//! declaration order, so a condition may only reference parameters declared
//! before the one it gates; that is checked eagerly when the condition is
//! attached, not at sampling time.
//!
//! A parameter whose condition evaluates to anything but `true` is inactive
//! in that configuration and carries the [`Datum::Inactive`] sentinel.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use confspace::expr::Expr;
//! use confspace::parameter::Parameter;
//! use confspace::space::ConfigurationSpace;
//!
//! let p1 = Parameter::categorical(
//!     "p1",
//!     vec!["on".into(), "off".into()],
//!     0,
//! ).unwrap();
//! let p2 = Parameter::float("p2", 0.0, 1.0).unwrap();
//!
//! let mut space = ConfigurationSpace::new("space", vec![p1, p2.clone()]).unwrap();
//! let cond = Expr::parse("p1 == 'on'", space.context()).unwrap();
//! space.set_condition(&p2, cond).unwrap();
//!
//! let space = Arc::new(space.with_seed(42));
//! let config = space.sample().unwrap();
//! assert!(space.check(&config).is_ok());
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::expr::{Expr, VariableLookup};
use crate::parameter::{Parameter, MAX_SAMPLING_ATTEMPTS};
use crate::space::context::{Binding, Context};

/// A search space of parameters with activation conditions and forbidden
/// clauses.
pub struct ConfigurationSpace {
    context: Arc<Context>,
    /// One slot per parameter; `None` means unconditionally active.
    conditions: Vec<Option<Expr>>,
    forbidden: Vec<Expr>,
    /// Per-parameter sampling overrides; `None` falls back to the
    /// parameter's default distribution.
    distributions: Vec<Option<crate::distribution::Distribution>>,
    seed: u64,
    rng: Mutex<fastrand::Rng>,
}

impl core::fmt::Debug for ConfigurationSpace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConfigurationSpace")
            .field("context", &self.context)
            .field("conditions", &self.conditions)
            .field("forbidden", &self.forbidden)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl Clone for ConfigurationSpace {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            conditions: self.conditions.clone(),
            forbidden: self.forbidden.clone(),
            distributions: self.distributions.clone(),
            seed: self.seed,
            rng: Mutex::new(self.rng.lock().clone()),
        }
    }
}

/// Resolves variables against a (possibly partial) value vector.
struct SliceLookup<'a> {
    context: &'a Context,
    values: &'a [Datum],
}

impl VariableLookup for SliceLookup<'_> {
    fn value_of(&self, param: &Parameter) -> Option<Datum> {
        let idx = self.context.index_of(param)?;
        self.values.get(idx).cloned()
    }
}

/// How a condition or forbidden clause evaluated for one value vector.
enum ClauseOutcome {
    True,
    /// `false`, a non-boolean result, or an inactive operand reaching an
    /// operator that rejects it. An inactive-parameter clause simply does
    /// not hold.
    NotTrue,
}

fn eval_clause(clause: &Expr, lookup: &SliceLookup<'_>) -> Result<ClauseOutcome> {
    match clause.eval(lookup) {
        Ok(Datum::Bool(true)) => Ok(ClauseOutcome::True),
        Ok(_) => Ok(ClauseOutcome::NotTrue),
        Err(Error::InvalidValue { .. }) => Ok(ClauseOutcome::NotTrue),
        Err(e) => Err(e),
    }
}

impl ConfigurationSpace {
    /// Creates a space over `parameters` in declaration order, with no
    /// conditions and no forbidden clauses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] on duplicate parameter names.
    pub fn new(name: impl AsRef<str>, parameters: Vec<Parameter>) -> Result<Self> {
        let context = Arc::new(Context::new(name, parameters)?);
        let n = context.len();
        Ok(Self {
            context,
            conditions: vec![None; n],
            forbidden: Vec::new(),
            distributions: vec![None; n],
            seed: fastrand::u64(..),
            rng: Mutex::new(fastrand::Rng::new()),
        })
    }

    /// Reseeds the space's sampling stream.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = Mutex::new(fastrand::Rng::with_seed(seed));
        self
    }

    /// Returns the seed the sampling stream started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the parameter context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns a shared handle to the parameter context, for use as an
    /// extra context of an objective space.
    #[must_use]
    pub fn context_arc(&self) -> Arc<Context> {
        Arc::clone(&self.context)
    }

    /// Returns the space's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.context.name()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.context.len()
    }

    /// Returns `true` if the space has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }

    /// Returns the activation condition of the parameter at `index`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` is not a parameter index.
    pub fn condition(&self, index: usize) -> Result<Option<&Expr>> {
        self.context.parameter(index)?;
        Ok(self.conditions[index].as_ref())
    }

    /// Returns the forbidden clauses.
    #[must_use]
    pub fn forbidden_clauses(&self) -> &[Expr] {
        &self.forbidden
    }

    /// Attaches an activation condition to `param`.
    ///
    /// The condition may only reference parameters declared before `param`;
    /// that keeps the single-pass sampling order well defined and makes
    /// cyclic activation impossible by construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCondition`] if `param` is not a member, is
    /// already conditioned, or the condition references `param` itself or a
    /// later-declared parameter.
    pub fn set_condition(&mut self, param: &Parameter, condition: Expr) -> Result<()> {
        let index = self
            .context
            .index_of(param)
            .ok_or_else(|| Error::InvalidCondition {
                reason: format!("parameter '{}' is not part of this space", param.name()),
            })?;
        if self.conditions[index].is_some() {
            return Err(Error::InvalidCondition {
                reason: format!("parameter '{}' already has a condition", param.name()),
            });
        }
        for referenced in condition.parameters() {
            match self.context.index_of(&referenced) {
                Some(i) if i < index => {}
                Some(_) => {
                    return Err(Error::InvalidCondition {
                        reason: format!(
                            "condition on '{}' may only reference parameters declared before it, \
                             not '{}'",
                            param.name(),
                            referenced.name()
                        ),
                    });
                }
                None => {
                    return Err(Error::InvalidCondition {
                        reason: format!(
                            "condition references '{}', which is not part of this space",
                            referenced.name()
                        ),
                    });
                }
            }
        }
        self.conditions[index] = Some(condition);
        Ok(())
    }

    /// Adds a forbidden clause; configurations where it evaluates to `true`
    /// are rejected by [`sample`](Self::sample) and [`check`](Self::check).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidExpression`] if the clause references a parameter
    ///   outside this space.
    /// - [`Error::InvalidConfiguration`] if the clause would forbid the
    ///   default configuration.
    pub fn add_forbidden_clause(&mut self, clause: Expr) -> Result<()> {
        clause.check_context(&self.context)?;
        let defaults = self.default_values()?;
        let lookup = SliceLookup {
            context: &self.context,
            values: &defaults,
        };
        if matches!(eval_clause(&clause, &lookup)?, ClauseOutcome::True) {
            return Err(Error::InvalidConfiguration {
                reason: format!("clause '{clause}' forbids the default configuration"),
            });
        }
        self.forbidden.push(clause);
        Ok(())
    }

    /// Overrides the sampling distribution of `param`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if `param` is not a member, or
    /// [`Error::InvalidDistribution`] if the distribution is not scalar.
    pub fn set_distribution(
        &mut self,
        param: &Parameter,
        distribution: crate::distribution::Distribution,
    ) -> Result<()> {
        let index = self
            .context
            .index_of(param)
            .ok_or_else(|| Error::InvalidValue {
                reason: format!("parameter '{}' is not part of this space", param.name()),
            })?;
        if distribution.dimension() != 1 {
            return Err(Error::InvalidDistribution {
                reason: "per-parameter distributions must be one-dimensional".to_string(),
            });
        }
        self.distributions[index] = Some(distribution);
        Ok(())
    }

    /// Computes the default value vector: each parameter's default where its
    /// condition holds over the earlier defaults, inactive elsewhere.
    fn default_values(&self) -> Result<Vec<Datum>> {
        let mut values = Vec::with_capacity(self.context.len());
        for (i, param) in self.context.parameters().iter().enumerate() {
            let active = match &self.conditions[i] {
                None => true,
                Some(cond) => {
                    let lookup = SliceLookup {
                        context: &self.context,
                        values: &values,
                    };
                    matches!(eval_clause(cond, &lookup)?, ClauseOutcome::True)
                }
            };
            values.push(if active {
                param.default_value()
            } else {
                Datum::Inactive
            });
        }
        Ok(values)
    }

    /// Returns the default configuration.
    ///
    /// # Errors
    ///
    /// Propagates condition evaluation failures.
    pub fn default_configuration(self: &Arc<Self>) -> Result<Configuration> {
        Ok(Configuration {
            space: Arc::clone(self),
            values: self.default_values()?,
        })
    }

    /// One conditional sampling pass, ignoring forbidden clauses.
    fn sample_values(&self, rng: &mut fastrand::Rng) -> Result<Vec<Datum>> {
        let mut values = Vec::with_capacity(self.context.len());
        for (i, param) in self.context.parameters().iter().enumerate() {
            let active = match &self.conditions[i] {
                None => true,
                Some(cond) => {
                    let lookup = SliceLookup {
                        context: &self.context,
                        values: &values,
                    };
                    matches!(eval_clause(cond, &lookup)?, ClauseOutcome::True)
                }
            };
            if active {
                let value = match &self.distributions[i] {
                    Some(dist) => param.sample(dist, rng)?,
                    None => param.sample(&param.default_distribution()?, rng)?,
                };
                values.push(value);
            } else {
                values.push(Datum::Inactive);
            }
        }
        Ok(values)
    }

    /// Returns `true` if any forbidden clause holds over `values`.
    fn is_forbidden(&self, values: &[Datum]) -> Result<bool> {
        let lookup = SliceLookup {
            context: &self.context,
            values,
        };
        for clause in &self.forbidden {
            if matches!(eval_clause(clause, &lookup)?, ClauseOutcome::True) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Draws one valid configuration.
    ///
    /// Parameters are sampled in declaration order, each one from its
    /// override or default distribution when its condition holds and pinned
    /// to [`Datum::Inactive`] otherwise. Draws violating a forbidden clause
    /// are rejected and the whole pass retried.
    ///
    /// # Errors
    ///
    /// - [`Error::SamplingUnsuccessful`] when [`MAX_SAMPLING_ATTEMPTS`]
    ///   passes in a row hit a forbidden clause.
    /// - Parameter-level sampling errors are propagated as is.
    pub fn sample(self: &Arc<Self>) -> Result<Configuration> {
        let mut rng = self.rng.lock();
        for _ in 0..MAX_SAMPLING_ATTEMPTS {
            let values = self.sample_values(&mut rng)?;
            if self.is_forbidden(&values)? {
                trace_debug!("draw hit a forbidden clause, retrying");
                continue;
            }
            return Ok(Configuration {
                space: Arc::clone(self),
                values,
            });
        }
        Err(Error::SamplingUnsuccessful {
            attempts: MAX_SAMPLING_ATTEMPTS,
        })
    }

    /// Draws `count` valid configurations.
    ///
    /// # Errors
    ///
    /// Same as [`sample`](Self::sample); fails on the first bad draw.
    pub fn samples(self: &Arc<Self>, count: usize) -> Result<Vec<Configuration>> {
        (0..count).map(|_| self.sample()).collect()
    }

    /// Validates a raw value vector against the space.
    ///
    /// Every value must be in its parameter's domain exactly when the
    /// parameter is active under the vector itself, inactive parameters must
    /// carry the sentinel, and no forbidden clause may hold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first violation.
    pub fn check_values(&self, values: &[Datum]) -> Result<()> {
        if values.len() != self.context.len() {
            return Err(Error::InvalidConfiguration {
                reason: format!(
                    "expected {} values, got {}",
                    self.context.len(),
                    values.len()
                ),
            });
        }
        for (i, param) in self.context.parameters().iter().enumerate() {
            let active = match &self.conditions[i] {
                None => true,
                Some(cond) => {
                    let lookup = SliceLookup {
                        context: &self.context,
                        values: &values[..i],
                    };
                    matches!(eval_clause(cond, &lookup)?, ClauseOutcome::True)
                }
            };
            match (active, &values[i]) {
                (false, Datum::Inactive) => {}
                (false, v) => {
                    return Err(Error::InvalidConfiguration {
                        reason: format!(
                            "parameter '{}' is inactive here but carries {v}",
                            param.name()
                        ),
                    });
                }
                (true, v) if !param.check_value(v) => {
                    return Err(Error::InvalidConfiguration {
                        reason: format!("{v} is not in the domain of '{}'", param.name()),
                    });
                }
                (true, _) => {}
            }
        }
        if self.is_forbidden(values)? {
            return Err(Error::InvalidConfiguration {
                reason: "a forbidden clause holds for these values".to_string(),
            });
        }
        Ok(())
    }

    /// Validates a configuration, including that it was drawn from this
    /// space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the configuration belongs
    /// to another space or its values fail [`check_values`](Self::check_values).
    pub fn check(&self, configuration: &Configuration) -> Result<()> {
        if !std::ptr::eq(
            Arc::as_ptr(&configuration.space.context),
            Arc::as_ptr(&self.context),
        ) {
            return Err(Error::InvalidConfiguration {
                reason: "configuration belongs to a different space".to_string(),
            });
        }
        self.check_values(&configuration.values)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::{Arc, ConfigurationSpace, Context, Mutex};
    use crate::distribution::Distribution;
    use crate::expr::Expr;

    #[derive(serde::Serialize, serde::Deserialize)]
    struct SpaceDef {
        context: Arc<Context>,
        conditions: Vec<Option<Expr>>,
        forbidden: Vec<Expr>,
        distributions: Vec<Option<Distribution>>,
        seed: u64,
    }

    impl serde::Serialize for ConfigurationSpace {
        fn serialize<S: serde::Serializer>(
            &self,
            serializer: S,
        ) -> core::result::Result<S::Ok, S::Error> {
            SpaceDef {
                context: Arc::clone(&self.context),
                conditions: self.conditions.clone(),
                forbidden: self.forbidden.clone(),
                distributions: self.distributions.clone(),
                seed: self.seed,
            }
            .serialize(serializer)
        }
    }

    // The RNG restarts from the stored seed; a restored space replays the
    // sampling stream of a fresh space with the same seed, not the stream
    // position at serialization time.
    impl<'de> serde::Deserialize<'de> for ConfigurationSpace {
        fn deserialize<D: serde::Deserializer<'de>>(
            deserializer: D,
        ) -> core::result::Result<Self, D::Error> {
            let def = SpaceDef::deserialize(deserializer)?;
            Ok(Self {
                context: def.context,
                conditions: def.conditions,
                forbidden: def.forbidden,
                distributions: def.distributions,
                seed: def.seed,
                rng: Mutex::new(fastrand::Rng::with_seed(def.seed)),
            })
        }
    }
}

/// One value per space parameter, drawn from or checked against a
/// [`ConfigurationSpace`].
#[derive(Clone, Debug)]
pub struct Configuration {
    space: Arc<ConfigurationSpace>,
    values: Vec<Datum>,
}

impl Configuration {
    /// Builds a configuration from raw values, validating them first.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigurationSpace::check_values`].
    pub fn new(space: Arc<ConfigurationSpace>, values: Vec<Datum>) -> Result<Self> {
        space.check_values(&values)?;
        Ok(Self { space, values })
    }

    /// Returns the space this configuration was drawn from.
    #[must_use]
    pub fn space(&self) -> &Arc<ConfigurationSpace> {
        &self.space
    }
}

impl Binding for Configuration {
    fn context(&self) -> &Context {
        self.space.context()
    }

    fn values(&self) -> &[Datum] {
        &self.values
    }
}

impl VariableLookup for Configuration {
    fn value_of(&self, param: &Parameter) -> Option<Datum> {
        let idx = self.space.context().index_of(param)?;
        self.values.get(idx).cloned()
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.space, &other.space)
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.eq_value(b))
    }
}

impl core::fmt::Display for Configuration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{{")?;
        for (i, (p, v)) in self
            .space
            .context()
            .parameters()
            .iter()
            .zip(&self.values)
            .enumerate()
        {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {v}", p.name())?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    fn conditional_space() -> ConfigurationSpace {
        let p1 =
            Parameter::categorical("p1", vec![Datum::from("on"), Datum::from("off")], 0).unwrap();
        let p2 = Parameter::float("p2", 0.0, 1.0).unwrap();
        let mut space = ConfigurationSpace::new("space", vec![p1, p2.clone()]).unwrap();
        let cond = Expr::parse("p1 == 'on'", space.context()).unwrap();
        space.set_condition(&p2, cond).unwrap();
        space
    }

    #[test]
    fn test_conditional_sampling() {
        let space = Arc::new(conditional_space().with_seed(7));
        let mut saw_active = false;
        let mut saw_inactive = false;
        for _ in 0..200 {
            let c = space.sample().unwrap();
            let p1_on = c.value(0).unwrap().eq_value(&Datum::from("on"));
            let p2 = c.value(1).unwrap();
            assert_eq!(p1_on, !p2.is_inactive());
            saw_active |= p1_on;
            saw_inactive |= !p1_on;
            space.check(&c).unwrap();
        }
        assert!(saw_active && saw_inactive);
    }

    #[test]
    fn test_condition_order_enforced() {
        let p1 = Parameter::int("a", 0, 10).unwrap();
        let p2 = Parameter::int("b", 0, 10).unwrap();
        let mut space = ConfigurationSpace::new("s", vec![p1.clone(), p2.clone()]).unwrap();

        // A condition on 'a' referencing the later 'b' is rejected.
        let later = Expr::parse("b > 3", space.context()).unwrap();
        assert!(matches!(
            space.set_condition(&p1, later),
            Err(Error::InvalidCondition { .. })
        ));

        // Self-reference is rejected too.
        let selfref = Expr::parse("b > 3", space.context()).unwrap();
        assert!(matches!(
            space.set_condition(&p2, selfref),
            Err(Error::InvalidCondition { .. })
        ));

        // A second condition on the same parameter is rejected.
        let ok = Expr::parse("a > 3", space.context()).unwrap();
        space.set_condition(&p2, ok).unwrap();
        let again = Expr::parse("a > 5", space.context()).unwrap();
        assert!(space.set_condition(&p2, again).is_err());
    }

    #[test]
    fn test_foreign_parameter_condition_rejected() {
        let p1 = Parameter::int("a", 0, 10).unwrap();
        let mut space = ConfigurationSpace::new("s", vec![p1.clone()]).unwrap();
        let foreign = Parameter::int("x", 0, 10).unwrap();
        let cond = Expr::binary(
            crate::expr::BinaryOp::Greater,
            Expr::variable(&foreign),
            Expr::literal(1_i64),
        );
        assert!(space.set_condition(&p1, cond).is_err());
    }

    #[test]
    fn test_forbidden_clause_respected() {
        let p1 = Parameter::int("a", 0, 10).unwrap();
        let p2 = Parameter::int("b", 0, 10).unwrap();
        let mut space = ConfigurationSpace::new("s", vec![p1, p2]).unwrap();
        let clause = Expr::parse("a == b && a > 0", space.context()).unwrap();
        space.add_forbidden_clause(clause).unwrap();

        let space = Arc::new(space.with_seed(11));
        for _ in 0..500 {
            let c = space.sample().unwrap();
            let (a, b) = (c.value(0).unwrap(), c.value(1).unwrap());
            if a.eq_value(b) {
                assert!(a.eq_value(&Datum::Int(0)));
            }
        }
    }

    #[test]
    fn test_forbidding_default_rejected() {
        let p = Parameter::int("a", 0, 10).unwrap();
        let mut space = ConfigurationSpace::new("s", vec![p]).unwrap();
        // The default of 'a' is 0.
        let clause = Expr::parse("a == 0", space.context()).unwrap();
        assert!(matches!(
            space.add_forbidden_clause(clause),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_forbidden_narrows_to_default() {
        let p = Parameter::categorical("c", vec![Datum::from("x"), Datum::from("y")], 0).unwrap();
        let mut space = ConfigurationSpace::new("s", vec![p]).unwrap();
        let clause = Expr::parse("c == 'y'", space.context()).unwrap();
        space.add_forbidden_clause(clause).unwrap();
        // Clauses covering the default are rejected, so the space cannot be
        // made unsatisfiable through this API.
        let covers_default = Expr::parse("c == 'x' || c == 'y'", space.context()).unwrap();
        assert!(space.add_forbidden_clause(covers_default).is_err());

        let space = Arc::new(space.with_seed(5));
        for _ in 0..100 {
            let c = space.sample().unwrap();
            assert!(c.value(0).unwrap().eq_value(&Datum::from("x")));
        }
    }

    #[test]
    fn test_default_configuration() {
        let space = Arc::new(conditional_space());
        let def = space.default_configuration().unwrap();
        assert_eq!(def.value(0).unwrap(), &Datum::from("on"));
        assert_eq!(def.value(1).unwrap(), &Datum::Float(0.0));
        space.check(&def).unwrap();
    }

    #[test]
    fn test_check_values() {
        let space = conditional_space();
        space
            .check_values(&[Datum::from("on"), Datum::Float(0.5)])
            .unwrap();
        space
            .check_values(&[Datum::from("off"), Datum::Inactive])
            .unwrap();
        // Active parameter carrying the sentinel.
        assert!(space
            .check_values(&[Datum::from("on"), Datum::Inactive])
            .is_err());
        // Inactive parameter carrying a value.
        assert!(space
            .check_values(&[Datum::from("off"), Datum::Float(0.5)])
            .is_err());
        // Out-of-domain value.
        assert!(space
            .check_values(&[Datum::from("on"), Datum::Float(2.0)])
            .is_err());
        // Wrong arity.
        assert!(space.check_values(&[Datum::from("on")]).is_err());
    }

    #[test]
    fn test_cross_space_check_rejected() {
        let a = Arc::new(conditional_space());
        let b = Arc::new(conditional_space());
        let c = a.sample().unwrap();
        assert!(matches!(
            b.check(&c),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_seeded_sampling_reproducible() {
        let a = Arc::new(conditional_space().with_seed(99));
        let b = Arc::new(conditional_space().with_seed(99));
        for _ in 0..50 {
            let ca = a.sample().unwrap();
            let cb = b.sample().unwrap();
            assert_eq!(ca.values(), cb.values());
        }
    }

    #[test]
    fn test_distribution_override() {
        let p = Parameter::int("n", 0, 100).unwrap();
        let mut space = ConfigurationSpace::new("s", vec![p.clone()]).unwrap();
        let narrow = crate::distribution::UniformDistribution::int(10, 20).unwrap();
        space.set_distribution(&p, narrow.into()).unwrap();
        let space = Arc::new(space.with_seed(3));
        for _ in 0..200 {
            let c = space.sample().unwrap();
            let Datum::Int(v) = *c.value(0).unwrap() else {
                panic!("expected an integer");
            };
            assert!((10..20).contains(&v));
        }
    }
}
