//! Objective spaces and trial evaluations.
//!
//! An [`ObjectiveSpace`] pairs a context of result parameters (what a trial
//! reports: error, latency, memory) with objective expressions over them,
//! each tagged with a [`Direction`]. An [`Evaluation`] binds one reported
//! value per result parameter to a [`Configuration`], and two evaluations of
//! the same objective space compare by Pareto dominance over their objective
//! values.
//!
//! Objective expressions may also reference search-space or feature
//! parameters; those resolve through the evaluation's configuration and
//! features at evaluation time.

use std::sync::Arc;

use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::expr::{Expr, VariableLookup};
use crate::parameter::Parameter;
use crate::space::{Binding, Configuration, Context, Features};
use crate::types::{Comparison, Direction, EvaluationStatus};

/// One objective: an expression over result (and possibly search/feature)
/// parameters, and the direction in which it improves.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    expr: Expr,
    direction: Direction,
}

impl Objective {
    /// Pairs an expression with its improvement direction.
    #[must_use]
    pub fn new(expr: Expr, direction: Direction) -> Self {
        Self { expr, direction }
    }

    /// Returns the objective expression.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Returns the improvement direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// A context of result parameters plus the objectives computed over them.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectiveSpace {
    context: Arc<Context>,
    objectives: Vec<Objective>,
    /// Additional contexts objective expressions may draw variables from,
    /// typically the search space's and the features space's.
    extra_contexts: Vec<Arc<Context>>,
}

impl ObjectiveSpace {
    /// Creates an objective space over result `parameters` with no
    /// objectives yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] on duplicate parameter names.
    pub fn new(name: impl AsRef<str>, parameters: Vec<Parameter>) -> Result<Self> {
        Ok(Self {
            context: Arc::new(Context::new(name, parameters)?),
            objectives: Vec::new(),
            extra_contexts: Vec::new(),
        })
    }

    /// Allows objective expressions to reference parameters of `context`,
    /// resolved through the evaluation's configuration or features.
    #[must_use]
    pub fn with_extra_context(mut self, context: Arc<Context>) -> Self {
        self.extra_contexts.push(context);
        self
    }

    /// Adds an objective.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] if the expression references a
    /// parameter that belongs to neither the result context nor an extra
    /// context.
    pub fn add_objective(&mut self, expr: Expr, direction: Direction) -> Result<()> {
        for p in expr.parameters() {
            let known = self.context.index_of(&p).is_some()
                || self
                    .extra_contexts
                    .iter()
                    .any(|c| c.index_of(&p).is_some());
            if !known {
                return Err(Error::InvalidExpression {
                    reason: format!(
                        "objective references '{}', which no known context resolves",
                        p.name()
                    ),
                });
            }
        }
        self.objectives.push(Objective::new(expr, direction));
        Ok(())
    }

    /// Returns the result-parameter context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the space's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.context.name()
    }

    /// Returns the objectives in declaration order.
    #[must_use]
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Validates a result-value vector against the result parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEvaluation`] naming the first violation.
    pub fn check_values(&self, values: &[Datum]) -> Result<()> {
        if values.len() != self.context.len() {
            return Err(Error::InvalidEvaluation {
                reason: format!(
                    "expected {} result values, got {}",
                    self.context.len(),
                    values.len()
                ),
            });
        }
        for (param, value) in self.context.parameters().iter().zip(values) {
            if !param.check_value(value) {
                return Err(Error::InvalidEvaluation {
                    reason: format!("{value} is not in the domain of '{}'", param.name()),
                });
            }
        }
        Ok(())
    }
}

/// Variable resolution for objective expressions: result values first, then
/// the configuration, then features.
struct EvaluationLookup<'a> {
    evaluation: &'a Evaluation,
}

impl VariableLookup for EvaluationLookup<'_> {
    fn value_of(&self, param: &Parameter) -> Option<Datum> {
        let e = self.evaluation;
        if let Some(i) = e.objective_space.context.index_of(param) {
            return e.values.get(i).cloned();
        }
        if let Some(v) = e.configuration.value_of(param) {
            return Some(v);
        }
        e.features.as_ref().and_then(|f| f.value_of(param))
    }
}

/// One trial: a configuration, optional features, and the reported result
/// values.
#[derive(Clone, Debug)]
pub struct Evaluation {
    objective_space: Arc<ObjectiveSpace>,
    configuration: Configuration,
    features: Option<Features>,
    values: Vec<Datum>,
    status: EvaluationStatus,
}

impl Evaluation {
    /// Creates a successful evaluation, validating the result values.
    ///
    /// # Errors
    ///
    /// Same as [`ObjectiveSpace::check_values`].
    pub fn new(
        objective_space: Arc<ObjectiveSpace>,
        configuration: Configuration,
        features: Option<Features>,
        values: Vec<Datum>,
    ) -> Result<Self> {
        objective_space.check_values(&values)?;
        Ok(Self {
            objective_space,
            configuration,
            features,
            values,
            status: EvaluationStatus::Success,
        })
    }

    /// Creates a failed evaluation; it carries no result values.
    #[must_use]
    pub fn failed(
        objective_space: Arc<ObjectiveSpace>,
        configuration: Configuration,
        features: Option<Features>,
    ) -> Self {
        let values = vec![Datum::None; objective_space.context.len()];
        Self {
            objective_space,
            configuration,
            features,
            values,
            status: EvaluationStatus::Failed,
        }
    }

    /// Returns the objective space.
    #[must_use]
    pub fn objective_space(&self) -> &Arc<ObjectiveSpace> {
        &self.objective_space
    }

    /// Returns the evaluated configuration.
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Returns the features the trial ran under, if any.
    #[must_use]
    pub fn features(&self) -> Option<&Features> {
        self.features.as_ref()
    }

    /// Returns the trial status.
    #[must_use]
    pub fn status(&self) -> EvaluationStatus {
        self.status
    }

    /// Computes the objective values from the bound results.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEvaluation`] for a failed evaluation.
    /// - Expression evaluation errors are propagated as is.
    pub fn objective_values(&self) -> Result<Vec<Datum>> {
        if self.status == EvaluationStatus::Failed {
            return Err(Error::InvalidEvaluation {
                reason: "a failed evaluation has no objective values".to_string(),
            });
        }
        let lookup = EvaluationLookup { evaluation: self };
        self.objective_space
            .objectives
            .iter()
            .map(|o| o.expr.eval(&lookup))
            .collect()
    }

    /// Pareto-compares two evaluations of the same objective space.
    ///
    /// Failed evaluations and evaluations of different objective spaces are
    /// [`Comparison::NotComparable`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotComparable`] when paired objective values
    /// cannot be ordered.
    pub fn compare(&self, other: &Self) -> Result<Comparison> {
        if !Arc::ptr_eq(&self.objective_space, &other.objective_space) {
            return Ok(Comparison::NotComparable);
        }
        if self.status == EvaluationStatus::Failed || other.status == EvaluationStatus::Failed {
            return Ok(Comparison::NotComparable);
        }
        let a = self.objective_values()?;
        let b = other.objective_values()?;
        let directions: Vec<Direction> = self
            .objective_space
            .objectives
            .iter()
            .map(Objective::direction)
            .collect();
        compare_objective_values(&a, &b, &directions)
    }
}

impl Binding for Evaluation {
    fn context(&self) -> &Context {
        self.objective_space.context()
    }

    fn values(&self) -> &[Datum] {
        &self.values
    }
}

/// Aggregates per-objective orderings into a Pareto [`Comparison`].
///
/// Also used by tree evaluations, which bind their own value vectors.
///
/// # Errors
///
/// Returns [`Error::TypeNotComparable`] when a pair of values cannot be
/// ordered, and [`Error::InvalidEvaluation`] on a length mismatch.
pub(crate) fn compare_objective_values(
    a: &[Datum],
    b: &[Datum],
    directions: &[Direction],
) -> Result<Comparison> {
    if a.len() != b.len() || a.len() != directions.len() {
        return Err(Error::InvalidEvaluation {
            reason: "objective value vectors have mismatched lengths".to_string(),
        });
    }
    let mut better = false;
    let mut worse = false;
    for ((x, y), dir) in a.iter().zip(b).zip(directions) {
        let ord = x.compare(y)?;
        let ord = match dir {
            Direction::Minimize => ord,
            Direction::Maximize => ord.reverse(),
        };
        // After direction folding, Less means x is better.
        match ord {
            core::cmp::Ordering::Less => better = true,
            core::cmp::Ordering::Greater => worse = true,
            core::cmp::Ordering::Equal => {}
        }
    }
    Ok(match (better, worse) {
        (true, true) => Comparison::NotComparable,
        (true, false) => Comparison::Better,
        (false, true) => Comparison::Worse,
        (false, false) => Comparison::Equivalent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::ConfigurationSpace;

    fn setup() -> (Arc<ConfigurationSpace>, Arc<ObjectiveSpace>) {
        let space = Arc::new(
            ConfigurationSpace::new("search", vec![Parameter::float("x", 0.0, 1.0).unwrap()])
                .unwrap()
                .with_seed(1),
        );
        let mut objective_space = ObjectiveSpace::new(
            "results",
            vec![
                Parameter::float("error", 0.0, 1.0).unwrap(),
                Parameter::float("latency", 0.0, 1000.0).unwrap(),
            ],
        )
        .unwrap();
        let ctx = objective_space.context().clone();
        objective_space
            .add_objective(
                Expr::parse("1.0 - error", &ctx).unwrap(),
                Direction::Maximize,
            )
            .unwrap();
        objective_space
            .add_objective(Expr::parse("latency", &ctx).unwrap(), Direction::Minimize)
            .unwrap();
        (space, Arc::new(objective_space))
    }

    fn eval(
        space: &Arc<ConfigurationSpace>,
        os: &Arc<ObjectiveSpace>,
        error: f64,
        latency: f64,
    ) -> Evaluation {
        let config = space.sample().unwrap();
        Evaluation::new(
            Arc::clone(os),
            config,
            None,
            vec![Datum::Float(error), Datum::Float(latency)],
        )
        .unwrap()
    }

    #[test]
    fn test_objective_values_follow_expressions() {
        let (space, os) = setup();
        let e = eval(&space, &os, 0.25, 10.0);
        assert_eq!(
            e.objective_values().unwrap(),
            vec![Datum::Float(0.75), Datum::Float(10.0)]
        );
    }

    #[test]
    fn test_pareto_comparison() {
        let (space, os) = setup();
        let good = eval(&space, &os, 0.1, 10.0);
        let bad = eval(&space, &os, 0.5, 100.0);
        let mixed = eval(&space, &os, 0.05, 500.0);
        let same = eval(&space, &os, 0.1, 10.0);

        assert_eq!(good.compare(&bad).unwrap(), Comparison::Better);
        assert_eq!(bad.compare(&good).unwrap(), Comparison::Worse);
        assert_eq!(good.compare(&mixed).unwrap(), Comparison::NotComparable);
        assert_eq!(good.compare(&same).unwrap(), Comparison::Equivalent);
    }

    #[test]
    fn test_failed_evaluations_not_comparable() {
        let (space, os) = setup();
        let ok = eval(&space, &os, 0.1, 10.0);
        let failed = Evaluation::failed(Arc::clone(&os), space.sample().unwrap(), None);
        assert_eq!(ok.compare(&failed).unwrap(), Comparison::NotComparable);
        assert!(failed.objective_values().is_err());
        assert_eq!(failed.status(), EvaluationStatus::Failed);
    }

    #[test]
    fn test_cross_space_not_comparable() {
        let (space, os_a) = setup();
        let (_, os_b) = setup();
        let a = eval(&space, &os_a, 0.1, 10.0);
        let config = space.sample().unwrap();
        let b = Evaluation::new(
            os_b,
            config,
            None,
            vec![Datum::Float(0.1), Datum::Float(10.0)],
        )
        .unwrap();
        assert_eq!(a.compare(&b).unwrap(), Comparison::NotComparable);
    }

    #[test]
    fn test_objective_over_search_parameter() {
        let (space, _) = setup();
        let x = space.context().get_by_name("x").unwrap().clone();
        let mut os = ObjectiveSpace::new(
            "results",
            vec![Parameter::float("error", 0.0, 1.0).unwrap()],
        )
        .unwrap()
        .with_extra_context(space.context_arc());
        let combined = Expr::binary(
            crate::expr::BinaryOp::Add,
            Expr::parse("error", os.context()).unwrap(),
            Expr::variable(&x),
        );
        os.add_objective(combined, Direction::Minimize).unwrap();
        let os = Arc::new(os);

        let config = space.sample().unwrap();
        let x_val = config.value(0).unwrap().as_numeric().unwrap().as_f64();
        let e = Evaluation::new(os, config, None, vec![Datum::Float(0.25)]).unwrap();
        let got = e.objective_values().unwrap();
        let Datum::Float(v) = got[0] else {
            panic!("expected a float objective");
        };
        assert!((v - (0.25 + x_val)).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_objective_variable_rejected() {
        let mut os = ObjectiveSpace::new(
            "results",
            vec![Parameter::float("error", 0.0, 1.0).unwrap()],
        )
        .unwrap();
        let stranger = Parameter::float("y", 0.0, 1.0).unwrap();
        assert!(os
            .add_objective(Expr::variable(&stranger), Direction::Minimize)
            .is_err());
    }

    #[test]
    fn test_invalid_result_values_rejected() {
        let (space, os) = setup();
        let config = space.sample().unwrap();
        assert!(Evaluation::new(
            Arc::clone(&os),
            config,
            None,
            vec![Datum::Float(2.0), Datum::Float(10.0)],
        )
        .is_err());
    }
}
