//! Random-search tuners, the baseline the protocol is measured against.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::expr::VariableLookup;
use crate::objective::{compare_objective_values, Evaluation, Objective, ObjectiveSpace};
use crate::parameter::Parameter;
use crate::pareto::update_optima;
use crate::space::{Binding, Configuration, ConfigurationSpace, Context, Features, FeaturesSpace};
use crate::tree::{TreeConfiguration, TreeSpace};
use crate::tuner::{TreeTuner, Tuner};
use crate::types::{Comparison, Direction, EvaluationStatus};

/// Compares within one feature context; evaluations under different
/// features never displace each other in the optimum set.
fn compare_within_features(a: &Evaluation, b: &Evaluation) -> Result<Comparison> {
    if a.features() != b.features() {
        return Ok(Comparison::NotComparable);
    }
    a.compare(b)
}

#[derive(Default)]
struct State {
    history: Vec<Evaluation>,
    optima: Vec<Evaluation>,
}

/// A tuner that proposes uniform random draws from its space.
///
/// It still maintains full history and Pareto optimum sets, so it doubles
/// as the reference for what any strategy must track.
pub struct RandomTuner {
    name: Arc<str>,
    space: Arc<ConfigurationSpace>,
    objective_space: Arc<ObjectiveSpace>,
    features_space: Option<Arc<FeaturesSpace>>,
    state: RwLock<State>,
    seed: u64,
    rng: Mutex<fastrand::Rng>,
}

impl RandomTuner {
    /// Creates a tuner over `space` scoring with `objective_space`.
    #[must_use]
    pub fn new(
        name: impl AsRef<str>,
        space: Arc<ConfigurationSpace>,
        objective_space: Arc<ObjectiveSpace>,
    ) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            space,
            objective_space,
            features_space: None,
            state: RwLock::default(),
            seed: fastrand::u64(..),
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Declares the feature context evaluations may carry.
    #[must_use]
    pub fn with_features_space(mut self, features_space: Arc<FeaturesSpace>) -> Self {
        self.features_space = Some(features_space);
        self
    }

    /// Reseeds the tuner's own choice stream (not the space's).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = Mutex::new(fastrand::Rng::with_seed(seed));
        self
    }

    /// Returns the tuner's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the search space.
    #[must_use]
    pub fn space(&self) -> &Arc<ConfigurationSpace> {
        &self.space
    }

    /// Returns the objective space.
    #[must_use]
    pub fn objective_space(&self) -> &Arc<ObjectiveSpace> {
        &self.objective_space
    }

    fn check_features(&self, features: Option<&Features>) -> Result<()> {
        match (features, &self.features_space) {
            (None, _) => Ok(()),
            (Some(f), Some(fs)) if Arc::ptr_eq(f.space(), fs) => Ok(()),
            (Some(_), _) => Err(Error::InvalidFeatures {
                reason: "features belong to a different features space".to_string(),
            }),
        }
    }

    fn check_evaluation(&self, evaluation: &Evaluation) -> Result<()> {
        if !Arc::ptr_eq(evaluation.objective_space(), &self.objective_space) {
            return Err(Error::InvalidEvaluation {
                reason: "evaluation scored against a different objective space".to_string(),
            });
        }
        self.space.check(evaluation.configuration())?;
        self.check_features(evaluation.features())
    }
}

impl Tuner for RandomTuner {
    fn ask(&self, count: usize, features: Option<&Features>) -> Result<Vec<Configuration>> {
        self.check_features(features)?;
        // Random search ignores the feature context when proposing.
        self.space.samples(count)
    }

    fn tell(&self, evaluations: Vec<Evaluation>) -> Result<()> {
        for evaluation in &evaluations {
            self.check_evaluation(evaluation)?;
        }
        let mut state = self.state.write();
        // Stage the optimum updates first; a comparison failure midway
        // through the batch must not leave part of it recorded.
        let mut optima = state.optima.clone();
        for evaluation in &evaluations {
            if evaluation.status() == EvaluationStatus::Success {
                update_optima(&mut optima, evaluation.clone(), compare_within_features)?;
            }
        }
        state.optima = optima;
        state.history.extend(evaluations);
        trace_info!(tuner = %self.name, history = state.history.len(), "told");
        Ok(())
    }

    fn history(&self, features: Option<&Features>) -> Result<Vec<Evaluation>> {
        self.check_features(features)?;
        let state = self.state.read();
        Ok(state
            .history
            .iter()
            .filter(|e| features.is_none() || e.features() == features)
            .cloned()
            .collect())
    }

    fn optima(&self, features: Option<&Features>) -> Result<Vec<Evaluation>> {
        self.check_features(features)?;
        let state = self.state.read();
        Ok(state
            .optima
            .iter()
            .filter(|e| features.is_none() || e.features() == features)
            .cloned()
            .collect())
    }

    fn suggest(&self, features: Option<&Features>) -> Result<Configuration> {
        let optima = self.optima(features)?;
        if !optima.is_empty() {
            let idx = self.rng.lock().usize(..optima.len());
            return Ok(optima[idx].configuration().clone());
        }
        self.space.sample()
    }
}

/// Resolves only result parameters; tree values have no variable names.
struct TreeEvaluationLookup<'a> {
    context: &'a Context,
    values: &'a [Datum],
}

impl VariableLookup for TreeEvaluationLookup<'_> {
    fn value_of(&self, param: &Parameter) -> Option<Datum> {
        let idx = self.context.index_of(param)?;
        self.values.get(idx).cloned()
    }
}

/// One scored tree walk.
#[derive(Clone, Debug)]
pub struct TreeEvaluation {
    objective_space: Arc<ObjectiveSpace>,
    configuration: TreeConfiguration,
    values: Vec<Datum>,
    status: EvaluationStatus,
}

impl TreeEvaluation {
    /// Creates a successful tree evaluation, validating the result values.
    ///
    /// # Errors
    ///
    /// Same as [`ObjectiveSpace::check_values`].
    pub fn new(
        objective_space: Arc<ObjectiveSpace>,
        configuration: TreeConfiguration,
        values: Vec<Datum>,
    ) -> Result<Self> {
        objective_space.check_values(&values)?;
        Ok(Self {
            objective_space,
            configuration,
            values,
            status: EvaluationStatus::Success,
        })
    }

    /// Creates a failed tree evaluation.
    #[must_use]
    pub fn failed(objective_space: Arc<ObjectiveSpace>, configuration: TreeConfiguration) -> Self {
        let values = vec![Datum::None; objective_space.context().len()];
        Self {
            objective_space,
            configuration,
            values,
            status: EvaluationStatus::Failed,
        }
    }

    /// Returns the objective space.
    #[must_use]
    pub fn objective_space(&self) -> &Arc<ObjectiveSpace> {
        &self.objective_space
    }

    /// Returns the evaluated tree walk.
    #[must_use]
    pub fn configuration(&self) -> &TreeConfiguration {
        &self.configuration
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
        let lookup = TreeEvaluationLookup {
            context: self.objective_space.context(),
            values: &self.values,
        };
        self.objective_space
            .objectives()
            .iter()
            .map(|o| o.expr().eval(&lookup))
            .collect()
    }

    /// Pareto-compares two tree evaluations of the same objective space.
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
        let directions: Vec<Direction> = self
            .objective_space
            .objectives()
            .iter()
            .map(Objective::direction)
            .collect();
        compare_objective_values(
            &self.objective_values()?,
            &other.objective_values()?,
            &directions,
        )
    }
}

impl Binding for TreeEvaluation {
    fn context(&self) -> &Context {
        self.objective_space.context()
    }

    fn values(&self) -> &[Datum] {
        &self.values
    }
}

#[derive(Default)]
struct TreeState {
    history: Vec<TreeEvaluation>,
    optima: Vec<TreeEvaluation>,
}

/// Random search over a tree space.
pub struct RandomTreeTuner {
    name: Arc<str>,
    space: Arc<TreeSpace>,
    objective_space: Arc<ObjectiveSpace>,
    state: RwLock<TreeState>,
    seed: u64,
    rng: Mutex<fastrand::Rng>,
}

impl RandomTreeTuner {
    /// Creates a tuner over `space` scoring with `objective_space`.
    #[must_use]
    pub fn new(
        name: impl AsRef<str>,
        space: Arc<TreeSpace>,
        objective_space: Arc<ObjectiveSpace>,
    ) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            space,
            objective_space,
            state: RwLock::default(),
            seed: fastrand::u64(..),
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Reseeds the tuner's own choice stream (not the space's).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = Mutex::new(fastrand::Rng::with_seed(seed));
        self
    }

    /// Returns the tuner's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tree space.
    #[must_use]
    pub fn space(&self) -> &Arc<TreeSpace> {
        &self.space
    }

    fn check_evaluation(&self, evaluation: &TreeEvaluation) -> Result<()> {
        if !Arc::ptr_eq(evaluation.objective_space(), &self.objective_space) {
            return Err(Error::InvalidEvaluation {
                reason: "evaluation scored against a different objective space".to_string(),
            });
        }
        let walked = self
            .space
            .values_at(evaluation.configuration().position())
            .map_err(|e| Error::InvalidEvaluation {
                reason: format!("position is not part of this tree: {e}"),
            })?;
        if walked != evaluation.configuration().values() {
            return Err(Error::InvalidEvaluation {
                reason: "configuration values do not match the tree at its position".to_string(),
            });
        }
        Ok(())
    }
}

impl TreeTuner for RandomTreeTuner {
    fn ask(&self, count: usize) -> Result<Vec<TreeConfiguration>> {
        self.space.samples(count)
    }

    fn tell(&self, evaluations: Vec<TreeEvaluation>) -> Result<()> {
        for evaluation in &evaluations {
            self.check_evaluation(evaluation)?;
        }
        let mut state = self.state.write();
        // Stage as in `RandomTuner::tell`: all or nothing.
        let mut optima = state.optima.clone();
        for evaluation in &evaluations {
            if evaluation.status() == EvaluationStatus::Success {
                update_optima(&mut optima, evaluation.clone(), TreeEvaluation::compare)?;
            }
        }
        state.optima = optima;
        state.history.extend(evaluations);
        trace_debug!(tuner = %self.name, history = state.history.len(), "told");
        Ok(())
    }

    fn history(&self) -> Result<Vec<TreeEvaluation>> {
        Ok(self.state.read().history.clone())
    }

    fn optima(&self) -> Result<Vec<TreeEvaluation>> {
        Ok(self.state.read().optima.clone())
    }

    fn suggest(&self) -> Result<TreeConfiguration> {
        let state = self.state.read();
        if !state.optima.is_empty() {
            let idx = self.rng.lock().usize(..state.optima.len());
            return Ok(state.optima[idx].configuration().clone());
        }
        drop(state);
        self.space.sample()
    }
}

#[cfg(feature = "serde")]
mod snapshot {
    use super::{
        Arc, Binding, Configuration, ConfigurationSpace, Datum, Error, Evaluation,
        EvaluationStatus, Features, FeaturesSpace, Mutex, ObjectiveSpace, RandomTreeTuner,
        RandomTuner, Result, RwLock, State, TreeConfiguration, TreeEvaluation, TreeSpace,
        TreeState, compare_within_features, update_optima,
    };

    fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn handle_err(e: &Error) -> Error {
        Error::InvalidHandle {
            reason: format!("snapshot does not match the supplied spaces: {e}"),
        }
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct EvaluationRecord {
        configuration: Vec<Datum>,
        features: Option<Vec<Datum>>,
        values: Vec<Datum>,
        status: EvaluationStatus,
    }

    /// Snapshots store raw value vectors, position-correlated with the
    /// contexts of the spaces re-supplied at restore time. The spaces
    /// themselves are not embedded; restoring against the wrong ones fails
    /// with [`Error::InvalidHandle`].
    #[derive(serde::Serialize, serde::Deserialize)]
    struct TunerSnapshot {
        name: String,
        seed: u64,
        history: Vec<EvaluationRecord>,
    }

    impl RandomTuner {
        /// Serializes the tuner's name, seed, and history.
        ///
        /// # Errors
        ///
        /// Returns [`Error::Serialization`] on encoding failure.
        pub fn snapshot(&self) -> Result<Vec<u8>> {
            let state = self.state.read();
            let history = state
                .history
                .iter()
                .map(|e| EvaluationRecord {
                    configuration: e.configuration().values().to_vec(),
                    features: e.features().map(|f| f.values().to_vec()),
                    values: Binding::values(e).to_vec(),
                    status: e.status(),
                })
                .collect();
            encode(&TunerSnapshot {
                name: self.name.to_string(),
                seed: self.seed,
                history,
            })
        }

        /// Rebuilds a tuner from a snapshot and freshly supplied spaces.
        ///
        /// The optimum set is replayed from history rather than stored, so
        /// the restored tuner satisfies the same invariants as the original.
        ///
        /// # Errors
        ///
        /// - [`Error::Serialization`] on decoding failure.
        /// - [`Error::InvalidHandle`] when a record does not fit the
        ///   supplied spaces, including features present in the snapshot
        ///   with no features space supplied.
        pub fn restore(
            space: Arc<ConfigurationSpace>,
            objective_space: Arc<ObjectiveSpace>,
            features_space: Option<Arc<FeaturesSpace>>,
            bytes: &[u8],
        ) -> Result<Self> {
            let snap: TunerSnapshot = decode(bytes)?;
            let mut state = State::default();
            for record in snap.history {
                let configuration =
                    Configuration::new(Arc::clone(&space), record.configuration)
                        .map_err(|e| handle_err(&e))?;
                let features = match (record.features, &features_space) {
                    (None, _) => None,
                    (Some(values), Some(fs)) => Some(
                        Features::new(Arc::clone(fs), values).map_err(|e| handle_err(&e))?,
                    ),
                    (Some(_), None) => {
                        return Err(Error::InvalidHandle {
                            reason: "snapshot carries features but no features space was supplied"
                                .to_string(),
                        });
                    }
                };
                let evaluation = match record.status {
                    EvaluationStatus::Success => Evaluation::new(
                        Arc::clone(&objective_space),
                        configuration,
                        features,
                        record.values,
                    )
                    .map_err(|e| handle_err(&e))?,
                    EvaluationStatus::Failed => {
                        Evaluation::failed(Arc::clone(&objective_space), configuration, features)
                    }
                };
                if evaluation.status() == EvaluationStatus::Success {
                    update_optima(
                        &mut state.optima,
                        evaluation.clone(),
                        compare_within_features,
                    )?;
                }
                state.history.push(evaluation);
            }
            Ok(Self {
                name: Arc::from(snap.name.as_str()),
                space,
                objective_space,
                features_space,
                state: RwLock::new(state),
                seed: snap.seed,
                rng: Mutex::new(fastrand::Rng::with_seed(snap.seed)),
            })
        }
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct TreeEvaluationRecord {
        position: Vec<usize>,
        values: Vec<Datum>,
        status: EvaluationStatus,
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct TreeTunerSnapshot {
        name: String,
        seed: u64,
        history: Vec<TreeEvaluationRecord>,
    }

    impl RandomTreeTuner {
        /// Serializes the tuner's name, seed, and history; positions stand
        /// in for tree configurations.
        ///
        /// # Errors
        ///
        /// Returns [`Error::Serialization`] on encoding failure.
        pub fn snapshot(&self) -> Result<Vec<u8>> {
            let state = self.state.read();
            let history = state
                .history
                .iter()
                .map(|e| TreeEvaluationRecord {
                    position: e.configuration().position().to_vec(),
                    values: Binding::values(e).to_vec(),
                    status: e.status(),
                })
                .collect();
            encode(&TreeTunerSnapshot {
                name: self.name.to_string(),
                seed: self.seed,
                history,
            })
        }

        /// Rebuilds a tuner from a snapshot, resolving stored positions
        /// against the freshly supplied tree.
        ///
        /// # Errors
        ///
        /// - [`Error::Serialization`] on decoding failure.
        /// - [`Error::InvalidHandle`] when a position leaves the supplied
        ///   tree or result values do not fit the objective space.
        pub fn restore(
            space: Arc<TreeSpace>,
            objective_space: Arc<ObjectiveSpace>,
            bytes: &[u8],
        ) -> Result<Self> {
            let snap: TreeTunerSnapshot = decode(bytes)?;
            let mut state = TreeState::default();
            for record in snap.history {
                let configuration = space
                    .configuration_at(&record.position)
                    .map_err(|e| handle_err(&e))?;
                let evaluation = match record.status {
                    EvaluationStatus::Success => TreeEvaluation::new(
                        Arc::clone(&objective_space),
                        configuration,
                        record.values,
                    )
                    .map_err(|e| handle_err(&e))?,
                    EvaluationStatus::Failed => {
                        TreeEvaluation::failed(Arc::clone(&objective_space), configuration)
                    }
                };
                if evaluation.status() == EvaluationStatus::Success {
                    update_optima(
                        &mut state.optima,
                        evaluation.clone(),
                        TreeEvaluation::compare,
                    )?;
                }
                state.history.push(evaluation);
            }
            Ok(Self {
                name: Arc::from(snap.name.as_str()),
                space,
                objective_space,
                state: RwLock::new(state),
                seed: snap.seed,
                rng: Mutex::new(fastrand::Rng::with_seed(snap.seed)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use crate::parameter::Parameter;
    use crate::tree::Tree;

    fn setup() -> (Arc<ConfigurationSpace>, Arc<ObjectiveSpace>) {
        let space = Arc::new(
            ConfigurationSpace::new(
                "search",
                vec![
                    Parameter::float("x", 0.0, 1.0).unwrap(),
                    Parameter::int("n", 1, 33).unwrap(),
                ],
            )
            .unwrap()
            .with_seed(61),
        );
        let mut os = ObjectiveSpace::new(
            "results",
            vec![Parameter::float("error", 0.0, 1.0).unwrap()],
        )
        .unwrap();
        let expr = Expr::parse("error", os.context()).unwrap();
        os.add_objective(expr, crate::types::Direction::Minimize)
            .unwrap();
        (space, Arc::new(os))
    }

    fn told_tuner(n: usize) -> (RandomTuner, Arc<ObjectiveSpace>) {
        let (space, os) = setup();
        let tuner = RandomTuner::new("random", Arc::clone(&space), Arc::clone(&os)).with_seed(62);
        let configs = tuner.ask(n, None).unwrap();
        let evals: Vec<Evaluation> = configs
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let err = (i % 10) as f64 / 10.0;
                Evaluation::new(Arc::clone(&os), c, None, vec![Datum::Float(err)]).unwrap()
            })
            .collect();
        tuner.tell(evals).unwrap();
        (tuner, os)
    }

    #[test]
    fn test_ask_tell_history() {
        let (tuner, _) = told_tuner(25);
        assert_eq!(tuner.history(None).unwrap().len(), 25);
        // Single objective: exactly one optimum, the smallest error seen.
        let optima = tuner.optima(None).unwrap();
        assert_eq!(optima.len(), 1);
        assert_eq!(
            optima[0].objective_values().unwrap(),
            vec![Datum::Float(0.0)]
        );
    }

    #[test]
    fn test_optima_dominate_history() {
        let (tuner, _) = told_tuner(40);
        let optima = tuner.optima(None).unwrap();
        for h in tuner.history(None).unwrap() {
            let dominated = optima
                .iter()
                .any(|o| o.compare(&h).unwrap() == Comparison::Better);
            let in_front = optima.iter().any(|o| {
                matches!(
                    o.compare(&h).unwrap(),
                    Comparison::Equivalent | Comparison::NotComparable
                )
            });
            assert!(dominated || in_front);
        }
    }

    #[test]
    fn test_failed_evaluations_stay_out_of_optima() {
        let (space, os) = setup();
        let tuner = RandomTuner::new("random", Arc::clone(&space), Arc::clone(&os));
        let c = space.sample().unwrap();
        tuner
            .tell(vec![Evaluation::failed(Arc::clone(&os), c, None)])
            .unwrap();
        assert_eq!(tuner.history(None).unwrap().len(), 1);
        assert!(tuner.optima(None).unwrap().is_empty());
    }

    /// A result context whose objective values cannot always be ordered:
    /// `y` is categorical over an integer and a string.
    fn incomparable_objective_space() -> Arc<ObjectiveSpace> {
        let mut os = ObjectiveSpace::new(
            "results",
            vec![Parameter::categorical("y", vec![Datum::Int(0), Datum::from("s")], 0).unwrap()],
        )
        .unwrap();
        let expr = Expr::parse("y", os.context()).unwrap();
        os.add_objective(expr, crate::types::Direction::Minimize)
            .unwrap();
        Arc::new(os)
    }

    #[test]
    fn test_tell_failure_leaves_state_untouched() {
        let space = Arc::new(
            ConfigurationSpace::new("search", vec![Parameter::float("x", 0.0, 1.0).unwrap()])
                .unwrap()
                .with_seed(67),
        );
        let os = incomparable_objective_space();
        let tuner = RandomTuner::new("random", Arc::clone(&space), Arc::clone(&os));

        // Both values are in the domain; only comparing them fails.
        let e1 = Evaluation::new(
            Arc::clone(&os),
            space.sample().unwrap(),
            None,
            vec![Datum::Int(0)],
        )
        .unwrap();
        let e2 = Evaluation::new(
            Arc::clone(&os),
            space.sample().unwrap(),
            None,
            vec![Datum::from("s")],
        )
        .unwrap();
        assert!(tuner.tell(vec![e1.clone(), e2]).is_err());
        assert!(tuner.history(None).unwrap().is_empty());
        assert!(tuner.optima(None).unwrap().is_empty());

        // The same evaluation on its own is still accepted afterwards.
        tuner.tell(vec![e1]).unwrap();
        assert_eq!(tuner.history(None).unwrap().len(), 1);
    }

    #[test]
    fn test_foreign_evaluations_rejected() {
        let (space, os) = setup();
        let (other_space, other_os) = setup();
        let tuner = RandomTuner::new("random", Arc::clone(&space), Arc::clone(&os));

        let foreign_config = other_space.sample().unwrap();
        let e =
            Evaluation::new(Arc::clone(&os), foreign_config, None, vec![Datum::Float(0.1)])
                .unwrap();
        assert!(tuner.tell(vec![e]).is_err());

        let config = space.sample().unwrap();
        let e = Evaluation::new(other_os, config, None, vec![Datum::Float(0.1)]).unwrap();
        assert!(tuner.tell(vec![e]).is_err());
    }

    #[test]
    fn test_suggest_prefers_optima() {
        let (tuner, _) = told_tuner(20);
        let optima = tuner.optima(None).unwrap();
        for _ in 0..10 {
            let s = tuner.suggest(None).unwrap();
            assert!(optima.iter().any(|o| *o.configuration() == s));
        }

        // Without history, suggest falls back to a fresh draw.
        let (space, os) = setup();
        let fresh = RandomTuner::new("random", Arc::clone(&space), os);
        let s = fresh.suggest(None).unwrap();
        space.check(&s).unwrap();
    }

    #[test]
    fn test_features_slice_history_and_optima() {
        let (space, os) = setup();
        let fs = Arc::new(
            FeaturesSpace::new(
                "features",
                vec![Parameter::categorical(
                    "region",
                    vec![Datum::from("eu"), Datum::from("us")],
                    0,
                )
                .unwrap()],
            )
            .unwrap(),
        );
        let tuner = RandomTuner::new("random", Arc::clone(&space), Arc::clone(&os))
            .with_features_space(Arc::clone(&fs))
            .with_seed(63);

        let eu = Features::new(Arc::clone(&fs), vec![Datum::from("eu")]).unwrap();
        let us = Features::new(Arc::clone(&fs), vec![Datum::from("us")]).unwrap();

        let mut evals = Vec::new();
        for (features, err) in [(&eu, 0.2), (&eu, 0.4), (&us, 0.1), (&us, 0.3)] {
            let c = space.sample().unwrap();
            evals.push(
                Evaluation::new(
                    Arc::clone(&os),
                    c,
                    Some(features.clone()),
                    vec![Datum::Float(err)],
                )
                .unwrap(),
            );
        }
        tuner.tell(evals).unwrap();

        assert_eq!(tuner.history(Some(&eu)).unwrap().len(), 2);
        assert_eq!(tuner.history(None).unwrap().len(), 4);

        // Each feature context keeps its own optimum.
        let eu_optima = tuner.optima(Some(&eu)).unwrap();
        assert_eq!(eu_optima.len(), 1);
        assert_eq!(
            eu_optima[0].objective_values().unwrap(),
            vec![Datum::Float(0.2)]
        );
        let us_optima = tuner.optima(Some(&us)).unwrap();
        assert_eq!(
            us_optima[0].objective_values().unwrap(),
            vec![Datum::Float(0.1)]
        );

        // Features from a foreign space are rejected.
        let other_fs = Arc::new(
            FeaturesSpace::new(
                "features",
                vec![Parameter::int("cores", 1, 9).unwrap()],
            )
            .unwrap(),
        );
        let foreign = Features::new(other_fs, vec![Datum::Int(4)]).unwrap();
        assert!(tuner.history(Some(&foreign)).is_err());
    }

    fn tree_setup() -> (Arc<TreeSpace>, Arc<ObjectiveSpace>) {
        let mut root = Tree::new(0_i64, 2);
        root.set_child(0, Tree::new(1_i64, 0)).unwrap();
        root.set_child(1, Tree::new(2_i64, 0)).unwrap();
        let space = Arc::new(TreeSpace::fixed("tree", root).with_seed(64));
        let mut os = ObjectiveSpace::new(
            "results",
            vec![Parameter::float("score", 0.0, 10.0).unwrap()],
        )
        .unwrap();
        let expr = Expr::parse("score", os.context()).unwrap();
        os.add_objective(expr, crate::types::Direction::Maximize)
            .unwrap();
        (space, Arc::new(os))
    }

    #[test]
    fn test_tree_tuner_round() {
        let (space, os) = tree_setup();
        let tuner =
            RandomTreeTuner::new("tree-random", Arc::clone(&space), Arc::clone(&os)).with_seed(65);
        let configs = tuner.ask(10).unwrap();
        let evals: Vec<TreeEvaluation> = configs
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                TreeEvaluation::new(Arc::clone(&os), c, vec![Datum::Float(i as f64)]).unwrap()
            })
            .collect();
        tuner.tell(evals).unwrap();
        assert_eq!(tuner.history().unwrap().len(), 10);
        let optima = tuner.optima().unwrap();
        assert_eq!(optima.len(), 1);
        assert_eq!(
            optima[0].objective_values().unwrap(),
            vec![Datum::Float(9.0)]
        );
        let s = tuner.suggest().unwrap();
        assert_eq!(&s, optima[0].configuration());
    }

    #[test]
    fn test_tree_tell_failure_leaves_state_untouched() {
        let mut root = Tree::new(0_i64, 2);
        root.set_child(0, Tree::new(1_i64, 0)).unwrap();
        root.set_child(1, Tree::new(2_i64, 0)).unwrap();
        let space = Arc::new(TreeSpace::fixed("tree", root).with_seed(68));
        let os = incomparable_objective_space();
        let tuner = RandomTreeTuner::new("tree-random", Arc::clone(&space), Arc::clone(&os));

        let e1 = TreeEvaluation::new(
            Arc::clone(&os),
            space.configuration_at(&[0]).unwrap(),
            vec![Datum::Int(0)],
        )
        .unwrap();
        let e2 = TreeEvaluation::new(
            Arc::clone(&os),
            space.configuration_at(&[1]).unwrap(),
            vec![Datum::from("s")],
        )
        .unwrap();
        assert!(tuner.tell(vec![e1, e2]).is_err());
        assert!(tuner.history().unwrap().is_empty());
        assert!(tuner.optima().unwrap().is_empty());
    }

    #[test]
    fn test_tree_tuner_rejects_foreign_positions() {
        let (space, os) = tree_setup();
        let tuner = RandomTreeTuner::new("tree-random", space, Arc::clone(&os));
        // A walk from a deeper tree names a position the tuner's tree
        // does not have.
        let mut deep_root = Tree::new(0_i64, 1);
        let mut mid = Tree::new(1_i64, 1);
        mid.set_child(0, Tree::new(2_i64, 0)).unwrap();
        deep_root.set_child(0, mid).unwrap();
        let deeper = TreeSpace::fixed("deep", deep_root);
        let foreign = deeper.configuration_at(&[0, 0]).unwrap();
        let e = TreeEvaluation::new(Arc::clone(&os), foreign, vec![Datum::Float(1.0)]).unwrap();
        assert!(tuner.tell(vec![e]).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_snapshot_round_trip() {
        let (tuner, os) = told_tuner(15);
        let bytes = tuner.snapshot().unwrap();
        let restored = RandomTuner::restore(
            Arc::clone(tuner.space()),
            Arc::clone(&os),
            None,
            &bytes,
        )
        .unwrap();
        assert_eq!(restored.name(), tuner.name());
        assert_eq!(
            restored.history(None).unwrap().len(),
            tuner.history(None).unwrap().len()
        );
        let a = tuner.optima(None).unwrap();
        let b = restored.optima(None).unwrap();
        assert_eq!(a.len(), b.len());
        assert_eq!(
            a[0].objective_values().unwrap(),
            b[0].objective_values().unwrap()
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_snapshot_restore_against_wrong_space_fails() {
        let (tuner, _) = told_tuner(5);
        let bytes = tuner.snapshot().unwrap();
        let wrong_space = Arc::new(
            ConfigurationSpace::new("search", vec![Parameter::float("x", 0.0, 1.0).unwrap()])
                .unwrap(),
        );
        let result = RandomTuner::restore(
            wrong_space,
            Arc::clone(tuner.objective_space()),
            None,
            &bytes,
        );
        assert!(matches!(result, Err(Error::InvalidHandle { .. })));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_tree_snapshot_round_trip() {
        let (space, os) = tree_setup();
        let tuner =
            RandomTreeTuner::new("tree-random", Arc::clone(&space), Arc::clone(&os)).with_seed(66);
        let configs = tuner.ask(8).unwrap();
        let evals: Vec<TreeEvaluation> = configs
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                TreeEvaluation::new(Arc::clone(&os), c, vec![Datum::Float(i as f64)]).unwrap()
            })
            .collect();
        tuner.tell(evals).unwrap();

        let bytes = tuner.snapshot().unwrap();
        let restored = RandomTreeTuner::restore(Arc::clone(&space), Arc::clone(&os), &bytes).unwrap();
        assert_eq!(restored.history().unwrap().len(), 8);
        assert_eq!(
            restored.optima().unwrap()[0].objective_values().unwrap(),
            tuner.optima().unwrap()[0].objective_values().unwrap()
        );
    }
}
