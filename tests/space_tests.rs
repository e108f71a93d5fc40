//! Integration tests for conditional configuration spaces.

use std::sync::Arc;

use confspace::prelude::*;

/// Builds the canonical three-parameter conditional space: an algorithm
/// switch, a float active only for one branch, and a forbidden corner.
fn build_space() -> Arc<ConfigurationSpace> {
    let algorithm = Parameter::categorical(
        "algorithm",
        vec!["sgd".into(), "adam".into(), "lbfgs".into()],
        0,
    )
    .unwrap();
    let momentum = Parameter::float("momentum", 0.0, 1.0).unwrap();
    let iterations = Parameter::int("iterations", 10, 1000).unwrap();

    let mut space = ConfigurationSpace::new(
        "training",
        vec![algorithm, momentum.clone(), iterations],
    )
    .unwrap();

    let cond = Expr::parse("algorithm == 'sgd'", space.context()).unwrap();
    space.set_condition(&momentum, cond).unwrap();

    let clause = Expr::parse("algorithm == 'lbfgs' && iterations > 500", space.context()).unwrap();
    space.add_forbidden_clause(clause).unwrap();

    Arc::new(space.with_seed(1729))
}

#[test]
fn test_thousand_samples_satisfy_all_constraints() {
    let space = build_space();
    for _ in 0..1000 {
        let config = space.sample().unwrap();
        space.check(&config).unwrap();

        let algorithm = config.value_by_name("algorithm").unwrap();
        let momentum = config.value_by_name("momentum").unwrap();
        let iterations = config.value_by_name("iterations").unwrap();

        // Activation follows the condition exactly.
        let is_sgd = algorithm.eq_value(&Datum::from("sgd"));
        assert_eq!(
            is_sgd,
            !momentum.is_inactive(),
            "momentum must be active exactly when the algorithm is sgd"
        );

        // The forbidden corner is never drawn.
        if algorithm.eq_value(&Datum::from("lbfgs")) {
            let Datum::Int(n) = *iterations else {
                panic!("iterations must be an integer");
            };
            assert!(n <= 500, "forbidden clause violated: lbfgs with {n} iterations");
        }
    }
}

#[test]
fn test_every_branch_is_reachable() {
    let space = build_space();
    let mut seen = [false; 3];
    for _ in 0..1000 {
        let config = space.sample().unwrap();
        let algorithm = config.value_by_name("algorithm").unwrap();
        for (i, name) in ["sgd", "adam", "lbfgs"].iter().enumerate() {
            seen[i] |= algorithm.eq_value(&Datum::from(*name));
        }
    }
    assert!(seen.iter().all(|&s| s), "all three branches should appear");
}

#[test]
fn test_manual_configurations_validate() {
    let space = build_space();
    Configuration::new(
        Arc::clone(&space),
        vec![Datum::from("sgd"), Datum::Float(0.9), Datum::Int(100)],
    )
    .unwrap();
    Configuration::new(
        Arc::clone(&space),
        vec![Datum::from("adam"), Datum::Inactive, Datum::Int(100)],
    )
    .unwrap();

    // Inactive parameter carrying a value.
    assert!(Configuration::new(
        Arc::clone(&space),
        vec![Datum::from("adam"), Datum::Float(0.9), Datum::Int(100)],
    )
    .is_err());
    // Forbidden corner.
    assert!(Configuration::new(
        Arc::clone(&space),
        vec![Datum::from("lbfgs"), Datum::Inactive, Datum::Int(900)],
    )
    .is_err());
}

#[test]
fn test_default_configuration_is_valid() {
    let space = build_space();
    let def = space.default_configuration().unwrap();
    space.check(&def).unwrap();
    assert!(def.value_by_name("algorithm").unwrap().eq_value(&Datum::from("sgd")));
    // sgd activates momentum, so the default carries momentum's default.
    assert_eq!(def.value_by_name("momentum").unwrap(), &Datum::Float(0.0));
}

#[cfg(feature = "serde")]
#[test]
fn test_space_serde_round_trip() {
    let space = build_space();
    let json = serde_json::to_string(&*space).unwrap();
    let restored: ConfigurationSpace = serde_json::from_str(&json).unwrap();
    let restored = Arc::new(restored);

    assert_eq!(restored.name(), space.name());
    assert_eq!(restored.len(), space.len());
    // The restored space enforces the same constraints.
    for _ in 0..200 {
        let config = restored.sample().unwrap();
        restored.check(&config).unwrap();
        let is_sgd = config
            .value_by_name("algorithm")
            .unwrap()
            .eq_value(&Datum::from("sgd"));
        assert_eq!(is_sgd, !config.value_by_name("momentum").unwrap().is_inactive());
    }
}
