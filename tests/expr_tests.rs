//! Expression parsing, rendering, and evaluation through the public API.

use std::sync::Arc;

use confspace::prelude::*;

fn context() -> Context {
    Context::new(
        "params",
        vec![
            Parameter::categorical(
                "kernel",
                vec!["linear".into(), "rbf".into(), "poly".into()],
                0,
            )
            .unwrap(),
            Parameter::float("gamma", 1e-6, 10.0).unwrap(),
            Parameter::int("degree", 1, 6).unwrap(),
        ],
    )
    .unwrap()
}

#[test]
fn test_parse_display_round_trips() {
    let ctx = context();
    for text in [
        "kernel == 'rbf' && gamma < 1.0",
        "kernel # ['rbf', 'poly']",
        "degree % 2 == 1 || gamma >= 5.0",
        "(gamma + 1.0) * 2.0 <= 10.0",
        "!(kernel == 'linear')",
        "-degree + 3 > 0",
    ] {
        let parsed = Expr::parse(text, &ctx).unwrap();
        assert_eq!(parsed.to_string(), text);
        assert_eq!(Expr::parse(&parsed.to_string(), &ctx).unwrap(), parsed);
    }
}

#[test]
fn test_conditions_drive_sampling() {
    let ctx = context();
    let kernel = ctx.get_by_name("kernel").unwrap().clone();
    let gamma = ctx.get_by_name("gamma").unwrap().clone();
    let degree = ctx.get_by_name("degree").unwrap().clone();

    let mut space = ConfigurationSpace::new(
        "svm",
        vec![kernel, gamma.clone(), degree.clone()],
    )
    .unwrap();
    let gamma_cond = Expr::parse("kernel # ['rbf', 'poly']", space.context()).unwrap();
    space.set_condition(&gamma, gamma_cond).unwrap();
    let degree_cond = Expr::parse("kernel == 'poly'", space.context()).unwrap();
    space.set_condition(&degree, degree_cond).unwrap();

    let space = Arc::new(space.with_seed(81));
    for _ in 0..500 {
        let config = space.sample().unwrap();
        let kernel = config.value_by_name("kernel").unwrap().clone();
        let gamma_active = !config.value_by_name("gamma").unwrap().is_inactive();
        let degree_active = !config.value_by_name("degree").unwrap().is_inactive();

        let is_poly = kernel.eq_value(&Datum::from("poly"));
        let is_rbf = kernel.eq_value(&Datum::from("rbf"));
        assert_eq!(gamma_active, is_poly || is_rbf);
        assert_eq!(degree_active, is_poly);
    }
}

#[test]
fn test_inactive_is_equality_transparent_only() {
    let ctx = context();
    let gamma = ctx.get_by_name("gamma").unwrap().clone();

    let mut space = ConfigurationSpace::new("svm", vec![
        ctx.get_by_name("kernel").unwrap().clone(),
        gamma.clone(),
    ])
    .unwrap();
    let cond = Expr::parse("kernel == 'rbf'", space.context()).unwrap();
    space.set_condition(&gamma, cond).unwrap();
    let space = Arc::new(space.with_seed(82));

    let eq = Expr::parse("gamma == inactive", space.context()).unwrap();
    let lt = Expr::parse("gamma < 1.0", space.context()).unwrap();
    let guarded = Expr::parse("kernel == 'rbf' && gamma < 1.0", space.context()).unwrap();

    let mut saw_inactive = false;
    for _ in 0..200 {
        let config = space.sample().unwrap();
        let inactive = config.value_by_name("gamma").unwrap().is_inactive();
        saw_inactive |= inactive;

        // Equality sees the sentinel.
        assert_eq!(eq.eval(&config).unwrap(), Datum::Bool(inactive));
        // A bare comparison errors on the sentinel, short-circuiting saves it.
        if inactive {
            assert!(lt.eval(&config).is_err());
            assert_eq!(guarded.eval(&config).unwrap(), Datum::Bool(false));
        } else {
            assert!(lt.eval(&config).is_ok());
        }
    }
    assert!(saw_inactive);
}

#[test]
fn test_type_errors_surface() {
    let ctx = context();
    let bad_compare = Expr::parse("kernel < 3", &ctx).unwrap();
    let space = ConfigurationSpace::new("svm", vec![
        ctx.get_by_name("kernel").unwrap().clone(),
    ])
    .unwrap();
    let space = Arc::new(space.with_seed(83));
    let config = space.sample().unwrap();
    assert!(matches!(
        bad_compare.eval(&config),
        Err(Error::TypeNotComparable { .. })
    ));
}

#[cfg(feature = "serde")]
#[test]
fn test_expression_serde_preserves_identity() {
    let ctx = context();
    let expr = Expr::parse("kernel == 'rbf' && gamma < 1.0", &ctx).unwrap();
    let json = serde_json::to_string(&expr).unwrap();
    let back: Expr = serde_json::from_str(&json).unwrap();
    assert_eq!(back, expr);
    // Referenced parameters keep their identity through the round trip.
    let params = back.parameters();
    assert_eq!(
        params[0].id(),
        ctx.get_by_name("kernel").unwrap().id()
    );
}
