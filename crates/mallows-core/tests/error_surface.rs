use mallows_core::errors::{ErrorInfo, MallowsError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("item", "3")
        .with_context("reason", "example")
}

#[test]
fn metric_error_surface() {
    let err = MallowsError::Metric(sample_info("unknown-metric", "no such distance"));
    assert_eq!(err.info().code, "unknown-metric");
    assert!(err.info().context.contains_key("item"));
}

#[test]
fn error_model_error_surface() {
    let err = MallowsError::ErrorModel(sample_info("shape-underflow", "beta shape zero"));
    assert_eq!(err.info().code, "shape-underflow");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn permutation_error_surface() {
    let err = MallowsError::Permutation(sample_info("duplicate-rank", "rank used twice"));
    assert_eq!(err.info().code, "duplicate-rank");
}

#[test]
fn constraint_error_surface() {
    let err = MallowsError::Constraint(sample_info("cyclic-preferences", "cycle detected"));
    assert_eq!(err.info().code, "cyclic-preferences");
}

#[test]
fn config_error_surface() {
    let err = MallowsError::Config(sample_info("bad-field", "value out of range"));
    assert_eq!(err.info().code, "bad-field");
}

#[test]
fn rng_error_surface() {
    let err = MallowsError::Rng(sample_info("bad-seed", "invalid seed"));
    assert_eq!(err.info().code, "bad-seed");
}

#[test]
fn hint_appears_in_display() {
    let err = MallowsError::Config(
        ErrorInfo::new("bad-field", "value out of range").with_hint("use a positive value"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("bad-field"));
    assert!(rendered.contains("use a positive value"));
}
