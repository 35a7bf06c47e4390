use fhub_filters::builtin::{
    PercentageFilter, PercentageFilterSettings, TimeWindowFilter, TimeWindowFilterSettings,
};
use fhub_filters::{EvaluationContext, FilterRegistry};

fn registry_with_builtins() -> FilterRegistry {
    let registry = FilterRegistry::new();
    registry
        .register(PercentageFilter, PercentageFilterSettings { value: 50.0 })
        .expect("register percentage");
    registry
        .register(TimeWindowFilter, TimeWindowFilterSettings { start: None, end: None })
        .expect("register time window");
    registry
}

#[test]
fn builtins_are_listed_with_defaults() {
    let registry = registry_with_builtins();
    let mut names: Vec<_> =
        registry.list_all().into_iter().map(|registration| registration.name).collect();
    names.sort();
    assert_eq!(names, ["Percentage", "TimeWindow"]);

    let percentage = registry.find_by_name("Percentage").expect("registered");
    assert_eq!(percentage.default_settings_json, r#"{"Value":50.0}"#);
}

#[test]
fn percentage_evaluates_through_registry() {
    let registry = registry_with_builtins();
    let ctx = EvaluationContext::new("Rollout").with_targeting_key("user-1");
    assert_eq!(registry.evaluate("Percentage", r#"{"Value":100.0}"#, &ctx), Some(true));
    assert_eq!(registry.evaluate("Percentage", r#"{"Value":0.0}"#, &ctx), Some(false));
}

#[test]
fn time_window_validates_open_bounds() {
    let registry = registry_with_builtins();
    assert!(registry.validate_parameters("TimeWindow", "{}").expect("registered").is_ok());
    assert!(
        registry
            .validate_parameters("TimeWindow", r#"{"Start":"2026-01-01T00:00:00Z"}"#)
            .expect("registered")
            .is_ok()
    );
}

#[test]
fn validation_rejects_fields_outside_the_settings_shape() {
    let registry = registry_with_builtins();
    let result =
        registry.validate_parameters("Percentage", r#"{"Value":10.0,"Seed":7}"#).expect("some");
    let error = result.expect_err("unknown field must reject");
    assert!(error.to_string().contains("PercentageFilterSettings"), "{error}");
}

#[test]
fn unregistered_type_has_no_validator() {
    let registry = registry_with_builtins();
    assert!(registry.validate_parameters("Geo", "{}").is_none());
}
