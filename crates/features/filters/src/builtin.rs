//! Built-in filter types registered by the dashboard builder.

use crate::{EvaluationContext, FeatureFilter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Enables a flag for a percentage of evaluations.
///
/// With a targeting key present, the outcome is deterministic: the same
/// feature and key always land in the same bucket. Without a key each
/// evaluation draws independently.
#[derive(Debug, Default, Clone, Copy)]
pub struct PercentageFilter;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct PercentageFilterSettings {
    /// Share of evaluations that pass, in percent `[0, 100]`.
    #[serde(alias = "value")]
    pub value: f64,
}

impl FeatureFilter for PercentageFilter {
    const NAME: &'static str = "Percentage";
    type Settings = PercentageFilterSettings;

    fn evaluate(&self, settings: &Self::Settings, ctx: &EvaluationContext) -> bool {
        if settings.value <= 0.0 {
            return false;
        }
        if settings.value >= 100.0 {
            return true;
        }
        match &ctx.targeting_key {
            Some(key) => bucket_of(&ctx.feature_name, key) < settings.value,
            None => rand::random::<f64>() * 100.0 < settings.value,
        }
    }
}

/// Stable bucket in `[0, 100)` for a feature/key pair.
fn bucket_of(feature_name: &str, key: &str) -> f64 {
    let hash = fxhash::hash64(&(feature_name, key));
    #[allow(clippy::cast_precision_loss)]
    let fraction = hash as f64 / u64::MAX as f64;
    fraction * 100.0
}

/// Enables a flag between two instants; either bound may be open.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeWindowFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct TimeWindowFilterSettings {
    #[serde(default, alias = "start")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, alias = "end")]
    pub end: Option<DateTime<Utc>>,
}

impl FeatureFilter for TimeWindowFilter {
    const NAME: &'static str = "TimeWindow";
    type Settings = TimeWindowFilterSettings;

    fn evaluate(&self, settings: &Self::Settings, _ctx: &EvaluationContext) -> bool {
        let now = Utc::now();
        settings.start.is_none_or(|start| start <= now)
            && settings.end.is_none_or(|end| now < end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ctx(key: &str) -> EvaluationContext {
        EvaluationContext::new("Rollout").with_targeting_key(key)
    }

    #[test]
    fn percentage_zero_never_passes() {
        let settings = PercentageFilterSettings { value: 0.0 };
        for i in 0..200 {
            assert!(!PercentageFilter.evaluate(&settings, &ctx(&format!("user-{i}"))));
        }
        assert!(!PercentageFilter.evaluate(&settings, &EvaluationContext::new("Rollout")));
    }

    #[test]
    fn percentage_hundred_always_passes() {
        let settings = PercentageFilterSettings { value: 100.0 };
        for i in 0..200 {
            assert!(PercentageFilter.evaluate(&settings, &ctx(&format!("user-{i}"))));
        }
        assert!(PercentageFilter.evaluate(&settings, &EvaluationContext::new("Rollout")));
    }

    #[test]
    fn percentage_is_deterministic_per_key() {
        let settings = PercentageFilterSettings { value: 50.0 };
        for i in 0..50 {
            let context = ctx(&format!("user-{i}"));
            let first = PercentageFilter.evaluate(&settings, &context);
            for _ in 0..10 {
                assert_eq!(PercentageFilter.evaluate(&settings, &context), first);
            }
        }
    }

    #[test]
    fn percentage_fifty_splits_roughly_in_half() {
        let settings = PercentageFilterSettings { value: 50.0 };
        let passed = (0..1000)
            .filter(|i| PercentageFilter.evaluate(&settings, &ctx(&format!("user-{i}"))))
            .count();
        assert!((350..=650).contains(&passed), "passed {passed} of 1000");
    }

    #[test]
    fn percentage_without_key_respects_extremes() {
        let never = PercentageFilterSettings { value: 0.0 };
        let always = PercentageFilterSettings { value: 100.0 };
        let anonymous = EvaluationContext::new("Rollout");
        for _ in 0..100 {
            assert!(!PercentageFilter.evaluate(&never, &anonymous));
            assert!(PercentageFilter.evaluate(&always, &anonymous));
        }
    }

    #[test]
    fn percentage_settings_accept_both_key_casings() {
        let settings: PercentageFilterSettings =
            serde_json::from_str(r#"{"Value":50.0}"#).expect("parse");
        assert!((settings.value - 50.0).abs() < f64::EPSILON);

        let settings: PercentageFilterSettings =
            serde_json::from_str(r#"{"value":50.0}"#).expect("parse");
        assert!((settings.value - 50.0).abs() < f64::EPSILON);

        assert!(serde_json::from_str::<PercentageFilterSettings>(r#"{"Seed":1}"#).is_err());
    }

    #[test]
    fn time_window_open_bounds_pass() {
        let settings = TimeWindowFilterSettings { start: None, end: None };
        assert!(TimeWindowFilter.evaluate(&settings, &EvaluationContext::new("Window")));
    }

    #[test]
    fn time_window_within_bounds_passes() {
        let now = Utc::now();
        let settings = TimeWindowFilterSettings {
            start: Some(now - Duration::hours(1)),
            end: Some(now + Duration::hours(1)),
        };
        assert!(TimeWindowFilter.evaluate(&settings, &EvaluationContext::new("Window")));
    }

    #[test]
    fn time_window_before_start_fails() {
        let settings = TimeWindowFilterSettings {
            start: Some(Utc::now() + Duration::hours(1)),
            end: None,
        };
        assert!(!TimeWindowFilter.evaluate(&settings, &EvaluationContext::new("Window")));
    }

    #[test]
    fn time_window_after_end_fails() {
        let settings = TimeWindowFilterSettings {
            start: None,
            end: Some(Utc::now() - Duration::hours(1)),
        };
        assert!(!TimeWindowFilter.evaluate(&settings, &EvaluationContext::new("Window")));
    }
}
