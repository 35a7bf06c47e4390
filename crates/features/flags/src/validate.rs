use crate::managed::ManagedFeatureRegistration;
use fhub_domain::flags::{FeatureChangeType, FeatureFlagDto, FilterBinding};
use fhub_filters::FilterRegistry;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Outcome of [`ChangeValidation::can_proceed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub cancel: bool,
    pub message: String,
}

impl Verdict {
    /// The change may go through.
    #[must_use]
    pub fn proceed() -> Self {
        Self::default()
    }

    /// The change is cancelled with the given caller-facing message.
    #[must_use]
    pub fn cancel(message: impl Into<String>) -> Self {
        Self { cancel: true, message: message.into() }
    }
}

/// Application-supplied veto hook, consulted after the built-in checks.
pub type FeatureChangingHook =
    dyn Fn(&FeatureFlagDto, FeatureChangeType) -> Verdict + Send + Sync;

/// Gatekeeper in front of every store write.
///
/// Checks run in fixed order and the first cancellation wins:
/// 1. deletes skip straight to the custom hook,
/// 2. managed names must keep exactly one binding of their required filter,
/// 3. every binding of a registered type must carry parameters matching the
///    filter's closed settings shape,
/// 4. the custom hook (absent hook never cancels).
#[derive(Clone)]
pub struct ChangeValidation {
    registry: FilterRegistry,
    managed: ManagedFeatureRegistration,
    custom: Arc<RwLock<Option<Box<FeatureChangingHook>>>>,
}

impl fmt::Debug for ChangeValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeValidation")
            .field("registry", &self.registry)
            .field("managed", &self.managed)
            .field("custom", &self.custom.read().is_some())
            .finish()
    }
}

impl ChangeValidation {
    #[must_use]
    pub fn new(registry: FilterRegistry, managed: ManagedFeatureRegistration) -> Self {
        Self { registry, managed, custom: Arc::new(RwLock::new(None)) }
    }

    /// Installs the custom veto hook; the last installation wins.
    pub fn set_custom<F>(&self, hook: F)
    where
        F: Fn(&FeatureFlagDto, FeatureChangeType) -> Verdict + Send + Sync + 'static,
    {
        *self.custom.write() = Some(Box::new(hook));
    }

    /// Runs the pipeline for one requested change.
    #[must_use]
    pub fn can_proceed(&self, dto: &FeatureFlagDto, change: FeatureChangeType) -> Verdict {
        if change != FeatureChangeType::Delete {
            let verdict = self.check_managed_requirement(dto);
            if verdict.cancel {
                return verdict;
            }
            let verdict = self.check_filter_parameters(dto);
            if verdict.cancel {
                return verdict;
            }
        }
        self.run_custom(dto, change)
    }

    /// A managed name with a required filter must carry exactly one binding
    /// of that type.
    fn check_managed_requirement(&self, dto: &FeatureFlagDto) -> Verdict {
        let Some(Some(requirement)) = self.managed.requirement(&dto.name) else {
            return Verdict::proceed();
        };
        let count = bindings(dto)
            .iter()
            .filter(|binding| binding.filter_type == requirement.type_name)
            .count();
        if count == 1 {
            Verdict::proceed()
        } else {
            debug!(feature = %dto.name, required = %requirement.type_name, "Required filter missing");
            Verdict::cancel(format!("{} must have a {} filter.", dto.name, requirement.type_name))
        }
    }

    /// Strict schema check for every binding whose type is registered; types
    /// the registry does not know are left to fail closed at evaluation.
    fn check_filter_parameters(&self, dto: &FeatureFlagDto) -> Verdict {
        for binding in bindings(dto) {
            let parameters = binding.parameters.as_deref().unwrap_or("{}");
            let Some(result) = self.registry.validate_parameters(&binding.filter_type, parameters)
            else {
                continue;
            };
            if let Err(error) = result {
                debug!(feature = %dto.name, filter = %binding.filter_type, %error, "Filter parameters rejected");
                let shape = self
                    .registry
                    .find_by_name(&binding.filter_type)
                    .map_or_else(|| binding.filter_type.clone(), |r| r.settings_shape);
                return Verdict::cancel(format!(
                    "{} filter parameters are not valid JSON for {shape}.",
                    dto.name
                ));
            }
        }
        Verdict::proceed()
    }

    fn run_custom(&self, dto: &FeatureFlagDto, change: FeatureChangeType) -> Verdict {
        self.custom.read().as_ref().map_or_else(Verdict::proceed, |hook| hook(dto, change))
    }
}

fn bindings(dto: &FeatureFlagDto) -> &[FilterBinding] {
    dto.filters.as_deref().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhub_domain::flags::FilterRequirement;
    use fhub_filters::builtin::{PercentageFilter, PercentageFilterSettings};

    fn pipeline() -> ChangeValidation {
        let registry = FilterRegistry::new();
        registry
            .register(PercentageFilter, PercentageFilterSettings { value: 50.0 })
            .expect("register");
        let managed = ManagedFeatureRegistration::new();
        managed.try_register(
            "Beta",
            Some(FilterRequirement {
                type_name: "Percentage".to_owned(),
                default_settings_json: r#"{"Value":50.0}"#.to_owned(),
            }),
        );
        ChangeValidation::new(registry, managed)
    }

    fn dto(name: &str, filters: Option<Vec<FilterBinding>>) -> FeatureFlagDto {
        FeatureFlagDto { name: name.to_owned(), is_enabled: true, description: None, filters }
    }

    #[test]
    fn managed_name_without_required_filter_cancels() {
        let pipeline = pipeline();
        let verdict = pipeline.can_proceed(&dto("Beta", None), FeatureChangeType::Update);
        assert!(verdict.cancel);
        assert_eq!(verdict.message, "Beta must have a Percentage filter.");
    }

    #[test]
    fn managed_name_with_duplicate_required_filter_cancels() {
        let pipeline = pipeline();
        let binding = FilterBinding::new("Percentage", Some(r#"{"Value":10.0}"#.to_owned()));
        let verdict = pipeline.can_proceed(
            &dto("Beta", Some(vec![binding.clone(), binding])),
            FeatureChangeType::Update,
        );
        assert!(verdict.cancel);
    }

    #[test]
    fn managed_name_with_required_filter_proceeds() {
        let pipeline = pipeline();
        let binding = FilterBinding::new("Percentage", Some(r#"{"Value":10.0}"#.to_owned()));
        let verdict =
            pipeline.can_proceed(&dto("Beta", Some(vec![binding])), FeatureChangeType::Create);
        assert!(!verdict.cancel);
    }

    #[test]
    fn malformed_parameters_cancel_with_shape_name() {
        let pipeline = pipeline();
        let binding = FilterBinding::new("Percentage", Some(r#"{"Value":"ten"}"#.to_owned()));
        let verdict =
            pipeline.can_proceed(&dto("Rollout", Some(vec![binding])), FeatureChangeType::Create);
        assert!(verdict.cancel);
        assert_eq!(
            verdict.message,
            "Rollout filter parameters are not valid JSON for PercentageFilterSettings."
        );
    }

    #[test]
    fn unknown_fields_cancel() {
        let pipeline = pipeline();
        let binding =
            FilterBinding::new("Percentage", Some(r#"{"Value":10.0,"Seed":1}"#.to_owned()));
        let verdict =
            pipeline.can_proceed(&dto("Rollout", Some(vec![binding])), FeatureChangeType::Create);
        assert!(verdict.cancel);
    }

    #[test]
    fn unregistered_filter_types_skip_schema_check() {
        let pipeline = pipeline();
        let binding = FilterBinding::new("Geo", Some("not even json".to_owned()));
        let verdict =
            pipeline.can_proceed(&dto("Rollout", Some(vec![binding])), FeatureChangeType::Create);
        assert!(!verdict.cancel);
    }

    #[test]
    fn delete_skips_builtin_checks_but_runs_custom() {
        let pipeline = pipeline();
        pipeline.set_custom(|dto, change| {
            if change == FeatureChangeType::Delete && dto.name == "MyFlag" {
                Verdict::cancel("MyFlag can not be updated!")
            } else {
                Verdict::proceed()
            }
        });

        // Managed "Beta" delete passes the built-ins it would otherwise fail.
        let verdict = pipeline.can_proceed(&dto("Beta", None), FeatureChangeType::Delete);
        assert!(!verdict.cancel);

        let verdict = pipeline.can_proceed(&dto("MyFlag", None), FeatureChangeType::Delete);
        assert!(verdict.cancel);
        assert_eq!(verdict.message, "MyFlag can not be updated!");
    }

    #[test]
    fn last_custom_hook_wins() {
        let pipeline = pipeline();
        pipeline.set_custom(|_, _| Verdict::cancel("first"));
        pipeline.set_custom(|_, _| Verdict::proceed());
        let verdict = pipeline.can_proceed(&dto("Anything", None), FeatureChangeType::Create);
        assert!(!verdict.cancel);
    }
}
