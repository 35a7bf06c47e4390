use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hard ceiling for flag names; the store rejects anything longer.
pub const MAX_FLAG_NAME_LEN: usize = 256;

/// A stored feature flag definition.
///
/// The name is the flag's identity and is unique across the store. Filters
/// are exclusively owned by the flag and are replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub name: String,
    pub is_enabled: bool,
    pub description: Option<String>,
    pub filters: Vec<FilterBinding>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeatureFlag {
    /// Creates a new flag with both timestamps set to now.
    #[must_use]
    pub fn new(name: impl Into<String>, is_enabled: bool, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            is_enabled,
            description,
            filters: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a filter binding, builder-style.
    #[must_use]
    pub fn with_filter(mut self, binding: FilterBinding) -> Self {
        self.filters.push(binding);
        self
    }
}

/// A filter attached to a flag: the public filter type name plus an opaque
/// JSON parameter blob interpreted by that filter's settings shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct FilterBinding {
    pub filter_type: String,
    pub parameters: Option<String>,
}

impl FilterBinding {
    #[must_use]
    pub fn new(filter_type: impl Into<String>, parameters: Option<String>) -> Self {
        Self { filter_type: filter_type.into(), parameters }
    }
}

/// Wire representation of a flag as served by the dashboard API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct FeatureFlagDto {
    pub name: String,
    pub is_enabled: bool,
    pub description: Option<String>,
    pub filters: Option<Vec<FilterBinding>>,
}

impl From<&FeatureFlag> for FeatureFlagDto {
    fn from(flag: &FeatureFlag) -> Self {
        Self {
            name: flag.name.clone(),
            is_enabled: flag.is_enabled,
            description: flag.description.clone(),
            filters: Some(flag.filters.clone()),
        }
    }
}

/// Wire representation of a registered filter type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct FilterDto {
    pub name: String,
    pub default_settings: Option<String>,
}

/// The kind of change flowing through the validation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureChangeType {
    Create,
    Update,
    Delete,
}

/// Filter a managed flag is required to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRequirement {
    /// Public alias of the required filter type.
    pub type_name: String,
    /// Default parameters, pre-serialized to JSON.
    pub default_settings_json: String,
}

/// Startup declaration of a managed flag.
///
/// Managed flags are provisioned by the embedding application, as opposed to
/// ad-hoc flags created through the admin API; their required filter (if any)
/// is enforced by the validation pipeline for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedFeature {
    pub name: String,
    pub description: String,
    pub is_enabled: bool,
    pub filter: Option<FilterRequirement>,
}

impl ManagedFeature {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, is_enabled: bool) -> Self {
        Self { name: name.into(), description: description.into(), is_enabled, filter: None }
    }

    /// Attaches the required filter for this managed flag.
    #[must_use]
    pub fn with_filter(mut self, requirement: FilterRequirement) -> Self {
        self.filter = Some(requirement);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dto_from_flag_carries_filters() {
        let flag = FeatureFlag::new("Checkout", true, Some("new checkout".to_owned()))
            .with_filter(FilterBinding::new("Percentage", Some(r#"{"value":50}"#.to_owned())));

        let dto = FeatureFlagDto::from(&flag);
        assert_eq!(dto.name, "Checkout");
        assert!(dto.is_enabled);
        assert_eq!(dto.filters.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn flag_dto_round_trips_through_json() {
        let dto = FeatureFlagDto {
            name: "Beta".to_owned(),
            is_enabled: false,
            description: None,
            filters: None,
        };
        let raw = serde_json::to_string(&dto).expect("serialize");
        let back: FeatureFlagDto = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(back, dto);
    }
}
