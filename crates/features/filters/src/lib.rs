//! # Feature Filters
//!
//! Pluggable predicates that gate feature flag activation. A filter type is
//! any implementation of [`FeatureFilter`]: a public alias, a typed settings
//! shape, and a pure `evaluate` decision. Filter types are registered once at
//! startup into a [`Filter Registry`](registry::FilterRegistry), which hands
//! the rest of the system three things per type:
//!
//! 1. the registration metadata (alias + default settings JSON) served to the
//!    dashboard UI,
//! 2. a type-erased evaluate capability that parses stored parameter JSON and
//!    fails closed on malformed input,
//! 3. a strict parameter validator used by the change-validation pipeline
//!    (unknown JSON fields reject, missing required fields reject).
//!
//! The built-in [`PercentageFilter`](builtin::PercentageFilter) and
//! [`TimeWindowFilter`](builtin::TimeWindowFilter) live in [`builtin`]; any
//! crate can register its own filter without touching the evaluation engine.

mod error;
pub mod builtin;
pub mod registry;

pub use error::FilterError;
pub use registry::{FilterRegistration, FilterRegistry};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Per-evaluation inputs handed to each filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationContext {
    /// Name of the flag under evaluation.
    pub feature_name: String,
    /// Optional stable subject key; filters that bucket (e.g. percentage)
    /// use it for a deterministic draw, and fall back to randomness without it.
    pub targeting_key: Option<String>,
}

impl EvaluationContext {
    #[must_use]
    pub fn new(feature_name: impl Into<String>) -> Self {
        Self { feature_name: feature_name.into(), targeting_key: None }
    }

    #[must_use]
    pub fn with_targeting_key(mut self, key: impl Into<String>) -> Self {
        self.targeting_key = Some(key.into());
        self
    }
}

/// A filter type: alias, settings shape, and the pass/fail decision.
///
/// `Settings` doubles as the UI pre-fill value and the validation schema —
/// annotate it with `#[serde(deny_unknown_fields)]` so stored parameters are
/// matched against a closed shape.
pub trait FeatureFilter: Send + Sync + 'static {
    /// Public alias used in bindings and API payloads.
    const NAME: &'static str;

    /// Typed parameter shape for this filter.
    type Settings: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Decides whether this filter passes for one evaluation.
    ///
    /// Must be pure with respect to `settings` and `ctx`; the engine may
    /// short-circuit without calling it.
    fn evaluate(&self, settings: &Self::Settings, ctx: &EvaluationContext) -> bool;
}
