use crate::error::FilterError;
use crate::{EvaluationContext, FeatureFilter};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

type EvaluateFn = Arc<dyn Fn(&str, &EvaluationContext) -> bool + Send + Sync>;
type ValidateFn = Arc<dyn Fn(&str) -> Result<(), FilterError> + Send + Sync>;

/// Public metadata of a registered filter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRegistration {
    /// Public alias used in bindings and API payloads.
    pub name: String,
    /// Short name of the settings shape (for validation messages).
    pub settings_shape: String,
    /// Default parameters, serialized eagerly at registration time.
    pub default_settings_json: String,
}

struct RegistryEntry {
    registration: FilterRegistration,
    evaluate: EvaluateFn,
    validate: ValidateFn,
}

#[derive(Default)]
struct RegistryInner {
    /// Type identity -> alias; makes re-registration of a type a no-op.
    by_type: FxHashMap<TypeId, String>,
    by_name: FxHashMap<String, RegistryEntry>,
}

/// In-memory catalog of filter types available for binding to flags.
///
/// Registrations happen sequentially at boot and are immutable afterwards;
/// the handle is cheaply clonable and safe for concurrent lookups from
/// request handlers. A racing registration follows first-write-wins.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("FilterRegistry").field("filters", &inner.by_name.keys()).finish()
    }
}

impl FilterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a filter type under [`FeatureFilter::NAME`].
    ///
    /// Idempotent per type identity: registering the same filter type twice
    /// is a no-op (first registration wins). An alias collision between two
    /// different types is also resolved first-wins, with a warning.
    ///
    /// # Errors
    /// Returns [`FilterError::InvalidSettings`] if `default_settings` cannot
    /// be serialized to JSON.
    pub fn register<F: FeatureFilter>(
        &self,
        filter: F,
        default_settings: F::Settings,
    ) -> Result<(), FilterError> {
        let default_settings_json =
            serde_json::to_string(&default_settings).map_err(|e| FilterError::InvalidSettings {
                message: e.to_string().into(),
                context: Some(F::NAME.into()),
            })?;

        let registration = FilterRegistration {
            name: F::NAME.to_owned(),
            settings_shape: settings_shape_name::<F>(),
            default_settings_json,
        };

        let filter = Arc::new(filter);
        let evaluate: EvaluateFn = {
            let filter = Arc::clone(&filter);
            Arc::new(move |parameters, ctx| match serde_json::from_str::<F::Settings>(parameters) {
                Ok(settings) => filter.evaluate(&settings, ctx),
                Err(e) => {
                    // Fail closed: a binding whose parameters no longer parse
                    // must never re-enable a flag.
                    debug!(filter = F::NAME, error = %e, "Filter parameters failed to parse");
                    false
                },
            })
        };
        let validate: ValidateFn = {
            let shape = registration.settings_shape.clone();
            Arc::new(move |parameters| validate_parameters::<F>(parameters, &shape))
        };

        let mut inner = self.inner.write();
        if inner.by_type.contains_key(&TypeId::of::<F>()) {
            debug!(filter = F::NAME, "Filter type already registered, skipping");
            return Ok(());
        }
        if inner.by_name.contains_key(F::NAME) {
            warn!(filter = F::NAME, "Filter alias already taken by another type, skipping");
            return Ok(());
        }

        debug!(filter = F::NAME, shape = %registration.settings_shape, "Filter registered");
        inner.by_type.insert(TypeId::of::<F>(), F::NAME.to_owned());
        inner
            .by_name
            .insert(F::NAME.to_owned(), RegistryEntry { registration, evaluate, validate });
        Ok(())
    }

    /// Returns a snapshot of every registration; order is not significant.
    #[must_use]
    pub fn list_all(&self) -> Vec<FilterRegistration> {
        self.inner.read().by_name.values().map(|entry| entry.registration.clone()).collect()
    }

    /// Exact, case-sensitive lookup by public alias.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<FilterRegistration> {
        self.inner.read().by_name.get(name).map(|entry| entry.registration.clone())
    }

    /// Evaluates one filter binding; `None` when the type is not registered
    /// (the engine treats that as a failing filter).
    #[must_use]
    pub fn evaluate(&self, name: &str, parameters: &str, ctx: &EvaluationContext) -> Option<bool> {
        let evaluate = {
            let inner = self.inner.read();
            Arc::clone(&inner.by_name.get(name)?.evaluate)
        };
        Some(evaluate(parameters, ctx))
    }

    /// Strictly validates parameters against the filter's settings shape;
    /// `None` when the type is not registered (unregistered types are left
    /// to fail-closed evaluation instead).
    #[must_use]
    pub fn validate_parameters(&self, name: &str, parameters: &str) -> Option<Result<(), FilterError>> {
        let validate = {
            let inner = self.inner.read();
            Arc::clone(&inner.by_name.get(name)?.validate)
        };
        Some(validate(parameters))
    }
}

/// Closed-schema check: parameters must be a JSON object and must parse into
/// the typed settings shape. Settings types carry `deny_unknown_fields`, so
/// stray fields are rejected by the typed parse.
fn validate_parameters<F: FeatureFilter>(parameters: &str, shape: &str) -> Result<(), FilterError> {
    let value: Value =
        serde_json::from_str(parameters).map_err(|e| FilterError::InvalidParameters {
            message: e.to_string().into(),
            context: Some(shape.to_owned().into()),
        })?;

    if !value.is_object() {
        return Err(FilterError::InvalidParameters {
            message: "Parameters must be a JSON object".into(),
            context: Some(shape.to_owned().into()),
        });
    }

    serde_json::from_value::<F::Settings>(value).map_err(|e| FilterError::InvalidParameters {
        message: e.to_string().into(),
        context: Some(shape.to_owned().into()),
    })?;
    Ok(())
}

/// Last path segment of the settings type name, e.g. `PercentageFilterSettings`.
fn settings_shape_name<F: FeatureFilter>() -> String {
    let full = std::any::type_name::<F::Settings>();
    full.rsplit("::").next().unwrap_or(full).to_owned()
}
