use crate::error::FlagsError;
use fhub_filters::{EvaluationContext, FilterRegistry};
use fhub_store::FlagStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Answers "is this flag on?" for any name, known or not.
///
/// The verdict function is total: unknown names, disabled flags, and filter
/// bindings whose type is not registered all yield `false` instead of an
/// error. The only failure path is the store itself becoming unavailable.
#[derive(Clone)]
pub struct FeatureEvaluator {
    store: Arc<dyn FlagStore>,
    registry: FilterRegistry,
}

impl fmt::Debug for FeatureEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureEvaluator").field("registry", &self.registry).finish_non_exhaustive()
    }
}

impl FeatureEvaluator {
    #[must_use]
    pub fn new(store: Arc<dyn FlagStore>, registry: FilterRegistry) -> Self {
        Self { store, registry }
    }

    /// Evaluates a flag without a targeting key.
    ///
    /// # Errors
    /// Only when the store itself fails; absence of the flag is `Ok(false)`.
    pub async fn is_enabled(&self, name: &str) -> Result<bool, FlagsError> {
        self.is_enabled_for(name, None).await
    }

    /// Evaluates a flag with an optional targeting key for deterministic
    /// bucketing filters.
    ///
    /// # Errors
    /// Only when the store itself fails; absence of the flag is `Ok(false)`.
    pub async fn is_enabled_for(
        &self,
        name: &str,
        targeting_key: Option<&str>,
    ) -> Result<bool, FlagsError> {
        let Some(flag) = self.store.get_by_name(name).await? else {
            trace!(feature = name, "Unknown feature evaluated as disabled");
            return Ok(false);
        };
        if !flag.is_enabled {
            return Ok(false);
        }
        if flag.filters.is_empty() {
            return Ok(true);
        }

        let mut ctx = EvaluationContext::new(name);
        if let Some(key) = targeting_key {
            ctx = ctx.with_targeting_key(key);
        }

        // Conjunction over stored order, short-circuiting on first failure.
        for binding in &flag.filters {
            let parameters = binding.parameters.as_deref().unwrap_or("{}");
            match self.registry.evaluate(&binding.filter_type, parameters, &ctx) {
                Some(true) => {},
                Some(false) => return Ok(false),
                None => {
                    debug!(
                        feature = name,
                        filter = %binding.filter_type,
                        "Filter type not registered, treating as failed"
                    );
                    return Ok(false);
                },
            }
        }
        Ok(true)
    }
}
