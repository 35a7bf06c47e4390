use fhub_domain::flags::FilterRequirement;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Process-lifetime set of flags owned by the embedding application.
///
/// Registration is add-once, first-writer-wins; entries are never removed.
/// The validation pipeline consults this set to enforce required filters on
/// managed names.
#[derive(Debug, Clone, Default)]
pub struct ManagedFeatureRegistration {
    inner: Arc<RwLock<FxHashMap<String, Option<FilterRequirement>>>>,
}

impl ManagedFeatureRegistration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a managed name; returns `false` (and changes nothing) when
    /// the name is already registered.
    pub fn try_register(&self, name: &str, requirement: Option<FilterRequirement>) -> bool {
        let mut inner = self.inner.write();
        if inner.contains_key(name) {
            return false;
        }
        debug!(feature = name, required = requirement.is_some(), "Managed feature registered");
        inner.insert(name.to_owned(), requirement);
        true
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.read().contains_key(name)
    }

    /// Looks up the required filter for a managed name. Outer `None` means
    /// the name was never registered; inner `None` means it is managed but
    /// carries no filter requirement.
    #[must_use]
    pub fn requirement(&self, name: &str) -> Option<Option<FilterRequirement>> {
        self.inner.read().get(name).cloned()
    }
}
