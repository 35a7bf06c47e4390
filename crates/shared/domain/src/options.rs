use crate::flags::FilterBinding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declarative reconciliation script applied to the flag store at startup.
///
/// Operations run in a fixed order — `delete`, then `add_if_missing`, then
/// `add_or_update` — so that re-applying the same options payload is
/// idempotent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardOptions {
    /// Flag names to remove; absent names are ignored.
    pub delete: Vec<String>,
    /// Seeds created only when the name does not exist yet.
    pub add_if_missing: BTreeMap<String, FeatureSeed>,
    /// Seeds applied unconditionally (upsert, full-replace semantics).
    pub add_or_update: BTreeMap<String, FeatureSeed>,
}

impl DashboardOptions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.add_if_missing.is_empty() && self.add_or_update.is_empty()
    }
}

/// Desired state for a single flag inside a [`DashboardOptions`] script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSeed {
    pub is_enabled: bool,
    pub description: Option<String>,
    /// At most one filter by reconciliation policy.
    pub filter: Option<FilterBinding>,
}
