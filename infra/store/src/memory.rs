use crate::error::StoreError;
use crate::{FlagStore, FlagUpdate};
use async_trait::async_trait;
use chrono::Utc;
use fhub_domain::flags::{FeatureFlag, MAX_FLAG_NAME_LEN};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// In-memory [`FlagStore`] backend.
///
/// Definitions live in a map guarded by a [`parking_lot::RwLock`]; the handle
/// is internally reference-counted and cheap to clone across request
/// handlers. Lock hold times are bounded to the map operation itself, so the
/// async contract never blocks meaningfully.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    flags: Arc<RwLock<FxHashMap<String, FeatureFlag>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored flags (diagnostics only).
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.read().is_empty()
    }

    fn validate_name(name: &str) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::Validation {
                message: "Flag name cannot be empty".into(),
                context: None,
            });
        }
        if name.len() > MAX_FLAG_NAME_LEN {
            return Err(StoreError::Validation {
                message: format!("Flag name exceeds {MAX_FLAG_NAME_LEN} characters").into(),
                context: Some(format!("len={}", name.len()).into()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FlagStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<FeatureFlag>, StoreError> {
        let flags = self.flags.read();
        let mut all: Vec<FeatureFlag> = flags.values().cloned().collect();
        // Map iteration order is arbitrary; keep listings stable for callers.
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<FeatureFlag>, StoreError> {
        Ok(self.flags.read().get(name).cloned())
    }

    async fn create(&self, flag: FeatureFlag) -> Result<FeatureFlag, StoreError> {
        Self::validate_name(&flag.name)?;

        let mut flags = self.flags.write();
        if flags.contains_key(&flag.name) {
            return Err(StoreError::conflict(&flag.name));
        }
        debug!(flag = %flag.name, is_enabled = flag.is_enabled, "Flag created");
        flags.insert(flag.name.clone(), flag.clone());
        Ok(flag)
    }

    async fn replace(&self, name: &str, update: FlagUpdate) -> Result<FeatureFlag, StoreError> {
        let mut flags = self.flags.write();
        let flag = flags.get_mut(name).ok_or_else(|| StoreError::not_found(name))?;

        flag.is_enabled = update.is_enabled;
        flag.description = update.description;
        flag.filters = update.filters;
        flag.updated_at = Utc::now();

        debug!(flag = %name, is_enabled = flag.is_enabled, "Flag replaced");
        Ok(flag.clone())
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let mut flags = self.flags.write();
        if flags.remove(name).is_none() {
            return Err(StoreError::not_found(name));
        }
        debug!(flag = %name, "Flag deleted");
        Ok(())
    }
}
