//! # Flag Store
//!
//! The durable home of feature flag definitions, expressed as an object-safe
//! async contract so the rest of the workspace never depends on a concrete
//! persistence engine. The crate ships an in-memory backend suitable for
//! single-node deployments and tests; external backends implement
//! [`FlagStore`] and plug into the same seam.
//!
//! Writes are whole-record: `replace` swaps enabled state, description, and
//! the filter set in one step. The store owns no evaluation or validation
//! logic.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::MemoryStore;

use async_trait::async_trait;
use fhub_domain::flags::{FeatureFlag, FilterBinding};

/// Whole-record update applied by [`FlagStore::replace`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagUpdate {
    pub is_enabled: bool,
    pub description: Option<String>,
    pub filters: Vec<FilterBinding>,
}

/// Async contract for flag definition storage.
///
/// All operations are suspension points; cancellation propagates from the
/// caller's request lifetime. Implementations must be safe for concurrent
/// use from request handlers.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Returns every stored flag.
    async fn get_all(&self) -> Result<Vec<FeatureFlag>, StoreError>;

    /// Returns the flag with the given name, if present.
    async fn get_by_name(&self, name: &str) -> Result<Option<FeatureFlag>, StoreError>;

    /// Creates a new flag.
    ///
    /// # Errors
    /// * [`StoreError::Conflict`] if the name already exists.
    /// * [`StoreError::Validation`] if the name is empty or too long.
    async fn create(&self, flag: FeatureFlag) -> Result<FeatureFlag, StoreError>;

    /// Replaces the mutable state of an existing flag wholesale and bumps
    /// `updated_at`.
    ///
    /// # Errors
    /// * [`StoreError::NotFound`] if the name does not exist.
    async fn replace(&self, name: &str, update: FlagUpdate) -> Result<FeatureFlag, StoreError>;

    /// Deletes a flag and its filter bindings.
    ///
    /// # Errors
    /// * [`StoreError::NotFound`] if the name does not exist.
    async fn delete(&self, name: &str) -> Result<(), StoreError>;
}
