//! # Feature Flag Management
//!
//! The management layer on top of [`fhub_store`] and [`fhub_filters`]: a
//! total evaluation engine, a change-validation pipeline in front of every
//! write, managed-flag registration, and declarative startup reconciliation,
//! all composed behind the [`Dashboard`] handle.
//!
//! Typical wiring:
//!
//! ```
//! # use std::sync::Arc;
//! # use fhub_store::MemoryStore;
//! # use fhub_flags::DashboardBuilder;
//! # fn demo() -> Result<(), fhub_flags::FlagsError> {
//! let dashboard = DashboardBuilder::new(Arc::new(MemoryStore::new()))?.build();
//! # Ok(())
//! # }
//! ```
//!
//! The optional `api` feature exposes the axum routers for the dashboard and
//! public evaluation endpoints.

#[cfg(feature = "api")]
pub mod api;
mod dashboard;
mod error;
mod evaluate;
mod managed;
mod validate;

pub use dashboard::{Dashboard, DashboardBuilder};
pub use error::FlagsError;
pub use evaluate::FeatureEvaluator;
pub use managed::ManagedFeatureRegistration;
pub use validate::{ChangeValidation, FeatureChangingHook, Verdict};
