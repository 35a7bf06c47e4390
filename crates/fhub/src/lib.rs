//! Facade crate for `FlagHub` features and shared modules.
//! Re-exports domain/kernel primitives and composes the feature-management
//! dashboard. Keep this crate thin: it should compose other crates, not
//! implement business logic.
//!
//! ## Usage
//! - Add `fhub` with the `server` feature for the HTTP surface.
//! - Call [`init`] to build a [`Dashboard`] over a store and reconcile it
//!   against the configured startup options.

pub use fhub_domain as domain;
pub use fhub_filters as filters;
pub use fhub_flags as flags;
pub use fhub_kernel as kernel;
pub use fhub_store as store;

pub use fhub_flags::{Dashboard, DashboardBuilder};

use fhub_domain::config::ApiConfig;
use fhub_flags::FlagsError;
use fhub_store::FlagStore;
use std::sync::Arc;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use fhub_flags::api::{dashboard_router, evaluation_router};
        pub use fhub_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        "flags",
        "filters",
        #[cfg(feature = "server")]
        "server",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Builds the dashboard over the given store and applies the configured
/// startup reconciliation script.
///
/// # Errors
/// Returns an error if filter registration or the reconciliation fails.
pub async fn init(config: &ApiConfig, store: Arc<dyn FlagStore>) -> Result<Dashboard, FlagsError> {
    let dashboard = DashboardBuilder::new(store)?.build();
    dashboard.apply_options(&config.dashboard).await?;
    Ok(dashboard)
}
