//! Kernel utilities shared across slices.
//! Keep this crate lightweight; it carries the layered config loader and,
//! behind the `server` feature, the system routes every service mounts.
//!
//! ## Config loading
//! ```rust,ignore
//! use fhub_kernel::config::load_config;
//! let cfg: serde_json::Value = load_config::<serde_json::Value>(Some("server")).unwrap();
//! ```

pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use fhub_domain as domain;
