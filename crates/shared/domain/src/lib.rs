//! Pure domain models shared across the workspace.
//! Keep this crate free of business logic; slices own the behavior.

pub mod config;
pub mod flags;
pub mod options;
