use std::borrow::Cow;

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

/// Errors surfaced by a [`FlagStore`](crate::FlagStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The named flag does not exist.
    #[error("Flag not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A flag with the same name already exists.
    #[error("Flag already exists{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The record violates a store invariant (e.g. name length).
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The backend is unreachable or failed mid-operation. Propagated to the
    /// caller untouched; retry policy belongs to the backend itself.
    #[error("Store unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal store error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl StoreError {
    /// Convenience constructor for the common not-found case.
    #[must_use]
    pub fn not_found(name: &str) -> Self {
        Self::NotFound { message: Cow::Owned(format!("Feature '{name}' not found.")), context: None }
    }

    /// Convenience constructor for the duplicate-name case.
    #[must_use]
    pub fn conflict(name: &str) -> Self {
        Self::Conflict {
            message: Cow::Owned(format!("Feature '{name}' already exists.")),
            context: None,
        }
    }
}
