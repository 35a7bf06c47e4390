use fhub_store::StoreError;
use std::borrow::Cow;

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

/// Errors surfaced by dashboard and evaluation operations.
#[derive(Debug, thiserror::Error)]
pub enum FlagsError {
    /// The named flag does not exist.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A flag with the same name already exists.
    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The change validation pipeline cancelled the request; `message` is the
    /// human-readable cancellation served to the caller.
    #[error("{message}")]
    ValidationRejected { message: String },

    /// The backing store failed for a reason other than not-found/conflict.
    #[error(transparent)]
    Store(StoreError),

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl FlagsError {
    pub(crate) fn not_found(name: &str) -> Self {
        Self::NotFound { message: format!("Feature '{name}' not found.").into(), context: None }
    }

    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Self::ValidationRejected { message: message.into() }
    }

    pub(crate) fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

/// Store not-found/conflict outcomes are domain results here, not backend
/// failures; everything else stays a store error.
impl From<StoreError> for FlagsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { message, context } => Self::NotFound { message, context },
            StoreError::Conflict { message, context } => Self::Conflict { message, context },
            other => Self::Store(other),
        }
    }
}
