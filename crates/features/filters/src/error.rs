use std::borrow::Cow;

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

/// Errors raised by the filter registry.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// Default settings could not be serialized at registration time.
    #[error("Invalid filter settings{}: {message}", format_context(.context))]
    InvalidSettings { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Stored parameters do not match the filter's settings shape.
    #[error("Invalid filter parameters{}: {message}", format_context(.context))]
    InvalidParameters { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
