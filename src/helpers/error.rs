//! Helpers related to generation of error messages.

/// Returns an iterator over an [`Error`] and all its [`source`]s, outermost first.
///
/// [`Error`]: std::error::Error
/// [`source`]: std::error::Error::source
pub fn error_chain<'a>(
    error: &'a (dyn std::error::Error + 'static),
) -> impl Iterator<Item = &'a (dyn std::error::Error + 'static)> {
    std::iter::successors(Some(error), |current| current.source())
}

/// Generates a recursive error message for an [`Error`].
///
/// The first line is the [`Error`]'s [`Display`] output; each following line contains one of its
/// [`source`]s (see [`error_chain`]), prefixed by `caused by: `.
///
/// If backtrace support is available (see [`backtrace_message`]), the error's
/// [`Backtrace`](std::backtrace::Backtrace) is appended as well.
///
/// [`Error`]: std::error::Error
/// [`source`]: std::error::Error::source
/// [`Display`]: std::fmt::Display
#[cfg(not(tarpaulin_include))]
pub fn recursive_error_message<E>(error: &E) -> String
where
    E: std::error::Error + 'static,
{
    let mut message = error_chain(error)
        .map(|err| err.to_string())
        .collect::<Vec<_>>()
        .join("\ncaused by: ");

    if let Some(backtrace_msg) = backtrace_message(error) {
        message += &format!("\n\nBacktrace: {}", backtrace_msg);
    }

    message
}

/// Attempts to get backtrace information for an [`Error`].
///
/// This function currently requires a `Nightly` Rust version. It is tied to the `backtrace_support`
/// config, which is set by the build script.
///
/// [`Error`]: std::error::Error
#[cfg(not(tarpaulin_include))]
#[cfg(backtrace_support)]
pub fn backtrace_message<E>(error: &E) -> Option<String>
where
    E: std::error::Error,
{
    std::error::request_ref::<std::backtrace::Backtrace>(error)
        .map(|backtrace| format!("{:#}", backtrace))
}

#[cfg(not(tarpaulin_include))]
#[cfg(not(backtrace_support))]
#[doc(hidden)]
pub fn backtrace_message<E>(_error: &E) -> Option<String>
where
    E: std::error::Error,
{
    None
}
