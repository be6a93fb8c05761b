//! Error types for locale store operations

use crate::Locale;
use thiserror::Error;

/// Boxed error raised by a fallible toggle hook.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building a store or switching locales.
///
/// Reads never fail: an unmounted scope, a missing key or a locale absent
/// from the table all read as `None`.
#[derive(Debug, Error)]
pub enum LocaleError {
    /// Locale token was empty or whitespace
    #[error("Invalid locale: {0:?}")]
    InvalidLocale(String),

    /// Locale has no bundle in the message table
    #[error("No message bundle for locale: {0}")]
    UnknownLocale(Locale),

    /// Message table has no locales
    #[error("Message table is empty")]
    EmptyTable,

    /// Message table JSON had the wrong shape
    #[error("Failed to parse message table: {0}")]
    ParseError(String),

    /// JSON parse error
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The toggle hook failed; the locale was left unchanged
    #[error("Toggle hook failed: {0}")]
    Hook(#[source] BoxError),

    /// The scope behind a toggle handle has been unmounted
    #[error("Locale scope is no longer mounted")]
    ScopeUnmounted,
}
