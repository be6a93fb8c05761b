//! Locale identifiers
//!
//! A [`Locale`] is an opaque, comparable token selecting one message bundle.
//! It is conventionally a short language tag (`"en"`, `"pt-BR"`), but the
//! store never interprets it beyond equality and ordering.

use crate::{LocaleError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Opaque locale token. Cloning is an `Arc` bump.
///
/// # Examples
///
/// ```
/// use locale_scope_store::Locale;
///
/// let en = Locale::new("en");
/// let parsed: Locale = "en".parse().unwrap();
/// assert_eq!(en, parsed);
/// assert_eq!(en, "en");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(Arc<str>);

impl Locale {
    /// Wrap a token as-is.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(Arc::from(tag.as_ref()))
    }

    /// Parse a token, rejecting empty or whitespace-only input.
    ///
    /// Surrounding whitespace is trimmed; nothing else is normalized.
    pub fn parse(tag: &str) -> Result<Self> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(LocaleError::InvalidLocale(tag.to_string()));
        }
        Ok(Self::new(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locale({:?})", &*self.0)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Locale {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Locale {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Locale {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&Locale> for Locale {
    fn from(locale: &Locale) -> Self {
        locale.clone()
    }
}

impl PartialEq<str> for Locale {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Locale {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
