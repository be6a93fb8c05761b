//! External notification hook
//!
//! A [`ToggleHook`] is invoked synchronously with the requested locale each
//! time a scope's toggle runs, before the new locale becomes visible to
//! readers. Typical uses are persisting the choice elsewhere or pushing it
//! to a collaborator that keeps its own locale.

use crate::{BoxError, Locale, LocaleError, Result};
use std::fmt;
use std::sync::Arc;

type HookFn = dyn Fn(&Locale) -> std::result::Result<(), BoxError> + Send + Sync;

/// Callback notified on every toggle.
///
/// A fallible hook that returns an error aborts the toggle: the scope keeps
/// its previous locale and the caller receives [`LocaleError::Hook`].
#[derive(Clone)]
pub struct ToggleHook {
    inner: Arc<HookFn>,
}

impl ToggleHook {
    /// Hook that cannot fail.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Locale) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(move |locale: &Locale| {
                f(locale);
                Ok(())
            }),
        }
    }

    /// Hook that may fail. Its error reaches the toggle caller wrapped in
    /// [`LocaleError::Hook`], with the original error as the source.
    pub fn fallible<F, E>(f: F) -> Self
    where
        F: Fn(&Locale) -> std::result::Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            inner: Arc::new(move |locale: &Locale| f(locale).map_err(Into::into)),
        }
    }

    pub(crate) fn notify(&self, locale: &Locale) -> Result<()> {
        (self.inner)(locale).map_err(LocaleError::Hook)
    }
}

impl fmt::Debug for ToggleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleHook").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_infallible_hook_records_locale() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hook = ToggleHook::new(move |locale| sink.lock().push(locale.clone()));

        hook.notify(&Locale::new("fr")).unwrap();
        hook.notify(&Locale::new("en")).unwrap();

        assert_eq!(*seen.lock(), vec![Locale::new("fr"), Locale::new("en")]);
    }

    #[test]
    fn test_fallible_hook_error_is_wrapped() {
        let hook = ToggleHook::fallible(|locale: &Locale| {
            if locale == "xx" {
                Err(format!("refusing {}", locale))
            } else {
                Ok(())
            }
        });

        assert!(hook.notify(&Locale::new("en")).is_ok());
        match hook.notify(&Locale::new("xx")) {
            Err(LocaleError::Hook(source)) => assert_eq!(source.to_string(), "refusing xx"),
            other => panic!("unexpected result: {:?}", other),
        }

        let err = hook.notify(&Locale::new("xx")).unwrap_err();
        assert_eq!(err.to_string(), "Toggle hook failed: refusing xx");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "refusing xx");
    }
}
