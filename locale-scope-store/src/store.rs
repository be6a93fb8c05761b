//! Store definition
//!
//! [`create`] (or [`Store::builder`]) captures a message table, an initial
//! locale and an optional toggle hook, and returns a [`Store`]. The store's
//! methods are the facets every consumer needs: mounting a provider
//! ([`Store::mount`], [`Store::provide`]) and reading the nearest mounted
//! provider ([`Store::read_locale`], [`Store::read_messages`],
//! [`Store::read_message`], [`Store::read_toggle`]).
//!
//! Each store carries its own identity, so two stores built from the same
//! table never see each other's scopes.

use crate::logging::{debug, warn};
use crate::scope::{LocaleValue, MountedScope, Scope, ToggleHandle};
use crate::{BoxError, Locale, LocaleError, Message, MessageTable, Result, ToggleHook, registry};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity token of one store. Scopes are looked up by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(u64);

impl StoreId {
    fn next() -> Self {
        Self(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) struct StoreShared {
    pub(crate) id: StoreId,
    pub(crate) messages: MessageTable,
    pub(crate) initial_locale: Locale,
    pub(crate) on_toggle: Option<ToggleHook>,
    pub(crate) strict: bool,
}

/// Build a store.
///
/// Never fails and validates nothing: the table should be non-empty and
/// every locale that may become current should have a bundle, but both are
/// the caller's contract. Use [`Store::builder`] for checked construction.
///
/// # Examples
///
/// ```
/// use locale_scope_store::{create, Message, MessageTable};
///
/// let messages = MessageTable::new()
///     .with_bundle("en", Message::new().with("greeting", "Hello"))
///     .with_bundle("fr", Message::new().with("greeting", "Bonjour"));
/// let store = create(messages, "en", None);
///
/// store.provide("en", |scope| {
///     assert_eq!(store.read_message("greeting").unwrap(), "Hello");
///     scope.toggle("fr").unwrap();
///     assert_eq!(store.read_message("greeting").unwrap(), "Bonjour");
/// });
///
/// assert!(store.read_locale().is_none());
/// ```
pub fn create(
    messages: MessageTable,
    initial_locale: impl Into<Locale>,
    on_toggle: Option<ToggleHook>,
) -> Store {
    Store::new(messages, initial_locale, on_toggle)
}

/// A locale store: shared message table plus its scope identity.
///
/// Clones are the same store. Separate calls to [`create`] are not.
#[derive(Clone)]
pub struct Store {
    shared: Arc<StoreShared>,
}

impl Store {
    /// Same as [`create`].
    pub fn new(
        messages: MessageTable,
        initial_locale: impl Into<Locale>,
        on_toggle: Option<ToggleHook>,
    ) -> Self {
        Self::from_parts(messages, initial_locale.into(), on_toggle, false)
    }

    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    fn from_parts(
        messages: MessageTable,
        initial_locale: Locale,
        on_toggle: Option<ToggleHook>,
        strict: bool,
    ) -> Self {
        let id = StoreId::next();
        if messages.is_empty() {
            warn!("locale store {} created with an empty message table", id);
        }
        debug!(
            "created locale store {} with {} locale(s), initial locale {}, hook: {}, strict: {}",
            id,
            messages.len(),
            initial_locale,
            on_toggle.is_some(),
            strict
        );

        Self {
            shared: Arc::new(StoreShared {
                id,
                messages,
                initial_locale,
                on_toggle,
                strict,
            }),
        }
    }

    pub fn id(&self) -> StoreId {
        self.shared.id
    }

    pub fn messages(&self) -> &MessageTable {
        &self.shared.messages
    }

    /// The locale given at construction. Only used by [`Store::mount_default`].
    pub fn initial_locale(&self) -> &Locale {
        &self.shared.initial_locale
    }

    pub fn is_strict(&self) -> bool {
        self.shared.strict
    }

    // ------------------------------------------------------------------------
    // Mounting
    // ------------------------------------------------------------------------

    /// Mount a new scope on `initial_locale` as the innermost provider of
    /// this store on the current thread.
    ///
    /// The scope lives until the returned guard is dropped.
    pub fn mount(&self, initial_locale: impl Into<Locale>) -> MountedScope {
        let scope = Scope::new(Arc::clone(&self.shared), initial_locale.into());
        MountedScope::mount(scope)
    }

    /// Mount a scope on the store's own initial locale.
    pub fn mount_default(&self) -> MountedScope {
        self.mount(self.shared.initial_locale.clone())
    }

    /// Mount a scope, run `subtree` inside it, then unmount.
    ///
    /// The scope is unmounted even if `subtree` panics.
    pub fn provide<R, F>(&self, initial_locale: impl Into<Locale>, subtree: F) -> R
    where
        F: FnOnce(&Scope) -> R,
    {
        let mounted = self.mount(initial_locale);
        subtree(mounted.scope())
    }

    /// Number of this store's scopes mounted on the current thread.
    pub fn depth(&self) -> usize {
        registry::depth(self.shared.id)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Nearest enclosing mounted scope, if any.
    pub fn current_scope(&self) -> Option<Scope> {
        registry::nearest(self.shared.id)
    }

    /// Value exposed by the nearest scope.
    pub fn read_value(&self) -> Option<Arc<LocaleValue>> {
        self.current_scope().map(|scope| scope.value())
    }

    /// Current locale of the nearest scope. `None` when nothing is mounted.
    pub fn read_locale(&self) -> Option<Locale> {
        self.current_scope().map(|scope| scope.locale())
    }

    /// Full bundle for the current locale.
    ///
    /// `None` when nothing is mounted or the current locale has no bundle.
    pub fn read_messages(&self) -> Option<Arc<Message>> {
        self.read_value()
            .and_then(|value| value.current_messages().cloned())
    }

    /// One entry of the current bundle; always equal to
    /// `read_messages()?.get(key)`.
    pub fn read_message(&self, key: &str) -> Option<Value> {
        self.read_value().and_then(|value| value.message(key).cloned())
    }

    /// Toggle operation of the nearest scope.
    pub fn read_toggle(&self) -> Option<ToggleHandle> {
        self.current_scope().map(|scope| scope.toggle_handle())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.shared.id)
            .field("locales", &self.shared.messages.len())
            .field("initial_locale", &self.shared.initial_locale)
            .field("on_toggle", &self.shared.on_toggle.is_some())
            .field("strict", &self.shared.strict)
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Checked construction of a [`Store`].
///
/// ```
/// use locale_scope_store::{Locale, LocaleError, MessageTable, Store};
///
/// let messages = MessageTable::from_json(r#"{ "en": {}, "fr": {} }"#).unwrap();
/// let store = Store::builder()
///     .with_messages(messages)
///     .with_initial_locale("fr")
///     .with_on_toggle(|locale: &Locale| println!("switched to {}", locale))
///     .with_strict(true)
///     .build()
///     .unwrap();
///
/// let scope = store.mount_default();
/// assert!(matches!(scope.toggle("de"), Err(LocaleError::UnknownLocale(_))));
/// ```
#[derive(Debug, Default)]
pub struct StoreBuilder {
    messages: MessageTable,
    initial_locale: Option<Locale>,
    on_toggle: Option<ToggleHook>,
    strict: bool,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(mut self, messages: MessageTable) -> Self {
        self.messages = messages;
        self
    }

    /// Defaults to the first locale of the table.
    pub fn with_initial_locale(mut self, locale: impl Into<Locale>) -> Self {
        self.initial_locale = Some(locale.into());
        self
    }

    pub fn with_hook(mut self, hook: ToggleHook) -> Self {
        self.on_toggle = Some(hook);
        self
    }

    pub fn with_on_toggle<F>(self, f: F) -> Self
    where
        F: Fn(&Locale) + Send + Sync + 'static,
    {
        self.with_hook(ToggleHook::new(f))
    }

    pub fn with_fallible_on_toggle<F, E>(self, f: F) -> Self
    where
        F: Fn(&Locale) -> std::result::Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.with_hook(ToggleHook::fallible(f))
    }

    /// Reject locales missing from the table, both at build time and on
    /// every toggle.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(self) -> Result<Store> {
        if self.messages.is_empty() {
            return Err(LocaleError::EmptyTable);
        }

        let initial_locale = match self.initial_locale {
            Some(locale) => locale,
            None => self
                .messages
                .locales()
                .next()
                .cloned()
                .ok_or(LocaleError::EmptyTable)?,
        };

        if self.strict && !self.messages.contains(&initial_locale) {
            return Err(LocaleError::UnknownLocale(initial_locale));
        }

        Ok(Store::from_parts(
            self.messages,
            initial_locale,
            self.on_toggle,
            self.strict,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    fn messages() -> MessageTable {
        MessageTable::new()
            .with_bundle("en", Message::new().with("greeting", "Hello"))
            .with_bundle("fr", Message::new().with("greeting", "Bonjour"))
    }

    #[test]
    fn test_unmounted_reads_are_none() {
        let store = create(messages(), "en", None);

        assert!(store.current_scope().is_none());
        assert!(store.read_locale().is_none());
        assert!(store.read_messages().is_none());
        assert!(store.read_message("greeting").is_none());
        assert!(store.read_toggle().is_none());
        assert_eq!(store.depth(), 0);
    }

    #[test]
    fn test_basic_switch() {
        let store = create(messages(), "en", None);
        let _scope = store.mount("en");

        assert_eq!(store.read_message("greeting"), Some(json!("Hello")));

        store.read_toggle().unwrap().toggle("fr").unwrap();

        assert_eq!(store.read_message("greeting"), Some(json!("Bonjour")));
        assert_eq!(store.read_locale().unwrap(), "fr");
    }

    #[test]
    fn test_read_messages_is_table_bundle() {
        let store = create(messages(), "en", None);
        let scope = store.mount("en");

        for locale in ["fr", "en"] {
            scope.toggle(locale).unwrap();
            let bundle = store.read_messages().unwrap();
            assert!(Arc::ptr_eq(&bundle, store.messages().get(locale).unwrap()));
            assert_eq!(store.read_locale().unwrap(), locale);
        }
    }

    #[test]
    fn test_key_projection_matches_bundle() {
        let store = create(messages(), "en", None);
        let _scope = store.mount("fr");

        for key in ["greeting", "missing"] {
            let full = store.read_messages().unwrap().get(key).cloned();
            assert_eq!(store.read_message(key), full);
        }
    }

    #[test]
    fn test_mount_default_uses_initial_locale() {
        let store = create(messages(), "fr", None);
        let scope = store.mount_default();
        assert_eq!(scope.locale(), "fr");
        assert_eq!(store.initial_locale(), &Locale::new("fr"));
    }

    #[test]
    fn test_scope_initial_locale_overrides_store_default() {
        let store = create(messages(), "en", None);
        let _scope = store.mount("fr");
        assert_eq!(store.read_locale().unwrap(), "fr");
    }

    #[test]
    fn test_nested_scopes_innermost_wins() {
        let store = create(messages(), "en", None);
        let outer = store.mount("en");

        store.provide("fr", |inner| {
            assert_eq!(store.depth(), 2);
            assert_eq!(store.read_locale().unwrap(), "fr");

            inner.toggle("en").unwrap();
            assert_eq!(store.read_locale().unwrap(), "en");
            outer.toggle("fr").unwrap();
            // Outer change does not leak into the inner scope
            assert_eq!(store.read_locale().unwrap(), "en");
        });

        assert_eq!(store.depth(), 1);
        assert_eq!(store.read_locale().unwrap(), "fr");
    }

    #[test]
    fn test_out_of_order_unmount() {
        let store = create(messages(), "en", None);
        let outer = store.mount("en");
        let inner = store.mount("fr");

        drop(outer);
        assert_eq!(store.read_locale().unwrap(), "fr");
        drop(inner);
        assert!(store.read_locale().is_none());
    }

    #[test]
    fn test_stores_are_independent() {
        let a = create(messages(), "en", None);
        let b = create(messages(), "en", None);
        assert_ne!(a.id(), b.id());

        let _scope_b = b.mount("en");
        assert!(a.read_locale().is_none());

        let scope_a = a.mount("en");
        scope_a.toggle("fr").unwrap();

        assert_eq!(a.read_locale().unwrap(), "fr");
        assert_eq!(b.read_locale().unwrap(), "en");
    }

    #[test]
    fn test_clone_shares_identity() {
        let store = create(messages(), "en", None);
        let alias = store.clone();
        let _scope = store.mount("fr");

        assert_eq!(alias.id(), store.id());
        assert_eq!(alias.read_locale().unwrap(), "fr");
    }

    #[test]
    fn test_hook_called_once_per_toggle() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let hook = ToggleHook::new(move |locale| sink.lock().push(locale.to_string()));
        let store = create(messages(), "en", Some(hook));
        let scope = store.mount("en");

        scope.toggle("fr").unwrap();
        scope.toggle("fr").unwrap();
        scope.toggle("en").unwrap();

        assert_eq!(*calls.lock(), vec!["fr", "fr", "en"]);
        assert_eq!(scope.version(), 2);
    }

    #[test]
    fn test_builder_validation() {
        assert!(matches!(
            Store::builder().build(),
            Err(LocaleError::EmptyTable)
        ));

        assert!(matches!(
            Store::builder()
                .with_messages(messages())
                .with_initial_locale("de")
                .with_strict(true)
                .build(),
            Err(LocaleError::UnknownLocale(l)) if l == "de"
        ));

        // Lenient builds accept an initial locale without a bundle
        let store = Store::builder()
            .with_messages(messages())
            .with_initial_locale("de")
            .build()
            .unwrap();
        assert_eq!(store.initial_locale(), &Locale::new("de"));
        assert!(!store.is_strict());
    }

    #[test]
    fn test_builder_defaults_to_first_locale() {
        let store = Store::builder().with_messages(messages()).build().unwrap();
        assert_eq!(store.initial_locale(), &Locale::new("en"));
    }

    #[test]
    fn test_strict_rejects_before_hook() {
        let calls = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&calls);
        let store = Store::builder()
            .with_messages(messages())
            .with_on_toggle(move |_: &Locale| *counter.lock() += 1)
            .with_strict(true)
            .build()
            .unwrap();
        let scope = store.mount_default();

        assert!(matches!(
            scope.toggle("de"),
            Err(LocaleError::UnknownLocale(_))
        ));
        assert_eq!(*calls.lock(), 0);
        assert_eq!(scope.locale(), "en");

        scope.toggle("fr").unwrap();
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn test_fallible_hook_via_builder() {
        let store = Store::builder()
            .with_messages(messages())
            .with_fallible_on_toggle(|locale: &Locale| {
                if locale == "fr" {
                    Err("fr disabled")
                } else {
                    Ok(())
                }
            })
            .build()
            .unwrap();
        let _scope = store.mount("en");
        let toggle = store.read_toggle().unwrap();

        assert!(matches!(toggle.toggle("fr"), Err(LocaleError::Hook(_))));
        assert_eq!(store.read_locale().unwrap(), "en");
    }

    #[test]
    fn test_provide_unmounts_on_panic() {
        let store = create(messages(), "en", None);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.provide("fr", |_| -> usize { panic!("subtree failed") });
        }));

        assert!(result.is_err());
        assert_eq!(store.depth(), 0);
        assert!(store.read_locale().is_none());
    }
}
