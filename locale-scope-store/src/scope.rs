//! Scope controllers
//!
//! A [`Scope`] is one mounted provider: it owns the current-locale cell for a
//! subtree and the [`LocaleValue`] exposed to everything beneath it. Scopes of
//! the same store never share their cell; only the read-only
//! [`MessageTable`] is shared.
//!
//! Toggling runs in a fixed order:
//!
//! 1. strict stores (or [`Scope::try_toggle`]) reject locales missing from
//!    the table,
//! 2. the store's [`ToggleHook`](crate::ToggleHook) is notified,
//! 3. the cell is updated and the exposed value recomputed under one lock.
//!
//! All three steps run under a per-scope toggle lock, so toggles from
//! different threads notify the hook in the same order they commit. The
//! toggle lock is reentrant and separate from the cell lock: a hook may read
//! the scope (and sees the previous locale) or toggle it again from the same
//! thread. If the hook fails, steps after it are skipped.

use crate::logging::{debug, trace, warn};
use crate::memo::Memo;
use crate::registry;
use crate::store::{StoreId, StoreShared};
use crate::{Locale, LocaleError, Message, MessageTable, Result};
use parking_lot::{Mutex, ReentrantMutex};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// Exposed value
// ============================================================================

/// The value a scope exposes to its subtree: current locale, the full
/// message table and the scope's toggle.
///
/// A scope hands out the same `Arc<LocaleValue>` until its locale changes,
/// so `Arc::ptr_eq` between two reads tells a consumer whether anything
/// moved.
#[derive(Debug)]
pub struct LocaleValue {
    locale: Locale,
    messages: MessageTable,
    toggle: ToggleHandle,
}

impl LocaleValue {
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// The whole table, every locale included.
    pub fn messages(&self) -> &MessageTable {
        &self.messages
    }

    /// Bundle for the current locale; `None` if the table lacks it.
    pub fn current_messages(&self) -> Option<&Arc<Message>> {
        self.messages.get(&self.locale)
    }

    /// One entry of the current bundle.
    pub fn message(&self, key: &str) -> Option<&Value> {
        self.current_messages().and_then(|bundle| bundle.get(key))
    }

    pub fn toggle(&self) -> &ToggleHandle {
        &self.toggle
    }
}

// ============================================================================
// Toggle handle
// ============================================================================

/// Toggle operation bound to one scope instance.
///
/// Cheap to clone and `Send + Sync`, so it can be given to a UI control.
/// Every clone refers to the same scope, and the handle stays identical for
/// the scope's whole lifetime.
#[derive(Clone)]
pub struct ToggleHandle {
    scope: Weak<ScopeInner>,
}

impl ToggleHandle {
    /// Switch the bound scope to `locale`.
    ///
    /// Fails with [`LocaleError::ScopeUnmounted`] once the scope is gone.
    pub fn toggle(&self, locale: impl Into<Locale>) -> Result<()> {
        let scope = self.scope.upgrade().ok_or(LocaleError::ScopeUnmounted)?;
        scope.toggle(locale.into(), false)
    }

    /// Like [`toggle`](Self::toggle), but rejects locales absent from the
    /// table.
    pub fn try_toggle(&self, locale: impl Into<Locale>) -> Result<()> {
        let scope = self.scope.upgrade().ok_or(LocaleError::ScopeUnmounted)?;
        scope.toggle(locale.into(), true)
    }

    /// Whether both handles toggle the same scope.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.scope, &other.scope)
    }
}

impl fmt::Debug for ToggleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.scope.upgrade().map(|scope| scope.id);
        f.debug_struct("ToggleHandle").field("scope", &id).finish()
    }
}

// ============================================================================
// Scope
// ============================================================================

struct ScopeState {
    value: Memo<Locale, Arc<LocaleValue>>,
    version: u64,
}

struct ScopeInner {
    id: u64,
    store: Arc<StoreShared>,
    mounted: AtomicBool,
    toggle: ToggleHandle,
    // Serializes validate, notify and commit across threads.
    toggle_lock: ReentrantMutex<()>,
    state: Mutex<ScopeState>,
}

impl ScopeInner {
    fn expose(&self, locale: &Locale) -> Arc<LocaleValue> {
        Arc::new(LocaleValue {
            locale: locale.clone(),
            messages: self.store.messages.clone(),
            toggle: self.toggle.clone(),
        })
    }

    fn toggle(&self, locale: Locale, validate: bool) -> Result<()> {
        let _serialized = self.toggle_lock.lock();

        if !self.mounted.load(Ordering::Acquire) {
            return Err(LocaleError::ScopeUnmounted);
        }

        if (validate || self.store.strict) && !self.store.messages.contains(&locale) {
            warn!("scope {} rejected unknown locale {}", self.id, locale);
            return Err(LocaleError::UnknownLocale(locale));
        }

        if let Some(hook) = &self.store.on_toggle {
            if let Err(e) = hook.notify(&locale) {
                warn!("scope {}: toggle hook failed for {}: {}", self.id, locale, e);
                return Err(e);
            }
        }

        let mut state = self.state.lock();
        let previous = state.value.key().clone();
        if state.value.update(locale, |l| self.expose(l)) {
            state.version += 1;
            debug!(
                "scope {} switched locale {} -> {} (version {})",
                self.id,
                previous,
                state.value.key(),
                state.version
            );
        } else {
            trace!("scope {} already on locale {}", self.id, previous);
        }
        Ok(())
    }
}

/// One mounted provider of a store.
///
/// Obtained from [`Store::mount`](crate::Store::mount) or
/// [`Store::provide`](crate::Store::provide). Clones refer to the same scope.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    pub(crate) fn new(store: Arc<StoreShared>, initial_locale: Locale) -> Self {
        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);

        let inner = Arc::new_cyclic(|weak: &Weak<ScopeInner>| {
            let toggle = ToggleHandle {
                scope: weak.clone(),
            };
            let value = Memo::new(initial_locale, |locale| {
                Arc::new(LocaleValue {
                    locale: locale.clone(),
                    messages: store.messages.clone(),
                    toggle: toggle.clone(),
                })
            });

            ScopeInner {
                id,
                store,
                mounted: AtomicBool::new(true),
                toggle,
                toggle_lock: ReentrantMutex::new(()),
                state: Mutex::new(ScopeState { value, version: 0 }),
            }
        });

        Self { inner }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn store_id(&self) -> StoreId {
        self.inner.store.id
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::Acquire)
    }

    /// The exposed value. Same `Arc` until the locale changes.
    pub fn value(&self) -> Arc<LocaleValue> {
        Arc::clone(self.inner.state.lock().value.get())
    }

    pub fn locale(&self) -> Locale {
        self.inner.state.lock().value.key().clone()
    }

    /// Bundle for the current locale.
    pub fn messages(&self) -> Option<Arc<Message>> {
        self.value().current_messages().cloned()
    }

    /// One entry of the current bundle.
    pub fn message(&self, key: &str) -> Option<Value> {
        self.value().message(key).cloned()
    }

    pub fn toggle_handle(&self) -> ToggleHandle {
        self.inner.toggle.clone()
    }

    /// Switch to `locale`. Unknown locales are accepted unless the store is
    /// strict.
    pub fn toggle(&self, locale: impl Into<Locale>) -> Result<()> {
        self.inner.toggle(locale.into(), false)
    }

    /// Switch to `locale`, rejecting locales missing from the table.
    pub fn try_toggle(&self, locale: impl Into<Locale>) -> Result<()> {
        self.inner.toggle(locale.into(), true)
    }

    /// Number of effective locale changes since mount.
    pub fn version(&self) -> u64 {
        self.inner.state.lock().version
    }

    /// Times the exposed value has been built, including at mount.
    pub fn recomputations(&self) -> u64 {
        self.inner.state.lock().value.computations()
    }

    fn unmount(&self) {
        self.inner.mounted.store(false, Ordering::Release);
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.inner.id)
            .field("store", &self.inner.store.id)
            .field("locale", &self.locale())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

// ============================================================================
// Mount guard
// ============================================================================

/// A scope registered as the innermost provider of its store on this thread.
///
/// Dropping the guard unmounts the scope: it leaves the registry, and its
/// toggle handles start returning [`LocaleError::ScopeUnmounted`]. The guard
/// is tied to the thread that mounted it.
#[must_use = "dropping the guard unmounts the scope"]
pub struct MountedScope {
    scope: Scope,
    _thread_bound: PhantomData<Rc<()>>,
}

impl MountedScope {
    pub(crate) fn mount(scope: Scope) -> Self {
        registry::push(scope.clone());
        debug!(
            "mounted scope {} of store {} on locale {}",
            scope.id(),
            scope.store_id(),
            scope.locale()
        );
        Self {
            scope,
            _thread_bound: PhantomData,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl Deref for MountedScope {
    type Target = Scope;

    fn deref(&self) -> &Scope {
        &self.scope
    }
}

impl Drop for MountedScope {
    fn drop(&mut self) {
        let removed = registry::remove(self.scope.id());
        self.scope.unmount();
        debug!("unmounted scope {} (registered: {})", self.scope.id(), removed);
    }
}

impl fmt::Debug for MountedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MountedScope").field(&self.scope).finish()
    }
}
