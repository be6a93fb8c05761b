//! Scoped, switchable locale state
//!
//! Builds a locale store over a fixed table of per-locale message bundles:
//!
//! - **Store**: created once from a [`MessageTable`], an initial locale and
//!   an optional [`ToggleHook`]
//! - **Scopes**: independently mounted providers, each owning its own
//!   current-locale cell
//! - **Accessors**: read the current locale, the current bundle or a single
//!   message from the nearest mounted scope
//! - **Toggle**: switch a scope's locale, notifying the hook first
//!
//! # Quick Start
//!
//! ```rust
//! use locale_scope_store::{create, Message, MessageTable, ToggleHook};
//!
//! let messages = MessageTable::new()
//!     .with_bundle("en", Message::new().with("greeting", "Hello"))
//!     .with_bundle("fr", Message::new().with("greeting", "Bonjour"));
//!
//! let store = create(
//!     messages,
//!     "en",
//!     Some(ToggleHook::new(|locale| println!("locale is now {}", locale))),
//! );
//!
//! let _scope = store.mount("en");
//! assert_eq!(store.read_message("greeting").unwrap(), "Hello");
//!
//! // A menu would hold on to this handle
//! let toggle = store.read_toggle().unwrap();
//! toggle.toggle("fr").unwrap();
//!
//! assert_eq!(store.read_locale().unwrap(), "fr");
//! assert_eq!(store.read_message("greeting").unwrap(), "Bonjour");
//! ```
//!
//! # Scope Resolution
//!
//! Mounted scopes are tracked per thread. Accessors resolve the most
//! recently mounted scope of *their own* store; with nothing mounted they
//! return `None`.

mod error;
mod hook;
mod locale;
mod logging;
mod memo;
mod messages;
mod registry;
mod scope;
mod store;

pub use error::{BoxError, LocaleError};
pub use hook::ToggleHook;
pub use locale::Locale;
pub use messages::{Message, MessageTable};
pub use scope::{LocaleValue, MountedScope, Scope, ToggleHandle};
pub use store::{Store, StoreBuilder, StoreId, create};

/// Result type for locale store operations
pub type Result<T> = std::result::Result<T, LocaleError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Locale, LocaleError, LocaleValue, Message, MessageTable, MountedScope, Result, Scope,
        Store, StoreBuilder, ToggleHandle, ToggleHook, create,
    };
}
