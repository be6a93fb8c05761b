// locale-scope - scoped locale switching over fixed message tables
//
// Facade over the workspace crates: the store itself and the logger it
// reports through.

// Re-export the store
pub use locale_scope_store::*;

// Re-export logging under its own path
pub use locale_scope_log as log;

// JSON values are the message payload type
pub use serde_json::{Value, json};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Locale, LocaleError, LocaleValue, Message, MessageTable, MountedScope, Result, Scope,
        Store, StoreBuilder, ToggleHandle, ToggleHook, Value, create, json,
    };
}
