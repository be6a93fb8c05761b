// Crate-internal access to the locale-scope logging macros.

#[allow(unused_imports)]
pub(crate) use locale_scope_log::{debug, error, info, trace, warn};
