// Thread-local registry of mounted scopes.
//
// Mount order doubles as nesting order: the most recently mounted scope of a
// store is the nearest enclosing one. Scopes of other stores are skipped.

use crate::Scope;
use crate::store::StoreId;
use std::cell::RefCell;

thread_local! {
    static MOUNTED: RefCell<Vec<Scope>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn push(scope: Scope) {
    MOUNTED.with(|mounted| mounted.borrow_mut().push(scope));
}

/// Remove a scope by id. Guards may drop out of mount order, so this is not
/// a plain pop.
pub(crate) fn remove(scope_id: u64) -> bool {
    // Dropped after the borrow ends; the last reference may run arbitrary drops.
    let removed = MOUNTED.with(|mounted| {
        let mut mounted = mounted.borrow_mut();
        mounted
            .iter()
            .rposition(|scope| scope.id() == scope_id)
            .map(|index| mounted.remove(index))
    });
    removed.is_some()
}

/// Innermost mounted scope of `store`.
pub(crate) fn nearest(store: StoreId) -> Option<Scope> {
    MOUNTED.with(|mounted| {
        mounted
            .borrow()
            .iter()
            .rev()
            .find(|scope| scope.store_id() == store)
            .cloned()
    })
}

/// How many scopes of `store` are mounted on this thread.
pub(crate) fn depth(store: StoreId) -> usize {
    MOUNTED.with(|mounted| {
        mounted
            .borrow()
            .iter()
            .filter(|scope| scope.store_id() == store)
            .count()
    })
}
