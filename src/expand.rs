//! Expansion mode: the thread-local flag controlling whether alias
//! derivation runs automatically on key insertion.
//!
//! The flag defaults to enabled. [`Scope`] is the stack-discipline
//! override: it sets the flag on construction and restores the prior
//! value when dropped, on every exit path including unwinding, so nested
//! scopes compose (the innermost restores whatever the enclosing scope
//! had set, not the global default).

use core::cell::Cell;
use core::marker::PhantomData;

thread_local! {
    static EXPAND: Cell<bool> = const { Cell::new(true) };
}

/// Whether alias derivation currently runs on key insertion.
pub fn enabled() -> bool {
    EXPAND.with(Cell::get)
}

/// Set the flag directly, returning the prior value.
///
/// Prefer [`Scope`] for temporary overrides; `set` leaves the flag
/// changed until someone changes it back.
pub fn set(on: bool) -> bool {
    EXPAND.with(|f| f.replace(on))
}

/// Scoped override of the expansion flag.
#[must_use = "the override only lasts while the Scope is alive"]
pub struct Scope {
    prev: bool,
    // Thread-local state: the guard must be dropped on the thread that
    // created it.
    _nosend: PhantomData<*mut ()>,
}

impl Scope {
    pub fn new(on: bool) -> Self {
        Scope {
            prev: set(on),
            _nosend: PhantomData,
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        set(self.prev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    /// Invariant: nested scopes restore the enclosing scope's value, not
    /// the default.
    #[test]
    fn nested_scopes_compose() {
        assert!(enabled());
        {
            let _outer = Scope::new(false);
            assert!(!enabled());
            {
                let _inner = Scope::new(true);
                assert!(enabled());
            }
            assert!(!enabled());
        }
        assert!(enabled());
    }

    /// Invariant: the prior value is restored even when the scope exits
    /// by panicking.
    #[test]
    fn scope_restores_on_unwind() {
        assert!(enabled());
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _scope = Scope::new(false);
            assert!(!enabled());
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(enabled());
    }

    #[test]
    fn set_returns_prior() {
        assert!(set(false));
        assert!(!set(true));
        assert!(enabled());
    }
}
