//! alias-map: an associative container whose entries are reachable under
//! a canonical key plus automatically derived or user-defined aliases.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one logical store with two access syntaxes (item-style keys
//!   and attribute-style names), every entry addressable through a set of
//!   alternate spellings kept consistent by a single alias index.
//! - Layers:
//!   - `key`: closed key domain (`Int`/`Float`/`Bool`/`Str`) with numeric
//!     unification (integer-like keys are equal and hash identically
//!     across variants), plus a borrowed `KeyRef` so string lookups never
//!     allocate.
//!   - `expand`: thread-local expansion mode (default on) with a
//!     stack-discipline `Scope` guard that restores the prior value on
//!     every exit path, unwinding included.
//!   - `derive`: pure derivation of alternate spellings; no access to the
//!     ambient flag, callers pass it in.
//!   - `table`: structural storage: entry and alias slots behind stable
//!     generational ids, insertion-order lists, and one hash index from
//!     alias to canonical entry with precomputed per-slot hashes.
//!   - `map`: the public `AliasMap`, which layers derivation, the
//!     observer hook, bulk construction, representation and equality on
//!     top of the structural store.
//!
//! Constraints
//! - Single-threaded: the expansion flag is thread-local and its guard is
//!   `!Send`; the container itself is plain owned data.
//! - A canonical key is always its own first alias; every lookup,
//!   including by canonical key, is one probe of the alias index.
//! - No alias ever maps to two different canonical keys; installing a
//!   fresh entry is atomic (collisions are detected before any mutation).
//! - Deleting an entry purges every alias that pointed to it.
//!
//! Why this split?
//! - Localize invariants: the structural layer knows nothing about
//!   derivation or error surfaces, and the derivation rules are a pure
//!   function that can be table-tested in isolation.
//! - The alias index is the only hash structure; entries do not carry
//!   their own index, which keeps the two maps impossible to desync.
//!
//! Notes and non-goals
//! - Not a general ordered-map replacement: order maintenance on removal
//!   is linear, lookups are O(1) average.
//! - No persistence and no I/O; the only extension point is the
//!   on-change observer invoked after each successful write.
//! - Concurrent use requires external synchronization, like any `&mut`
//!   structure.

mod derive;
mod error;
pub mod expand;
mod key;
mod map;
mod table;

// Public surface
pub use derive::aliases_for;
pub use error::Error;
pub use key::{AsKeyRef, Key, KeyRef};
pub use map::{AliasMap, OnChange};
