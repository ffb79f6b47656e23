//! Structural storage layer: entry and alias slots, insertion-order
//! lists, and the alias hash index.
//!
//! This layer owns raw bookkeeping only: no derivation, no observer, no
//! error text. Every lookup (canonical keys included) goes through the
//! alias index, since a canonical key is always registered as its own
//! first alias. Each alias slot stores a precomputed `u64` hash and the
//! index always probes with the stored hash, so key hashing never reruns
//! on rehash.

use core::hash::BuildHasher;
use hashbrown::HashTable;
use slotmap::SlotMap;
use std::collections::hash_map::RandomState;

use crate::key::{AsKeyRef, Key, KeyRef};

slotmap::new_key_type! {
    pub(crate) struct EntryId;
    pub(crate) struct AliasId;
}

#[derive(Debug)]
pub(crate) struct EntrySlot<V> {
    pub key: Key,
    pub value: V,
}

#[derive(Debug)]
pub(crate) struct AliasSlot {
    pub alias: Key,
    pub target: EntryId,
    pub hash: u64,
}

pub(crate) struct Store<V, S = RandomState> {
    hasher: S,
    entries: SlotMap<EntryId, EntrySlot<V>>,
    entry_order: Vec<EntryId>,
    aliases: SlotMap<AliasId, AliasSlot>,
    alias_order: Vec<AliasId>,
    index: HashTable<AliasId>,
}

impl<V, S: BuildHasher> Store<V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            entries: SlotMap::with_key(),
            entry_order: Vec::new(),
            aliases: SlotMap::with_key(),
            alias_order: Vec::new(),
            index: HashTable::new(),
        }
    }

    fn make_hash(&self, q: KeyRef<'_>) -> u64 {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub fn find_alias(&self, q: KeyRef<'_>) -> Option<AliasId> {
        let hash = self.make_hash(q);
        self.index
            .find(hash, |&a| {
                self.aliases
                    .get(a)
                    .map(|s| s.alias.as_key_ref() == q)
                    .unwrap_or(false)
            })
            .copied()
    }

    /// Resolve any registered spelling to its canonical entry.
    pub fn resolve(&self, q: KeyRef<'_>) -> Option<EntryId> {
        self.find_alias(q)
            .and_then(|a| self.aliases.get(a))
            .map(|s| s.target)
    }

    /// Register `alias` as a spelling of `target`.
    ///
    /// Re-registering onto the same target is a no-op; an alias already
    /// owned by a different entry is returned as `Err` with that entry.
    pub fn register_alias(&mut self, alias: Key, target: EntryId) -> Result<(), EntryId> {
        let hash = self.make_hash(alias.as_key_ref());
        match self.index.entry(
            hash,
            |&a| {
                self.aliases
                    .get(a)
                    .map(|s| s.alias == alias)
                    .unwrap_or(false)
            },
            |&a| self.aliases.get(a).map(|s| s.hash).unwrap_or(0),
        ) {
            hashbrown::hash_table::Entry::Occupied(o) => {
                match self.aliases.get(*o.get()).map(|s| s.target) {
                    Some(existing) if existing == target => Ok(()),
                    Some(existing) => Err(existing),
                    None => Ok(()),
                }
            }
            hashbrown::hash_table::Entry::Vacant(v) => {
                let id = self.aliases.insert(AliasSlot {
                    alias,
                    target,
                    hash,
                });
                let _ = v.insert(id);
                self.alias_order.push(id);
                Ok(())
            }
        }
    }

    pub fn unregister_alias(&mut self, id: AliasId) -> Option<AliasSlot> {
        let slot = self.aliases.remove(id)?;
        if let Ok(occupied) = self.index.find_entry(slot.hash, |&a| a == id) {
            occupied.remove();
        }
        self.alias_order.retain(|&a| a != id);
        Some(slot)
    }

    /// True when the alias slot is an entry's self-alias.
    pub fn is_canonical_alias(&self, id: AliasId) -> bool {
        self.aliases
            .get(id)
            .and_then(|s| self.entries.get(s.target).map(|e| e.key == s.alias))
            .unwrap_or(false)
    }

    pub fn push_entry(&mut self, key: Key, value: V) -> EntryId {
        let id = self.entries.insert(EntrySlot { key, value });
        self.entry_order.push(id);
        id
    }

    /// Remove an entry and purge every alias targeting it.
    pub fn remove_entry(&mut self, id: EntryId) -> Option<(Key, V)> {
        let slot = self.entries.remove(id)?;
        self.entry_order.retain(|&e| e != id);
        let doomed: Vec<AliasId> = self
            .alias_order
            .iter()
            .copied()
            .filter(|&a| {
                self.aliases
                    .get(a)
                    .map(|s| s.target == id)
                    .unwrap_or(false)
            })
            .collect();
        for a in doomed {
            self.unregister_alias(a);
        }
        Some((slot.key, slot.value))
    }

    pub fn entry(&self, id: EntryId) -> Option<&EntrySlot<V>> {
        self.entries.get(id)
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut EntrySlot<V>> {
        self.entries.get_mut(id)
    }

    /// The canonical key of a live entry.
    pub fn entry_key(&self, id: EntryId) -> &Key {
        &self.entries[id].key
    }

    pub fn entries_in_order(&self) -> impl Iterator<Item = (EntryId, &EntrySlot<V>)> + '_ {
        self.entry_order
            .iter()
            .filter_map(move |&id| self.entries.get(id).map(|slot| (id, slot)))
    }

    pub fn aliases_in_order(&self) -> impl Iterator<Item = &AliasSlot> + '_ {
        self.alias_order
            .iter()
            .filter_map(move |&id| self.aliases.get(id))
    }
}
