//! Public container: canonical-key storage plus the alias index, with one
//! resolve path shared by item-style and attribute-style access.

use core::fmt;
use core::hash::BuildHasher;
use std::collections::hash_map::RandomState;
use std::ops::{Index, IndexMut};

use crate::derive::{aliases_for, is_identifier};
use crate::error::Error;
use crate::expand;
use crate::key::{AsKeyRef, Key};
use crate::table::{EntryId, Store};

/// Observer invoked after every successful write with the canonical key
/// and the stored value.
pub type OnChange<V> = Box<dyn FnMut(&Key, &V)>;

/// An associative container whose entries are reachable under a canonical
/// key plus automatically derived or user-defined aliases.
///
/// Writing a fresh key derives its alternate spellings (see
/// [`aliases_for`]) under the ambient expansion mode and registers each
/// as an alias of the new entry; the canonical key is always its own
/// first alias. Reads, writes and removals accept any registered
/// spelling and act on the canonical entry, so assigning through an
/// alias updates the existing entry rather than creating a new one.
///
/// Entries iterate in insertion order. A disjoint direct-attribute store
/// holds metadata that never participates in aliasing.
///
/// ```
/// use alias_map::AliasMap;
///
/// let mut m: AliasMap<i32> = AliasMap::new();
/// m.insert("two words", 5).unwrap();
/// assert_eq!(m["two_words"], 5);
///
/// m.insert(1, 7).unwrap();
/// assert_eq!(m["_True"], 7);
/// assert_eq!(m[&true], 7);
/// ```
pub struct AliasMap<V, S = RandomState> {
    store: Store<V, S>,
    vars: Vec<(String, V)>,
    on_change: Option<OnChange<V>>,
}

impl<V> AliasMap<V> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Build a map from its three constituent parts: items (inserted in
    /// order under the ambient expansion mode), explicit alias
    /// declarations `alias -> existing key` (registered bare, with no
    /// derivation), and direct attributes.
    ///
    /// The [`Debug`] rendering of a map is exactly these parts.
    pub fn from_parts<I, K, A, AK, AT, D, N>(items: I, aliases: A, vars: D) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        A: IntoIterator<Item = (AK, AT)>,
        AK: Into<Key>,
        AT: Into<Key>,
        D: IntoIterator<Item = (N, V)>,
        N: Into<String>,
    {
        let mut map = Self::new();
        for (k, v) in items {
            map.insert(k, v)?;
        }
        for (alias, target) in aliases {
            map.declare_alias(alias.into(), target.into())?;
        }
        for (name, value) in vars {
            map.set_attr_direct(name, value);
        }
        Ok(map)
    }

    /// One value for many keys.
    pub fn from_keys<I, K>(keys: I, value: V) -> Result<Self, Error>
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
        V: Clone,
    {
        let mut map = Self::new();
        for k in keys {
            map.insert(k, value.clone())?;
        }
        Ok(map)
    }
}

impl<V, S: BuildHasher> AliasMap<V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            store: Store::with_hasher(hasher),
            vars: Vec::new(),
            on_change: None,
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: AsKeyRef + ?Sized,
    {
        self.store.resolve(key.as_key_ref()).is_some()
    }

    /// Store `value` under `key`.
    ///
    /// If `key` is already a registered spelling the write is redirected
    /// to the canonical entry it resolves to and the previous value is
    /// returned. Otherwise a new entry is created and the key's derived
    /// spellings are registered as aliases; the whole installation is
    /// atomic, so a collision with an alias owned by another entry fails
    /// without changing the map.
    pub fn insert(&mut self, key: impl Into<Key>, value: V) -> Result<Option<V>, Error> {
        let key = key.into();
        if let Some(id) = self.store.resolve(key.as_key_ref()) {
            let old = match self.store.entry_mut(id) {
                Some(slot) => core::mem::replace(&mut slot.value, value),
                None => return Err(Error::KeyNotFound(key)),
            };
            self.notify(id);
            return Ok(Some(old));
        }
        let spellings = aliases_for(&key, expand::enabled());
        for alias in &spellings[1..] {
            if let Some(existing) = self.store.resolve(alias.as_key_ref()) {
                return Err(self.collision(alias.clone(), existing));
            }
        }
        let id = self.store.push_entry(key, value);
        // Cannot collide: the canonical key did not resolve and the
        // derived spellings were checked above.
        for alias in spellings {
            let _ = self.store.register_alias(alias, id);
        }
        self.notify(id);
        Ok(None)
    }

    pub fn get<Q>(&self, key: &Q) -> Result<&V, Error>
    where
        Q: AsKeyRef + ?Sized,
    {
        let q = key.as_key_ref();
        match self.store.resolve(q).and_then(|id| self.store.entry(id)) {
            Some(slot) => Ok(&slot.value),
            None => Err(Error::KeyNotFound(q.to_key())),
        }
    }

    /// Mutable access to the value under any registered spelling.
    ///
    /// Mutations through the returned reference do not fire the
    /// on-change observer.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, Error>
    where
        Q: AsKeyRef + ?Sized,
    {
        let q = key.as_key_ref();
        match self.store.resolve(q) {
            Some(id) => match self.store.entry_mut(id) {
                Some(slot) => Ok(&mut slot.value),
                None => Err(Error::KeyNotFound(q.to_key())),
            },
            None => Err(Error::KeyNotFound(q.to_key())),
        }
    }

    /// Remove the entry reachable under `key` (canonical or alias) and
    /// purge every alias that pointed to it.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V, Error>
    where
        Q: AsKeyRef + ?Sized,
    {
        let q = key.as_key_ref();
        let id = match self.store.resolve(q) {
            Some(id) => id,
            None => return Err(Error::KeyNotFound(q.to_key())),
        };
        match self.store.remove_entry(id) {
            Some((_, value)) => Ok(value),
            None => Err(Error::KeyNotFound(q.to_key())),
        }
    }

    /// The canonical key that `key` resolves to.
    pub fn resolve_key<Q>(&self, key: &Q) -> Result<&Key, Error>
    where
        Q: AsKeyRef + ?Sized,
    {
        let q = key.as_key_ref();
        match self.store.resolve(q).and_then(|id| self.store.entry(id)) {
            Some(slot) => Ok(&slot.key),
            None => Err(Error::KeyNotFound(q.to_key())),
        }
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &V)> + '_ {
        self.store
            .entries_in_order()
            .map(|(_, slot)| (&slot.key, &slot.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Every registered alias, canonical keys included, in registration
    /// order.
    pub fn aliases(&self) -> impl Iterator<Item = &Key> + '_ {
        self.store.aliases_in_order().map(|slot| &slot.alias)
    }

    /// Every alias resolving to the same entry as `key`, in registration
    /// order; the canonical key comes first.
    pub fn aliases_of<Q>(&self, key: &Q) -> Result<Vec<&Key>, Error>
    where
        Q: AsKeyRef + ?Sized,
    {
        let q = key.as_key_ref();
        match self.store.resolve(q) {
            Some(id) => Ok(self
                .store
                .aliases_in_order()
                .filter(|slot| slot.target == id)
                .map(|slot| &slot.alias)
                .collect()),
            None => Err(Error::KeyNotFound(q.to_key())),
        }
    }

    pub fn add_alias<Q>(&mut self, key: &Q, alias: impl Into<Key>) -> Result<(), Error>
    where
        Q: AsKeyRef + ?Sized,
    {
        self.add_aliases(key, [alias.into()])
    }

    /// Register each alias, and each alias's own derived spellings, onto
    /// the entry `key` resolves to.
    ///
    /// Derivation always runs in full here, whatever the ambient
    /// expansion mode says. A collision with an alias owned by a
    /// different entry fails before anything is registered; an alias
    /// already owned by the same entry is a no-op.
    pub fn add_aliases<Q, I, A>(&mut self, key: &Q, aliases: I) -> Result<(), Error>
    where
        Q: AsKeyRef + ?Sized,
        I: IntoIterator<Item = A>,
        A: Into<Key>,
    {
        let q = key.as_key_ref();
        let target = match self.store.resolve(q) {
            Some(id) => id,
            None => return Err(Error::KeyNotFound(q.to_key())),
        };
        let mut spellings = Vec::new();
        for alias in aliases {
            spellings.extend(aliases_for(&alias.into(), true));
        }
        for alias in &spellings {
            if let Some(existing) = self.store.resolve(alias.as_key_ref()) {
                if existing != target {
                    return Err(self.collision(alias.clone(), existing));
                }
            }
        }
        for alias in spellings {
            let _ = self.store.register_alias(alias, target);
        }
        Ok(())
    }

    /// Remove a registered alias.
    ///
    /// Canonical keys are rejected: an entry can only go away through
    /// [`AliasMap::remove`]. With expansion enabled the removal cascades
    /// to every other registered spelling the deriver generates from this
    /// one, canonical keys excepted; with it disabled only the given
    /// alias is removed.
    pub fn remove_alias<Q>(&mut self, alias: &Q) -> Result<(), Error>
    where
        Q: AsKeyRef + ?Sized,
    {
        let q = alias.as_key_ref();
        let id = match self.store.find_alias(q) {
            Some(id) => id,
            None => return Err(Error::AliasNotFound(q.to_key())),
        };
        if self.store.is_canonical_alias(id) {
            return Err(Error::AliasIsCanonicalKey(q.to_key()));
        }
        let removed = match self.store.unregister_alias(id) {
            Some(slot) => slot,
            None => return Err(Error::AliasNotFound(q.to_key())),
        };
        if expand::enabled() {
            for sibling in aliases_for(&removed.alias, true).into_iter().skip(1) {
                if let Some(sid) = self.store.find_alias(sibling.as_key_ref()) {
                    if !self.store.is_canonical_alias(sid) {
                        self.store.unregister_alias(sid);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn remove_aliases<I, A>(&mut self, aliases: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = A>,
        A: Into<Key>,
    {
        for alias in aliases {
            let alias = alias.into();
            self.remove_alias(&alias)?;
        }
        Ok(())
    }

    /// Attribute-style read: direct attributes first, then the item
    /// store. Failures surface as [`Error::AttributeNotFound`] with the
    /// item-level error as source.
    pub fn attr(&self, name: &str) -> Result<&V, Error> {
        if let Some(value) = self.attr_direct(name) {
            return Ok(value);
        }
        self.get(name).map_err(|e| e.into_attribute(name))
    }

    /// Attribute-style write: the same operation as
    /// [`AliasMap::insert`] with a string key.
    pub fn set_attr(&mut self, name: &str, value: V) -> Result<Option<V>, Error> {
        self.insert(name, value)
    }

    pub fn remove_attr(&mut self, name: &str) -> Result<V, Error> {
        self.remove(name).map_err(|e| e.into_attribute(name))
    }

    /// Store a value outside the item/alias system. Returns the previous
    /// value under that name, if any.
    pub fn set_attr_direct(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        for (n, v) in self.vars.iter_mut() {
            if *n == name {
                return Some(core::mem::replace(v, value));
            }
        }
        self.vars.push((name, value));
        None
    }

    pub fn attr_direct(&self, name: &str) -> Option<&V> {
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Direct attributes in insertion order.
    pub fn direct_attrs(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.vars.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Install the observer invoked after every successful write with
    /// the canonical key and the stored value. Replaces any previous
    /// observer.
    pub fn set_on_change(&mut self, observer: impl FnMut(&Key, &V) + 'static) {
        self.on_change = Some(Box::new(observer));
    }

    pub fn take_on_change(&mut self) -> Option<OnChange<V>> {
        self.on_change.take()
    }

    /// Fallible bulk insert; stops at the first collision.
    pub fn try_extend<I, K>(&mut self, items: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
    {
        for (k, v) in items {
            self.insert(k, v)?;
        }
        Ok(())
    }

    fn declare_alias(&mut self, alias: Key, target: Key) -> Result<(), Error> {
        let id = match self.store.resolve(target.as_key_ref()) {
            Some(id) => id,
            None => return Err(Error::KeyNotFound(target)),
        };
        match self.store.register_alias(alias.clone(), id) {
            Ok(()) => Ok(()),
            Err(existing) => Err(self.collision(alias, existing)),
        }
    }

    fn collision(&self, alias: Key, existing: EntryId) -> Error {
        Error::AliasCollision {
            alias,
            existing: self.store.entry_key(existing).clone(),
        }
    }

    fn notify(&mut self, id: EntryId) {
        if let Some(observer) = self.on_change.as_mut() {
            if let Some(slot) = self.store.entry(id) {
                observer(&slot.key, &slot.value);
            }
        }
    }
}

impl<V, S: BuildHasher + Default> Default for AliasMap<V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<V, K: Into<Key>> FromIterator<(K, V)> for AliasMap<V> {
    /// Panics on alias collision; [`AliasMap::from_parts`] and
    /// [`AliasMap::try_extend`] are the fallible forms.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<V, S: BuildHasher, K: Into<Key>> Extend<(K, V)> for AliasMap<V, S> {
    /// Panics on alias collision; [`AliasMap::try_extend`] is the
    /// fallible form.
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            if let Err(e) = self.insert(k, v) {
                panic!("{e}");
            }
        }
    }
}

impl<'q, V, S: BuildHasher, Q: AsKeyRef + ?Sized> Index<&'q Q> for AliasMap<V, S> {
    type Output = V;

    /// Panics when `key` is not a registered spelling.
    fn index(&self, key: &'q Q) -> &V {
        match self.get(key) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<'q, V, S: BuildHasher, Q: AsKeyRef + ?Sized> IndexMut<&'q Q> for AliasMap<V, S> {
    /// Panics when `key` is not a registered spelling. Mutations through
    /// the returned reference do not fire the on-change observer.
    fn index_mut(&mut self, key: &'q Q) -> &mut V {
        match self.get_mut(key) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

/// Equality compares item sets (canonical keys and values) and direct
/// attributes. Alias sets and observers are not part of equality.
impl<V: PartialEq, S: BuildHasher, S2: BuildHasher> PartialEq<AliasMap<V, S2>> for AliasMap<V, S> {
    fn eq(&self, other: &AliasMap<V, S2>) -> bool {
        if self.len() != other.len() || self.vars.len() != other.vars.len() {
            return false;
        }
        let items_equal = self.iter().all(|(k, v)| match other.resolve_key(k) {
            Ok(canonical) if canonical == k => {
                other.get(k).map(|ov| ov == v).unwrap_or(false)
            }
            _ => false,
        });
        items_equal
            && self
                .vars
                .iter()
                .all(|(name, v)| other.attr_direct(name).map(|ov| ov == v).unwrap_or(false))
    }
}

/// Machine-oriented rendering: the three parts accepted by
/// [`AliasMap::from_parts`]. Aliases are listed only where the alias is
/// not itself a canonical key.
impl<V: fmt::Debug, S: BuildHasher> fmt::Debug for AliasMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AliasMap(")?;
        f.debug_map().entries(self.iter()).finish()?;
        f.write_str(", aliases: ")?;
        f.debug_map()
            .entries(self.store.aliases_in_order().filter_map(|slot| {
                let entry = self.store.entry(slot.target)?;
                if entry.key == slot.alias {
                    None
                } else {
                    Some((&slot.alias, &entry.key))
                }
            }))
            .finish()?;
        f.write_str(", vars: ")?;
        f.debug_map()
            .entries(self.vars.iter().map(|(n, v)| (n, v)))
            .finish()?;
        f.write_str(")")
    }
}

/// Human-oriented rendering: one line per item listing every registered
/// index spelling, then every attribute spelling, then the value; direct
/// attributes follow.
impl<V: fmt::Debug, S: BuildHasher> fmt::Display for AliasMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AliasMap:")?;
        for (id, slot) in self.store.entries_in_order() {
            f.write_str("\n    ")?;
            for alias in self.store.aliases_in_order().filter(|a| a.target == id) {
                write!(f, "m[{:?}] == ", alias.alias)?;
            }
            for alias in self.store.aliases_in_order().filter(|a| a.target == id) {
                if let Key::Str(name) = &alias.alias {
                    if is_identifier(name) {
                        write!(f, "m.{name} == ")?;
                    }
                }
            }
            write!(f, "{:?}", slot.value)?;
        }
        for (name, value) in &self.vars {
            write!(f, "\n    m.{name} == {value:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: the canonical key is its own first alias.
    #[test]
    fn canonical_key_is_first_alias() {
        let mut m: AliasMap<i32> = AliasMap::new();
        m.insert("two words", 5).unwrap();
        let aliases = m.aliases_of("two words").unwrap();
        assert_eq!(aliases[0], &Key::Str("two words".into()));
        assert!(aliases.contains(&&Key::Str("two_words".into())));
    }

    /// Invariant: a failed insert leaves the map unchanged.
    #[test]
    fn colliding_insert_is_atomic() {
        let mut m: AliasMap<i32> = AliasMap::new();
        m.insert("a b", 1).unwrap();
        // "a-b" derives "a_b", which already belongs to "a b".
        let err = m.insert("a-b", 2).unwrap_err();
        assert!(matches!(err, Error::AliasCollision { .. }));
        assert_eq!(m.len(), 1);
        assert!(!m.contains("a-b"));
        assert_eq!(m["a_b"], 1);
    }

    /// Assignment through an alias updates the existing entry.
    #[test]
    fn write_through_alias_redirects() {
        let mut m: AliasMap<i32> = AliasMap::new();
        m.insert("two words", 5).unwrap();
        let old = m.insert("two_words", 6).unwrap();
        assert_eq!(old, Some(5));
        assert_eq!(m.len(), 1);
        assert_eq!(m["two words"], 6);
    }

    #[test]
    fn unresolvable_mutations_report_the_query() {
        let mut m: AliasMap<i32> = AliasMap::new();
        match m.remove("ghost") {
            Err(Error::KeyNotFound(k)) => assert_eq!(k, Key::Str("ghost".into())),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(m.get_mut(&7).is_err());
    }
}
