//! Key domain: a closed set of hashable key shapes with numeric
//! unification.
//!
//! Integer-like keys are unified: `Key::Bool(true)`, `Key::Int(1)` and
//! `Key::Float(1.0)` are the same key for every lookup. Non-integral
//! floats compare and hash by bit pattern, so `-0.0` (integral) equals
//! `0` while `f64::NAN` is a usable, self-equal key.

use core::fmt;
use core::hash::{Hash, Hasher};

/// A canonical or alias key.
#[derive(Clone)]
pub enum Key {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

/// Borrowed view of a [`Key`]; string lookups go through this so they
/// never allocate.
#[derive(Clone, Copy)]
pub enum KeyRef<'a> {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(&'a str),
}

/// Anything that can be viewed as a [`KeyRef`] for lookups.
///
/// Lookup methods take `&Q where Q: AsKeyRef + ?Sized`, so callers pass
/// `&5`, `&true`, `"name"` or `&key` interchangeably.
pub trait AsKeyRef {
    fn as_key_ref(&self) -> KeyRef<'_>;
}

// 2^63 as an exact f64; floats in [-2^63, 2^63) convert to i64 losslessly
// once known integral.
const I64_SPAN: f64 = 9_223_372_036_854_775_808.0;

impl Key {
    /// The exact integer value of an integer-like key.
    ///
    /// `Int` and `Bool` always qualify; a `Float` qualifies when its value
    /// is integral and in `i64` range. `Str` never does.
    pub fn as_int(&self) -> Option<i64> {
        self.as_key_ref().as_int()
    }

    /// True when the key is textual (`Str`).
    pub fn is_str(&self) -> bool {
        matches!(self, Key::Str(_))
    }
}

impl<'a> KeyRef<'a> {
    /// See [`Key::as_int`].
    pub fn as_int(self) -> Option<i64> {
        match self {
            KeyRef::Int(n) => Some(n),
            KeyRef::Bool(b) => Some(b as i64),
            KeyRef::Float(f) => {
                if f.fract() == 0.0 && (-I64_SPAN..I64_SPAN).contains(&f) {
                    Some(f as i64)
                } else {
                    None
                }
            }
            KeyRef::Str(_) => None,
        }
    }

    /// Clone into an owned [`Key`].
    pub fn to_key(self) -> Key {
        match self {
            KeyRef::Int(n) => Key::Int(n),
            KeyRef::Float(f) => Key::Float(f),
            KeyRef::Bool(b) => Key::Bool(b),
            KeyRef::Str(s) => Key::Str(s.to_string()),
        }
    }
}

impl PartialEq for KeyRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_int(), other.as_int()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => match (*self, *other) {
                (KeyRef::Float(a), KeyRef::Float(b)) => a.to_bits() == b.to_bits(),
                (KeyRef::Str(a), KeyRef::Str(b)) => a == b,
                _ => false,
            },
            _ => false,
        }
    }
}

impl Eq for KeyRef<'_> {}

impl Hash for KeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with Eq: every integer-like key hashes through its
        // integer value, whatever the variant.
        match self.as_int() {
            Some(n) => {
                state.write_u8(0);
                n.hash(state);
            }
            None => match *self {
                KeyRef::Float(f) => {
                    state.write_u8(1);
                    f.to_bits().hash(state);
                }
                KeyRef::Str(s) => {
                    state.write_u8(2);
                    s.hash(state);
                }
                // Int and Bool are always integer-like.
                KeyRef::Int(_) | KeyRef::Bool(_) => {}
            },
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.as_key_ref() == other.as_key_ref()
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key_ref().hash(state)
    }
}

impl fmt::Display for KeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::Int(n) => write!(f, "{n}"),
            KeyRef::Float(x) => write!(f, "{x}"),
            KeyRef::Bool(b) => write!(f, "{b}"),
            KeyRef::Str(s) => f.write_str(s),
        }
    }
}

impl fmt::Debug for KeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::Str(s) => write!(f, "{s:?}"),
            other => write!(f, "{other}"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_key_ref(), f)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_key_ref(), f)
    }
}

impl AsKeyRef for Key {
    fn as_key_ref(&self) -> KeyRef<'_> {
        match self {
            Key::Int(n) => KeyRef::Int(*n),
            Key::Float(f) => KeyRef::Float(*f),
            Key::Bool(b) => KeyRef::Bool(*b),
            Key::Str(s) => KeyRef::Str(s),
        }
    }
}

impl AsKeyRef for KeyRef<'_> {
    fn as_key_ref(&self) -> KeyRef<'_> {
        *self
    }
}

impl AsKeyRef for str {
    fn as_key_ref(&self) -> KeyRef<'_> {
        KeyRef::Str(self)
    }
}

impl AsKeyRef for String {
    fn as_key_ref(&self) -> KeyRef<'_> {
        KeyRef::Str(self)
    }
}

impl AsKeyRef for i64 {
    fn as_key_ref(&self) -> KeyRef<'_> {
        KeyRef::Int(*self)
    }
}

impl AsKeyRef for i32 {
    fn as_key_ref(&self) -> KeyRef<'_> {
        KeyRef::Int(i64::from(*self))
    }
}

impl AsKeyRef for u32 {
    fn as_key_ref(&self) -> KeyRef<'_> {
        KeyRef::Int(i64::from(*self))
    }
}

impl AsKeyRef for bool {
    fn as_key_ref(&self) -> KeyRef<'_> {
        KeyRef::Bool(*self)
    }
}

impl AsKeyRef for f64 {
    fn as_key_ref(&self) -> KeyRef<'_> {
        KeyRef::Float(*self)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n as i64)
    }
}

impl From<u32> for Key {
    fn from(n: u32) -> Self {
        Key::Int(n as i64)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<f64> for Key {
    fn from(f: f64) -> Self {
        Key::Float(f)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<KeyRef<'_>> for Key {
    fn from(r: KeyRef<'_>) -> Self {
        r.to_key()
    }
}
