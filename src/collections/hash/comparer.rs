use std::fmt::{self, Debug, Formatter};
use std::hash::{BuildHasher, DefaultHasher, Hash, Hasher, RandomState};

#[cfg(feature = "serde")]
use serde::de::{self, Unexpected, Visitor};
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Decides how keys of type `Q` are hashed and compared for equality.
///
/// A collection holds exactly one comparer for its whole lifetime, and routes every key comparison
/// through it. Implementations must be consistent: if `key_eq(a, b)` is true, then
/// `hash_key(a) == hash_key(b)` must hold too.
///
/// When a collection stores keys of type `K` but is queried with a borrowed form `Q` (`K:
/// Borrow<Q>`), the comparer must hash `k` and `k.borrow()` identically. Both comparers in this
/// module do.
pub trait Comparer<Q: ?Sized> {
    /// Produces the hash of `key`.
    fn hash_key(&self, key: &Q) -> u64;

    /// Returns true if `a` and `b` are the same key.
    fn key_eq(&self, a: &Q, b: &Q) -> bool;
}

/// Compares keys by their own [`Hash`] and [`Eq`] implementations, hashing through `B`.
#[derive(Clone, Default)]
pub struct DefaultComparer<B: BuildHasher = RandomState> {
    pub(crate) hasher: B,
}

impl<B: BuildHasher> DefaultComparer<B> {
    /// Creates a DefaultComparer which hashes using `hasher`.
    pub const fn with_hasher(hasher: B) -> DefaultComparer<B> {
        DefaultComparer {
            hasher,
        }
    }

    /// Returns a reference to the [`BuildHasher`] used by this comparer.
    pub const fn hasher(&self) -> &B {
        &self.hasher
    }
}

impl<Q: Hash + Eq + ?Sized, B: BuildHasher> Comparer<Q> for DefaultComparer<B> {
    fn hash_key(&self, key: &Q) -> u64 {
        self.hasher.hash_one(key)
    }

    fn key_eq(&self, a: &Q, b: &Q) -> bool {
        a == b
    }
}

impl<B: BuildHasher> Debug for DefaultComparer<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // RandomState's keys aren't worth printing.
        f.debug_struct("DefaultComparer").finish_non_exhaustive()
    }
}

/// Compares string-like keys while ignoring ASCII case, so `"Key"`, `"KEY"` and `"key"` are all
/// the same key. Non-ASCII characters are compared exactly.
///
/// The hash is computed from the lowercased bytes with a fixed-key hasher, so every instance in a
/// program hashes the same key the same way. The hash values may change between Rust releases, so
/// they shouldn't be persisted.
///
/// # Examples
/// ```
/// # use ordered_collections::collections::hash::AsciiCaseInsensitive;
/// # use ordered_collections::collections::ordered::OrderedMap;
/// let mut map = OrderedMap::with_comparer(AsciiCaseInsensitive);
/// map.add("Content-Type", "text/html").unwrap();
/// assert_eq!(map.get("content-type"), Some(&"text/html"));
/// assert!(map.add("CONTENT-TYPE", "text/plain").is_err());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AsciiCaseInsensitive;

impl<Q: AsRef<str> + ?Sized> Comparer<Q> for AsciiCaseInsensitive {
    fn hash_key(&self, key: &Q) -> u64 {
        let mut hasher = DefaultHasher::new();
        for byte in key.as_ref().bytes() {
            hasher.write_u8(byte.to_ascii_lowercase());
        }
        // Terminate like str's own Hash does, so prefixes don't collide structurally.
        hasher.write_u8(0xff);
        hasher.finish()
    }

    fn key_eq(&self, a: &Q, b: &Q) -> bool {
        a.as_ref().eq_ignore_ascii_case(b.as_ref())
    }
}

// Comparers are written as their name, which is checked when reading one back, so a snapshot
// can't silently change how its keys compare. The hasher state of a DefaultComparer (usually
// random keys) isn't meaningful outside of the process, so reading one back builds a fresh hasher.
#[cfg(feature = "serde")]
impl<B: BuildHasher> Serialize for DefaultComparer<B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(DEFAULT_COMPARER)
    }
}

#[cfg(feature = "serde")]
impl<'de, B: BuildHasher + Default> Deserialize<'de> for DefaultComparer<B> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(ComparerName(DEFAULT_COMPARER))?;
        Ok(DefaultComparer::default())
    }
}

#[cfg(feature = "serde")]
impl Serialize for AsciiCaseInsensitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(ASCII_CASE_INSENSITIVE)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for AsciiCaseInsensitive {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(ComparerName(ASCII_CASE_INSENSITIVE))?;
        Ok(AsciiCaseInsensitive)
    }
}

#[cfg(feature = "serde")]
const DEFAULT_COMPARER: &str = "DefaultComparer";
#[cfg(feature = "serde")]
const ASCII_CASE_INSENSITIVE: &str = "AsciiCaseInsensitive";

/// Accepts exactly the contained comparer name.
#[cfg(feature = "serde")]
struct ComparerName(&'static str);

#[cfg(feature = "serde")]
impl Visitor<'_> for ComparerName {
    type Value = ();

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "the comparer name {:?}", self.0)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v == self.0 {
            Ok(())
        } else {
            Err(E::invalid_value(Unexpected::Str(v), &self))
        }
    }
}
