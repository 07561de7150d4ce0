#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{MissingEntriesError, OrderedMap, SnapshotError};
use crate::collections::hash::Comparer;

/// The flat, serializable form of an [`OrderedMap`]: its original capacity hint, its comparer and
/// its entries in positional order.
///
/// A snapshot is plain data. It can be written out with any serde format (with the `serde`
/// feature), edited or constructed by hand, and turned back into a map with
/// [`OrderedMap::restore`]. `entries` is optional so that a snapshot read from an incomplete source
/// can be represented; restoring one without entries fails.
///
/// # Examples
/// ```
/// # use ordered_collections::collections::hash::AsciiCaseInsensitive;
/// # use ordered_collections::collections::ordered::{OrderedMap, map::Snapshot};
/// let mut map = OrderedMap::with_comparer(AsciiCaseInsensitive);
/// map.add("Accept", "*/*").unwrap();
/// map.add("Host", "localhost").unwrap();
///
/// let json = serde_json::to_string(&map.snapshot()).unwrap();
/// let snapshot: Snapshot<String, String, AsciiCaseInsensitive> = serde_json::from_str(&json).unwrap();
/// let restored = OrderedMap::restore(snapshot).unwrap();
///
/// assert_eq!(restored.key_at(1).map(String::as_str), Ok("Host"));
/// assert_eq!(restored.get("HOST").map(String::as_str), Some("localhost"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot<K, V, C> {
    /// The capacity the map was originally created with.
    pub cap_hint: usize,
    /// The comparer the map used for its keys.
    pub comparer: C,
    /// The entries of the map in positional order.
    pub entries: Option<Vec<(K, V)>>,
}

impl<K: Clone, V: Clone, C: Clone> OrderedMap<K, V, C> {
    /// Captures the current contents of the map as a [`Snapshot`], cloning every key and value.
    pub fn snapshot(&self) -> Snapshot<K, V, C> {
        Snapshot {
            cap_hint: self.cap_hint,
            comparer: self.comparer.clone(),
            entries: Some(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        }
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    /// Consumes the map and returns its contents as a [`Snapshot`].
    pub fn into_snapshot(self) -> Snapshot<K, V, C> {
        Snapshot {
            cap_hint: self.cap_hint,
            comparer: self.comparer,
            entries: Some(self.entries.into_iter().map(|b| b.into_pair()).collect()),
        }
    }
}

impl<K, V, C: Comparer<K>> OrderedMap<K, V, C> {
    /// Rebuilds a map from a [`Snapshot`] by adding each saved entry in order with the saved
    /// comparer. The restored map has a fresh version.
    ///
    /// # Errors
    /// - [`SnapshotError::MissingEntries`] if the snapshot has no entry list.
    /// - [`SnapshotError::DuplicateKey`] if two saved keys are equal under the comparer.
    /// - [`SnapshotError::CapacityOverflow`] if the saved capacity hint can't be allocated.
    pub fn restore(snapshot: Snapshot<K, V, C>) -> Result<OrderedMap<K, V, C>, SnapshotError> {
        let entries = snapshot.entries.ok_or(MissingEntriesError)?;

        log::trace!(
            "restoring map from snapshot with {} entries (capacity hint {})",
            entries.len(),
            snapshot.cap_hint,
        );

        let mut map = OrderedMap::try_with_cap_and_comparer(snapshot.cap_hint, snapshot.comparer)?;
        map.try_reserve(entries.len())?;

        for (key, value) in entries {
            map.add(key, value)?;
        }

        // Replaying adds counts as modification, but a restored map is new.
        map.version = 0;
        Ok(map)
    }
}
