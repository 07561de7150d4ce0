#![cfg(test)]

use std::fmt::Debug;

use super::*;
use crate::collections::hash::{AsciiCaseInsensitive, Comparer, DefaultComparer};
use crate::collections::traits::map::{MapMut, MapRead, OrderedMut, OrderedRead};
use crate::util::drop::DropCounter;
use crate::util::hash::{BadHasherBuilder, ManualHash};
use crate::util::panic::assert_panics;

/// Checks that the entries and the index table agree with each other.
fn check_invariants<K: Debug, V, C: Comparer<K>>(map: &OrderedMap<K, V, C>) {
    assert_eq!(
        map.indices.len(),
        map.entries.len(),
        "The index table should hold exactly one position per entry."
    );

    let mut seen = vec![false; map.len()];
    for index in map.indices.slots.iter().flatten() {
        assert!(*index < map.len(), "Slot holds position {index}, which is out of bounds.");
        assert!(!seen[*index], "Position {index} is stored in more than one slot.");
        seen[*index] = true;
    }

    for (index, bucket) in map.entries.iter().enumerate() {
        assert_eq!(
            bucket.hash,
            map.comparer.hash_key(&bucket.key),
            "The cached hash of {:?} is stale.",
            bucket.key
        );
        assert_eq!(
            map.find_hashed(bucket.hash, &bucket.key),
            Some(index),
            "{:?} should be found at its own position.",
            bucket.key
        );
    }
}

fn keys<K: Clone, V, C>(map: &OrderedMap<K, V, C>) -> Vec<K> {
    map.keys().cloned().collect()
}

#[test]
fn test_order_preservation() {
    let mut map = OrderedMap::new();
    map.add("k1", 1).unwrap();
    map.add("k2", 2).unwrap();

    assert_eq!(map.key_at(0), Ok(&"k1"), "The first added key should be at position 0.");
    assert_eq!(map.key_at(1), Ok(&"k2"), "The second added key should be at position 1.");
    check_invariants(&map);
}

#[test]
fn test_set_preserves_position() {
    let mut map = OrderedMap::new();
    map.add("a", 1).unwrap();
    map.add("b", 2).unwrap();
    let version = map.version();

    assert_eq!(map.set("a", 9), Some(1), "Setting an existing key should return the old value.");
    assert_eq!(map.key_at(0), Ok(&"a"), "Setting an existing key shouldn't move it.");
    assert_eq!(map[0], 9);
    assert_eq!(map.len(), 2);
    assert_ne!(map.version(), version, "Replacing a value by key should change the version.");

    let version = map.version();
    assert_eq!(map.set("c", 3), None);
    assert_eq!(map.key_at(2), Ok(&"c"), "Setting a new key should append it.");
    assert_ne!(map.version(), version, "Appending through set should change the version.");
    check_invariants(&map);
}

#[test]
fn test_duplicate_rejection() {
    let mut map = OrderedMap::new();
    map.add("a", 1).unwrap();
    let version = map.version();

    assert_eq!(
        map.add("a", 2),
        Err(DuplicateKeyError { index: 0 }),
        "Adding a duplicate key should fail and report the existing position."
    );
    assert_eq!(map["a"], 1, "A failed add shouldn't change the existing value.");
    assert_eq!(map.len(), 1);
    assert_eq!(map.version(), version, "A failed add shouldn't change the version.");

    assert_eq!(
        OrderedMap::try_from([("x", 1), ("y", 2), ("x", 3)]),
        Err(DuplicateKeyError { index: 0 }),
        "Building a map from a source with duplicates should fail."
    );
}

#[test]
fn test_insert_shift() {
    let mut map = OrderedMap::new();
    map.add("a", 1).unwrap();
    map.add("b", 2).unwrap();
    map.insert_at(0, "c", 3).unwrap();

    assert_eq!(keys(&map), ["c", "a", "b"], "Inserting at 0 should shift existing entries up.");
    assert_eq!(map.get_index_of("a"), Some(1));
    assert_eq!(map.get_index_of("b"), Some(2));
    check_invariants(&map);

    map.insert_at(3, "d", 4).unwrap();
    assert_eq!(keys(&map), ["c", "a", "b", "d"], "Inserting at len should append.");
    assert_eq!(
        map.insert_at(1, "a", 0),
        Err(InsertError::DuplicateKey(DuplicateKeyError { index: 1 })),
    );
    check_invariants(&map);
}

#[test]
fn test_remove_shift() {
    let mut map = OrderedMap::new();
    map.add("a", 1).unwrap();
    map.add("b", 2).unwrap();
    map.add("c", 3).unwrap();

    assert_eq!(map.remove_at(1), Ok(("b", 2)));
    assert_eq!(keys(&map), ["a", "c"], "Removing should shift following entries down.");
    assert_eq!(map.get_index_of("c"), Some(1), "The shifted entry should be found at its new position.");
    assert!(!map.contains_key("b"));
    check_invariants(&map);

    assert_eq!(map.remove_entry("a"), Some(("a", 1)));
    assert_eq!(keys(&map), ["c"]);
    check_invariants(&map);
}

#[test]
fn test_boundaries() {
    let mut map = OrderedMap::try_from([("a", 1), ("b", 2), ("c", 3)]).unwrap();
    let version = map.version();
    let oob = |index| IndexOutOfBounds { index, len: 3 };

    for index in [usize::MAX, 3] {
        assert_eq!(map.get_at(index), Err(oob(index)), "get_at({index}) should be out of bounds.");
        assert_eq!(map.key_at(index), Err(oob(index)), "key_at({index}) should be out of bounds.");
        assert_eq!(map.set_at(index, 0), Err(oob(index)), "set_at({index}) should be out of bounds.");
        assert_eq!(map.remove_at(index), Err(oob(index)), "remove_at({index}) should be out of bounds.");
        assert_eq!(map.get_index(index), None);
    }
    for index in [usize::MAX, 4] {
        assert_eq!(
            map.insert_at(index, "z", 0),
            Err(InsertError::IndexOutOfBounds(oob(index))),
            "insert_at({index}) should be out of bounds."
        );
    }
    assert_eq!(map.version(), version, "Failed positional operations shouldn't change the map.");
    assert_eq!(keys(&map), ["a", "b", "c"]);

    assert_eq!(map.get_at(0), Ok(&1));
    assert_eq!(map.get_at(2), Ok(&3));
    assert_eq!(map.key_at(2), Ok(&"c"));
    assert_eq!(map.set_at(2, 30), Ok(3));
    assert_eq!(map.insert_at(3, "d", 4), Ok(()));
    assert_eq!(map.remove_at(3), Ok(("d", 4)));
    assert_eq!(map.remove_at(0), Ok(("a", 1)));
    check_invariants(&map);
}

#[test]
fn test_idempotent_remove() {
    let mut map = OrderedMap::try_from([("a", 1), ("b", 2)]).unwrap();
    let version = map.version();

    assert_eq!(map.remove("x"), None, "Removing an absent key should report nothing removed.");
    assert_eq!(map.remove("x"), None, "Removing an absent key twice should be safe.");
    assert_eq!(map.version(), version, "Removing an absent key shouldn't change the map.");

    assert_eq!(map.remove("a"), Some(1));
    assert_eq!(map.remove("a"), None, "The second removal of a key should be a no-op.");
    assert_eq!(keys(&map), ["b"]);
    check_invariants(&map);
}

#[test]
fn test_cursor_concurrent_modification() {
    let mut map = OrderedMap::try_from([("a", 1), ("b", 2), ("c", 3)]).unwrap();
    let mut cursor = map.cursor();

    assert_eq!(cursor.advance(&map), Some(Ok((&"a", &1))));
    assert_eq!(cursor.index(), Some(0));

    // Mutable access to a value leaves the version alone, so the cursor carries on.
    *map.get_mut("b").unwrap() = 20;
    assert_eq!(cursor.advance(&map), Some(Ok((&"b", &20))));

    // Replacing by key counts the same as replacing by position.
    let before = map.version();
    map.set("a", 10);
    assert_eq!(
        cursor.advance(&map),
        Some(Err(ConcurrentModificationError { expected: before, found: map.version() })),
        "Advancing after a keyed set should report the modification."
    );
    cursor.reset(&map);
    assert_eq!(cursor.advance(&map), Some(Ok((&"a", &10))));
    assert_eq!(cursor.advance(&map), Some(Ok((&"b", &20))));

    let before = map.version();
    map.add("d", 4).unwrap();
    let error = ConcurrentModificationError {
        expected: before,
        found: map.version(),
    };
    assert_eq!(
        cursor.advance(&map),
        Some(Err(error)),
        "Advancing after an add should report the modification."
    );
    assert_eq!(
        cursor.advance(&map),
        Some(Err(error)),
        "A cursor should keep failing until it is reset."
    );

    cursor.reset(&map);
    assert_eq!(cursor.index(), None);
    let visited: Vec<_> = std::iter::from_fn(|| cursor.advance(&map))
        .map(|r| r.map(|(k, _)| *k))
        .collect();
    assert_eq!(visited, [Ok("a"), Ok("b"), Ok("c"), Ok("d")]);
    assert_eq!(cursor.advance(&map), None, "An exhausted cursor should stay exhausted.");
}

#[test]
fn test_version_changes() {
    let mut map = OrderedMap::new();
    let mut last = map.version();
    let mut assert_bumped = |version: u64, what: &str, expected: bool| {
        assert_eq!(version != last, expected, "Unexpected version change after {what}.");
        last = version;
    };

    map.add("a", 1).unwrap();
    assert_bumped(map.version(), "add", true);
    map.add("b", 2).unwrap();
    assert_bumped(map.version(), "add", true);
    map.set("a", 3);
    assert_bumped(map.version(), "set of an existing key", true);
    *map.get_mut("a").unwrap() += 1;
    assert_bumped(map.version(), "get_mut", false);
    map.values_mut().for_each(|v| *v *= 2);
    assert_bumped(map.version(), "values_mut", false);
    map[0] = 7;
    assert_bumped(map.version(), "IndexMut", false);
    map.set_at(0, 8).unwrap();
    assert_bumped(map.version(), "set_at", true);
    map.retain(|_, _| true);
    assert_bumped(map.version(), "retain that keeps everything", false);
    map.swap_indices(0, 1).unwrap();
    assert_bumped(map.version(), "swap_indices", true);
    map.reverse();
    assert_bumped(map.version(), "reverse", true);
    map.clear();
    assert_bumped(map.version(), "clear", true);
}

#[test]
fn test_hash_collisions() {
    let mut map = OrderedMap::with_comparer(DefaultComparer::with_hasher(BadHasherBuilder));
    map.add(ManualHash::new(0, "zero"), 0).unwrap();
    map.add(ManualHash::new(0, "one"), 1).unwrap();
    map.add(ManualHash::new(2, "two"), 2).unwrap();
    map.add(ManualHash::new(0, "three"), 3).unwrap();
    map.add(ManualHash::new(2, "four"), 4).unwrap();
    map.add(ManualHash::new(1, "five"), 5).unwrap();
    check_invariants(&map);

    map.remove(&ManualHash::new(0, "zero"));
    map.remove(&ManualHash::new(2, "two"));
    check_invariants(&map);

    assert_eq!(
        map.keys().map(|k| *k.value()).collect::<Vec<_>>(),
        ["one", "three", "four", "five"],
        "OrderedMap should handle hash collisions so that no entries are lost during removal."
    );
    for (index, key) in map.keys().enumerate() {
        assert_eq!(map.get_index_of(key), Some(index), "Every colliding key should still be found.");
    }

    let mut map = OrderedMap::with_cap_and_comparer(6, DefaultComparer::with_hasher(BadHasherBuilder));
    assert_eq!(map.indices.slot_count(), 8);
    map.add(ManualHash::new(7, "zero"), 0).unwrap();
    map.add(ManualHash::new(7, "one"), 1).unwrap();
    map.add(ManualHash::new(1, "two"), 2).unwrap();
    map.add(ManualHash::new(7, "three"), 3).unwrap();

    map.remove(&ManualHash::new(7, "zero"));
    check_invariants(&map);

    assert_eq!(
        map.into_keys().map(|k| *k.value()).collect::<Vec<_>>(),
        ["one", "two", "three"],
        "Hash collisions should be handled in a wrapping manner."
    );
}

#[test]
fn test_swap_remove_and_reorder() {
    let mut map = OrderedMap::try_from([("a", 1), ("b", 2), ("c", 3), ("d", 4)]).unwrap();

    assert_eq!(map.swap_remove("b"), Some(2));
    assert_eq!(keys(&map), ["a", "d", "c"], "swap_remove should move the last entry into the gap.");
    check_invariants(&map);

    map.move_index(2, 0).unwrap();
    assert_eq!(keys(&map), ["c", "a", "d"]);
    check_invariants(&map);

    map.move_index(0, 2).unwrap();
    assert_eq!(keys(&map), ["a", "d", "c"]);
    check_invariants(&map);

    map.swap_indices(0, 2).unwrap();
    assert_eq!(keys(&map), ["c", "d", "a"]);
    check_invariants(&map);

    assert_eq!(map.move_index(0, 3), Err(IndexOutOfBounds { index: 3, len: 3 }));
    assert_eq!(map.swap_remove_at(2), Ok(("a", 1)));
    assert_eq!(map.swap_remove_at(2), Err(IndexOutOfBounds { index: 2, len: 2 }));
    check_invariants(&map);
}

#[test]
fn test_retain_sort_reverse() {
    let mut map: OrderedMap<u32, u32> = (0..20).map(|i| (i * 7 % 20, i)).collect();

    map.retain(|_, v| *v % 2 == 0);
    assert_eq!(map.len(), 10);
    assert!(map.values().all(|v| v % 2 == 0), "retain should drop every rejected entry.");
    check_invariants(&map);

    map.sort_keys();
    assert!(map.keys().is_sorted(), "sort_keys should order entries by key.");
    check_invariants(&map);

    map.reverse();
    assert!(map.keys().rev().is_sorted(), "reverse should invert the order.");
    check_invariants(&map);

    map.sort_by(|_, v1, _, v2| v1.cmp(v2));
    assert!(map.values().is_sorted(), "sort_by should order entries by the comparison.");
    check_invariants(&map);
}

#[test]
fn test_panicking_closures_leave_map_usable() {
    let mut map: OrderedMap<u32, u32> = (0..10).map(|i| (i, i)).collect();
    let version = map.version();

    assert_panics!(
        {
            map.retain(|k, _| {
                assert!(*k != 5, "give up half way");
                k % 2 == 0
            });
        },
        "retain should pass on the closure's panic."
    );
    assert_eq!(keys(&map), [0, 2, 4, 5, 6, 7, 8, 9], "Entries past the panic should be kept.");
    assert_ne!(map.version(), version, "A retain that removed entries should change the version.");
    check_invariants(&map);
    assert_eq!(map.get(&9), Some(&9), "Lookups should see the shifted positions.");
    assert_eq!(map.get(&1), None);

    let mut calls = 0;
    assert_panics!(
        {
            map.sort_by(|k1, _, k2, _| {
                calls += 1;
                assert!(calls < 4, "give up part way");
                k2.cmp(k1)
            });
        },
        "sort_by should pass on the closure's panic."
    );
    check_invariants(&map);
    assert_eq!(map.len(), 8);
    for key in [0, 2, 4, 5, 6, 7, 8, 9] {
        assert_eq!(map.get(&key), Some(&key), "{key} should still be reachable after the panic.");
    }
}

#[test]
fn test_ascii_case_insensitive() {
    let mut map = OrderedMap::with_comparer(AsciiCaseInsensitive);
    map.add(String::from("Content-Type"), 1).unwrap();
    map.add(String::from("Accept"), 2).unwrap();

    assert!(map.contains_key("content-type"));
    assert_eq!(map.get("ACCEPT"), Some(&2));
    assert_eq!(
        map.add(String::from("CONTENT-TYPE"), 3),
        Err(DuplicateKeyError { index: 0 }),
        "Keys that differ only in ASCII case should be duplicates."
    );

    assert_eq!(map.set(String::from("accept"), 4), Some(2));
    assert_eq!(
        map.key_at(1).map(String::as_str),
        Ok("Accept"),
        "Setting an existing key should keep the original key."
    );
    check_invariants(&map);
}

#[test]
#[cfg(feature = "serde")]
fn test_snapshot_round_trip() {
    let mut map = OrderedMap::new();
    for (i, word) in ["delta", "alpha", "charlie", "bravo"].into_iter().enumerate() {
        map.add(word.to_owned(), i).unwrap();
    }

    let json = serde_json::to_string(&map.snapshot()).unwrap();
    let snapshot: Snapshot<String, usize, DefaultComparer> = serde_json::from_str(&json).unwrap();
    let restored = OrderedMap::restore(snapshot).unwrap();

    assert_eq!(restored.len(), map.len());
    for index in 0..map.len() {
        assert_eq!(restored.key_at(index), map.key_at(index), "Keys should keep their positions.");
        assert_eq!(restored[index], map[index], "Values should keep their positions.");
    }
    assert!(restored.contains_key("charlie"));
    assert!(!restored.contains_key("CHARLIE"), "The default comparer is case sensitive.");
    assert_eq!(restored, map);
    assert_eq!(restored.version(), 0, "A restored map should start with a fresh version.");
    check_invariants(&restored);

    let mut map = OrderedMap::with_cap_and_comparer(8, AsciiCaseInsensitive);
    map.add(String::from("Host"), String::from("localhost")).unwrap();
    map.add(String::from("Accept"), String::from("*/*")).unwrap();

    let json = serde_json::to_string(&map.snapshot()).unwrap();
    let snapshot: Snapshot<String, String, AsciiCaseInsensitive> = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot.cap_hint, 8, "The capacity hint should be saved.");

    let restored = OrderedMap::restore(snapshot).unwrap();
    assert!(restored.contains_key("HOST"), "The comparer's behaviour should survive a round trip.");
    assert_eq!(restored.cap_hint(), 8);
    assert_eq!(OrderedMap::restore(map.into_snapshot()), Ok(restored));
}

#[test]
#[cfg(feature = "serde")]
fn test_snapshot_errors() {
    let missing: Snapshot<String, i32, DefaultComparer> =
        serde_json::from_str(r#"{"cap_hint":4,"comparer":"DefaultComparer","entries":null}"#).unwrap();
    assert_eq!(
        OrderedMap::restore(missing).map(|m| m.len()),
        Err(SnapshotError::MissingEntries(MissingEntriesError)),
        "A snapshot without entries can't be restored."
    );

    let duplicate = Snapshot {
        cap_hint: 0,
        comparer: AsciiCaseInsensitive,
        entries: Some(vec![("a", 1), ("b", 2), ("A", 3)]),
    };
    assert_eq!(
        OrderedMap::restore(duplicate).map(|m| m.len()),
        Err(SnapshotError::DuplicateKey(DuplicateKeyError { index: 0 })),
        "Restoring should reject keys that are duplicates under the saved comparer."
    );

    let mut insensitive = OrderedMap::with_comparer(AsciiCaseInsensitive);
    insensitive.add(String::from("Host"), 1).unwrap();
    let json = serde_json::to_string(&insensitive.snapshot()).unwrap();
    assert!(
        json.contains(r#""comparer":"AsciiCaseInsensitive""#),
        "The comparer should be saved by name, not as {json}."
    );
    assert!(
        serde_json::from_str::<Snapshot<String, i32, DefaultComparer>>(&json).is_err(),
        "A snapshot shouldn't restore with a different comparer than it was taken with."
    );
    let sensitive = OrderedMap::<String, i32>::new().snapshot();
    let json = serde_json::to_string(&sensitive).unwrap();
    assert!(serde_json::from_str::<Snapshot<String, i32, AsciiCaseInsensitive>>(&json).is_err());

    let huge: Snapshot<u8, u8, DefaultComparer> = Snapshot {
        cap_hint: usize::MAX,
        comparer: DefaultComparer::default(),
        entries: Some(Vec::new()),
    };
    assert!(OrderedMap::restore(huge).is_err_and(|e| e.is_capacity_overflow()));
}

#[test]
#[cfg(feature = "serde")]
fn test_map_serde() {
    let map = OrderedMap::try_from([("b", 2), ("a", 1), ("c", 3)]).unwrap();
    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"b":2,"a":1,"c":3}"#, "Maps should serialize in positional order.");

    let back: OrderedMap<String, i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(keys(&back), ["b", "a", "c"], "Maps should deserialize in document order.");

    let duplicate = serde_json::from_str::<OrderedMap<String, i32>>(r#"{"a":1,"a":2}"#);
    assert!(duplicate.is_err(), "Deserializing should reject duplicate keys.");
}

#[test]
fn test_views() {
    let map = OrderedMap::try_from([("a", 1), ("b", 2), ("c", 3)]).unwrap();

    let key_view = map.key_view();
    assert_eq!(key_view.len(), 3);
    assert_eq!(key_view[1], "b");
    assert_eq!(key_view.get(3), None);
    assert_eq!(key_view.first(), Some(&"a"));
    assert_eq!(key_view.last(), Some(&"c"));
    assert!(key_view.contains("c"));
    assert!(!key_view.contains("d"));
    assert_eq!(format!("{key_view:?}"), r#"["a", "b", "c"]"#);

    let value_view = map.value_view();
    assert_eq!(value_view[2], 3);
    assert!(value_view.contains(&2));
    assert!(!value_view.contains(&4));
    assert_eq!(value_view.into_iter().sum::<i32>(), 6);

    let read_only = map.as_read_only();
    assert_eq!(read_only.get("b"), Some(&2));
    assert_eq!(read_only.key_at(0), Ok(&"a"));
    assert_eq!(read_only.try_get("z"), Err(KeyNotFoundError));
    assert_eq!(read_only.keys().iter().copied().collect::<Vec<_>>(), ["a", "b", "c"]);
    assert_eq!(format!("{read_only:?}"), r#"{"a": 1, "b": 2, "c": 3}"#);
}

#[test]
fn test_iterators() {
    let mut map = OrderedMap::try_from([(1, 'a'), (2, 'b'), (3, 'c')]).unwrap();

    let mut iter = map.iter();
    assert_eq!(iter.len(), 3);
    assert_eq!(iter.next_back(), Some((&3, &'c')));
    assert_eq!(iter.next(), Some((&1, &'a')));
    assert_eq!(iter.len(), 1);

    for (_, value) in &mut map {
        *value = value.to_ascii_uppercase();
    }
    assert_eq!(map.values().collect::<String>(), "ABC");
    assert_eq!(map.keys().rev().copied().collect::<Vec<_>>(), [3, 2, 1]);
    assert_eq!(map.clone().into_values().collect::<String>(), "ABC");
    assert_eq!(map.into_iter().collect::<Vec<_>>(), [(1, 'A'), (2, 'B'), (3, 'C')]);
}

#[test]
fn test_extend_and_collect() {
    let mut map: OrderedMap<&str, i32> = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
    assert_eq!(keys(&map), ["a", "b"], "Collecting should keep the first position of each key.");
    assert_eq!(map["a"], 3, "Collecting should keep the last value of each key.");

    map.extend([("c", 4), ("b", 5)]);
    assert_eq!(keys(&map), ["a", "b", "c"]);
    assert_eq!(map["b"], 5);
    check_invariants(&map);
}

#[test]
fn test_equality_and_formatting() {
    let ab = OrderedMap::try_from([("a", 1), ("b", 2)]).unwrap();
    let ba = OrderedMap::try_from([("b", 2), ("a", 1)]).unwrap();

    assert_ne!(ab, ba, "Maps with the same entries in a different order aren't equal.");
    assert_eq!(ab, ab.clone());
    assert_eq!(format!("{ab}"), r#"%{"a": 1, "b": 2}"#);
    assert_eq!(format!("{}", OrderedMap::<u8, u8>::new()), "%{}");
}

#[test]
fn test_clone_is_independent() {
    let mut map = OrderedMap::try_from([("a", 1)]).unwrap();
    map.add("b", 2).unwrap();
    let clone = map.clone();

    map.remove("a");
    assert_eq!(keys(&clone), ["a", "b"], "Changes to a map shouldn't affect its clone.");
    assert_eq!(clone.version(), 0, "A clone should start with a fresh version.");
    check_invariants(&clone);
}

#[test]
fn test_capacity() {
    let mut map: OrderedMap<u64, u64> = OrderedMap::with_cap(10);
    assert!(map.cap() >= 10);
    assert_eq!(map.cap_hint(), 10);

    map.extend((0..100).map(|i| (i, i)));
    map.retain(|k, _| *k < 5);
    map.shrink_to_fit();
    assert!(map.cap() >= 5 && map.cap() < 100, "shrink_to_fit should release spare capacity.");
    check_invariants(&map);

    assert_eq!(map.try_reserve(usize::MAX), Err(CapacityOverflow));
    assert_eq!(map.len(), 5, "A failed reserve shouldn't change the map.");

    map.reserve(50);
    assert!(map.cap() >= 55);
    check_invariants(&map);
}

#[test]
fn test_drops_each_value_once() {
    let counter = DropCounter::new();
    let mut map = OrderedMap::new();
    for i in 0..10 {
        map.add(i, counter.clone()).unwrap();
    }

    map.remove(&0);
    map.remove_at(0).unwrap();
    assert_eq!(counter.drops(), 2, "Removed values should be dropped.");

    map.set(5, counter.clone());
    assert_eq!(counter.drops(), 3, "The replaced value should be dropped.");

    map.retain(|k, _| *k < 8);
    assert_eq!(counter.drops(), 5);

    map.clear();
    assert_eq!(counter.drops(), 11, "Clearing should drop every remaining value.");
    assert!(map.is_empty());
}

#[test]
fn test_index_panics() {
    assert_panics!(
        {
            let map = OrderedMap::try_from([("a", 1)]).unwrap();
            let _value: i32 = map["b"];
        },
        "Indexing by an absent key should panic."
    );
    assert_panics!(
        {
            let map = OrderedMap::try_from([("a", 1)]).unwrap();
            let _value: i32 = map[1];
        },
        "Indexing out of bounds should panic."
    );
    assert_panics!(
        {
            let mut map = OrderedMap::try_from([("a", 1)]).unwrap();
            map[1] = 2;
        },
        "Mutably indexing out of bounds should panic."
    );
}

#[test]
#[cfg(feature = "sync")]
fn test_sync_root() {
    let map: OrderedMap<&str, i32> = OrderedMap::new();

    let (first, second) = std::thread::scope(|s| {
        let first = s.spawn(|| map.sync_root().clone());
        let second = s.spawn(|| map.sync_root().clone());
        (first.join().unwrap(), second.join().unwrap())
    });
    assert!(first.ptr_eq(&second), "Racing first calls should receive the same handle.");
    assert!(first.ptr_eq(map.sync_root()));
    assert!(!map.clone().sync_root().ptr_eq(&first), "A clone should get its own handle.");

    let guard = first.lock();
    assert!(second.try_lock().is_none(), "The handle should be shared between clones.");
    drop(guard);
    assert!(second.try_lock().is_some());
}

#[test]
fn test_capability_traits() {
    fn fill<M: OrderedMut<&'static str, i32>>(map: &mut M) {
        map.add("a", 1).unwrap();
        map.add("c", 3).unwrap();
        map.insert_at(1, "b", 2).unwrap();
        map.set_at(0, 10).unwrap();
        map.set("d", 4);
        map.remove(&"d");
    }

    fn describe<M: OrderedRead<&'static str, i32>>(map: &M) -> Vec<(usize, &'static str, i32)> {
        map.iter()
            .map(|(k, v)| (map.index_of(k).unwrap(), *k, *v))
            .collect()
    }

    let mut map: OrderedMap<&'static str, i32> = OrderedMap::new();
    fill(&mut map);
    assert_eq!(describe(&map), [(0, "a", 10), (1, "b", 2), (2, "c", 3)]);
    assert_eq!(describe(&map.as_read_only()), describe(&map));

    let view = map.as_read_only();
    assert!(MapRead::contains_key(&view, &"b"));
    assert!(MapRead::contains_value(&view, &3));
    assert_eq!(OrderedRead::key_at(&view, 3), Err(IndexOutOfBounds { index: 3, len: 3 }));
    assert_eq!(OrderedRead::get_at(&view, 2), Ok(&3));

    MapMut::clear(&mut map);
    assert!(MapRead::is_empty(&map));
}

mod model {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8, u16),
        Set(u8, u16),
        Insert(usize, u8, u16),
        Remove(u8),
        RemoveAt(usize),
        SwapRemove(u8),
        Move(usize, usize),
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        // A small key space makes duplicates and collisions common.
        let key = 0_u8..32;
        let index = 0_usize..40;

        prop_oneof![
            4 => (key.clone(), any::<u16>()).prop_map(|(k, v)| Op::Add(k, v)),
            4 => (key.clone(), any::<u16>()).prop_map(|(k, v)| Op::Set(k, v)),
            3 => (index.clone(), key.clone(), any::<u16>()).prop_map(|(i, k, v)| Op::Insert(i, k, v)),
            3 => key.clone().prop_map(Op::Remove),
            2 => index.clone().prop_map(Op::RemoveAt),
            2 => key.prop_map(Op::SwapRemove),
            2 => (index.clone(), index).prop_map(|(from, to)| Op::Move(from, to)),
            1 => Just(Op::Clear),
        ]
    }

    fn position(model: &[(u8, u16)], key: u8) -> Option<usize> {
        model.iter().position(|(k, _)| *k == key)
    }

    fn apply(map: &mut OrderedMap<u8, u16>, model: &mut Vec<(u8, u16)>, op: Op) {
        match op {
            Op::Add(k, v) => {
                let expected = match position(model, k) {
                    Some(index) => Err(DuplicateKeyError { index }),
                    None => {
                        model.push((k, v));
                        Ok(())
                    },
                };
                assert_eq!(map.add(k, v), expected);
            },
            Op::Set(k, v) => {
                let expected = match position(model, k) {
                    Some(index) => Some(std::mem::replace(&mut model[index].1, v)),
                    None => {
                        model.push((k, v));
                        None
                    },
                };
                assert_eq!(map.set(k, v), expected);
            },
            Op::Insert(i, k, v) => {
                let len = model.len();
                let expected = if i > len {
                    Err(InsertError::IndexOutOfBounds(IndexOutOfBounds { index: i, len }))
                } else if let Some(index) = position(model, k) {
                    Err(InsertError::DuplicateKey(DuplicateKeyError { index }))
                } else {
                    model.insert(i, (k, v));
                    Ok(())
                };
                assert_eq!(map.insert_at(i, k, v), expected);
            },
            Op::Remove(k) => {
                let expected = position(model, k).map(|index| model.remove(index).1);
                assert_eq!(map.remove(&k), expected);
            },
            Op::RemoveAt(i) => {
                let len = model.len();
                let expected = if i < len {
                    Ok(model.remove(i))
                } else {
                    Err(IndexOutOfBounds { index: i, len })
                };
                assert_eq!(map.remove_at(i), expected);
            },
            Op::SwapRemove(k) => {
                let expected = position(model, k).map(|index| model.swap_remove(index).1);
                assert_eq!(map.swap_remove(&k), expected);
            },
            Op::Move(from, to) => {
                let len = model.len();
                let expected = if from >= len {
                    Err(IndexOutOfBounds { index: from, len })
                } else if to >= len {
                    Err(IndexOutOfBounds { index: to, len })
                } else {
                    let entry = model.remove(from);
                    model.insert(to, entry);
                    Ok(())
                };
                assert_eq!(map.move_index(from, to), expected);
            },
            Op::Clear => {
                model.clear();
                map.clear();
            },
        }
    }

    proptest! {
        #[test]
        fn prop_matches_vec_model(ops in prop::collection::vec(op(), 0..200)) {
            let mut map = OrderedMap::new();
            let mut model = Vec::new();

            for op in ops {
                apply(&mut map, &mut model, op);
                check_invariants(&map);
            }

            prop_assert_eq!(map.into_iter().collect::<Vec<_>>(), model);
        }

        #[test]
        fn prop_colliding_hashes_match_model(
            hashes in prop::array::uniform16(0_u64..4),
            values in prop::collection::vec(0_u8..16, 0..100)
        ) {
            let mut map = OrderedMap::with_comparer(DefaultComparer::with_hasher(BadHasherBuilder));
            let mut model: Vec<ManualHash<u8>> = Vec::new();

            // Each value always gets the same hash, so equal keys hash equally.
            for value in values {
                let key = ManualHash::new(hashes[usize::from(value)], value);
                match model.iter().position(|k| k == &key) {
                    Some(index) => {
                        model.remove(index);
                        prop_assert!(map.remove(&key).is_some());
                    },
                    None => {
                        model.push(key.clone());
                        prop_assert!(map.add(key, ()).is_ok());
                    },
                }
                check_invariants(&map);
            }

            prop_assert_eq!(map.into_keys().collect::<Vec<_>>(), model);
        }
    }
}
