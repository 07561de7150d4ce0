use std::fmt::{self, Formatter};
use std::marker::PhantomData;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::OrderedMap;
use crate::collections::hash::Comparer;

// Maps are written as plain serde maps, in positional order. The comparer isn't part of this form;
// use a Snapshot to carry it.
impl<K: Serialize, V: Serialize, C> Serialize for OrderedMap<K, V, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, K, V, C> Deserialize<'de> for OrderedMap<K, V, C>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: Comparer<K> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<K, V, C>(PhantomData<fn() -> OrderedMap<K, V, C>>);

        impl<'de, K, V, C> Visitor<'de> for OrderedMapVisitor<K, V, C>
        where
            K: Deserialize<'de>,
            V: Deserialize<'de>,
            C: Comparer<K> + Default,
        {
            type Value = OrderedMap<K, V, C>;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map with unique keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                // Don't trust the size hint with an up front allocation.
                let cap = access.size_hint().unwrap_or(0).min(4096);
                let mut map = OrderedMap::try_with_cap_and_comparer(cap, C::default())
                    .map_err(de::Error::custom)?;

                while let Some((key, value)) = access.next_entry()? {
                    map.add(key, value).map_err(de::Error::custom)?;
                }

                map.version = 0;
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}
