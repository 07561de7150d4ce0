/// A single entry of an [`OrderedMap`](super::OrderedMap). The hash is cached so that the index
/// table can be rebuilt or probed for a position without consulting the comparer again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Bucket<K, V> {
    pub hash: u64,
    pub key: K,
    pub value: V,
}

impl<K, V> Bucket<K, V> {
    pub const fn refs(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    pub const fn ref_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}
