use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Nbt;

/// Insertion-ordered string → value map.
///
/// Re-inserting an existing key replaces the value but keeps the key's original position,
/// so rendering stays stable when a template is patched after construction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NbtCompound {
    entries: IndexMap<String, Nbt>,
}

impl NbtCompound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Nbt>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Nbt>) -> Option<Nbt> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Nbt> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Nbt> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Nbt> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Nbt)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Shallow merge in the target's `data merge` sense: nested compounds merge recursively,
    /// every other tag is replaced.
    pub fn merge(&mut self, other: &NbtCompound) {
        for (key, value) in other.iter() {
            match (self.entries.get_mut(key), value) {
                (Some(Nbt::Compound(existing)), Nbt::Compound(incoming)) => {
                    existing.merge(incoming);
                }
                _ => {
                    self.entries.insert(key.to_string(), value.clone());
                }
            }
        }
    }
}

impl<K: Into<String>, V: Into<Nbt>> FromIterator<(K, V)> for NbtCompound {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = NbtCompound::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}
