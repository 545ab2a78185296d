use serde::{Deserialize, Serialize};

use crate::value::{Nbt, NbtKind};

/// Ordered list whose elements all share one [`NbtKind`].
///
/// Mixing kinds is a caller bug; `push` panics rather than rendering a literal the target
/// would reject.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NbtList {
    items: Vec<Nbt>,
}

impl NbtList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn element_kind(&self) -> Option<NbtKind> {
        self.items.first().map(Nbt::kind)
    }

    pub fn push(&mut self, value: impl Into<Nbt>) {
        let value = value.into();
        if let Some(kind) = self.element_kind() {
            assert_eq!(
                kind,
                value.kind(),
                "heterogeneous list: expected {kind:?}, got {:?}",
                value.kind()
            );
        }
        self.items.push(value);
    }

    pub fn with(mut self, value: impl Into<Nbt>) -> Self {
        self.push(value);
        self
    }

    /// List of `f`-suffixed floats (e.g. a transformation matrix).
    pub fn floats(values: impl IntoIterator<Item = f32>) -> Self {
        values.into_iter().collect()
    }

    pub fn doubles(values: impl IntoIterator<Item = f64>) -> Self {
        values.into_iter().collect()
    }

    pub fn strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        values.into_iter().map(|s| Nbt::String(s.into())).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Nbt> {
        self.items.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Nbt> {
        self.items.get(idx)
    }
}

impl<V: Into<Nbt>> FromIterator<V> for NbtList {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut out = NbtList::new();
        for v in iter {
            out.push(v);
        }
        out
    }
}

impl<'a> IntoIterator for &'a NbtList {
    type Item = &'a Nbt;
    type IntoIter = std::slice::Iter<'a, Nbt>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
