//! Simulated entities.

use std::collections::BTreeSet;

use rigbake_core::Selector;
use rigbake_nbt::{Nbt, NbtCompound};
use serde::{Deserialize, Serialize};

/// Index into the world's entity list. Never reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub entity_type: String,
    pub tags: BTreeSet<String>,
    /// Everything from the summon payload except `id`, `Tags` and `Passengers`, plus merges.
    pub data: NbtCompound,
    pub vehicle: Option<EntityId>,
    pub passengers: Vec<EntityId>,
    pub alive: bool,
    /// Last local teleport: (`^x ^y ^z`, `~yaw ~pitch`).
    pub teleport: Option<([f64; 3], [f64; 2])>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, entity_type: impl Into<String>) -> Self {
        Self {
            id,
            entity_type: entity_type.into(),
            tags: BTreeSet::new(),
            data: NbtCompound::new(),
            vehicle: None,
            passengers: Vec::new(),
            alive: true,
            teleport: None,
        }
    }

    #[inline]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Integer data field, e.g. `interpolation_duration`.
    pub fn int(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(Nbt::as_i64)
    }

    /// The 16 floats of `transformation`, when set.
    pub fn transformation(&self) -> Option<Vec<f32>> {
        let list = self.data.get("transformation")?.as_list()?;
        list.iter()
            .map(|v| match v {
                Nbt::Float(f) => Some(*f),
                _ => None,
            })
            .collect()
    }

    /// Whether the entity passes the selector's type and tag filters (the base is ignored).
    pub fn matches(&self, selector: &Selector) -> bool {
        if !self.alive {
            return false;
        }
        if let Some(ty) = &selector.entity_type {
            if *ty != self.entity_type {
                return false;
            }
        }
        selector
            .tags
            .iter()
            .all(|(tag, negated)| self.has_tag(tag) != *negated)
    }
}

