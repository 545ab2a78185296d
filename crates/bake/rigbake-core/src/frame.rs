//! Sampled, delta-encoded animation frames.

use std::cmp::Ordering;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::LoopMode;
use crate::transform::NodeTransform;

/// Commands a locator runs when its frame is applied.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocatorEffect {
    pub commands: Vec<String>,
    #[serde(default)]
    pub execute_condition: Option<String>,
    /// Copied from the key; repeated emissions carry the same effect.
    #[serde(default)]
    pub repeat: bool,
    #[serde(default = "one")]
    pub repeat_frequency: u32,
}

fn one() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantEffect {
    pub variants: Vec<Uuid>,
    #[serde(default)]
    pub execute_condition: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandEffect {
    pub commands: Vec<String>,
    #[serde(default)]
    pub execute_condition: Option<String>,
}

/// One node's entry in a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeFrame {
    pub transform: NodeTransform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<LocatorEffect>,
}

impl NodeFrame {
    pub fn new(transform: NodeTransform) -> Self {
        Self {
            transform,
            effect: None,
        }
    }

    /// Total order used to pick a winner when two frames for the same tick disagree.
    fn total_cmp(&self, other: &Self) -> Ordering {
        let a = &self.transform;
        let b = &other.transform;
        cmp_f64s(&a.matrix, &b.matrix)
            .then_with(|| cmp_f64s(&a.head_rotation, &b.head_rotation))
            .then_with(|| a.marker.cmp(&b.marker))
            .then_with(|| self.effect.cmp(&other.effect))
    }
}

fn cmp_f64s(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Everything that changes at one tick. Present only when something does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u32,
    #[serde(default)]
    pub nodes: IndexMap<Uuid, NodeFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantEffect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<CommandEffect>,
}

impl Frame {
    pub fn new(tick: u32) -> Self {
        Self {
            tick,
            nodes: IndexMap::new(),
            variant: None,
            commands: None,
        }
    }

    /// Nothing to apply.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.variant.is_none() && self.commands.is_none()
    }

    /// Whether applying the frame runs anything beyond node transforms.
    pub fn has_side_effects(&self) -> bool {
        self.variant.is_some()
            || self.commands.is_some()
            || self.nodes.values().any(|n| n.effect.is_some())
    }

    /// Fold another frame for the same tick into this one.
    ///
    /// Node entries are unioned. Where both frames carry an entry for the same node, or both
    /// carry the same kind of side effect, the one that sorts last wins, so the result does not
    /// depend on which frame came first.
    pub fn merge(&mut self, other: Frame) {
        debug_assert_eq!(self.tick, other.tick);
        for (uuid, entry) in other.nodes {
            match self.nodes.get_mut(&uuid) {
                Some(existing) => {
                    if entry.total_cmp(existing).is_gt() {
                        *existing = entry;
                    }
                }
                None => {
                    self.nodes.insert(uuid, entry);
                }
            }
        }
        self.nodes.sort_keys();
        self.variant = self.variant.take().max(other.variant);
        self.commands = self.commands.take().max(other.commands);
    }
}

/// Compiled form of one animation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    pub name: String,
    /// `[a-z0-9_.-]` name used in function paths.
    pub path_name: String,
    /// `[a-z0-9_]` name used in objectives and tags.
    pub storage_name: String,
    /// Length in ticks; frames live in `[0, duration)`.
    pub duration: u32,
    pub loop_mode: LoopMode,
    /// Ticks to wait before a looping animation restarts.
    pub loop_delay: u32,
    pub modified_nodes: IndexSet<Uuid>,
    pub frames: Vec<Frame>,
}

impl AnimationDescriptor {
    pub fn frame_at(&self, tick: u32) -> Option<&Frame> {
        self.frames
            .binary_search_by_key(&tick, |f| f.tick)
            .ok()
            .map(|i| &self.frames[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::InterpolationMarker;

    fn entry(x: f64) -> NodeFrame {
        let mut matrix = [0.0; 16];
        matrix[3] = x;
        NodeFrame::new(NodeTransform {
            matrix,
            translation: [x, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
            head_rotation: [0.0, 0.0],
            marker: InterpolationMarker::None,
        })
    }

    #[test]
    fn merge_is_order_independent() {
        let a_id = Uuid::from_u128(1);
        let b_id = Uuid::from_u128(2);

        let mut a = Frame::new(5);
        a.nodes.insert(a_id, entry(1.0));
        a.commands = Some(CommandEffect {
            commands: vec!["say a".into()],
            execute_condition: None,
        });
        let mut b = Frame::new(5);
        b.nodes.insert(b_id, entry(2.0));
        b.nodes.insert(a_id, entry(3.0));
        b.commands = Some(CommandEffect {
            commands: vec!["say b".into()],
            execute_condition: None,
        });

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b;
        ba.merge(a);
        assert_eq!(ab, ba);
        assert_eq!(ab.nodes.keys().copied().collect::<Vec<_>>(), vec![a_id, b_id]);
        assert_eq!(ab.nodes[&a_id].transform.translation[0], 3.0);
        assert_eq!(ab.commands.unwrap().commands, vec!["say b".to_string()]);
    }

    #[test]
    fn empty_frame_has_no_side_effects() {
        let f = Frame::new(0);
        assert!(f.is_empty());
        assert!(!f.has_side_effects());
    }
}
