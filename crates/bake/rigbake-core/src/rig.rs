//! Rig model: the static node hierarchy and its variants.
//!
//! Built once per compile pass and read-only afterwards. Nodes are stored parents-first so a
//! single forward pass can accumulate world matrices.

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BakeError, Result};
use crate::names::{storage_safe, NameAllocator};

/// How a node's orientation is expressed in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Full 4x4 transformation written into entity data.
    Matrix,
    /// Position plus two-axis (pitch, yaw) rotation, applied with a teleport.
    HeadRotation,
}

/// Closed set of animatable node kinds with their kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Bone {
        /// Item model shown by the bone's display entity.
        #[serde(default)]
        item: Option<String>,
    },
    Locator {
        /// Tracked locators get an anchor entity that follows the animation.
        #[serde(default)]
        tracked: bool,
    },
    Camera,
    TextDisplay {
        #[serde(default)]
        text: String,
    },
    ItemDisplay {
        item: String,
    },
    BlockDisplay {
        block: String,
    },
}

/// Kind names accepted in blueprint JSON.
pub const NODE_KIND_NAMES: [&str; 6] = [
    "bone",
    "locator",
    "camera",
    "text_display",
    "item_display",
    "block_display",
];

pub const DEFAULT_BONE_ITEM: &str = "minecraft:white_dye";

impl NodeKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bone { .. } => "bone",
            Self::Locator { .. } => "locator",
            Self::Camera => "camera",
            Self::TextDisplay { .. } => "text_display",
            Self::ItemDisplay { .. } => "item_display",
            Self::BlockDisplay { .. } => "block_display",
        }
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        match self {
            Self::Bone { .. }
            | Self::TextDisplay { .. }
            | Self::ItemDisplay { .. }
            | Self::BlockDisplay { .. } => Orientation::Matrix,
            Self::Locator { .. } | Self::Camera => Orientation::HeadRotation,
        }
    }

    /// Whether the node is backed by an entity that rides the rig root.
    #[inline]
    pub fn has_entity(&self) -> bool {
        match self {
            Self::Locator { tracked } => *tracked,
            _ => true,
        }
    }

    /// Entity type spawned for this node.
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::Bone { .. } | Self::ItemDisplay { .. } => "minecraft:item_display",
            Self::BlockDisplay { .. } => "minecraft:block_display",
            Self::TextDisplay { .. } => "minecraft:text_display",
            // Anchors carry no visuals.
            Self::Locator { .. } | Self::Camera => "minecraft:item_display",
        }
    }
}

/// Static bind pose relative to the parent (or to the rig root).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindPose {
    /// Pivot position in blocks.
    #[serde(default)]
    pub origin: [f64; 3],
    /// Euler rotation in degrees, applied Z then Y then X.
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

impl Default for BindPose {
    fn default() -> Self {
        Self {
            origin: [0.0; 3],
            rotation: [0.0; 3],
            scale: unit_scale(),
        }
    }
}

/// One animatable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigNode {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub parent: Option<Uuid>,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub bind: BindPose,
}

impl RigNode {
    pub fn new(uuid: Uuid, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            uuid,
            name: name.into(),
            parent: None,
            kind,
            bind: BindPose::default(),
        }
    }

    pub fn with_parent(mut self, parent: Uuid) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.bind.origin = origin;
        self
    }

    pub fn with_rotation(mut self, rotation: [f64; 3]) -> Self {
        self.bind.rotation = rotation;
        self
    }
}

/// Named set of item-model overrides for bones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    /// Bone uuid → item model shown while this variant is active.
    #[serde(default)]
    pub models: IndexMap<Uuid, String>,
}

/// Validated rig. Node order is parents-first; siblings keep their input order.
#[derive(Debug, Clone)]
pub struct Rig {
    name: String,
    nodes: Vec<RigNode>,
    /// Unique storage-safe name per node, parallel to `nodes`.
    storage_names: Vec<String>,
    parents: Vec<Option<usize>>,
    index: HashMap<Uuid, usize>,
    variants: Vec<Variant>,
    variant_names: Vec<String>,
}

impl Rig {
    pub fn new(name: impl Into<String>, nodes: Vec<RigNode>, variants: Vec<Variant>) -> Result<Self> {
        let mut by_uuid: HashMap<Uuid, usize> = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if by_uuid.insert(node.uuid, i).is_some() {
                return Err(BakeError::DuplicateNode { uuid: node.uuid });
            }
        }
        for node in &nodes {
            if let Some(parent) = node.parent {
                if !by_uuid.contains_key(&parent) {
                    return Err(BakeError::MissingParent {
                        node: node.uuid,
                        parent,
                    });
                }
            }
        }

        // Depth-first from the synthetic root; anything not reached sits on a cycle.
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut roots = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            match node.parent {
                Some(p) => children[by_uuid[&p]].push(i),
                None => roots.push(i),
            }
        }
        let mut order = Vec::with_capacity(nodes.len());
        let mut stack: Vec<usize> = roots.into_iter().rev().collect();
        while let Some(i) = stack.pop() {
            order.push(i);
            stack.extend(children[i].iter().rev().copied());
        }
        if order.len() != nodes.len() {
            let mut reached = vec![false; nodes.len()];
            for &i in &order {
                reached[i] = true;
            }
            let culprit = reached
                .iter()
                .position(|r| !r)
                .map(|i| nodes[i].uuid)
                .unwrap_or_default();
            return Err(BakeError::HierarchyCycle { node: culprit });
        }

        let mut slots: Vec<Option<RigNode>> = nodes.into_iter().map(Some).collect();
        let ordered: Vec<RigNode> = order.iter().filter_map(|&i| slots[i].take()).collect();
        let index: HashMap<Uuid, usize> = ordered
            .iter()
            .enumerate()
            .map(|(i, n)| (n.uuid, i))
            .collect();
        let parents = ordered
            .iter()
            .map(|n| n.parent.map(|p| index[&p]))
            .collect();

        let mut names = NameAllocator::new();
        let storage_names = ordered
            .iter()
            .map(|n| {
                let (name, renamed) = names.allocate(storage_safe(&n.name));
                if renamed {
                    log::debug!("node '{}' renamed to '{}' to keep tags unique", n.name, name);
                }
                name
            })
            .collect();

        let mut variant_alloc = NameAllocator::new();
        let variant_names = variants
            .iter()
            .map(|v| variant_alloc.allocate(storage_safe(&v.name)).0)
            .collect();

        Ok(Self {
            name: name.into(),
            nodes: ordered,
            storage_names,
            parents,
            index,
            variants,
            variant_names,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn nodes(&self) -> &[RigNode] {
        &self.nodes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, uuid: &Uuid) -> Option<usize> {
        self.index.get(uuid).copied()
    }

    pub fn node(&self, uuid: &Uuid) -> Option<&RigNode> {
        self.index_of(uuid).map(|i| &self.nodes[i])
    }

    /// Parent slot of the node at `idx` (parents always precede children).
    #[inline]
    pub fn parent_index(&self, idx: usize) -> Option<usize> {
        self.parents[idx]
    }

    /// Unique `[a-z0-9_]` name of the node at `idx`.
    #[inline]
    pub fn storage_name(&self, idx: usize) -> &str {
        &self.storage_names[idx]
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn variant(&self, uuid: &Uuid) -> Option<(usize, &Variant)> {
        self.variants.iter().enumerate().find(|(_, v)| v.uuid == *uuid)
    }

    /// Unique `[a-z0-9_]` name of the variant at `idx`.
    #[inline]
    pub fn variant_name(&self, idx: usize) -> &str {
        &self.variant_names[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bone(id: u128, name: &str) -> RigNode {
        RigNode::new(Uuid::from_u128(id), name, NodeKind::Bone { item: None })
    }

    #[test]
    fn orders_parents_before_children() {
        let nodes = vec![
            bone(3, "hand").with_parent(Uuid::from_u128(2)),
            bone(2, "arm").with_parent(Uuid::from_u128(1)),
            bone(1, "body"),
        ];
        let rig = Rig::new("test", nodes, vec![]).unwrap();
        let names: Vec<&str> = rig.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["body", "arm", "hand"]);
        assert_eq!(rig.parent_index(2), Some(1));
        assert_eq!(rig.parent_index(0), None);
    }

    #[test]
    fn rejects_cycles_and_missing_parents() {
        let cyclic = vec![
            bone(1, "a").with_parent(Uuid::from_u128(2)),
            bone(2, "b").with_parent(Uuid::from_u128(1)),
        ];
        assert!(matches!(
            Rig::new("x", cyclic, vec![]),
            Err(BakeError::HierarchyCycle { .. })
        ));

        let orphan = vec![bone(1, "a").with_parent(Uuid::from_u128(9))];
        assert!(matches!(
            Rig::new("x", orphan, vec![]),
            Err(BakeError::MissingParent { .. })
        ));

        let dup = vec![bone(1, "a"), bone(1, "b")];
        assert!(matches!(
            Rig::new("x", dup, vec![]),
            Err(BakeError::DuplicateNode { .. })
        ));
    }

    #[test]
    fn storage_names_are_unique() {
        let rig = Rig::new("x", vec![bone(1, "Left Arm"), bone(2, "left-arm")], vec![]).unwrap();
        assert_eq!(rig.storage_name(0), "left_arm");
        assert_eq!(rig.storage_name(1), "left_arm_2");
    }

    #[test]
    fn kind_tags_deserialize() {
        let node: RigNode = serde_json::from_str(
            r#"{ "uuid": "00000000-0000-0000-0000-000000000001", "name": "cam", "type": "camera" }"#,
        )
        .unwrap();
        assert_eq!(node.kind, NodeKind::Camera);
        assert_eq!(node.kind.orientation(), Orientation::HeadRotation);
        assert_eq!(node.bind.scale, [1.0, 1.0, 1.0]);
    }
}
