//! Balanced dispatch tree over an animation's frames.
//!
//! The target can only branch on "score within range", so each lookup walks a chain of range
//! guards. Splitting at the median frame keeps that chain O(log N) long. The tree lives in an
//! arena; children are stored before their parent.

use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// Index into [`DispatchTree`]'s arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DispatchNode {
    /// Covers `min_index..=max_index`; children are ordered and never overlap.
    Branch {
        min_index: u32,
        max_index: u32,
        children: Vec<NodeId>,
    },
    Leaf { tick_index: u32, frame: Frame },
}

impl DispatchNode {
    /// Inclusive tick range covered by this node.
    #[inline]
    pub fn range(&self) -> (u32, u32) {
        match self {
            Self::Branch {
                min_index,
                max_index,
                ..
            } => (*min_index, *max_index),
            Self::Leaf { tick_index, .. } => (*tick_index, *tick_index),
        }
    }
}

/// Result of seek routing.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Route {
    /// Apply this leaf.
    Leaf(NodeId),
    /// Nothing to apply (tick outside the animation or before its first frame).
    NoOp,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchTree {
    nodes: Vec<DispatchNode>,
    root: Option<NodeId>,
    duration: u32,
}

impl DispatchTree {
    /// Build over `[0, duration)`. Frames outside the domain are dropped; frames sharing a tick
    /// are merged with [`Frame::merge`], so the input order does not matter.
    pub fn build(frames: Vec<Frame>, duration: u32) -> Self {
        let total = frames.len();
        let mut frames: Vec<Frame> = frames.into_iter().filter(|f| f.tick < duration).collect();
        if frames.len() < total {
            log::debug!(
                "dispatch tree: dropped {} frame(s) outside [0, {duration})",
                total - frames.len()
            );
        }
        frames.sort_by_key(|f| f.tick);

        let mut unique: Vec<Frame> = Vec::with_capacity(frames.len());
        for frame in frames {
            match unique.last_mut() {
                Some(prev) if prev.tick == frame.tick => prev.merge(frame),
                _ => unique.push(frame),
            }
        }

        let mut tree = Self {
            nodes: Vec::with_capacity(unique.len() * 2),
            root: None,
            duration,
        };
        tree.root = tree.build_node(unique);
        tree
    }

    fn build_node(&mut self, mut frames: Vec<Frame>) -> Option<NodeId> {
        match frames.len() {
            0 => None,
            1 => {
                let frame = frames.pop()?;
                Some(self.push(DispatchNode::Leaf {
                    tick_index: frame.tick,
                    frame,
                }))
            }
            n => {
                // The median frame opens the right half.
                let right = frames.split_off(n / 2);
                let children: Vec<NodeId> = [self.build_node(frames), self.build_node(right)]
                    .into_iter()
                    .flatten()
                    .collect();
                match children.as_slice() {
                    [] => None,
                    [only] => Some(*only),
                    [first, .., last] => {
                        let min_index = self.node(*first).range().0;
                        let max_index = self.node(*last).range().1;
                        Some(self.push(DispatchNode::Branch {
                            min_index,
                            max_index,
                            children,
                        }))
                    }
                }
            }
        }
    }

    fn push(&mut self, node: DispatchNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &DispatchNode {
        &self.nodes[id.index()]
    }

    /// Number of arena entries (branches and leaves).
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Leaf holding exactly `tick`, if any.
    pub fn find_leaf(&self, tick: u32) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match self.node(current) {
                DispatchNode::Leaf { tick_index, .. } => {
                    return (*tick_index == tick).then_some(current);
                }
                DispatchNode::Branch { children, .. } => {
                    current = *children.iter().find(|c| {
                        let (lo, hi) = self.node(**c).range();
                        lo <= tick && tick <= hi
                    })?;
                }
            }
        }
    }

    /// Latest leaf at or before `tick`; `NoOp` outside `[0, duration)` or before the first frame.
    pub fn route(&self, tick: u32) -> Route {
        if tick >= self.duration {
            return Route::NoOp;
        }
        let Some(mut current) = self.root else {
            return Route::NoOp;
        };
        loop {
            match self.node(current) {
                DispatchNode::Leaf { tick_index, .. } => {
                    return if *tick_index <= tick {
                        Route::Leaf(current)
                    } else {
                        Route::NoOp
                    };
                }
                DispatchNode::Branch { children, .. } => {
                    match children
                        .iter()
                        .rev()
                        .find(|c| self.node(**c).range().0 <= tick)
                    {
                        Some(c) => current = *c,
                        None => return Route::NoOp,
                    }
                }
            }
        }
    }

    /// Children of a branch with the inclusive tick range each one serves under seek routing:
    /// a child covers from its first frame up to the tick before its next sibling, the last child
    /// up to `upper`.
    pub fn floor_ranges(&self, id: NodeId, upper: u32) -> Vec<(NodeId, u32, u32)> {
        match self.node(id) {
            DispatchNode::Leaf { .. } => Vec::new(),
            DispatchNode::Branch { children, .. } => children
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    let lo = self.node(*c).range().0;
                    let hi = children
                        .get(i + 1)
                        .map(|next| self.node(*next).range().0 - 1)
                        .unwrap_or(upper);
                    (*c, lo, hi)
                })
                .collect(),
        }
    }

    /// Leaves in tick order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            match self.node(id) {
                DispatchNode::Leaf { .. } => out.push(id),
                DispatchNode::Branch { children, .. } => stack.extend(children.iter().rev()),
            }
        }
        out
    }

    /// Frame held by a leaf.
    pub fn frame(&self, id: NodeId) -> Option<&Frame> {
        match self.node(id) {
            DispatchNode::Leaf { frame, .. } => Some(frame),
            DispatchNode::Branch { .. } => None,
        }
    }

    /// Longest root-to-leaf path, counted in nodes (0 for the empty tree).
    pub fn depth(&self) -> usize {
        fn walk(tree: &DispatchTree, id: NodeId) -> usize {
            match tree.node(id) {
                DispatchNode::Leaf { .. } => 1,
                DispatchNode::Branch { children, .. } => {
                    1 + children.iter().map(|c| walk(tree, *c)).max().unwrap_or(0)
                }
            }
        }
        self.root.map(|r| walk(self, r)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(ticks: &[u32]) -> Vec<Frame> {
        ticks.iter().map(|t| Frame::new(*t)).collect()
    }

    #[test]
    fn empty_set_builds_empty_tree() {
        let tree = DispatchTree::build(Vec::new(), 20);
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.route(0), Route::NoOp);
        assert!(tree.find_leaf(0).is_none());
    }

    #[test]
    fn single_frame_is_a_leaf_root() {
        let tree = DispatchTree::build(frames(&[3]), 20);
        let root = tree.root().unwrap();
        assert!(matches!(tree.node(root), DispatchNode::Leaf { tick_index: 3, .. }));
        assert_eq!(tree.route(2), Route::NoOp);
        assert_eq!(tree.route(19), Route::Leaf(root));
    }

    #[test]
    fn median_goes_right() {
        let tree = DispatchTree::build(frames(&[0, 1, 2]), 3);
        let root = tree.root().unwrap();
        let DispatchNode::Branch { children, .. } = tree.node(root) else {
            panic!("expected branch");
        };
        assert_eq!(tree.node(children[0]).range(), (0, 0));
        assert_eq!(tree.node(children[1]).range(), (1, 2));
    }

    #[test]
    fn floor_ranges_tile_the_branch() {
        let tree = DispatchTree::build(frames(&[0, 5, 20, 39]), 40);
        let root = tree.root().unwrap();
        let ranges: Vec<(u32, u32)> = tree
            .floor_ranges(root, 39)
            .into_iter()
            .map(|(_, lo, hi)| (lo, hi))
            .collect();
        assert_eq!(ranges, vec![(0, 19), (20, 39)]);
    }
}
