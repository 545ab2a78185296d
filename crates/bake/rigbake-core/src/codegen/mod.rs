//! Lowering of dispatch trees and playback control into command functions.
//!
//! Layout of the generated namespace:
//! - `animations/<anim>/dispatch`, `tree/<lo>_<hi>`: exact dispatch used by natural playback
//! - `animations/<anim>/seek`, `seek_tree/<lo>_<hi>`: floor dispatch used by seeking
//! - `animations/<anim>/frames/<tick>[_effects]`: leaves, shared by both trees
//! - `animations/<anim>/{play,resume,pause,stop,...}`: playback control
//! - `load`, `tick`, `on_tick`, `summon`, `remove`, ...: rig-level functions

pub mod nodes;
pub mod playback;
pub mod rig;
pub mod tree;

use crate::command::{Command, ExecuteClause, FunctionPath, Selector};
use crate::config::BakeConfig;
use crate::datapack::Datapack;
use crate::dispatch::DispatchTree;
use crate::error::Result;
use crate::frame::AnimationDescriptor;
use crate::rig::Rig;
use crate::runtime_vars::RuntimeVariables;
use crate::transform::NodeTransform;

/// Function paths of one animation.
#[derive(Clone, Debug)]
pub struct AnimationPaths {
    root: FunctionPath,
}

impl AnimationPaths {
    pub fn new(namespace: &str, animation: &AnimationDescriptor) -> Self {
        Self {
            root: FunctionPath::new(namespace, format!("animations/{}", animation.path_name)),
        }
    }

    pub fn control(&self, name: &str) -> FunctionPath {
        self.root.join(name)
    }

    /// Exact dispatch entry point.
    pub fn dispatch(&self) -> FunctionPath {
        self.root.join("dispatch")
    }

    /// Floor dispatch entry point.
    pub fn seek(&self) -> FunctionPath {
        self.root.join("seek")
    }

    pub fn branch(&self, lo: u32, hi: u32) -> FunctionPath {
        self.root.join(&format!("tree/{lo}_{hi}"))
    }

    pub fn seek_branch(&self, lo: u32, hi: u32) -> FunctionPath {
        self.root.join(&format!("seek_tree/{lo}_{hi}"))
    }

    pub fn frame(&self, tick: u32) -> FunctionPath {
        self.root.join(&format!("frames/{tick}"))
    }

    pub fn effects(&self, tick: u32) -> FunctionPath {
        self.root.join(&format!("frames/{tick}_effects"))
    }
}

/// Shared state for generating one rig's functions.
pub struct Codegen<'a> {
    pub(crate) rig: &'a Rig,
    pub(crate) config: &'a BakeConfig,
    pub(crate) vars: RuntimeVariables,
    /// Bind pose of every node, parallel to `rig.nodes()`.
    pub(crate) rest: Vec<NodeTransform>,
}

impl<'a> Codegen<'a> {
    pub fn new(
        rig: &'a Rig,
        config: &'a BakeConfig,
        namespace: impl Into<String>,
        rest: Vec<NodeTransform>,
    ) -> Self {
        Self {
            rig,
            config,
            vars: RuntimeVariables::new(namespace),
            rest,
        }
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        self.vars.namespace()
    }

    #[inline]
    pub fn vars(&self) -> &RuntimeVariables {
        &self.vars
    }

    pub fn function(&self, path: &str) -> FunctionPath {
        FunctionPath::new(self.namespace(), path)
    }

    /// `variants/<name>/apply` for the variant at `idx`.
    pub fn variant_apply(&self, idx: usize) -> FunctionPath {
        self.function(&format!("variants/{}/apply", self.rig.variant_name(idx)))
    }

    pub fn paths(&self, animation: &AnimationDescriptor) -> AnimationPaths {
        AnimationPaths::new(self.namespace(), animation)
    }

    /// Every function belonging to one animation: both trees, leaves and playback control.
    pub fn animation(&self, animation: &AnimationDescriptor, tree: &DispatchTree) -> Result<Datapack> {
        let mut pack = Datapack::new();
        let paths = self.paths(animation);
        tree::emit_trees(self, &paths, tree, &mut pack)?;
        nodes::emit_leaves(self, &paths, tree, &mut pack)?;
        playback::emit_controls(self, &paths, animation, &mut pack)?;
        log::debug!(
            "codegen '{}': {} function(s), tree depth {}",
            animation.name,
            pack.len(),
            tree.depth()
        );
        Ok(pack)
    }

    /// Rig-level functions, tags and pack metadata.
    pub fn rig_files(&self, animations: &[AnimationDescriptor]) -> Result<Datapack> {
        rig::emit_rig(self, animations)
    }

    // Small builders shared by the submodules.

    /// `on passengers if entity @s[tag=<node tag>]`
    pub(crate) fn on_node(&self, idx: usize) -> Vec<ExecuteClause> {
        vec![
            ExecuteClause::OnPassengers,
            ExecuteClause::if_entity(
                Selector::this().tagged(self.vars.node_tag(self.rig.storage_name(idx))),
            ),
        ]
    }

    /// `tag @s add|remove <suppress>` around a call.
    pub(crate) fn suppressed(&self, inner: Vec<Command>) -> Vec<Command> {
        let tag = self.vars.suppress_tag();
        let mut out = Vec::with_capacity(inner.len() + 2);
        out.push(Command::tag_add(Selector::this(), tag.clone()));
        out.extend(inner);
        out.push(Command::tag_remove(Selector::this(), tag));
        out
    }
}
