//! Names of the scoreboard objectives and tags that hold playback state at runtime.
//!
//! The compiler never holds runtime state itself; it only agrees on these names with the code
//! it emits. All names are prefixed by the rig namespace so several rigs can coexist.

use crate::command::ScoreHolder;

/// Fake player used to carry a score across `execute on passengers`.
pub const INTERP_HOLDER: &str = "#interp";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeVariables {
    namespace: String,
}

impl RuntimeVariables {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Dispatch counter compared by every tree guard.
    pub fn frame(&self) -> String {
        format!("{}.frame", self.namespace)
    }

    /// Per-animation playback position in ticks.
    pub fn local_time(&self, animation: &str) -> String {
        format!("{}.{animation}.local_time", self.namespace)
    }

    /// Per-animation loop mode (0 loop, 1 once, 2 hold).
    pub fn loop_mode(&self, animation: &str) -> String {
        format!("{}.{animation}.loop_mode", self.namespace)
    }

    /// Remaining tween ticks.
    pub fn tween(&self) -> String {
        format!("{}.tween", self.namespace)
    }

    /// Tween length requested by the caller before `tween_play`/`tween_resume`.
    pub fn tween_request(&self) -> String {
        format!("{}.tween_request", self.namespace)
    }

    /// Interpolation duration pushed to display entities on sync.
    pub fn interp(&self) -> String {
        format!("{}.interp", self.namespace)
    }

    /// Ticks since the instance was summoned.
    pub fn lifetime(&self) -> String {
        format!("{}.lifetime", self.namespace)
    }

    pub fn playing_tag(&self, animation: &str) -> String {
        format!("{}.{animation}.playing", self.namespace)
    }

    /// While present on the root, frame side effects are skipped.
    pub fn suppress_tag(&self) -> String {
        format!("{}.suppress_effects", self.namespace)
    }

    pub fn root_tag(&self) -> String {
        format!("{}.root", self.namespace)
    }

    /// Marks a root that was just summoned and still needs its scores initialized.
    pub fn new_tag(&self) -> String {
        format!("{}.new", self.namespace)
    }

    pub fn node_tag(&self, node: &str) -> String {
        format!("{}.node.{node}", self.namespace)
    }

    /// Tag shared by every node entity of the rig.
    pub fn any_node_tag(&self) -> String {
        format!("{}.node", self.namespace)
    }

    pub fn interp_holder(&self) -> ScoreHolder {
        ScoreHolder::Fake(INTERP_HOLDER.to_string())
    }

    /// Instance-wide objectives with a description, in creation order.
    pub fn instance_objectives(&self) -> Vec<(String, &'static str)> {
        vec![
            (self.frame(), "frame index the dispatch tree is evaluated against"),
            (self.tween(), "remaining tween ticks; animations do not advance while > 0"),
            (self.tween_request(), "tween length for the next tween_play/tween_resume"),
            (self.interp(), "interpolation duration synced to node entities"),
            (self.lifetime(), "ticks since summon"),
        ]
    }

    /// Per-animation objectives with a description.
    pub fn animation_objectives(&self, animation: &str) -> Vec<(String, &'static str)> {
        vec![
            (self.local_time(animation), "playback position in ticks"),
            (self.loop_mode(animation), "0 loop, 1 once, 2 hold"),
        ]
    }
}
