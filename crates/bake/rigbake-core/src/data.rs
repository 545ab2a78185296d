//! Animation source model: per-node keyframe channels plus the rig-wide side-effect channels.
//!
//! Times are in seconds. Keys inside a channel must be sorted by time; two keys sharing a time
//! form an instant (pre/post) transition, the first one being the value before the jump.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::config::TICKS_PER_SECOND;
use crate::error::{BakeError, Result};

/// What happens when local time reaches the end of the animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Restart from frame 0 after the loop delay.
    Loop,
    /// Stop and return to frame 0.
    #[default]
    Once,
    /// Freeze on the last frame.
    Hold,
}

impl LoopMode {
    /// Value stored in the per-animation loop-mode score.
    #[inline]
    pub fn score(self) -> i32 {
        match self {
            Self::Loop => 0,
            Self::Once => 1,
            Self::Hold => 2,
        }
    }
}

/// Interpolation of the segment that leaves a key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    /// Hold the left value until the right key is reached.
    Step,
    CatmullRom,
    /// Cubic-bezier timing using the left key's `out` and the right key's `in` handles.
    Bezier,
}

/// 2D control point in the normalized 0..1 segment domain.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

/// Per-key bezier handles: `in` shapes the arrival, `out` the departure.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Transitions {
    #[serde(default, rename = "in")]
    pub r#in: Option<Vec2>,
    #[serde(default, rename = "out")]
    pub r#out: Option<Vec2>,
}

/// Position (blocks), rotation (euler degrees) or scale key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TransformKey {
    pub time: f64,
    pub value: [f64; 3],
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default)]
    pub transitions: Option<Transitions>,
}

impl TransformKey {
    pub fn new(time: f64, value: [f64; 3]) -> Self {
        Self {
            time,
            value,
            interpolation: Interpolation::Linear,
            transitions: None,
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}

/// Commands run by a locator when its key is reached.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LocatorCommandKey {
    pub time: f64,
    #[serde(deserialize_with = "command_lines")]
    pub commands: Vec<String>,
    /// Raw execute condition (e.g. `if block ~ ~-1 ~ minecraft:water`).
    #[serde(default)]
    pub execute_condition: Option<String>,
    /// Re-run the commands every `repeat_frequency` ticks until the next key.
    #[serde(default)]
    pub repeat: bool,
    #[serde(default = "one")]
    pub repeat_frequency: u32,
}

fn one() -> u32 {
    1
}

/// Switch to one or more variants.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VariantKey {
    pub time: f64,
    pub variants: Vec<Uuid>,
    #[serde(default)]
    pub execute_condition: Option<String>,
}

/// Raw commands run by the rig root.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CommandKey {
    pub time: f64,
    #[serde(deserialize_with = "command_lines")]
    pub commands: Vec<String>,
    #[serde(default)]
    pub execute_condition: Option<String>,
}

/// Keyframe channels of one node.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeAnimator {
    pub node: Uuid,
    #[serde(default)]
    pub position: Vec<TransformKey>,
    #[serde(default)]
    pub rotation: Vec<TransformKey>,
    #[serde(default)]
    pub scale: Vec<TransformKey>,
    /// Locator command keys; ignored on other node kinds.
    #[serde(default)]
    pub commands: Vec<LocatorCommandKey>,
}

impl NodeAnimator {
    pub fn new(node: Uuid) -> Self {
        Self {
            node,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
            && self.rotation.is_empty()
            && self.scale.is_empty()
            && self.commands.is_empty()
    }
}

/// One authored animation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationSource {
    pub name: String,
    /// Length in seconds.
    pub length: f64,
    #[serde(default)]
    pub loop_mode: LoopMode,
    /// Pause (seconds) before a looping animation restarts.
    #[serde(default)]
    pub loop_delay: f64,
    #[serde(default)]
    pub animators: Vec<NodeAnimator>,
    #[serde(default)]
    pub variant_keys: Vec<VariantKey>,
    #[serde(default)]
    pub command_keys: Vec<CommandKey>,
}

/// Convert seconds to the nearest whole tick.
#[inline]
pub fn seconds_to_tick(seconds: f64) -> i64 {
    (seconds * TICKS_PER_SECOND as f64).round() as i64
}

impl AnimationSource {
    pub fn new(name: impl Into<String>, length: f64) -> Self {
        Self {
            name: name.into(),
            length,
            loop_mode: LoopMode::Once,
            loop_delay: 0.0,
            animators: Vec::new(),
            variant_keys: Vec::new(),
            command_keys: Vec::new(),
        }
    }

    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    pub fn with_animator(mut self, animator: NodeAnimator) -> Self {
        self.animators.push(animator);
        self
    }

    /// Length in ticks (rounded).
    #[inline]
    pub fn duration_ticks(&self) -> u32 {
        seconds_to_tick(self.length).max(0) as u32
    }

    #[inline]
    pub fn loop_delay_ticks(&self) -> u32 {
        seconds_to_tick(self.loop_delay).max(0) as u32
    }

    /// Reject non-finite, negative or oversized times, non-finite values, unsorted channels and
    /// command text that would not stay on one function line.
    pub fn validate(&self) -> Result<()> {
        for duration in [self.length, self.loop_delay] {
            // Tick counters are 32-bit scores.
            if !duration.is_finite()
                || duration < 0.0
                || seconds_to_tick(duration) > i64::from(i32::MAX)
            {
                return Err(BakeError::InvalidDuration {
                    animation: self.name.clone(),
                    duration,
                });
            }
        }

        let mut seen = hashbrown::HashSet::new();
        for animator in &self.animators {
            let node = Some(animator.node);
            if !seen.insert(animator.node) {
                return Err(self.keyframe_error(node, "node is animated twice".to_string()));
            }
            for (channel, keys) in [
                ("position", &animator.position),
                ("rotation", &animator.rotation),
                ("scale", &animator.scale),
            ] {
                self.check_times(node, channel, keys.iter().map(|k| k.time))?;
                if let Some(k) = keys.iter().find(|k| k.value.iter().any(|v| !v.is_finite())) {
                    return Err(self.keyframe_error(
                        node,
                        format!("{channel} key at {}s has a non-finite value", k.time),
                    ));
                }
            }
            self.check_times(node, "commands", animator.commands.iter().map(|k| k.time))?;
            for key in &animator.commands {
                self.check_lines(node, &key.commands, key.execute_condition.as_ref())?;
            }
        }
        self.check_times(None, "variant", self.variant_keys.iter().map(|k| k.time))?;
        self.check_times(None, "commands", self.command_keys.iter().map(|k| k.time))?;
        for key in &self.variant_keys {
            self.check_lines(None, &[], key.execute_condition.as_ref())?;
        }
        for key in &self.command_keys {
            self.check_lines(None, &key.commands, key.execute_condition.as_ref())?;
        }
        Ok(())
    }

    fn check_lines(
        &self,
        node: Option<Uuid>,
        commands: &[String],
        condition: Option<&String>,
    ) -> Result<()> {
        let broken = commands
            .iter()
            .chain(condition)
            .find(|line| line.contains(['\n', '\r']));
        match broken {
            Some(line) => Err(self.keyframe_error(
                node,
                format!("command text {line:?} spans more than one line"),
            )),
            None => Ok(()),
        }
    }

    fn check_times(
        &self,
        node: Option<Uuid>,
        channel: &str,
        times: impl Iterator<Item = f64>,
    ) -> Result<()> {
        let mut last = 0.0f64;
        for time in times {
            if !time.is_finite() || time < 0.0 {
                return Err(self.keyframe_error(
                    node,
                    format!("{channel} key time {time} must be finite and non-negative"),
                ));
            }
            if time < last {
                return Err(self.keyframe_error(
                    node,
                    format!("{channel} keys must be sorted by time ({time} after {last})"),
                ));
            }
            last = time;
        }
        Ok(())
    }

    fn keyframe_error(&self, node: Option<Uuid>, reason: String) -> BakeError {
        BakeError::InvalidKeyframe {
            animation: self.name.clone(),
            node,
            reason,
        }
    }
}

/// Accept either a newline-separated string or a list of lines; blank lines are dropped.
fn command_lines<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lines {
        One(String),
        Many(Vec<String>),
    }

    let raw = match Lines::deserialize(deserializer)? {
        Lines::One(s) => s.lines().map(str::to_string).collect::<Vec<_>>(),
        Lines::Many(v) => v,
    };
    Ok(raw
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}
