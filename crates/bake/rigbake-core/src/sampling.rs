//! Frame sampler: turns an authored animation into sparse per-tick frames.
//!
//! Every tick in `[0, duration)` is evaluated, but a node only gets an entry when its rounded
//! matrix differs from the last one emitted for it (or, for locators, when a command key fires).
//! Instant transitions are tagged so codegen can skip the client-side interpolation:
//! - `Step`: a key reached through a Step segment since the previous tick;
//! - `PrePost`: two keys stacked in the half tick before this tick, resampled just after them.

use indexmap::IndexSet;
use nalgebra::Matrix4;
use uuid::Uuid;

use crate::config::{BakeConfig, TICKS_PER_SECOND, TICK_SECONDS};
use crate::data::{seconds_to_tick, AnimationSource, LocatorCommandKey, NodeAnimator, TransformKey};
use crate::diagnostics::Diagnostics;
use crate::error::{BakeError, Result};
use crate::frame::{
    AnimationDescriptor, CommandEffect, Frame, LocatorEffect, NodeFrame, VariantEffect,
};
use crate::interp::{has_stacked_keys, has_step_arrival, sample_channel};
use crate::names::{path_safe, storage_safe};
use crate::rig::{NodeKind, Orientation, Rig};
use crate::transform::{compose_local, InterpolationMarker, NodeTransform};

/// Names an animation is compiled under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationNames {
    /// `[a-z0-9_.-]`, used in function paths.
    pub path: String,
    /// `[a-z0-9_]`, used in objectives and tags.
    pub storage: String,
}

impl AnimationNames {
    pub fn from_name(name: &str) -> Self {
        Self {
            path: path_safe(name),
            storage: storage_safe(name),
        }
    }
}

/// Keys of one node that fall inside the animation.
#[derive(Default)]
struct Channels<'a> {
    position: &'a [TransformKey],
    rotation: &'a [TransformKey],
    scale: &'a [TransformKey],
    commands: &'a [LocatorCommandKey],
}

impl<'a> Channels<'a> {
    fn is_animated(&self) -> bool {
        !(self.position.is_empty() && self.rotation.is_empty() && self.scale.is_empty())
    }

    fn marker(&self, time: f64) -> InterpolationMarker {
        let half = TICK_SECONDS / 2.0;
        let tracks = [self.position, self.rotation, self.scale];
        if tracks.iter().any(|k| has_stacked_keys(k, time - half, time)) {
            InterpolationMarker::PrePost
        } else if tracks
            .iter()
            .any(|k| has_step_arrival(k, time - TICK_SECONDS, time))
        {
            InterpolationMarker::Step
        } else {
            InterpolationMarker::None
        }
    }
}

/// Drop keys after the end of the animation, warning once per channel.
fn trim<'a, K>(
    keys: &'a [K],
    time_of: impl Fn(&K) -> f64,
    length: f64,
    channel: &str,
    animation: &str,
    node: Option<Uuid>,
    diagnostics: &mut Diagnostics,
) -> &'a [K] {
    let keep = keys.partition_point(|k| time_of(k) <= length);
    if keep < keys.len() {
        diagnostics.warn(
            Some(animation),
            node,
            format!(
                "{} {channel} keyframe(s) after the end of the animation ({length}s) are ignored",
                keys.len() - keep
            ),
        );
    }
    &keys[..keep]
}

struct RepeatState {
    effect: LocatorEffect,
    from_tick: u32,
}

/// Sample `source` against `rig` into an [`AnimationDescriptor`].
pub fn sample_animation(
    rig: &Rig,
    source: &AnimationSource,
    config: &BakeConfig,
    names: AnimationNames,
    diagnostics: &mut Diagnostics,
) -> Result<AnimationDescriptor> {
    source.validate()?;
    let anim = source.name.as_str();
    let duration = source.duration_ticks();
    let precision = config.precision_scale();
    let epsilon = config.pre_post_epsilon;

    let mut channels: Vec<Channels<'_>> = (0..rig.len()).map(|_| Channels::default()).collect();
    for animator in &source.animators {
        let idx = rig.index_of(&animator.node).ok_or(BakeError::UnknownNode {
            animation: source.name.clone(),
            node: animator.node,
        })?;
        channels[idx] = trim_animator(rig, idx, animator, source, diagnostics);
    }

    let rest: Vec<[f64; 16]> = rest_pose(rig, config)?.into_iter().map(|t| t.matrix).collect();

    let mut last: Vec<Option<[f64; 16]>> = vec![None; rig.len()];
    let mut repeats: Vec<Option<RepeatState>> = (0..rig.len()).map(|_| None).collect();
    let mut modified = vec![false; rig.len()];
    let mut frames: Vec<Frame> = Vec::new();

    for tick in 0..duration {
        let time = tick as f64 / TICKS_PER_SECOND as f64;
        let mut markers: Vec<InterpolationMarker> = Vec::with_capacity(rig.len());
        for (idx, ch) in channels.iter().enumerate() {
            let inherited = rig
                .parent_index(idx)
                .map(|p| markers[p])
                .unwrap_or_default();
            markers.push(ch.marker(time).max(inherited));
        }
        let worlds = world_matrices(rig, &channels, Some(markers.as_slice()), time, epsilon);

        let mut frame = Frame::new(tick);
        for (idx, node) in rig.nodes().iter().enumerate() {
            let orientation = node.kind.orientation();
            let marker = match orientation {
                Orientation::Matrix => markers[idx],
                Orientation::HeadRotation => InterpolationMarker::None,
            };
            let transform = NodeTransform::from_matrix(&worlds[idx], marker, precision).ok_or(
                BakeError::DegenerateTransform {
                    animation: source.name.clone(),
                    node: node.uuid,
                    tick,
                },
            )?;
            let changed = last[idx].as_ref() != Some(&transform.matrix);

            let effect = match node.kind {
                NodeKind::Locator { .. } => {
                    locator_effect(&channels[idx], &mut repeats[idx], tick, anim, node.uuid, diagnostics)
                }
                _ => None,
            };

            let emit = match node.kind {
                NodeKind::Locator { tracked } => effect.is_some() || (tracked && changed),
                _ => changed,
            };
            if !emit {
                continue;
            }
            if effect.is_some() || (changed && rest[idx] != transform.matrix) {
                modified[idx] = true;
            }
            last[idx] = Some(transform.matrix);
            frame.nodes.insert(node.uuid, NodeFrame { transform, effect });
        }

        frame.variant = variant_effect(rig, source, tick, diagnostics);
        frame.commands = command_effect(source, tick);

        if !frame.is_empty() {
            frames.push(frame);
        }
    }

    for key in &source.variant_keys {
        if seconds_to_tick(key.time) >= duration as i64 {
            diagnostics.warn(
                Some(anim),
                None,
                format!("variant keyframe at {}s is past the end and is ignored", key.time),
            );
        }
    }
    for key in &source.command_keys {
        if seconds_to_tick(key.time) >= duration as i64 {
            diagnostics.warn(
                Some(anim),
                None,
                format!("command keyframe at {}s is past the end and is ignored", key.time),
            );
        }
    }

    let modified_nodes: IndexSet<Uuid> = rig
        .nodes()
        .iter()
        .zip(&modified)
        .filter(|(_, m)| **m)
        .map(|(n, _)| n.uuid)
        .collect();

    // Untouched nodes keep whatever pose another animation left them in.
    for frame in &mut frames {
        frame.nodes.retain(|uuid, _| modified_nodes.contains(uuid));
    }
    frames.retain(|f| !f.is_empty());

    log::debug!(
        "sampled '{}': {} frame(s) over {} tick(s), {} modified node(s)",
        anim,
        frames.len(),
        duration,
        modified_nodes.len()
    );

    Ok(AnimationDescriptor {
        name: source.name.clone(),
        path_name: names.path,
        storage_name: names.storage,
        duration,
        loop_mode: source.loop_mode,
        loop_delay: source.loop_delay_ticks(),
        modified_nodes,
        frames,
    })
}

/// Bind pose of every node relative to the rig root, parallel to `rig.nodes()`.
pub fn rest_pose(rig: &Rig, config: &BakeConfig) -> Result<Vec<NodeTransform>> {
    let channels: Vec<Channels<'_>> = (0..rig.len()).map(|_| Channels::default()).collect();
    world_matrices(rig, &channels, None, 0.0, config.pre_post_epsilon)
        .iter()
        .zip(rig.nodes())
        .map(|(m, node)| {
            NodeTransform::from_matrix(m, InterpolationMarker::None, config.precision_scale()).ok_or(
                BakeError::DegenerateTransform {
                    animation: "bind pose".to_string(),
                    node: node.uuid,
                    tick: 0,
                },
            )
        })
        .collect()
}

fn trim_animator<'a>(
    rig: &Rig,
    idx: usize,
    animator: &'a NodeAnimator,
    source: &AnimationSource,
    diagnostics: &mut Diagnostics,
) -> Channels<'a> {
    let node = rig.nodes()[idx].uuid;
    let name = source.name.as_str();
    let len = source.length;
    let time = |k: &TransformKey| k.time;
    let mut commands = trim(
        &animator.commands,
        |k: &LocatorCommandKey| k.time,
        len,
        "locator command",
        name,
        Some(node),
        diagnostics,
    );
    if !commands.is_empty() && !matches!(rig.nodes()[idx].kind, NodeKind::Locator { .. }) {
        diagnostics.warn(
            Some(name),
            Some(node),
            "command keyframes on a node that is not a locator are ignored",
        );
        commands = &[];
    }
    Channels {
        position: trim(&animator.position, time, len, "position", name, Some(node), diagnostics),
        rotation: trim(&animator.rotation, time, len, "rotation", name, Some(node), diagnostics),
        scale: trim(&animator.scale, time, len, "scale", name, Some(node), diagnostics),
        commands,
    }
}

/// Root-relative matrices of every node. With `markers`, nodes flagged `PrePost` are sampled
/// just after `time` so they land on the post value of the stacked keys.
fn world_matrices(
    rig: &Rig,
    channels: &[Channels<'_>],
    markers: Option<&[InterpolationMarker]>,
    time: f64,
    epsilon: f64,
) -> Vec<Matrix4<f64>> {
    let mut worlds: Vec<Matrix4<f64>> = Vec::with_capacity(rig.len());
    for (idx, node) in rig.nodes().iter().enumerate() {
        let ch = &channels[idx];
        let t = match markers.map(|m| m[idx]) {
            Some(InterpolationMarker::PrePost) => time + epsilon,
            _ => time,
        };
        let (position, rotation, scale) = if markers.is_some() && ch.is_animated() {
            (
                sample_channel(ch.position, t).unwrap_or([0.0; 3]),
                sample_channel(ch.rotation, t).unwrap_or([0.0; 3]),
                sample_channel(ch.scale, t).unwrap_or([1.0; 3]),
            )
        } else {
            ([0.0; 3], [0.0; 3], [1.0; 3])
        };
        let parent = rig.parent_index(idx);
        let parent_origin = parent
            .map(|p| rig.nodes()[p].bind.origin)
            .unwrap_or([0.0; 3]);
        let local = compose_local(&node.bind, parent_origin, position, rotation, scale);
        let world = match parent {
            Some(p) => worlds[p] * local,
            None => local,
        };
        worlds.push(world);
    }
    worlds
}

fn locator_effect(
    channels: &Channels<'_>,
    repeat: &mut Option<RepeatState>,
    tick: u32,
    animation: &str,
    node: Uuid,
    diagnostics: &mut Diagnostics,
) -> Option<LocatorEffect> {
    if let Some(key) = channels
        .commands
        .iter()
        .find(|k| seconds_to_tick(k.time) == tick as i64)
    {
        let mut frequency = key.repeat_frequency;
        if key.repeat && frequency == 0 {
            diagnostics.warn(
                Some(animation),
                Some(node),
                format!("repeat frequency 0 at {}s treated as 1", key.time),
            );
            frequency = 1;
        }
        if key.commands.is_empty() {
            *repeat = None;
            return None;
        }
        let effect = LocatorEffect {
            commands: key.commands.clone(),
            execute_condition: key.execute_condition.clone(),
            repeat: key.repeat,
            repeat_frequency: frequency.max(1),
        };
        *repeat = key.repeat.then(|| RepeatState {
            effect: effect.clone(),
            from_tick: tick,
        });
        return Some(effect);
    }

    let state = repeat.as_ref()?;
    let elapsed = tick - state.from_tick;
    (elapsed % state.effect.repeat_frequency == 0).then(|| state.effect.clone())
}

fn variant_effect(
    rig: &Rig,
    source: &AnimationSource,
    tick: u32,
    diagnostics: &mut Diagnostics,
) -> Option<VariantEffect> {
    let key = source
        .variant_keys
        .iter()
        .find(|k| seconds_to_tick(k.time) == tick as i64)?;
    let mut variants = Vec::with_capacity(key.variants.len());
    for uuid in &key.variants {
        if rig.variant(uuid).is_some() {
            variants.push(*uuid);
        } else {
            diagnostics.warn(
                Some(&source.name),
                None,
                format!("variant keyframe at {}s references missing variant {uuid}; dropped", key.time),
            );
        }
    }
    if variants.is_empty() {
        return None;
    }
    Some(VariantEffect {
        variants,
        execute_condition: key.execute_condition.clone(),
    })
}

fn command_effect(source: &AnimationSource, tick: u32) -> Option<CommandEffect> {
    let key = source
        .command_keys
        .iter()
        .find(|k| seconds_to_tick(k.time) == tick as i64)?;
    if key.commands.is_empty() {
        return None;
    }
    Some(CommandEffect {
        commands: key.commands.clone(),
        execute_condition: key.execute_condition.clone(),
    })
}
