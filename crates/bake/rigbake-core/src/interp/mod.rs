//! Keyframe channel evaluation.
//!
//! Channels are left-continuous at instant transitions: sampling exactly at the time of two
//! stacked keys yields the first (pre) value, any later time yields the second (post) value.

pub mod functions;

use crate::data::{Interpolation, TransformKey};
use functions::{bezier_ease_t, catmull_rom_vec3, lerp_vec3};

/// Default bezier handles (linear timing) when a key carries none.
const LINEAR_OUT: (f64, f64) = (0.0, 0.0);
const LINEAR_IN: (f64, f64) = (1.0, 1.0);

/// Evaluate a sorted channel at `time` (seconds). `None` for an empty channel.
pub fn sample_channel(keys: &[TransformKey], time: f64) -> Option<[f64; 3]> {
    let first = keys.first()?;
    let i = keys.partition_point(|k| k.time < time);
    if i == 0 {
        return Some(first.value);
    }
    if i == keys.len() {
        return keys.last().map(|k| k.value);
    }
    let right = &keys[i];
    if right.time == time {
        return Some(right.value);
    }
    let left = &keys[i - 1];
    let span = right.time - left.time;
    let t = if span > 0.0 {
        (time - left.time) / span
    } else {
        1.0
    };

    let value = match left.interpolation {
        Interpolation::Step => {
            if t >= 1.0 {
                right.value
            } else {
                left.value
            }
        }
        Interpolation::Linear => lerp_vec3(left.value, right.value, t),
        Interpolation::CatmullRom => {
            let before = if i >= 2 { keys[i - 2].value } else { left.value };
            let after = keys.get(i + 1).map(|k| k.value).unwrap_or(right.value);
            catmull_rom_vec3(before, left.value, right.value, after, t)
        }
        Interpolation::Bezier => {
            let (x1, y1) = left
                .transitions
                .as_ref()
                .and_then(|tr| tr.r#out)
                .map(|p| (p.x, p.y))
                .unwrap_or(LINEAR_OUT);
            let (x2, y2) = right
                .transitions
                .as_ref()
                .and_then(|tr| tr.r#in)
                .map(|p| (p.x, p.y))
                .unwrap_or(LINEAR_IN);
            lerp_vec3(left.value, right.value, bezier_ease_t(t, x1, y1, x2, y2))
        }
    };
    Some(value)
}

/// Whether two keys of the channel share a time inside `(lo, hi]`.
pub fn has_stacked_keys(keys: &[TransformKey], lo: f64, hi: f64) -> bool {
    keys.windows(2)
        .any(|w| w[0].time == w[1].time && w[0].time > lo && w[0].time <= hi)
}

/// Whether a key inside `(lo, hi]` is reached through a Step segment.
pub fn has_step_arrival(keys: &[TransformKey], lo: f64, hi: f64) -> bool {
    keys.windows(2).any(|w| {
        w[0].interpolation == Interpolation::Step
            && w[0].time < w[1].time
            && w[1].time > lo
            && w[1].time <= hi
    })
}
