//! Bake configuration.

use serde::{Deserialize, Serialize};

use crate::error::{BakeError, Result};

/// Target runtime tick rate. Fixed: the runtime advances 20 ticks per second.
pub const TICKS_PER_SECOND: u32 = 20;

/// Length of one tick in seconds.
pub const TICK_SECONDS: f64 = 1.0 / TICKS_PER_SECOND as f64;

/// Global settings for one compile pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    /// Function namespace; derived from the blueprint name when `None`.
    pub namespace: Option<String>,
    /// Interpolation duration (ticks) applied to display entities during normal playback.
    pub interpolation_duration: u32,
    /// Tween length (ticks) used by `tween_play`/`tween_resume` when the caller sets none.
    pub tween_duration: u32,
    /// Offset (seconds) used to resample the settled value after a stacked instant transition.
    pub pre_post_epsilon: f64,
    /// Decimal places kept for matrix entries and teleport coordinates.
    pub matrix_precision: u32,
    /// `pack_format` written to `pack.mcmeta`.
    pub pack_format: u32,
    pub description: String,
    /// File name of the emitted manifest, relative to the output root.
    pub manifest_name: String,
    /// Entity type used for the rig root.
    pub root_entity: String,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            interpolation_duration: 1,
            tween_duration: 10,
            pre_post_epsilon: 0.001,
            matrix_precision: 4,
            pack_format: 48,
            description: "Baked rig animations".to_string(),
            manifest_name: "rigbake_manifest.json".to_string(),
            root_entity: "minecraft:item_display".to_string(),
        }
    }
}

impl BakeConfig {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_interpolation_duration(mut self, ticks: u32) -> Self {
        self.interpolation_duration = ticks;
        self
    }

    pub fn with_tween_duration(mut self, ticks: u32) -> Self {
        self.tween_duration = ticks;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.pre_post_epsilon.is_finite()
            || self.pre_post_epsilon <= 0.0
            || self.pre_post_epsilon >= TICK_SECONDS / 2.0
        {
            return Err(BakeError::InvalidConfig {
                reason: format!(
                    "pre_post_epsilon must be in (0, {}) seconds, got {}",
                    TICK_SECONDS / 2.0,
                    self.pre_post_epsilon
                ),
            });
        }
        if !(1..=8).contains(&self.matrix_precision) {
            return Err(BakeError::InvalidConfig {
                reason: format!(
                    "matrix_precision must be between 1 and 8, got {}",
                    self.matrix_precision
                ),
            });
        }
        if self.tween_duration == 0 {
            return Err(BakeError::InvalidConfig {
                reason: "tween_duration must be at least one tick".to_string(),
            });
        }
        if let Some(ns) = &self.namespace {
            if ns.is_empty() || crate::names::storage_safe(ns) != *ns {
                return Err(BakeError::InvalidConfig {
                    reason: format!("namespace '{ns}' must match [a-z0-9_]+"),
                });
            }
        }
        if self.manifest_name.is_empty() || self.manifest_name.contains(['/', '\\']) {
            return Err(BakeError::InvalidConfig {
                reason: format!("manifest_name '{}' must be a bare file name", self.manifest_name),
            });
        }
        Ok(())
    }

    /// Rounding factor for emitted coordinates (`10^precision`).
    #[inline]
    pub(crate) fn precision_scale(&self) -> f64 {
        10f64.powi(self.matrix_precision as i32)
    }
}
