//! Blueprint JSON: the host editor's export of a rig and its animations.
//!
//! Shape:
//! ```json
//! {
//!   "name": "Wolf",
//!   "settings": { "interpolation_duration": 2 },
//!   "nodes": [{ "uuid": "...", "name": "body", "type": "bone", "parent": null, "bind": {...} }],
//!   "variants": [{ "uuid": "...", "name": "Red", "models": { "<bone uuid>": "minecraft:red_dye" } }],
//!   "animations": [{ "name": "walk", "length": 2.0, "loop_mode": "loop", "animators": [...] }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::BakeConfig;
use crate::data::AnimationSource;
use crate::error::{BakeError, Result};
use crate::rig::{Rig, RigNode, Variant, NODE_KIND_NAMES};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub name: String,
    #[serde(default)]
    pub settings: BakeConfig,
    #[serde(default)]
    pub nodes: Vec<RigNode>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub animations: Vec<AnimationSource>,
}

/// Reject node kinds outside the closed set before typed deserialization, so the error names
/// the node instead of a serde position.
fn check_node_kinds(raw: &Value) -> Result<()> {
    let Some(nodes) = raw.get("nodes").and_then(Value::as_array) else {
        return Ok(());
    };
    for node in nodes {
        let Some(kind) = node.get("type").and_then(Value::as_str) else {
            continue;
        };
        if !NODE_KIND_NAMES.contains(&kind) {
            let name = node
                .get("name")
                .and_then(Value::as_str)
                .or_else(|| node.get("uuid").and_then(Value::as_str))
                .unwrap_or("<unnamed>");
            return Err(BakeError::UnknownNodeKind {
                node: name.to_string(),
                kind: kind.to_string(),
            });
        }
    }
    Ok(())
}

impl Blueprint {
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(s)?;
        Self::from_value(raw)
    }

    pub fn from_value(raw: Value) -> Result<Self> {
        check_node_kinds(&raw)?;
        let blueprint: Blueprint = serde_json::from_value(raw)?;
        log::debug!(
            "blueprint '{}': {} node(s), {} variant(s), {} animation(s)",
            blueprint.name,
            blueprint.nodes.len(),
            blueprint.variants.len(),
            blueprint.animations.len()
        );
        Ok(blueprint)
    }

    /// Validated rig plus the animation sources and settings.
    pub fn into_parts(self) -> Result<(Rig, Vec<AnimationSource>, BakeConfig)> {
        let rig = Rig::new(self.name, self.nodes, self.variants)?;
        Ok((rig, self.animations, self.settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_names_the_node() {
        let json = r#"{
            "name": "wolf",
            "nodes": [{ "uuid": "00000000-0000-0000-0000-000000000001", "name": "glow", "type": "light" }]
        }"#;
        assert_eq!(
            Blueprint::from_json(json).unwrap_err(),
            BakeError::UnknownNodeKind {
                node: "glow".into(),
                kind: "light".into()
            }
        );
    }

    #[test]
    fn settings_default_when_absent() {
        let json = r#"{
            "name": "wolf",
            "nodes": [{ "uuid": "00000000-0000-0000-0000-000000000001", "name": "body", "type": "bone" }]
        }"#;
        let bp = Blueprint::from_json(json).unwrap();
        assert_eq!(bp.settings, BakeConfig::default());
        let (rig, animations, _) = bp.into_parts().unwrap();
        assert_eq!(rig.len(), 1);
        assert!(animations.is_empty());
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            Blueprint::from_json("{"),
            Err(BakeError::SerializationError { .. })
        ));
    }
}
