//! Error types for the bake pipeline.
//!
//! Everything in [`BakeError`] aborts the compile; recoverable problems are reported as
//! [`crate::diagnostics::Diagnostic`]s instead.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fatal compile error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BakeError {
    /// Blueprint node with a kind this compiler does not model
    #[error("Unknown node kind '{kind}' on node '{node}'")]
    UnknownNodeKind { node: String, kind: String },

    /// Two nodes share a UUID
    #[error("Duplicate node uuid {uuid}")]
    DuplicateNode { uuid: Uuid },

    /// Parent UUID not present in the rig
    #[error("Node {node} references missing parent {parent}")]
    MissingParent { node: Uuid, parent: Uuid },

    /// Parent links do not form a tree
    #[error("Node hierarchy contains a cycle through {node}")]
    HierarchyCycle { node: Uuid },

    /// Negative, NaN or infinite animation length
    #[error("Animation '{animation}' has invalid duration {duration}")]
    InvalidDuration { animation: String, duration: f64 },

    /// Keyframe with a non-finite time/value or out-of-order time
    #[error("Animation '{animation}': invalid keyframe on node {node:?}: {reason}")]
    InvalidKeyframe {
        animation: String,
        node: Option<Uuid>,
        reason: String,
    },

    /// Animation data (or a frame) references a node absent from the rig
    #[error("Animation '{animation}' references node {node} which is not part of the rig")]
    UnknownNode { animation: String, node: Uuid },

    /// A frame transform that cannot be decomposed (degenerate or non-finite matrix)
    #[error("Animation '{animation}': cannot decompose transform of node {node} at tick {tick}")]
    DegenerateTransform {
        animation: String,
        node: Uuid,
        tick: u32,
    },

    /// Rejected configuration value
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Two generated files resolved to the same path
    #[error("Duplicate output path: {path}")]
    DuplicateOutput { path: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// IO error while writing output
    #[error("IO error at {path}: {reason}")]
    IoError { path: String, reason: String },
}

impl BakeError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownNodeKind { .. }
            | Self::DuplicateNode { .. }
            | Self::MissingParent { .. }
            | Self::HierarchyCycle { .. } => "rig",
            Self::InvalidDuration { .. }
            | Self::InvalidKeyframe { .. }
            | Self::UnknownNode { .. }
            | Self::DegenerateTransform { .. } => "animation",
            Self::InvalidConfig { .. } => "config",
            Self::DuplicateOutput { .. } => "codegen",
            Self::SerializationError { .. } => "serialization",
            Self::IoError { .. } => "io",
        }
    }

    /// Name of the animation at fault, when the error is tied to one.
    pub fn animation(&self) -> Option<&str> {
        match self {
            Self::InvalidDuration { animation, .. }
            | Self::InvalidKeyframe { animation, .. }
            | Self::UnknownNode { animation, .. }
            | Self::DegenerateTransform { animation, .. } => Some(animation),
            _ => None,
        }
    }

    /// UUID of the node at fault, when known.
    pub fn node(&self) -> Option<Uuid> {
        match self {
            Self::DuplicateNode { uuid } => Some(*uuid),
            Self::MissingParent { node, .. }
            | Self::HierarchyCycle { node }
            | Self::UnknownNode { node, .. }
            | Self::DegenerateTransform { node, .. } => Some(*node),
            Self::InvalidKeyframe { node, .. } => *node,
            _ => None,
        }
    }

    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::IoError {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BakeError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, BakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let err = BakeError::InvalidDuration {
            animation: "walk".into(),
            duration: f64::NAN,
        };
        assert_eq!(err.category(), "animation");
        assert_eq!(err.animation(), Some("walk"));
        assert_eq!(err.node(), None);

        let node = Uuid::from_u128(7);
        let err = BakeError::HierarchyCycle { node };
        assert_eq!(err.category(), "rig");
        assert_eq!(err.node(), Some(node));
    }

    #[test]
    fn display_names_animation_and_node() {
        let node = Uuid::from_u128(1);
        let err = BakeError::UnknownNode {
            animation: "idle".into(),
            node,
        };
        let text = err.to_string();
        assert!(text.contains("idle"));
        assert!(text.contains(&node.to_string()));
    }
}
