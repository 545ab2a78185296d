//! Non-fatal compile diagnostics.
//!
//! Warnings are aggregated and handed back with the compile output; the host shows them after
//! the build without blocking it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning; it is also forwarded to the `log` facade.
    pub fn warn(&mut self, animation: Option<&str>, node: Option<Uuid>, message: impl Into<String>) {
        let message = message.into();
        match animation {
            Some(anim) => log::warn!("[{anim}] {message}"),
            None => log::warn!("{message}"),
        }
        self.items.push(Diagnostic {
            severity: Severity::Warning,
            animation: animation.map(str::to_string),
            node,
            message,
        });
    }

    pub fn info(&mut self, animation: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.items.push(Diagnostic {
            severity: Severity::Info,
            animation: animation.map(str::to_string),
            node: None,
            message,
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
