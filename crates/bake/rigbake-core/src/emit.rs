//! Writing a compiled datapack to disk.
//!
//! Files are written in path order, followed by the manifest. Paths listed by a previous
//! manifest in the same directory but not produced by this run are removed, so regenerating
//! into the same output leaves no stale functions behind.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::config::BakeConfig;
use crate::datapack::Datapack;
use crate::error::{BakeError, Result};

/// Receives emission progress as units completed against a precomputed total.
pub trait ProgressSink: Sync {
    fn begin(&self, total: usize);
    fn advance(&self, completed: usize);
}

/// Sink that ignores progress.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn begin(&self, _total: usize) {}
    fn advance(&self, _completed: usize) {}
}

/// Sink that can be polled from another thread.
#[derive(Debug, Default)]
pub struct AtomicProgress {
    total: AtomicUsize,
    completed: AtomicUsize,
}

impl AtomicProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Acquire)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Fraction done in `[0, 1]`; 0 before `begin`.
    pub fn fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.completed() as f64 / total as f64,
        }
    }
}

impl ProgressSink for AtomicProgress {
    fn begin(&self, total: usize) {
        self.completed.store(0, Ordering::Release);
        self.total.store(total, Ordering::Release);
    }

    fn advance(&self, completed: usize) {
        self.completed.store(completed, Ordering::Release);
    }
}

/// Every path written by one emission, relative to the output root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Sorted; includes the manifest itself.
    pub files: Vec<String>,
}

impl Manifest {
    pub fn contains(&self, path: &str) -> bool {
        self.files.binary_search_by(|p| p.as_str().cmp(path)).is_ok()
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BakeError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| BakeError::io(path, e))
}

/// Only plain relative paths (no root, prefix, `.` or `..`) may be removed during cleanup.
fn is_relative_inside(path: &str) -> bool {
    let path = Path::new(path);
    path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Read the manifest left by a previous emission, if any.
pub fn read_manifest(out_dir: &Path, config: &BakeConfig) -> Result<Option<Manifest>> {
    let path = out_dir.join(&config.manifest_name);
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|e| BakeError::io(&path, e))?;
    Ok(Some(serde_json::from_str(&text)?))
}

/// Write `datapack` under `out_dir` and return the manifest of written paths.
pub fn emit(
    datapack: &Datapack,
    out_dir: &Path,
    config: &BakeConfig,
    progress: &dyn ProgressSink,
) -> Result<Manifest> {
    if datapack.get(&config.manifest_name).is_some() {
        return Err(BakeError::DuplicateOutput {
            path: config.manifest_name.clone(),
        });
    }
    let previous = read_manifest(out_dir, config)?;

    let mut files: BTreeSet<String> = datapack.paths().map(str::to_string).collect();
    files.insert(config.manifest_name.clone());
    let manifest = Manifest {
        files: files.into_iter().collect(),
    };

    let total = datapack.len() + 1;
    progress.begin(total);
    for (done, (path, file)) in datapack.iter().enumerate() {
        write_file(&out_dir.join(path), &file.render())?;
        progress.advance(done + 1);
    }
    let mut text = serde_json::to_string_pretty(&manifest)?;
    text.push('\n');
    write_file(&out_dir.join(&config.manifest_name), &text)?;
    progress.advance(total);

    if let Some(previous) = previous {
        let mut removed = 0usize;
        for stale in previous.files.iter().filter(|p| !manifest.contains(p)) {
            if !is_relative_inside(stale) {
                log::warn!("ignoring manifest entry '{stale}' that points outside the output directory");
                continue;
            }
            let path = out_dir.join(stale);
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| BakeError::io(&path, e))?;
                removed += 1;
            }
        }
        if removed > 0 {
            log::debug!("removed {removed} stale file(s) from {}", out_dir.display());
        }
    }

    log::info!("emitted {} file(s) to {}", manifest.files.len(), out_dir.display());
    Ok(manifest)
}
