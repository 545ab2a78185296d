//! In-memory datapack: every generated file keyed by its path relative to the output root.
//!
//! Function files keep their command IR until they are rendered, so tests and the reference
//! interpreter can run exactly what would be written.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::command::{Command, FunctionPath};
use crate::error::{BakeError, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum PackFile {
    Function {
        path: FunctionPath,
        commands: Vec<Command>,
    },
    Text(String),
}

impl PackFile {
    /// File contents as written to disk.
    pub fn render(&self) -> String {
        match self {
            Self::Function { commands, .. } => {
                let mut out = String::new();
                for cmd in commands {
                    out.push_str(&cmd.to_string());
                    out.push('\n');
                }
                out
            }
            Self::Text(text) => text.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Datapack {
    files: BTreeMap<String, PackFile>,
}

impl Datapack {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, path: String, file: PackFile) -> Result<()> {
        if self.files.contains_key(&path) {
            return Err(BakeError::DuplicateOutput { path });
        }
        self.files.insert(path, file);
        Ok(())
    }

    pub fn add_function(&mut self, path: FunctionPath, commands: Vec<Command>) -> Result<()> {
        self.insert(path.file_path(), PackFile::Function { path, commands })
    }

    pub fn add_text(&mut self, path: impl Into<String>, contents: impl Into<String>) -> Result<()> {
        self.insert(path.into(), PackFile::Text(contents.into()))
    }

    /// Pretty-printed JSON file with a trailing newline.
    pub fn add_json<T: Serialize>(&mut self, path: impl Into<String>, value: &T) -> Result<()> {
        let mut text = serde_json::to_string_pretty(value)?;
        text.push('\n');
        self.add_text(path, text)
    }

    /// Move every file of `other` into this pack.
    pub fn extend(&mut self, other: Datapack) -> Result<()> {
        for (path, file) in other.files {
            self.insert(path, file)?;
        }
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&PackFile> {
        self.files.get(path)
    }

    /// Commands of a function, if the pack defines it.
    pub fn function(&self, path: &FunctionPath) -> Option<&[Command]> {
        match self.files.get(&path.file_path())? {
            PackFile::Function { commands, .. } => Some(commands),
            PackFile::Text(_) => None,
        }
    }

    /// Rendered contents of a file.
    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.get(path).map(PackFile::render)
    }

    pub fn functions(&self) -> impl Iterator<Item = (&FunctionPath, &[Command])> {
        self.files.values().filter_map(|f| match f {
            PackFile::Function { path, commands } => Some((path, commands.as_slice())),
            PackFile::Text(_) => None,
        })
    }

    /// Files in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PackFile)> {
        self.files.iter().map(|(p, f)| (p.as_str(), f))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_paths() {
        let mut pack = Datapack::new();
        let path = FunctionPath::new("rig", "play");
        pack.add_function(path.clone(), vec![Command::Comment("a".into())])
            .unwrap();
        let err = pack.add_function(path, Vec::new()).unwrap_err();
        assert_eq!(
            err,
            BakeError::DuplicateOutput {
                path: "data/rig/function/play.mcfunction".into()
            }
        );
    }

    #[test]
    fn renders_one_command_per_line() {
        let mut pack = Datapack::new();
        let path = FunctionPath::new("rig", "x");
        pack.add_function(
            path.clone(),
            vec![
                Command::Comment("hello".into()),
                Command::Function(FunctionPath::new("rig", "y")),
            ],
        )
        .unwrap();
        assert_eq!(
            pack.contents(&path.file_path()).unwrap(),
            "# hello\nfunction rig:y\n"
        );
        assert_eq!(pack.function(&path).unwrap().len(), 2);
    }
}
