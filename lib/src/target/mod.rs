use std::{
    fmt,
    path::{
        Path,
        PathBuf,
    },
};

use serde::Serialize;

use crate::PathEx;

/// Kind of a regenerable build artefact directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Node.js dependency directory
    NodeModules,

    /// Cargo build output directory
    Target,
}

impl ArtifactKind {
    /// Classify a directory by its exact (case sensitive) name.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "node_modules" => Some(Self::NodeModules),
            "target" => Some(Self::Target),
            _ => None,
        }
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::NodeModules => "node_modules",
            Self::Target => "target",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.dir_name())
    }
}

/// A matched artefact directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    path: PathBuf,
    size: u64,
    name: String,
    kind: ArtifactKind,
}

impl DirectoryEntry {
    /// The display name is derived from the parent directory, which usually names the project.
    pub fn new(kind: ArtifactKind, path: PathBuf, size: u64) -> Self {
        Self {
            name: path.parent_name(),
            path,
            size,
            kind,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub node_modules: Vec<DirectoryEntry>,
    pub targets: Vec<DirectoryEntry>,
}

impl ScanResult {
    pub fn push(&mut self, entry: DirectoryEntry) {
        match entry.kind() {
            ArtifactKind::NodeModules => self.node_modules.push(entry),
            ArtifactKind::Target => self.targets.push(entry),
        }
    }

    /// All entries, `node_modules` first.
    pub fn entries(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.node_modules.iter().chain(self.targets.iter())
    }

    pub fn len(&self) -> usize {
        self.node_modules.len() + self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_size(&self) -> u64 {
        self.entries().map(DirectoryEntry::size).sum()
    }
}
