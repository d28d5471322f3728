//! Document loaders
//!
//! The resolver never touches the filesystem itself; it asks a [`DocumentLoader`] for
//! documents by logical name. [`FsLoader`] searches an ordered list of config roots,
//! [`MemoryLoader`] serves documents held in memory.

use crate::document::LoadedDocument;
use crate::error::ConfigError;
use indexmap::IndexMap;
use std::path::{Component, Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

/// File extensions tried, in order, for each logical name.
pub const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// A document a loader can serve, as reported by [`DocumentLoader::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    /// Logical name (`data/era5_hpx32`).
    pub name: String,
    pub origin: Option<PathBuf>,
}

impl DocumentEntry {
    /// Group part of the name; empty for documents at the root.
    pub fn group(&self) -> &str {
        crate::document::group_dir_of(&self.name)
    }

    /// Variant part of the name.
    pub fn variant(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Source of config documents, addressed by slash-separated logical name.
pub trait DocumentLoader: Send + Sync {
    /// Load the document with the given logical name. `Ok(None)` when it does not exist.
    fn load(&self, name: &str) -> Result<Option<LoadedDocument>, ConfigError>;

    /// Every document this loader can serve, sorted by name.
    fn list(&self) -> Result<Vec<DocumentEntry>, ConfigError>;
}

/// Loads documents from one or more config directories. Earlier roots shadow later ones.
#[derive(Debug, Clone)]
pub struct FsLoader {
    roots: Vec<PathBuf>,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
        }
    }

    pub fn with_search_path(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Append a lower-priority root.
    pub fn push_root(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn candidate_paths<'a>(&'a self, name: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        self.roots.iter().flat_map(move |root| {
            EXTENSIONS
                .iter()
                .map(move |ext| root.join(format!("{}.{}", name, ext)))
        })
    }
}

impl DocumentLoader for FsLoader {
    fn load(&self, name: &str) -> Result<Option<LoadedDocument>, ConfigError> {
        if !is_safe_name(name) {
            return Ok(None);
        }
        for candidate in self.candidate_paths(name) {
            if !candidate.is_file() {
                continue;
            }
            trace!(document = %name, path = %candidate.display(), "Reading config document");
            let text = std::fs::read_to_string(&candidate).map_err(|source| ConfigError::Io {
                path: candidate.clone(),
                source,
            })?;
            return Ok(Some(LoadedDocument {
                name: name.to_string(),
                text,
                origin: Some(candidate),
            }));
        }
        Ok(None)
    }

    fn list(&self) -> Result<Vec<DocumentEntry>, ConfigError> {
        let mut entries: IndexMap<String, DocumentEntry> = IndexMap::new();
        for root in &self.roots {
            if !root.is_dir() {
                continue;
            }
            for entry in WalkDir::new(root).follow_links(true) {
                let entry = entry.map_err(|e| ConfigError::Io {
                    path: root.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("Failed to walk config directory: {}", e),
                    ),
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let Some(name) = logical_name(root, path) else {
                    continue;
                };
                entries.entry(name.clone()).or_insert(DocumentEntry {
                    name,
                    origin: Some(path.to_path_buf()),
                });
            }
        }
        let mut list: Vec<DocumentEntry> = entries.into_values().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }
}

/// Logical name of a YAML file below `root`, or `None` for other files.
fn logical_name(root: &Path, path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !EXTENSIONS.contains(&ext) {
        return None;
    }
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// Logical names never escape their root.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Serves documents from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    documents: IndexMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, text: &str) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&mut self, name: &str, text: &str) {
        self.documents
            .insert(crate::document::normalize_name(name), text.to_string());
    }
}

impl DocumentLoader for MemoryLoader {
    fn load(&self, name: &str) -> Result<Option<LoadedDocument>, ConfigError> {
        Ok(self.documents.get(name).map(|text| LoadedDocument {
            name: name.to_string(),
            text: text.clone(),
            origin: None,
        }))
    }

    fn list(&self) -> Result<Vec<DocumentEntry>, ConfigError> {
        let mut list: Vec<DocumentEntry> = self
            .documents
            .keys()
            .map(|name| DocumentEntry {
                name: name.clone(),
                origin: None,
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }
}

impl<L: DocumentLoader + ?Sized> DocumentLoader for &L {
    fn load(&self, name: &str) -> Result<Option<LoadedDocument>, ConfigError> {
        (**self).load(name)
    }

    fn list(&self) -> Result<Vec<DocumentEntry>, ConfigError> {
        (**self).list()
    }
}
