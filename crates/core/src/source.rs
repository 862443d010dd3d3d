//! Where source text comes from.
//!
//! [`SourceProvider`] keeps file access out of the parser so hosts can feed
//! it from disk, an editor buffer, or a test fixture map.

use crate::ast::File;
use crate::error::LoadError;
use crate::options::{Grammar, ParseOptions};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

pub trait SourceProvider {
    /// Read the full source text stored at `path`.
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error>;
}

/// Reads sources with `std::fs::read_to_string`.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }
}

/// Serves sources from a path-to-text map. Lookups normalize `.` and `..`
/// first, so `/a/./b.cp` and `/a/x/../b.cp` find the same entry.
pub struct InMemoryProvider {
    files: HashMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new(files: HashMap<PathBuf, String>) -> Self {
        let files = files
            .into_iter()
            .map(|(path, src)| (Self::normalize_path(&path), src))
            .collect();
        Self { files }
    }

    /// Add or replace one source unit.
    pub fn insert(&mut self, path: impl AsRef<Path>, src: impl Into<String>) {
        self.files
            .insert(Self::normalize_path(path.as_ref()), src.into());
    }

    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                // `..` never climbs above the root; leading `..` of a
                // relative path is kept
                Component::ParentDir => match components.last().copied() {
                    Some(Component::RootDir | Component::Prefix(_)) => {}
                    Some(Component::ParentDir) | None => components.push(component),
                    Some(_) => {
                        components.pop();
                    }
                },
                other => components.push(other),
            }
        }
        components.iter().collect()
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        let normalized = Self::normalize_path(path);
        self.files.get(&normalized).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found in memory: {}", normalized.display()),
            )
        })
    }
}

/// Read `path` through `provider` and parse it. The path's display form is
/// used as the file name in every position.
pub fn parse_source(
    provider: &dyn SourceProvider,
    path: &Path,
    grammar: Grammar,
) -> Result<File, LoadError> {
    let name = path.display().to_string();
    let src = provider
        .read_source(path)
        .map_err(|source| LoadError::Io {
            path: name.clone(),
            source,
        })?;
    let options = ParseOptions::new()
        .with_filename(name)
        .with_grammar(grammar);
    Ok(crate::parse_with_options(&src, &options)?)
}
