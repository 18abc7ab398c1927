//! Named-resource loading for migration steps.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// Loads migration resources (scripts, change-logs, task specs) by name.
///
/// An absent resource is `Ok(None)`, not an error — steps probe several
/// candidate names in order and only fail once every candidate is absent.
pub trait ResourceResolver: Send + Sync {
    fn load(&self, name: &str) -> io::Result<Option<String>>;
}

/// Resolves resource names against files in a directory.
#[derive(Debug, Clone)]
pub struct DirResolver {
    root: PathBuf,
}

impl DirResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceResolver for DirResolver {
    fn load(&self, name: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.root.join(name)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Resolves resource names against an in-memory map.
///
/// Useful for embedding resources with `include_str!` and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.entries.insert(name.into(), content.into());
        self
    }
}

impl ResourceResolver for StaticResolver {
    fn load(&self, name: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(name).cloned())
    }
}
