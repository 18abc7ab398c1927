//! In-memory version store for tests and ephemeral targets.

use std::collections::HashMap;

use crate::errors::StorageError;

use super::VersionStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryVersionStore {
    versions: HashMap<String, String>,
}

impl InMemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a marker, e.g. to start a test mid-history.
    pub fn with_version(
        mut self,
        module_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        self.versions.insert(module_id.into(), version.into());
        self
    }

    /// Marker currently recorded for a module.
    pub fn recorded(&self, module_id: &str) -> Option<&str> {
        self.versions.get(module_id).map(String::as_str)
    }
}

impl VersionStore for InMemoryVersionStore {
    async fn initialize(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn current_version(&mut self, module_id: &str) -> Result<Option<String>, StorageError> {
        Ok(self.versions.get(module_id).cloned())
    }

    async fn set_version(&mut self, module_id: &str, version: &str) -> Result<(), StorageError> {
        self.versions
            .insert(module_id.to_string(), version.to_string());
        Ok(())
    }
}
