//! Version marker persistence.

pub mod memory;
pub mod redis;

use crate::errors::StorageError;

/// Persists, per module, the id of the last fully-applied version.
///
/// Absence of a marker means "no version ever applied". Markers are created
/// on a module's first applied version, then overwritten — never deleted —
/// by the engine.
pub trait VersionStore {
    /// Ensure the marker storage exists and is usable. Safe to call on
    /// every run.
    async fn initialize(&mut self) -> Result<(), StorageError>;

    /// Last-applied version id for the module, reflecting the latest
    /// committed `set_version`.
    async fn current_version(&mut self, module_id: &str) -> Result<Option<String>, StorageError>;

    /// Single-operation upsert of the module's marker.
    async fn set_version(&mut self, module_id: &str, version: &str) -> Result<(), StorageError>;
}
