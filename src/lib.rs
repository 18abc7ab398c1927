//! groundwork — versioned migration orchestration for Redis-backed stores.
//!
//! A [`Module`] declares an ordered history of [`Version`]s, each a group of
//! [`MigrationStep`]s that must succeed together. The engine applies the
//! not-yet-applied suffix of that history exactly once, recording progress
//! in a [`VersionStore`] marker so repeated runs are safe: already-applied
//! versions are skipped, a failed run resumes from the last completed
//! version.
//!
//! ```no_run
//! use groundwork::{
//!     DirResolver, MigrateError, MigrationRunner, MigrationStep, Module, ScriptMigration,
//!     Version,
//! };
//!
//! async fn run() -> Result<(), MigrateError> {
//!     let module = Module::new("accounts")
//!         .version(Version::new("1.0.0").step(MigrationStep::Script(ScriptMigration::new())));
//!
//!     let resources = DirResolver::new("migrations");
//!     let mut runner = MigrationRunner::connect("redis://127.0.0.1/", Box::new(resources)).await?;
//!     let report = runner.run(&module).await?;
//!     println!("applied {} version(s)", report.applied.len());
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod model;
pub mod resolver;
pub mod step;
pub mod store;

pub use context::{Dialect, MigrationContext};
pub use engine::{AppliedVersion, MigrationReport, MigrationRunner, migrate};
pub use errors::{MigrateError, StepError, StorageError};
pub use executor::{Command, CommandExecutor, RedisExecutor};
pub use model::{Module, Version};
pub use resolver::{DirResolver, ResourceResolver, StaticResolver};
pub use step::{ChangeLogMigration, MigrationStep, ScriptMigration, TaskMigration};
pub use store::VersionStore;
pub use store::memory::InMemoryVersionStore;
pub use store::redis::RedisVersionStore;

// Re-export redis types so embedders don't need to depend on a specific
// redis version.
pub use redis;
pub use redis::aio::ConnectionManager;
