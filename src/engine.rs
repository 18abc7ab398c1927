//! The orchestration engine.
//!
//! Given a module's declared history and the persisted marker, [`migrate`]
//! computes the not-yet-applied suffix and applies it in order, advancing
//! the marker after each completed version. The computation is two-phase:
//! first resolve the resume position from the marker, then apply the suffix.
//! A marker that names no declared version is an error, never a silent skip.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;

use crate::context::{Dialect, MigrationContext};
use crate::errors::{MigrateError, StorageError};
use crate::executor::{CommandExecutor, RedisExecutor};
use crate::model::Module;
use crate::resolver::ResourceResolver;
use crate::store::VersionStore;
use crate::store::redis::RedisVersionStore;

/// One version applied during a run.
#[derive(Debug, Clone)]
pub struct AppliedVersion {
    pub version: String,
    pub applied_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Outcome of a completed [`migrate`] run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub module: String,
    /// Versions applied by this run, in application order.
    pub applied: Vec<AppliedVersion>,
    /// Versions skipped because the marker already covered them.
    pub skipped: usize,
    pub total_time_ms: u64,
}

/// Apply every not-yet-applied version of `module`, in declared order.
///
/// Each version's steps run in order with `(module_id, version_id, ctx)`;
/// once all steps of a version succeed the marker is advanced before the
/// next version starts. A step failure aborts the run immediately — the
/// partially-applied version's marker is not advanced and nothing is rolled
/// back. Re-running resumes from the last recorded version and re-executes
/// the failed version from its first step.
///
/// Concurrent runs for the same module are not serialized here; the caller
/// owns external locking if multiple processes may migrate the same module.
pub async fn migrate<S, E>(
    module: &Module,
    store: &mut S,
    ctx: &mut MigrationContext<E>,
) -> Result<MigrationReport, MigrateError>
where
    S: VersionStore,
    E: CommandExecutor,
{
    let started = Instant::now();
    store.initialize().await?;

    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(module.versions().len());
    for (index, version) in module.versions().iter().enumerate() {
        if positions.insert(version.id(), index).is_some() {
            return Err(MigrateError::DuplicateVersion {
                module: module.id().to_string(),
                version: version.id().to_string(),
            });
        }
    }

    let current = store.current_version(module.id()).await?;
    let resume_from = match current.as_deref() {
        None => 0,
        Some(marker) => match positions.get(marker) {
            Some(position) => position + 1,
            None => {
                return Err(MigrateError::UnknownVersion {
                    module: module.id().to_string(),
                    recorded: marker.to_string(),
                });
            }
        },
    };

    if resume_from > 0 {
        log::debug!(
            "module {}: {resume_from} version(s) already applied through {}",
            module.id(),
            current.as_deref().unwrap_or_default()
        );
    }

    let mut report = MigrationReport {
        module: module.id().to_string(),
        applied: Vec::new(),
        skipped: resume_from,
        total_time_ms: 0,
    };

    for version in &module.versions()[resume_from..] {
        let version_started = Instant::now();
        log::info!(
            "module {}: applying version {} ({} step(s))",
            module.id(),
            version.id(),
            version.steps().len()
        );

        for (index, step) in version.steps().iter().enumerate() {
            step.execute(module.id(), version.id(), ctx)
                .await
                .map_err(|source| MigrateError::Step {
                    module: module.id().to_string(),
                    version: version.id().to_string(),
                    step: index,
                    source,
                })?;
        }

        store.set_version(module.id(), version.id()).await?;
        report.applied.push(AppliedVersion {
            version: version.id().to_string(),
            applied_at: Utc::now(),
            duration_ms: version_started.elapsed().as_millis() as u64,
        });
    }

    report.total_time_ms = started.elapsed().as_millis() as u64;
    Ok(report)
}

/// Convenience owner wiring the engine to Redis: one connection for step
/// execution, a second for marker bookkeeping.
pub struct MigrationRunner {
    store: RedisVersionStore,
    ctx: MigrationContext<RedisExecutor<ConnectionManager>>,
}

impl MigrationRunner {
    pub async fn connect(
        redis_url: &str,
        resources: Box<dyn ResourceResolver>,
    ) -> Result<Self, MigrateError> {
        let client = redis::Client::open(redis_url).map_err(StorageError::from)?;
        let exec_conn = client
            .get_connection_manager()
            .await
            .map_err(StorageError::from)?;
        let store_conn = client
            .get_connection_manager()
            .await
            .map_err(StorageError::from)?;

        Ok(Self {
            store: RedisVersionStore::new(store_conn),
            ctx: MigrationContext::new(RedisExecutor::new(exec_conn), resources),
        })
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.ctx = self.ctx.with_dialect(dialect);
        self
    }

    /// Override the marker hash key.
    pub fn with_versions_key(mut self, key: impl Into<String>) -> Self {
        self.store = self.store.with_key(key);
        self
    }

    pub async fn run(&mut self, module: &Module) -> Result<MigrationReport, MigrateError> {
        migrate(module, &mut self.store, &mut self.ctx).await
    }

    /// The underlying version store, e.g. for manual marker administration.
    pub fn store(&mut self) -> &mut RedisVersionStore {
        &mut self.store
    }
}
