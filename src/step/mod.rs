//! Migration step strategies.
//!
//! A step is one pluggable unit of change execution, selected at
//! module-declaration time from a closed set: a raw command script, a
//! structured change-log, or an external task. The engine only sees
//! success or failure.

mod changelog;
mod script;
mod task;

pub use changelog::{Change, ChangeLog, ChangeLogMigration};
pub use script::ScriptMigration;
pub use task::{TaskMigration, TaskSpec};

use crate::context::MigrationContext;
use crate::errors::StepError;
use crate::executor::CommandExecutor;
use crate::resolver::ResourceResolver;

/// A single migration step within a version.
#[derive(Debug, Clone)]
pub enum MigrationStep {
    /// Runs a raw command script resource against the target store.
    Script(ScriptMigration),
    /// Applies a structured JSON change-log resource.
    ChangeLog(ChangeLogMigration),
    /// Runs an external program declared in a TOML task resource.
    Task(TaskMigration),
}

impl MigrationStep {
    /// Execute this step for `(module_id, version_id)`.
    pub async fn execute<E>(
        &self,
        module_id: &str,
        version_id: &str,
        ctx: &mut MigrationContext<E>,
    ) -> Result<(), StepError>
    where
        E: CommandExecutor,
    {
        match self {
            Self::Script(step) => step.execute(module_id, version_id, ctx).await,
            Self::ChangeLog(step) => step.execute(module_id, version_id, ctx).await,
            Self::Task(step) => step.execute(module_id, version_id, ctx).await,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Script(_) => "script",
            Self::ChangeLog(_) => "change-log",
            Self::Task(_) => "task",
        }
    }
}

/// Probe candidate resource names in order, returning the first hit along
/// with the name that matched.
pub(crate) fn load_first(
    resolver: &dyn ResourceResolver,
    names: &[String],
) -> Result<Option<(String, String)>, StepError> {
    for name in names {
        if let Some(content) = resolver.load(name)? {
            return Ok(Some((name.clone(), content)));
        }
    }
    Ok(None)
}
