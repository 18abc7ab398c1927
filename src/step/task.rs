//! Task-based migration steps.
//!
//! A task resource is a TOML document naming an external program to run for
//! the version — out-of-band work like rebuilding an index or invoking a
//! data-fix tool. The program's exit status decides step success.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use tokio::process::Command as ProcessCommand;

use crate::context::MigrationContext;
use crate::errors::StepError;
use crate::executor::CommandExecutor;

use super::load_first;

/// Runs an external program declared in a task resource.
///
/// Without an explicit path the resource is `<module>_<version>.toml`.
#[derive(Debug, Clone, Default)]
pub struct TaskMigration {
    path: Option<String>,
}

impl TaskMigration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Task spec at an explicit resource path.
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub(crate) async fn execute<E>(
        &self,
        module_id: &str,
        version_id: &str,
        ctx: &mut MigrationContext<E>,
    ) -> Result<(), StepError>
    where
        E: CommandExecutor,
    {
        let names = match &self.path {
            Some(path) => vec![path.clone()],
            None => vec![format!("{module_id}_{version_id}.toml")],
        };
        let Some((name, source)) = load_first(ctx.resources(), &names)? else {
            return Err(StepError::MissingResource { tried: names });
        };

        let spec: TaskSpec = toml::from_str(&source).map_err(|err| StepError::Malformed {
            resource: name.clone(),
            message: err.to_string(),
        })?;

        log::info!("task `{name}`: running {}", spec.program);
        let mut command = ProcessCommand::new(&spec.program);
        command.args(&spec.args).envs(&spec.env);
        if let Some(dir) = &spec.dir {
            command.current_dir(dir);
        }

        let status = command.status().await?;
        if status.success() {
            Ok(())
        } else {
            Err(StepError::Task {
                program: spec.program,
                status,
            })
        }
    }
}

/// Parsed task resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    /// Program to run.
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory, resolved against the process working directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_task_spec() {
        let spec: TaskSpec = toml::from_str(
            r#"
            program = "sh"
            args = ["-c", "echo done"]
            dir = "scratch"

            [env]
            APP_ENV = "migration"
            "#,
        )
        .unwrap();

        assert_eq!(spec.program, "sh");
        assert_eq!(spec.args, vec!["-c", "echo done"]);
        assert_eq!(spec.dir.as_deref(), Some(std::path::Path::new("scratch")));
        assert_eq!(spec.env.get("APP_ENV").map(String::as_str), Some("migration"));
    }

    #[test]
    fn program_is_required() {
        assert!(toml::from_str::<TaskSpec>("args = []").is_err());
    }
}
