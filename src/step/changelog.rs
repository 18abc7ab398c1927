//! Change-log based migration steps.
//!
//! A change-log is a JSON resource holding an ordered list of tagged change
//! operations. Each change compiles to one or more store commands; the
//! dialect tag decides how (`set_json` becomes `JSON.SET` on redis-stack and
//! a serialized `SET` on plain redis).

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::context::{Dialect, MigrationContext};
use crate::errors::StepError;
use crate::executor::{Command, CommandExecutor};

use super::load_first;

/// Applies a structured change-log resource.
///
/// Without an explicit path the resource is `<module>_<version>.json`.
#[derive(Debug, Clone, Default)]
pub struct ChangeLogMigration {
    path: Option<String>,
}

impl ChangeLogMigration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change-log at an explicit resource path.
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
            None => vec![format!("{module_id}_{version_id}.json")],
        };
        let Some((name, source)) = load_first(ctx.resources(), &names)? else {
            return Err(StepError::MissingResource { tried: names });
        };

        let change_log: ChangeLog =
            serde_json::from_str(&source).map_err(|err| StepError::Malformed {
                resource: name.clone(),
                message: err.to_string(),
            })?;

        // Missing id/author inherit the version and module ids.
        let id = change_log.id.as_deref().unwrap_or(version_id);
        let author = change_log.author.as_deref().unwrap_or(module_id);
        log::info!(
            "change-set {id} by {author}: {} change(s)",
            change_log.changes.len()
        );

        for change in &change_log.changes {
            let commands =
                change
                    .commands(ctx.dialect())
                    .map_err(|message| StepError::Malformed {
                        resource: name.clone(),
                        message,
                    })?;
            for command in &commands {
                log::debug!("{command}");
                ctx.executor().run(command).await?;
            }
        }
        Ok(())
    }
}

/// Parsed change-log resource.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeLog {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub changes: Vec<Change>,
}

/// One change operation. The set is closed; unknown operations fail to parse.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Change {
    /// Set a plain string value.
    Set { key: String, value: String },
    /// Set a JSON document. `path` defaults to the document root and
    /// requires the redis-stack dialect.
    SetJson {
        key: String,
        #[serde(default)]
        path: Option<String>,
        value: Value,
    },
    /// Set one or more hash fields.
    HashSet {
        key: String,
        fields: BTreeMap<String, String>,
    },
    /// Delete keys.
    Delete { keys: Vec<String> },
    /// Rename a key.
    Rename { from: String, to: String },
    /// Set a key's time-to-live in seconds.
    Expire { key: String, seconds: u64 },
}

impl Change {
    fn commands(&self, dialect: Dialect) -> Result<Vec<Command>, String> {
        match self {
            Self::Set { key, value } => Ok(vec![Command::new("SET").arg(key).arg(value)]),
            Self::SetJson { key, path, value } => {
                let serialized =
                    serde_json::to_string(value).map_err(|err| err.to_string())?;
                match dialect {
                    Dialect::RedisStack => Ok(vec![
                        Command::new("JSON.SET")
                            .arg(key)
                            .arg(path.as_deref().unwrap_or("$"))
                            .arg(serialized),
                    ]),
                    Dialect::Redis => {
                        if path.as_deref().is_some_and(|p| p != "$") {
                            return Err(format!(
                                "set_json path `{}` requires the redis-stack dialect",
                                path.as_deref().unwrap_or_default()
                            ));
                        }
                        Ok(vec![Command::new("SET").arg(key).arg(serialized)])
                    }
                }
            }
            Self::HashSet { key, fields } => {
                let mut command = Command::new("HSET").arg(key);
                for (field, value) in fields {
                    command = command.arg(field).arg(value);
                }
                Ok(vec![command])
            }
            Self::Delete { keys } => Ok(vec![Command::new("DEL").args(keys.clone())]),
            Self::Rename { from, to } => Ok(vec![Command::new("RENAME").arg(from).arg(to)]),
            Self::Expire { key, seconds } => {
                Ok(vec![Command::new("EXPIRE").arg(key).arg(seconds.to_string())])
            }
        }
    }
}
