//! Script-based migration steps.
//!
//! A script resource holds one store command per line. Blank lines and lines
//! starting with `#` are skipped. Arguments may be quoted: single quotes are
//! literal, double quotes honor `\n`, `\t`, `\r`, `\\` and `\"` escapes.

use crate::context::MigrationContext;
use crate::errors::StepError;
use crate::executor::{Command, CommandExecutor};

use super::load_first;

/// Runs a command script resource.
///
/// Without an explicit path, resolution probes
/// `<module>_<version>_<dialect>.redis` then `<module>_<version>.redis`.
/// With an explicit path ending in `.redis`, a dialect-suffixed variant of
/// that path is probed first.
#[derive(Debug, Clone, Default)]
pub struct ScriptMigration {
    path: Option<String>,
}

impl ScriptMigration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script at an explicit resource path.
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn candidates(&self, module_id: &str, version_id: &str, dialect: &str) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(path) = &self.path {
            if let Some(stem) = path.strip_suffix(".redis") {
                names.push(format!("{stem}_{dialect}.redis"));
            }
            names.push(path.clone());
        }
        names.push(format!("{module_id}_{version_id}_{dialect}.redis"));
        names.push(format!("{module_id}_{version_id}.redis"));
        names
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
        let names = self.candidates(module_id, version_id, ctx.dialect().as_str());
        let Some((name, source)) = load_first(ctx.resources(), &names)? else {
            return Err(StepError::MissingResource { tried: names });
        };

        let commands = parse_script(&name, &source)?;
        log::debug!("script `{name}`: {} command(s)", commands.len());
        for command in &commands {
            log::debug!("{command}");
            ctx.executor().run(command).await?;
        }
        Ok(())
    }
}

fn parse_script(resource: &str, source: &str) -> Result<Vec<Command>, StepError> {
    let mut commands = Vec::new();
    for (line_no, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens = split_line(line).map_err(|message| StepError::Malformed {
            resource: resource.to_string(),
            message: format!("line {}: {message}", line_no + 1),
        })?;
        let mut tokens = tokens.into_iter();
        if let Some(name) = tokens.next() {
            commands.push(Command::new(name).args(tokens));
        }
    }
    Ok(commands)
}

fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            ' ' | '\t' => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => current.push(inner),
                        None => return Err("unterminated single-quoted argument".to_string()),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => current.push('\n'),
                            Some('t') => current.push('\t'),
                            Some('r') => current.push('\r'),
                            Some(esc) => current.push(esc),
                            None => {
                                return Err("unterminated escape in double-quoted argument"
                                    .to_string());
                            }
                        },
                        Some(inner) => current.push(inner),
                        None => return Err("unterminated double-quoted argument".to_string()),
                    }
                }
            }
            other => {
                in_token = true;
                current.push(other);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
