//! TOML manifest declaring modules, versions, and their steps.
//!
//! The manifest is the CLI's way of building the programmatic module
//! declarations the engine consumes:
//!
//! ```toml
//! resources = "migrations"
//! dialect = "redis-stack"
//!
//! [[module]]
//! id = "accounts"
//!
//! [[module.version]]
//! id = "1.0.0"
//! steps = [{ type = "changelog" }, { type = "script", path = "seed.redis" }]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use groundwork::{
    ChangeLogMigration, Dialect, MigrationStep, Module, ScriptMigration, TaskMigration, Version,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Resource directory, resolved against the manifest's own directory.
    pub resources: PathBuf,
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDecl {
    pub id: String,
    #[serde(default, rename = "version")]
    pub versions: Vec<VersionDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionDecl {
    pub id: String,
    #[serde(default)]
    pub steps: Vec<StepDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDecl {
    Script {
        #[serde(default)]
        path: Option<String>,
    },
    Changelog {
        #[serde(default)]
        path: Option<String>,
    },
    Task {
        #[serde(default)]
        path: Option<String>,
    },
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        let mut manifest: Manifest = toml::from_str(&raw)
            .with_context(|| format!("failed to parse manifest {}", path.display()))?;

        if manifest.resources.is_relative()
            && let Some(parent) = path.parent()
        {
            manifest.resources = parent.join(&manifest.resources);
        }
        Ok(manifest)
    }

    /// Build the engine's module declarations.
    pub fn modules(&self) -> Vec<Module> {
        self.modules
            .iter()
            .map(|decl| {
                let versions = decl
                    .versions
                    .iter()
                    .map(|version| {
                        let steps = version.steps.iter().map(StepDecl::to_step).collect();
                        Version::with_steps(&version.id, steps)
                    })
                    .collect();
                Module::with_versions(&decl.id, versions)
            })
            .collect()
    }
}

impl StepDecl {
    fn to_step(&self) -> MigrationStep {
        match self {
            Self::Script { path } => MigrationStep::Script(match path {
                Some(path) => ScriptMigration::at(path),
                None => ScriptMigration::new(),
            }),
            Self::Changelog { path } => MigrationStep::ChangeLog(match path {
                Some(path) => ChangeLogMigration::at(path),
                None => ChangeLogMigration::new(),
            }),
            Self::Task { path } => MigrationStep::Task(match path {
                Some(path) => TaskMigration::at(path),
                None => TaskMigration::new(),
            }),
        }
    }
}
