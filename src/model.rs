//! Module and version declarations.
//!
//! A [`Module`] is the caller-declared migration history of one logical unit
//! of the target store. The order of its versions is semantic: it is the
//! application order, and the position of a version in the sequence is the
//! only notion of "earlier/later" the engine has. Declarations are built
//! once, up front, and never mutated by the engine.

use crate::step::MigrationStep;

/// A named unit of migratable state with its own independent version history.
#[derive(Debug, Clone)]
pub struct Module {
    id: String,
    versions: Vec<Version>,
}

impl Module {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            versions: Vec::new(),
        }
    }

    pub fn with_versions(id: impl Into<String>, versions: Vec<Version>) -> Self {
        Self {
            id: id.into(),
            versions,
        }
    }

    /// Append a version to the declared history.
    pub fn version(mut self, version: Version) -> Self {
        self.versions.push(version);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// Position of a version id in the declared order, if it is declared.
    pub fn position_of(&self, version_id: &str) -> Option<usize> {
        self.versions.iter().position(|v| v.id == version_id)
    }
}

/// An atomically-applied named group of migration steps within a module.
///
/// Either every step succeeds and the marker advances to this version's id,
/// or the marker stays at the prior value.
#[derive(Debug, Clone)]
pub struct Version {
    id: String,
    steps: Vec<MigrationStep>,
}

impl Version {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_steps(id: impl Into<String>, steps: Vec<MigrationStep>) -> Self {
        Self {
            id: id.into(),
            steps,
        }
    }

    /// Append a step; steps run in declared order, later steps may depend on
    /// earlier ones.
    pub fn step(mut self, step: MigrationStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::ScriptMigration;

    #[test]
    fn position_of_follows_declared_order() {
        let module = Module::new("app")
            .version(Version::new("1.0.0"))
            .version(Version::new("1.1.0"))
            .version(Version::new("1.2.0"));

        assert_eq!(module.position_of("1.0.0"), Some(0));
        assert_eq!(module.position_of("1.2.0"), Some(2));
        assert_eq!(module.position_of("2.0.0"), None);
    }

    #[test]
    fn builder_keeps_step_order() {
        let version = Version::new("1.0.0")
            .step(MigrationStep::Script(ScriptMigration::at("a.redis")))
            .step(MigrationStep::Script(ScriptMigration::at("b.redis")));

        assert_eq!(version.steps().len(), 2);
    }
}
