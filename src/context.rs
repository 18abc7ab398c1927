//! Execution context handed to every migration step.

use std::fmt;

use serde::Deserialize;

use crate::resolver::ResourceResolver;

/// Target store dialect tag.
///
/// Drives resource-name candidates (`<module>_<version>_<dialect>.redis`)
/// and change-log command generation — `set_json` compiles to `JSON.SET` on
/// redis-stack and to a serialized `SET` on plain redis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    #[default]
    Redis,
    RedisStack,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Redis => "redis",
            Self::RedisStack => "redis-stack",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities available to migration steps: a command executor for the
/// target store, a resolver for named migration resources, and the dialect
/// tag. Passed unchanged from the engine into every step.
pub struct MigrationContext<E> {
    executor: E,
    resources: Box<dyn ResourceResolver>,
    dialect: Dialect,
}

impl<E> MigrationContext<E> {
    pub fn new(executor: E, resources: Box<dyn ResourceResolver>) -> Self {
        Self {
            executor,
            resources,
            dialect: Dialect::default(),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn executor(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn resources(&self) -> &dyn ResourceResolver {
        self.resources.as_ref()
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}
