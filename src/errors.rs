use std::borrow::Cow;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures reading or writing the persisted version marker.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying Redis command failed or the store is unreachable.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The marker key exists but does not have the expected shape.
    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

/// Failures while executing a single migration step.
///
/// The engine treats every variant the same way: the current run aborts and
/// the marker is not advanced for the version the step belongs to.
#[derive(Debug, Error)]
pub enum StepError {
    /// None of the candidate resource names resolved to content.
    #[error("no migration resource found (tried {tried:?})")]
    MissingResource { tried: Vec<String> },

    /// A resource was found but could not be parsed.
    #[error("malformed migration resource `{resource}`: {message}")]
    Malformed { resource: String, message: String },

    /// A generated store command was rejected by Redis.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Resource loading or task spawning failed at the I/O level.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An external task ran but did not exit successfully.
    #[error("task `{program}` failed: {status}")]
    Task { program: String, status: ExitStatus },
}

/// Top-level error returned by the orchestration engine.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The version store is unreachable or the marker cannot be read/written.
    /// Nothing has been executed when this is raised before the apply loop.
    #[error("version store error: {0}")]
    Storage(#[from] StorageError),

    /// A step failed mid-version. The marker still names the last version
    /// that completed; re-running resumes there and re-executes the failed
    /// version from its first step.
    #[error("step {step} of version {version} in module {module} failed")]
    Step {
        module: String,
        version: String,
        step: usize,
        #[source]
        source: StepError,
    },

    /// The recorded marker names a version that is not in the module's
    /// declared history (renamed or removed versions, or a foreign marker).
    #[error("module {module} records version {recorded}, which is not in the declared history")]
    UnknownVersion { module: String, recorded: String },

    /// A version id appears more than once in a module's declared history,
    /// making the resume position ambiguous.
    #[error("module {module} declares version {version} more than once")]
    DuplicateVersion { module: String, version: String },
}
