//! Store command execution seam.
//!
//! Steps compile their work down to [`Command`] values; a [`CommandExecutor`]
//! runs them against the target store. Production code uses [`RedisExecutor`];
//! tests substitute recording or failing executors.

use std::fmt;

use redis::aio::ConnectionLike;

use crate::errors::StepError;

/// A single generated store command, e.g. `SET app:greeting hello`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Executes generated commands against the target store.
pub trait CommandExecutor {
    async fn run(&mut self, command: &Command) -> Result<(), StepError>;
}

/// Command executor backed by a Redis connection.
pub struct RedisExecutor<C>
where
    C: ConnectionLike + Send,
{
    connection: C,
}

impl<C> RedisExecutor<C>
where
    C: ConnectionLike + Send,
{
    pub fn new(connection: C) -> Self {
        Self { connection }
    }
}

impl<C> CommandExecutor for RedisExecutor<C>
where
    C: ConnectionLike + Send,
{
    async fn run(&mut self, command: &Command) -> Result<(), StepError> {
        let mut cmd = redis::cmd(&command.name);
        for arg in &command.args {
            cmd.arg(arg);
        }
        let _: redis::Value = cmd.query_async(&mut self.connection).await?;
        Ok(())
    }
}
