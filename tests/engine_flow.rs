//! End-to-end engine behavior against an in-memory store and a recording
//! executor: skip/resume arithmetic, marker advancement, and the
//! partial-failure boundary.

use groundwork::{
    ChangeLogMigration, Command, CommandExecutor, Dialect, InMemoryVersionStore, MigrateError,
    MigrationContext, MigrationStep, Module, ScriptMigration, StaticResolver, StepError,
    TaskMigration, Version, migrate,
};

/// Records every command instead of talking to a store.
#[derive(Default)]
struct RecordingExecutor {
    seen: Vec<Command>,
}

impl CommandExecutor for RecordingExecutor {
    async fn run(&mut self, command: &Command) -> Result<(), StepError> {
        self.seen.push(command.clone());
        Ok(())
    }
}

fn recording_ctx(resolver: StaticResolver) -> MigrationContext<RecordingExecutor> {
    MigrationContext::new(RecordingExecutor::default(), Box::new(resolver))
}

fn script_resolver() -> StaticResolver {
    StaticResolver::new()
        .resource("app_1.0.0.redis", "SET app:schema one\n")
        .resource("app_1.1.0.redis", "SET app:schema two\n")
        .resource("app_1.2.0.redis", "SET app:schema three\n")
}

fn script_module() -> Module {
    Module::new("app")
        .version(Version::new("1.0.0").step(MigrationStep::Script(ScriptMigration::new())))
        .version(Version::new("1.1.0").step(MigrationStep::Script(ScriptMigration::new())))
        .version(Version::new("1.2.0").step(MigrationStep::Script(ScriptMigration::new())))
}

#[tokio::test]
async fn applies_all_versions_in_declared_order() {
    let module = script_module();
    let mut store = InMemoryVersionStore::new();
    let mut ctx = recording_ctx(script_resolver());

    let report = migrate(&module, &mut store, &mut ctx).await.unwrap();

    assert_eq!(report.skipped, 0);
    let applied: Vec<&str> = report.applied.iter().map(|a| a.version.as_str()).collect();
    assert_eq!(applied, vec!["1.0.0", "1.1.0", "1.2.0"]);
    assert_eq!(store.recorded("app"), Some("1.2.0"));

    let values: Vec<&str> = ctx
        .executor()
        .seen
        .iter()
        .map(|command| command.args[1].as_str())
        .collect();
    assert_eq!(values, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn second_run_applies_nothing() {
    let module = script_module();
    let mut store = InMemoryVersionStore::new();

    let mut ctx = recording_ctx(script_resolver());
    migrate(&module, &mut store, &mut ctx).await.unwrap();

    let mut ctx = recording_ctx(script_resolver());
    let report = migrate(&module, &mut store, &mut ctx).await.unwrap();

    assert!(report.applied.is_empty());
    assert_eq!(report.skipped, 3);
    assert!(ctx.executor().seen.is_empty());
    assert_eq!(store.recorded("app"), Some("1.2.0"));
}

#[tokio::test]
async fn resumes_after_the_recorded_version() {
    let module = script_module();
    let mut store = InMemoryVersionStore::new().with_version("app", "1.1.0");
    let mut ctx = recording_ctx(script_resolver());

    let report = migrate(&module, &mut store, &mut ctx).await.unwrap();

    assert_eq!(report.skipped, 2);
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.applied[0].version, "1.2.0");
    assert_eq!(ctx.executor().seen.len(), 1);
    assert_eq!(ctx.executor().seen[0].args[1], "three");
}

#[tokio::test]
async fn failed_step_leaves_marker_at_prior_version() {
    let module = Module::new("app")
        .version(Version::new("1.0.0").step(MigrationStep::Script(ScriptMigration::new())))
        .version(
            Version::new("2.0.0")
                .step(MigrationStep::Script(ScriptMigration::at("app_2.0.0_one.redis")))
                .step(MigrationStep::Script(ScriptMigration::at("app_2.0.0_two.redis"))),
        );
    let resolver = StaticResolver::new()
        .resource("app_1.0.0.redis", "SET app:schema one\n")
        .resource("app_2.0.0_one.redis", "SET app:stage first\n");

    let mut store = InMemoryVersionStore::new();
    let mut ctx = recording_ctx(resolver);

    let err = migrate(&module, &mut store, &mut ctx).await.unwrap_err();
    match err {
        MigrateError::Step {
            module,
            version,
            step,
            source,
        } => {
            assert_eq!(module, "app");
            assert_eq!(version, "2.0.0");
            assert_eq!(step, 1);
            assert!(matches!(source, StepError::MissingResource { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // 1.0.0 committed, 2.0.0 did not advance even though its first step ran.
    assert_eq!(store.recorded("app"), Some("1.0.0"));
    assert_eq!(ctx.executor().seen.len(), 2);

    // After fixing the missing resource, the failed version re-runs from its
    // first step — no partial-step resume.
    let resolver = StaticResolver::new()
        .resource("app_1.0.0.redis", "SET app:schema one\n")
        .resource("app_2.0.0_one.redis", "SET app:stage first\n")
        .resource("app_2.0.0_two.redis", "SET app:stage second\n");
    let mut ctx = recording_ctx(resolver);

    let report = migrate(&module, &mut store, &mut ctx).await.unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.applied.len(), 1);
    assert_eq!(store.recorded("app"), Some("2.0.0"));

    let stages: Vec<&str> = ctx
        .executor()
        .seen
        .iter()
        .map(|command| command.args[1].as_str())
        .collect();
    assert_eq!(stages, vec!["first", "second"]);
}

#[tokio::test]
async fn empty_history_is_a_noop() {
    let module = Module::new("app");
    let mut store = InMemoryVersionStore::new();
    let mut ctx = recording_ctx(StaticResolver::new());

    let report = migrate(&module, &mut store, &mut ctx).await.unwrap();

    assert!(report.applied.is_empty());
    assert_eq!(report.skipped, 0);
    assert!(ctx.executor().seen.is_empty());
    assert_eq!(store.recorded("app"), None);
}

#[tokio::test]
async fn unknown_marker_is_an_error_not_a_silent_skip() {
    let module = script_module();
    let mut store = InMemoryVersionStore::new().with_version("app", "9.9.9");
    let mut ctx = recording_ctx(script_resolver());

    let err = migrate(&module, &mut store, &mut ctx).await.unwrap_err();
    match err {
        MigrateError::UnknownVersion { module, recorded } => {
            assert_eq!(module, "app");
            assert_eq!(recorded, "9.9.9");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(ctx.executor().seen.is_empty());
    assert_eq!(store.recorded("app"), Some("9.9.9"));
}

#[tokio::test]
async fn duplicate_version_id_is_rejected() {
    let module = Module::new("app")
        .version(Version::new("1.0.0"))
        .version(Version::new("1.0.0"));
    let mut store = InMemoryVersionStore::new();
    let mut ctx = recording_ctx(StaticResolver::new());

    let err = migrate(&module, &mut store, &mut ctx).await.unwrap_err();
    assert!(matches!(err, MigrateError::DuplicateVersion { .. }));
}

#[tokio::test]
async fn change_log_steps_generate_dialect_commands() {
    let module = Module::new("app")
        .version(Version::new("1.0.0").step(MigrationStep::ChangeLog(ChangeLogMigration::new())));
    let resolver = StaticResolver::new().resource(
        "app_1.0.0.json",
        r#"{
            "changes": [
                {"op": "set", "key": "app:flag", "value": "on"},
                {"op": "set_json", "key": "app:config", "value": {"limit": 10}},
                {"op": "delete", "keys": ["app:stale"]}
            ]
        }"#,
    );

    let mut store = InMemoryVersionStore::new();
    let mut ctx = recording_ctx(resolver).with_dialect(Dialect::RedisStack);

    migrate(&module, &mut store, &mut ctx).await.unwrap();

    let names: Vec<&str> = ctx
        .executor()
        .seen
        .iter()
        .map(|command| command.name.as_str())
        .collect();
    assert_eq!(names, vec!["SET", "JSON.SET", "DEL"]);
    assert_eq!(store.recorded("app"), Some("1.0.0"));
}

#[tokio::test]
async fn task_steps_run_the_declared_program() {
    let scratch = tempfile::tempdir().unwrap();
    let witness = scratch.path().join("task-ran");

    let module = Module::new("app")
        .version(Version::new("1.0.0").step(MigrationStep::Task(TaskMigration::new())));
    let resolver = StaticResolver::new().resource(
        "app_1.0.0.toml",
        format!("program = \"touch\"\nargs = [\"{}\"]\n", witness.display()),
    );

    let mut store = InMemoryVersionStore::new();
    let mut ctx = recording_ctx(resolver);

    migrate(&module, &mut store, &mut ctx).await.unwrap();

    assert!(witness.exists());
    assert_eq!(store.recorded("app"), Some("1.0.0"));
}

#[tokio::test]
async fn failing_task_aborts_the_run() {
    let module = Module::new("app")
        .version(Version::new("1.0.0").step(MigrationStep::Task(TaskMigration::new())));
    let resolver = StaticResolver::new()
        .resource("app_1.0.0.toml", "program = \"sh\"\nargs = [\"-c\", \"exit 3\"]\n");

    let mut store = InMemoryVersionStore::new();
    let mut ctx = recording_ctx(resolver);

    let err = migrate(&module, &mut store, &mut ctx).await.unwrap_err();
    match err {
        MigrateError::Step { source, .. } => {
            assert!(matches!(source, StepError::Task { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.recorded("app"), None);
}
