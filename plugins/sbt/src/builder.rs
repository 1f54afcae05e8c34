//! The sbt builder: turns a validated [`BuildConfig`] into an sbt invocation and an [`Artifact`].

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use builder_plugin_protocol::{
    Artifact, BuildContext, BuilderPlugin, Status, StepStyle, TerminalUi,
};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{config_schema, BuildConfig, SbtCommand};
use crate::lock::{TargetGuard, TargetLocks};
use crate::reporter::report_output;
use crate::runner::{CommandSpec, ProcessRunner, RunnerError, SystemProcessRunner};

pub const PLUGIN_KEY: &str = "sbt";
pub const SBT_PROGRAM: &str = "sbt";
pub const STATUS_MESSAGE: &str = "Building application";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No sbt configuration has been accepted; build cannot start")]
    NotConfigured,

    #[error("Error finding output path for '{path}': {source}")]
    OutputPath {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Build cancelled while waiting for another build of '{}'", .target.display())]
    Cancelled { target: PathBuf },

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("sbt {command} failed ({})", describe_exit(.exit_code))]
    Failed {
        command: SbtCommand,
        exit_code: Option<i32>,
    },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Resolve the artifact path against the current directory.
///
/// # Errors
///
/// Fails when the path cannot be made absolute, e.g. because it is empty or the current
/// directory is gone.
pub fn absolute_artifact_path(artifact_path: &str) -> Result<PathBuf, BuildError> {
    std::path::absolute(Path::new(artifact_path)).map_err(|source| BuildError::OutputPath {
        path: artifact_path.to_string(),
        source,
    })
}

/// The sbt setting that redirects the assembly jar to `absolute`.
///
/// The path is embedded in a Scala string literal, so backslashes and quotes are escaped.
#[must_use]
pub fn output_path_setting(absolute: &Path) -> String {
    let escaped = absolute
        .display()
        .to_string()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    format!("set assemblyOutputPath in assembly := new File(\"{escaped}\")")
}

/// `sbt <output path setting> <command>`, run from the source directory.
#[must_use]
pub fn sbt_command(config: &BuildConfig, absolute: &Path) -> CommandSpec {
    CommandSpec::new(SBT_PROGRAM)
        .arg(output_path_setting(absolute))
        .arg(config.command.as_str())
        .current_dir(&config.source_dir)
}

/// Builder plugin that runs sbt through a [`ProcessRunner`].
pub struct SbtBuilder<R = SystemProcessRunner> {
    runner: R,
    locks: &'static TargetLocks,
    config: Option<BuildConfig>,
}

impl SbtBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_runner(SystemProcessRunner::new())
    }
}

impl Default for SbtBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> SbtBuilder<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            locks: TargetLocks::global(),
            config: None,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The configuration accepted by the last successful `config_set`, if any.
    pub fn config(&self) -> Option<&BuildConfig> {
        self.config.as_ref()
    }

    /// Install an already validated configuration.
    pub fn configure(&mut self, config: BuildConfig) {
        self.config = Some(config);
    }

    /// Run sbt with the current configuration and report its output to `ui`.
    ///
    /// # Errors
    ///
    /// See [`BuildError`]. Every failure is final; nothing is retried.
    pub async fn run(&self, ctx: &BuildContext, ui: &dyn TerminalUi) -> Result<Artifact, BuildError> {
        let mut status = ui.status();
        status.update(STATUS_MESSAGE);
        let result = self.run_with_status(ctx, status.as_mut()).await;
        status.close();
        result
    }

    async fn run_with_status(
        &self,
        ctx: &BuildContext,
        status: &mut dyn Status,
    ) -> Result<Artifact, BuildError> {
        let config = self.config.as_ref().ok_or(BuildError::NotConfigured)?;
        let artifact_path = config.artifact_path();

        let absolute = match absolute_artifact_path(&artifact_path) {
            Ok(path) => path,
            Err(err) => {
                status.step(StepStyle::Error, &err.to_string());
                return Err(err);
            }
        };

        let _guard = self.lock_target(ctx, status, &absolute).await?;

        let spec = sbt_command(config, &absolute);
        info!(command = %spec, dir = %config.source_dir.display(), "running sbt");
        let output = match self.runner.run(&spec, ctx).await {
            Ok(output) => output,
            Err(err) => {
                status.step(StepStyle::Error, &err.to_string());
                return Err(err.into());
            }
        };

        let succeeded = output.success();
        let lines = report_output(status, &output.stdout, succeeded);
        debug!(lines, succeeded, "reported sbt output");

        if !succeeded {
            warn!(exit_code = ?output.exit_code, "sbt {} failed", config.command);
            return Err(BuildError::Failed {
                command: config.command,
                exit_code: output.exit_code,
            });
        }

        Ok(Artifact::new(artifact_path))
    }

    async fn lock_target(
        &self,
        ctx: &BuildContext,
        status: &mut dyn Status,
        target: &Path,
    ) -> Result<TargetGuard, BuildError> {
        if let Some(guard) = self.locks.try_acquire(target) {
            return Ok(guard);
        }

        info!(target = %target.display(), "waiting for another build of the same artifact");
        status.update(&format!("Waiting for another build of {}", target.display()));
        let guard = tokio::select! {
            guard = self.locks.acquire(target) => guard,
            () = ctx.cancelled() => {
                return Err(BuildError::Cancelled { target: target.to_path_buf() });
            }
        };
        status.update(STATUS_MESSAGE);
        Ok(guard)
    }
}

impl<R: ProcessRunner> BuilderPlugin for SbtBuilder<R> {
    fn name(&self) -> &str {
        "sbt Builder"
    }

    fn key(&self) -> &str {
        PLUGIN_KEY
    }

    fn configuration_options(&self) -> Option<JsonValue> {
        config_schema()
    }

    fn config_set(&mut self, config: JsonValue) -> anyhow::Result<()> {
        match BuildConfig::from_value(config) {
            Ok(config) => {
                debug!(command = %config.command, source_dir = %config.source_dir.display(), "configuration accepted");
                self.configure(config);
                Ok(())
            }
            Err(err) => {
                self.config = None;
                Err(err.into())
            }
        }
    }

    fn build(
        &self,
        ctx: &BuildContext,
        ui: &dyn TerminalUi,
    ) -> impl Future<Output = anyhow::Result<Artifact>> + Send {
        async move { Ok(self.run(ctx, ui).await?) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;

    use crate::runner::ProcessOutput;

    /// Records every command it is asked to run and answers with a canned result.
    struct FakeRunner {
        exit_code: Option<i32>,
        stdout: String,
        launch_fails: bool,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl FakeRunner {
        fn exiting(exit_code: i32, stdout: &str) -> Self {
            Self {
                exit_code: Some(exit_code),
                stdout: stdout.to_string(),
                launch_fails: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_to_launch() -> Self {
            Self {
                launch_fails: true,
                ..Self::exiting(0, "")
            }
        }

        fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProcessRunner for FakeRunner {
        fn run(
            &self,
            spec: &CommandSpec,
            _ctx: &BuildContext,
        ) -> impl Future<Output = Result<ProcessOutput, RunnerError>> + Send {
            self.calls.lock().unwrap().push(spec.clone());
            let result = if self.launch_fails {
                Err(RunnerError::Spawn {
                    program: spec.program.clone(),
                    source: io::Error::new(io::ErrorKind::NotFound, "sbt: command not found"),
                })
            } else {
                Ok(ProcessOutput {
                    stdout: self.stdout.clone(),
                    exit_code: self.exit_code,
                })
            };
            async move { result }
        }
    }

    #[derive(Default)]
    struct RecordingUi {
        events: Mutex<Vec<String>>,
    }

    impl RecordingUi {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    struct RecordingStatus<'a>(&'a RecordingUi);

    impl Status for RecordingStatus<'_> {
        fn update(&mut self, message: &str) {
            self.0.events.lock().unwrap().push(format!("update:{message}"));
        }
        fn step(&mut self, style: StepStyle, message: &str) {
            self.0
                .events
                .lock()
                .unwrap()
                .push(format!("{style:?}:{message}"));
        }
        fn close(&mut self) {
            self.0.events.lock().unwrap().push("close".to_string());
        }
    }

    impl TerminalUi for RecordingUi {
        fn status(&self) -> Box<dyn Status + '_> {
            Box::new(RecordingStatus(self))
        }
    }

    fn config(command: &str, output_dir: &str, file_name: &str) -> JsonValue {
        json!({
            "command": command,
            "source_dir": "/src",
            "output_dir": output_dir,
            "file_name": file_name,
        })
    }

    #[tokio::test]
    async fn successful_build_returns_concatenated_path() {
        let mut builder = SbtBuilder::with_runner(FakeRunner::exiting(0, "[info] done\n"));
        builder
            .config_set(config("build", "/out/success", "app.jar"))
            .unwrap();

        let ui = RecordingUi::default();
        let artifact = builder.build(&BuildContext::detached(), &ui).await.unwrap();

        assert_eq!(artifact.path, "/out/success/app.jar");
        assert_eq!(
            ui.events(),
            vec![
                "update:Building application".to_string(),
                "Ok:[info] done".to_string(),
                "close".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn invokes_sbt_in_source_dir_with_absolute_output_path() {
        let mut builder = SbtBuilder::with_runner(FakeRunner::exiting(0, ""));
        builder
            .config_set(config("build", "/out/invocation", "app.jar"))
            .unwrap();

        builder
            .build(&BuildContext::detached(), &RecordingUi::default())
            .await
            .unwrap();

        let calls = builder.runner().calls();
        assert_eq!(calls.len(), 1);
        let spec = &calls[0];
        assert_eq!(spec.program, "sbt");
        assert_eq!(spec.current_dir.as_deref(), Some(Path::new("/src")));
        assert_eq!(spec.args.len(), 2);

        let absolute = std::path::absolute("/out/invocation/app.jar").unwrap();
        assert!(spec.args[0].contains(&absolute.display().to_string()));
        assert!(spec.args[0].starts_with("set assemblyOutputPath in assembly := new File("));
        assert_eq!(spec.args[1], "build");
    }

    #[tokio::test]
    async fn assembly_is_passed_as_last_argument() {
        let mut builder = SbtBuilder::with_runner(FakeRunner::exiting(0, ""));
        builder
            .config_set(config("assembly", "/out/assembly", "fat.jar"))
            .unwrap();
        builder
            .build(&BuildContext::detached(), &RecordingUi::default())
            .await
            .unwrap();

        let calls = builder.runner().calls();
        assert_eq!(calls[0].args.last().map(String::as_str), Some("assembly"));
    }

    #[tokio::test]
    async fn relative_output_dir_is_resolved_but_result_stays_literal() {
        let mut builder = SbtBuilder::with_runner(FakeRunner::exiting(0, ""));
        builder
            .config_set(config("build", "target/relative", "app.jar"))
            .unwrap();

        let artifact = builder
            .build(&BuildContext::detached(), &RecordingUi::default())
            .await
            .unwrap();
        assert_eq!(artifact.path, "target/relative/app.jar");

        let expected = std::env::current_dir()
            .unwrap()
            .join("target/relative/app.jar");
        let calls = builder.runner().calls();
        assert!(calls[0].args[0].contains(&expected.display().to_string()));
    }

    #[tokio::test]
    async fn non_zero_exit_fails_and_marks_all_lines_as_errors() {
        let output = "[info] loading project\n[error] compilation failed\n";
        let mut builder = SbtBuilder::with_runner(FakeRunner::exiting(1, output));
        builder
            .config_set(config("build", "/out/failure", "app.jar"))
            .unwrap();

        let ui = RecordingUi::default();
        let err = builder
            .run(&BuildContext::detached(), &ui)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BuildError::Failed {
                command: SbtCommand::Build,
                exit_code: Some(1)
            }
        ));
        assert_eq!(
            ui.events(),
            vec![
                "update:Building application".to_string(),
                "Error:[info] loading project".to_string(),
                "Error:[error] compilation failed".to_string(),
                "close".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn launch_failure_is_reported_and_closes_the_status() {
        let mut builder = SbtBuilder::with_runner(FakeRunner::failing_to_launch());
        builder
            .config_set(config("assembly", "/out/launch", "app.jar"))
            .unwrap();

        let ui = RecordingUi::default();
        let err = builder
            .run(&BuildContext::detached(), &ui)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BuildError::Runner(RunnerError::Spawn { ref program, .. }) if program == "sbt"
        ));
        assert_eq!(builder.runner().calls().len(), 1);
        assert_eq!(
            ui.events(),
            vec![
                "update:Building application".to_string(),
                "Error:Failed to launch 'sbt': sbt: command not found".to_string(),
                "close".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn rejected_configuration_never_launches_a_process() {
        let mut builder = SbtBuilder::with_runner(FakeRunner::exiting(0, ""));
        builder
            .config_set(config("build", "/out/rejected", "app.jar"))
            .unwrap();
        assert!(builder
            .config_set(config("package", "/out/rejected", "app.jar"))
            .is_err());
        assert!(builder.config().is_none());

        let ui = RecordingUi::default();
        let err = builder.run(&BuildContext::detached(), &ui).await.unwrap_err();

        assert!(matches!(err, BuildError::NotConfigured));
        assert!(builder.runner().calls().is_empty());
        assert_eq!(ui.events().last().map(String::as_str), Some("close"));
    }

    #[test]
    fn unresolvable_output_path_is_an_error() {
        let err = absolute_artifact_path("").unwrap_err();
        assert!(matches!(err, BuildError::OutputPath { ref path, .. } if path.is_empty()));
        assert!(err.to_string().starts_with("Error finding output path"));
    }

    #[tokio::test]
    async fn cancelled_while_waiting_for_target_lock() {
        let target = std::path::absolute("/out/locked/app.jar").unwrap();
        let _held = TargetLocks::global().acquire(&target).await;

        let mut builder = SbtBuilder::with_runner(FakeRunner::exiting(0, ""));
        builder
            .config_set(config("build", "/out/locked", "app.jar"))
            .unwrap();

        let (ctx, handle) = BuildContext::new();
        handle.cancel();
        let ui = RecordingUi::default();
        let err = builder.run(&ctx, &ui).await.unwrap_err();

        assert!(matches!(err, BuildError::Cancelled { .. }));
        assert!(builder.runner().calls().is_empty());
        assert!(ui
            .events()
            .iter()
            .any(|event| event.starts_with("update:Waiting for another build")));
    }

    #[test]
    fn output_path_setting_escapes_scala_literal() {
        assert_eq!(
            output_path_setting(Path::new("/out/app.jar")),
            r#"set assemblyOutputPath in assembly := new File("/out/app.jar")"#
        );
        assert_eq!(
            output_path_setting(Path::new(r#"C:\out\my "app".jar"#)),
            r#"set assemblyOutputPath in assembly := new File("C:\\out\\my \"app\".jar")"#
        );
    }

    #[test]
    fn plugin_metadata() {
        let builder = SbtBuilder::new();
        assert_eq!(builder.key(), "sbt");
        assert!(builder.configuration_options().is_some());
    }
}
