//! Process execution for the sbt plugin.
//!
//! The builder never spawns processes itself; it goes through a [`ProcessRunner`], so tests can
//! substitute a fake that records the command instead of launching sbt.

use std::fmt;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use builder_plugin_protocol::BuildContext;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// A program invocation: argv plus working directory. No shell is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// What a finished process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Everything the process wrote to stdout, decoded lossily.
    pub stdout: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' was cancelled before it finished")]
    Cancelled { program: String },
}

/// Runs a command to completion and captures its stdout.
///
/// A non-zero exit is not an error at this level; callers inspect [`ProcessOutput::success`].
pub trait ProcessRunner: Send + Sync {
    fn run(
        &self,
        spec: &CommandSpec,
        ctx: &BuildContext,
    ) -> impl Future<Output = Result<ProcessOutput, RunnerError>> + Send;
}

/// Spawns real child processes through tokio.
///
/// stdout is buffered in memory until the process exits, stderr goes straight to ours.
/// On unix the child leads its own process group, and cancelling the [`BuildContext`] kills
/// that whole group. A cancelled context never launches anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(
        &self,
        spec: &CommandSpec,
        ctx: &BuildContext,
    ) -> impl Future<Output = Result<ProcessOutput, RunnerError>> + Send {
        async move {
            let mut std_command = std::process::Command::new(&spec.program);
            std_command
                .args(&spec.args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::inherit());
            if let Some(dir) = &spec.current_dir {
                std_command.current_dir(dir);
            }
            // The sbt launcher forks java, so the whole tree has to be reachable with one signal.
            // This also keeps terminal SIGINT away from the child; Ctrl-C goes through `ctx`.
            #[cfg(unix)]
            std::os::unix::process::CommandExt::process_group(&mut std_command, 0);

            let mut command = Command::from(std_command);
            command.kill_on_drop(true);

            if ctx.is_cancelled() {
                debug!(program = %spec.program, "already cancelled, not launching");
                return Err(RunnerError::Cancelled {
                    program: spec.program.clone(),
                });
            }

            debug!(command = %spec, dir = ?spec.current_dir, "launching process");
            let child = command.spawn().map_err(|source| RunnerError::Spawn {
                program: spec.program.clone(),
                source,
            })?;
            let pid = child.id();

            let output = tokio::select! {
                output = child.wait_with_output() => output.map_err(|source| RunnerError::Wait {
                    program: spec.program.clone(),
                    source,
                })?,
                () = ctx.cancelled() => {
                    warn!(program = %spec.program, ?pid, "cancellation requested, killing process group");
                    kill_process_group(pid);
                    return Err(RunnerError::Cancelled {
                        program: spec.program.clone(),
                    });
                }
            };

            debug!(program = %spec.program, status = %output.status, "process exited");
            Ok(ProcessOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                exit_code: output.status.code(),
            })
        }
    }
}

/// SIGKILL every process in the group led by `pid`.
///
/// The direct child is also covered by `kill_on_drop`; this reaches the processes it forked.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(raw) = pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    if let Err(err) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        debug!(pid = raw, error = %err, "process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
