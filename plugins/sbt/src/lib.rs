//! sbt builder plugin.
//!
//! Builds a Scala project with `sbt`, telling sbt where to place the jar, echoes sbt's output
//! to the host UI, and hands the jar's path back to the host.

pub mod builder;
pub mod config;
pub mod lock;
pub mod reporter;
pub mod runner;

pub use builder::{BuildError, SbtBuilder, PLUGIN_KEY};
pub use config::{BuildConfig, ConfigError, SbtCommand};
pub use runner::{CommandSpec, ProcessOutput, ProcessRunner, RunnerError, SystemProcessRunner};
