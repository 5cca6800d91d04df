use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a container engine invocation
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("container engine '{0}' is not installed or not configured properly")]
    Unavailable(String),

    #[error("{context}: engine exited with {}", describe_code(.code))]
    NonZeroExit { context: String, code: Option<i32> },

    #[error("{context}: no response after {}s, process killed", .limit.as_secs())]
    Timeout { context: String, limit: Duration },

    #[error("engine did not report a container id")]
    MissingHandle,
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Named steps of an environment lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    PullImage,
    StartAndMount,
    BackupFiles,
    BeforeScripts,
    RunTests,
    CleanupFiles,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PullImage => "pulling image",
            Self::StartAndMount => "starting container",
            Self::BackupFiles => "backing up mounted files",
            Self::BeforeScripts => "running before scripts",
            Self::RunTests => "running test command",
            Self::CleanupFiles => "restoring mounted files",
        };
        f.write_str(label)
    }
}

/// Why an environment ended up failed
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// No container exists yet, nothing to tear down
    #[error("{step} failed: {cause:#}")]
    PreStart { step: Step, cause: anyhow::Error },

    /// A container was running when the step failed
    #[error("{step} failed on container {handle}: {cause:#}")]
    PostStart {
        step: Step,
        handle: String,
        cause: anyhow::Error,
    },
}

impl LifecycleError {
    pub fn step(&self) -> Step {
        match self {
            Self::PreStart { step, .. } | Self::PostStart { step, .. } => *step,
        }
    }

    pub fn had_container(&self) -> bool {
        matches!(self, Self::PostStart { .. })
    }
}
