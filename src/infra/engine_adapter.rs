use crate::domain::{ContainerEngine, ContainerHandle, EngineError, MountSpec, OutputMode};
use anyhow::{Context, Result, anyhow};
use std::ffi::OsStr;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

pub const DEFAULT_ENGINE: &str = "docker";

/// Drives a docker-compatible engine through its command line
#[derive(Debug, Clone)]
pub struct EngineAdapter {
    binary: String,
    step_timeout: Option<Duration>,
}

impl EngineAdapter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            step_timeout: None,
        }
    }

    /// Kill any engine invocation that runs longer than `limit`
    pub fn with_step_timeout(mut self, limit: Option<Duration>) -> Self {
        self.step_timeout = limit;
        self
    }

    fn engine<I, S>(&self, args: I, output: OutputMode, context: &str) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.command(args);
        match output {
            OutputMode::Inherit => cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit()),
            OutputMode::Suppress => cmd.stdout(Stdio::null()).stderr(Stdio::null()),
        };

        let child = cmd.spawn().with_context(|| context.to_string())?;
        let status = self.wait(child, context)?;
        ensure_success(status, context)
    }

    fn engine_output<I, S>(&self, args: I, context: &str) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut child = self
            .command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| context.to_string())?;

        // stdout must be drained while waiting, or a full pipe blocks the child
        let mut stdout = child.stdout.take().context("engine stdout was not captured")?;
        let reader = thread::spawn(move || {
            let mut captured = String::new();
            stdout.read_to_string(&mut captured).map(|_| captured)
        });

        let status = self.wait(child, context)?;
        let captured = reader
            .join()
            .map_err(|_| anyhow!("output reader for {context} panicked"))?
            .with_context(|| format!("reading output of {context}"))?;

        ensure_success(status, context)?;
        Ok(captured)
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args.into_iter().map(|item| item.as_ref().to_os_string()));
        debug!("{:?}", cmd);
        cmd
    }

    fn wait(&self, mut child: Child, context: &str) -> Result<ExitStatus> {
        let Some(limit) = self.step_timeout else {
            return child.wait().with_context(|| context.to_string());
        };

        match child
            .wait_timeout(limit)
            .with_context(|| context.to_string())?
        {
            Some(status) => Ok(status),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(EngineError::Timeout {
                    context: context.to_string(),
                    limit,
                }
                .into())
            }
        }
    }
}

impl Default for EngineAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl ContainerEngine for EngineAdapter {
    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn pull_image(&self, image: &str) -> Result<()> {
        self.engine(
            ["pull", image],
            OutputMode::Suppress,
            &format!("pulling image {image}"),
        )
    }

    fn run_detached(&self, spec: &MountSpec) -> Result<String> {
        let volume = format!("{}:{}", spec.host_dir.display(), spec.mount_path);
        let args = [
            "run",
            "-d",
            "-v",
            volume.as_str(),
            "-w",
            spec.workdir,
            "-it",
            spec.image,
            spec.command,
        ];

        self.engine_output(args, &format!("starting container from {}", spec.image))
    }

    fn exec(&self, handle: &ContainerHandle, script: &str, output: OutputMode) -> Result<()> {
        self.engine(
            ["exec", handle.as_str(), "bash", "-c", script],
            output,
            &format!("executing `{script}` on {handle}"),
        )
    }

    fn stop_container(&self, handle: &ContainerHandle) -> Result<()> {
        self.engine(
            ["stop", handle.as_str()],
            OutputMode::Suppress,
            &format!("stopping container {handle}"),
        )
    }

    fn remove_container(&self, handle: &ContainerHandle) -> Result<()> {
        self.engine(
            ["rm", "-v", handle.as_str()],
            OutputMode::Suppress,
            &format!("removing container {handle}"),
        )
    }
}

fn ensure_success(status: ExitStatus, context: &str) -> Result<()> {
    if status.success() {
        return Ok(());
    }

    Err(EngineError::NonZeroExit {
        context: context.to_string(),
        code: status.code(),
    }
    .into())
}
