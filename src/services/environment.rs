use crate::domain::{
    ContainerEngine, ContainerHandle, EngineError, EnvironmentDefinition, LifecycleError,
    MountSpec, OutputMode, RunConfig, RunStatus, Step,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// In-container path where the project directory is bind-mounted
pub const MOUNT_PATH: &str = "/app/test";
/// In-container path holding the pristine copy of the mounted files
pub const BACKUP_PATH: &str = "/app/backup";

const KEEPALIVE_COMMAND: &str = "/bin/bash";

/// One container definition and the lifecycle that tests the project inside it
#[derive(Debug)]
pub struct Environment {
    definition: EnvironmentDefinition,
    engine: Arc<dyn ContainerEngine>,
    config: Arc<RunConfig>,
    handle: Option<ContainerHandle>,
}

impl Environment {
    pub fn new(
        definition: EnvironmentDefinition,
        engine: Arc<dyn ContainerEngine>,
        config: Arc<RunConfig>,
    ) -> Self {
        Self {
            definition,
            engine,
            config,
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        self.definition.display_name()
    }

    /// Container left running by the last successful run, if any
    pub fn live_handle(&self) -> Option<&ContainerHandle> {
        self.handle.as_ref()
    }

    /// Runs the whole lifecycle. Never panics on engine failures; every
    /// failure ends up as `RunStatus::Failed`.
    pub fn run(&mut self) -> RunStatus {
        info!("Testing on container {}", self.name());

        match self.execute() {
            Ok(()) => RunStatus::Passed,
            Err(err) => {
                error!("{} {}: {err}", self.name(), RunStatus::Failed);
                RunStatus::Failed
            }
        }
    }

    pub fn execute(&mut self) -> Result<(), LifecycleError> {
        self.handle = None;

        self.pull_image()
            .map_err(|cause| LifecycleError::PreStart {
                step: Step::PullImage,
                cause,
            })?;

        let handle = self
            .start_and_mount()
            .map_err(|cause| LifecycleError::PreStart {
                step: Step::StartAndMount,
                cause,
            })?;

        if let Err((step, cause)) = self.exercise(&handle) {
            self.teardown(&handle);
            return Err(LifecycleError::PostStart {
                step,
                handle: handle.to_string(),
                cause,
            });
        }

        if self.config.teardown_on_success {
            self.teardown(&handle);
        } else {
            debug!("Leaving container {handle} running");
            self.handle = Some(handle);
        }

        Ok(())
    }

    /// Steps that need a live container, in order
    fn exercise(&self, handle: &ContainerHandle) -> Result<(), (Step, anyhow::Error)> {
        self.backup_files(handle)
            .map_err(|e| (Step::BackupFiles, e))?;
        self.run_before_scripts(handle)
            .map_err(|e| (Step::BeforeScripts, e))?;
        self.run_tests(handle).map_err(|e| (Step::RunTests, e))?;
        self.cleanup_files(handle)
            .map_err(|e| (Step::CleanupFiles, e))
    }

    fn pull_image(&self) -> Result<()> {
        debug!("Pulling image: {}", self.definition.image);
        self.engine.pull_image(&self.definition.image)
    }

    fn start_and_mount(&self) -> Result<ContainerHandle> {
        info!("Starting container...");

        let spec = MountSpec {
            image: &self.definition.image,
            host_dir: &self.config.project_dir,
            mount_path: MOUNT_PATH,
            workdir: MOUNT_PATH,
            command: KEEPALIVE_COMMAND,
        };

        let output = self.engine.run_detached(&spec)?;
        let handle = ContainerHandle::from_output(&output).ok_or(EngineError::MissingHandle)?;
        debug!("Started container {handle}");
        Ok(handle)
    }

    fn backup_files(&self, handle: &ContainerHandle) -> Result<()> {
        debug!("Backing up volume files on container {}", self.name());
        self.engine.exec(
            handle,
            &with_profile(&format!(
                "rm -rf {BACKUP_PATH} && cp -p -r {MOUNT_PATH} {BACKUP_PATH}"
            )),
            OutputMode::Suppress,
        )
    }

    fn run_before_scripts(&self, handle: &ContainerHandle) -> Result<()> {
        if self.definition.before_scripts.is_empty() {
            return Ok(());
        }

        debug!("Running before scripts");
        let output = if self.config.streams_hook_output() {
            OutputMode::Inherit
        } else {
            OutputMode::Suppress
        };

        for script in &self.definition.before_scripts {
            debug!("  {script}");
            self.engine
                .exec(handle, &with_profile(script), output)
                .with_context(|| format!("before script `{script}`"))?;
        }

        Ok(())
    }

    fn run_tests(&self, handle: &ContainerHandle) -> Result<()> {
        let command = self.test_command();
        debug!("Running \"{command}\" on container {}", self.name());
        self.engine
            .exec(handle, &with_profile(&command), OutputMode::Inherit)
            .context("test command")
    }

    fn cleanup_files(&self, handle: &ContainerHandle) -> Result<()> {
        debug!("Restoring volume files on container {}", self.name());
        self.engine.exec(
            handle,
            &with_profile(&format!(
                "find {MOUNT_PATH} -mindepth 1 -delete && cp -p -r {BACKUP_PATH}/. {MOUNT_PATH}/"
            )),
            OutputMode::Suppress,
        )
    }

    /// Best-effort stop + remove; failures are logged and swallowed
    fn teardown(&self, handle: &ContainerHandle) {
        match self.engine.stop_container(handle) {
            Ok(()) => debug!("Stopped container {handle}"),
            Err(e) => warn!("Could not stop container {handle}: {e:#}"),
        }

        match self.engine.remove_container(handle) {
            Ok(()) => debug!("Removed container {handle}"),
            Err(e) => warn!("Could not remove container {handle}: {e:#}"),
        }
    }

    /// Test command with the pass-through arguments appended
    pub fn test_command(&self) -> String {
        let extra = self.config.test_args.render();
        if extra.is_empty() {
            self.definition.test_command.clone()
        } else {
            format!("{} {extra}", self.definition.test_command)
        }
    }
}

/// Loads the image's interactive shell setup before running `script`
fn with_profile(script: &str) -> String {
    format!("if [ -f ~/.bashrc ]; then . ~/.bashrc; fi; {script}")
}
