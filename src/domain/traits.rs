use super::ContainerHandle;
use anyhow::Result;
use std::fmt::Debug;
use std::path::Path;

/// Where the stdout/stderr of an in-container command goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Streamed to the caller's console
    Inherit,
    /// Discarded
    Suppress,
}

/// Arguments for starting a detached container with the project mounted
#[derive(Debug, Clone)]
pub struct MountSpec<'a> {
    pub image: &'a str,
    pub host_dir: &'a Path,
    pub mount_path: &'a str,
    pub workdir: &'a str,
    pub command: &'a str,
}

/// Trait for container engine operations
pub trait ContainerEngine: Send + Sync + Debug {
    /// Check if the engine binary can be invoked at all
    fn is_available(&self) -> bool;

    /// Fetch an image
    fn pull_image(&self, image: &str) -> Result<()>;

    /// Create and start a detached container, returning the engine's raw stdout
    fn run_detached(&self, spec: &MountSpec) -> Result<String>;

    /// Execute a shell script inside a running container
    fn exec(&self, handle: &ContainerHandle, script: &str, output: OutputMode) -> Result<()>;

    /// Stop a container
    fn stop_container(&self, handle: &ContainerHandle) -> Result<()>;

    /// Remove a container together with its anonymous volumes
    fn remove_container(&self, handle: &ContainerHandle) -> Result<()>;
}
