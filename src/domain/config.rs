use super::TestArgs;
use std::path::PathBuf;

/// Read-only settings shared by every environment of a run
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// 0 = quiet, 1 = step announcements, 2+ = also stream before-script output
    pub verbosity: u8,
    /// Host directory mounted into every container
    pub project_dir: PathBuf,
    /// Extra arguments appended to every test command
    pub test_args: TestArgs,
    /// Stop and remove the container after a passing run as well
    pub teardown_on_success: bool,
}

impl RunConfig {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Default::default()
        }
    }

    pub fn streams_hook_output(&self) -> bool {
        self.verbosity >= 2
    }
}
