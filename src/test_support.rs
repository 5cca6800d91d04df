use crate::domain::{ContainerEngine, ContainerHandle, MountSpec, OutputMode};
use crate::services::environment::{BACKUP_PATH, MOUNT_PATH};
use anyhow::{Result, bail};
use std::collections::{BTreeSet, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Recording engine for tests.
///
/// Every call is logged as `operation:argument`. In-container scripts are
/// labelled `backup` / `restore` for the snapshot steps and by their own text
/// otherwise, so `exec:c1:npm test` is the test command `npm test` on the
/// first container. Handles are `c1`, `c2`, ... in start order.
#[derive(Debug, Default)]
pub struct MockEngine {
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<HashSet<String>>,
    run_output: RwLock<Option<String>>,
    started: AtomicUsize,
    mounts: RwLock<Vec<String>>,
    exec_modes: RwLock<Vec<(String, OutputMode)>>,
    mounted: RwLock<BTreeSet<String>>,
    backup: RwLock<BTreeSet<String>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `operation` fail: `pull`, `run`, `stop`, `remove`, or `exec:<label>`
    pub fn set_fail_on(&self, operation: &str) {
        self.fail_on.write().unwrap().insert(operation.to_string());
    }

    /// Raw stdout returned by every subsequent `run`
    pub fn set_run_output(&self, output: &str) {
        *self.run_output.write().unwrap() = Some(output.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    pub fn get_mounts(&self) -> Vec<String> {
        self.mounts.read().unwrap().clone()
    }

    /// Output mode of the last exec with the given label
    pub fn output_mode_of(&self, label: &str) -> Option<OutputMode> {
        self.exec_modes
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(l, _)| l == label)
            .map(|(_, mode)| *mode)
    }

    /// Files present in the mounted project directory
    pub fn seed_files(&self, files: &[&str]) {
        let mut mounted = self.mounted.write().unwrap();
        mounted.extend(files.iter().map(|f| f.to_string()));
    }

    pub fn mounted_files(&self) -> Vec<String> {
        self.mounted.read().unwrap().iter().cloned().collect()
    }

    fn record_command(&self, cmd: &str) {
        self.commands.write().unwrap().push(cmd.to_string());
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        if self.fail_on.read().unwrap().contains(operation) {
            bail!("Mock failure on: {}", operation);
        }
        Ok(())
    }

    fn label(script: &str) -> String {
        let payload = script.rsplit_once("fi; ").map_or(script, |(_, p)| p);

        if payload.contains(&format!("cp -p -r {MOUNT_PATH} {BACKUP_PATH}")) {
            "backup".to_string()
        } else if payload.contains(&format!("{BACKUP_PATH}/. {MOUNT_PATH}")) {
            "restore".to_string()
        } else {
            payload.to_string()
        }
    }

    fn apply_effects(&self, label: &str) {
        match label {
            "backup" => {
                *self.backup.write().unwrap() = self.mounted.read().unwrap().clone();
            }
            "restore" => {
                *self.mounted.write().unwrap() = self.backup.read().unwrap().clone();
            }
            other => {
                if let Some(file) = other.strip_prefix("touch ") {
                    self.mounted.write().unwrap().insert(file.to_string());
                } else if let Some(file) = other.strip_prefix("rm ") {
                    self.mounted.write().unwrap().remove(file);
                }
            }
        }
    }
}

impl ContainerEngine for MockEngine {
    fn is_available(&self) -> bool {
        self.record_command("is_available");
        !self.fail_on.read().unwrap().contains("is_available")
    }

    fn pull_image(&self, image: &str) -> Result<()> {
        self.record_command(&format!("pull:{}", image));
        self.check_fail("pull")
    }

    fn run_detached(&self, spec: &MountSpec) -> Result<String> {
        self.record_command(&format!("run:{}", spec.image));
        self.check_fail("run")?;

        self.mounts.write().unwrap().push(format!(
            "{}:{} -w {}",
            spec.host_dir.display(),
            spec.mount_path,
            spec.workdir
        ));

        let n = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let output = self
            .run_output
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("c{n}\n"));
        Ok(output)
    }

    fn exec(&self, handle: &ContainerHandle, script: &str, output: OutputMode) -> Result<()> {
        let label = Self::label(script);
        self.record_command(&format!("exec:{}:{}", handle, label));
        self.exec_modes.write().unwrap().push((label.clone(), output));
        self.check_fail(&format!("exec:{label}"))?;

        self.apply_effects(&label);
        Ok(())
    }

    fn stop_container(&self, handle: &ContainerHandle) -> Result<()> {
        self.record_command(&format!("stop:{}", handle));
        self.check_fail("stop")
    }

    fn remove_container(&self, handle: &ContainerHandle) -> Result<()> {
        self.record_command(&format!("remove:{}", handle));
        self.check_fail("remove")
    }
}
