use anyhow::{Result, bail};
use serde::Deserialize;
use std::fmt;

/// One container entry from the project manifest
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentDefinition {
    pub image: String,
    pub test_command: String,
    #[serde(default)]
    pub pretty_name: Option<String>,
    #[serde(default)]
    pub before_scripts: Vec<String>,
}

impl EnvironmentDefinition {
    pub fn new(image: impl Into<String>, test_command: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            test_command: test_command.into(),
            pretty_name: None,
            before_scripts: Vec::new(),
        }
    }

    pub fn with_pretty_name(mut self, name: impl Into<String>) -> Self {
        self.pretty_name = Some(name.into());
        self
    }

    pub fn with_before_scripts<I, S>(mut self, scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.before_scripts = scripts.into_iter().map(Into::into).collect();
        self
    }

    /// Display name, falling back to the image reference
    pub fn display_name(&self) -> &str {
        self.pretty_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.image)
    }

    pub fn validate(&self) -> Result<()> {
        if self.image.trim().is_empty() {
            bail!("container definition without an 'image'");
        }
        if self.test_command.trim().is_empty() {
            bail!(
                "container '{}' has no 'testCommand'",
                self.display_name()
            );
        }
        Ok(())
    }
}

/// Terminal outcome of a single environment run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    Failed,
}

impl RunStatus {
    pub const FAILURE_CODE: i32 = 255;

    pub fn code(self) -> i32 {
        match self {
            Self::Passed => 0,
            Self::Failed => Self::FAILURE_CODE,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Engine-assigned container identifier, restricted to ASCII letters and digits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerHandle(String);

impl ContainerHandle {
    /// Extracts a handle from the raw stdout of a detached `run`.
    ///
    /// Returns `None` when nothing identifier-like is left after sanitizing.
    pub fn from_output(raw: &str) -> Option<Self> {
        let id: String = raw
            .trim()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();

        if id.is_empty() { None } else { Some(Self(id)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
