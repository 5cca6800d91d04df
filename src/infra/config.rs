use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE_NAME: &str = "dockunit.toml";

/// Optional project-level defaults, read from `dockunit.toml`
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Engine binary (docker, podman, ...)
    pub engine: Option<String>,
    /// Per-step limit such as "90s" or "10m"
    pub step_timeout: Option<String>,
    pub teardown_on_success: Option<bool>,
}

impl Settings {
    /// Merges another Settings into self.
    /// Values from `other` overwrite values in `self` if present.
    pub fn merge(&mut self, other: Settings) {
        if let Some(engine) = other.engine {
            self.engine = Some(engine);
        }
        if let Some(limit) = other.step_timeout {
            self.step_timeout = Some(limit);
        }
        if let Some(teardown) = other.teardown_on_success {
            self.teardown_on_success = Some(teardown);
        }
    }

    pub fn step_timeout(&self) -> Result<Option<Duration>> {
        self.step_timeout.as_deref().map(parse_duration).transpose()
    }
}

pub fn settings_path(project_dir: &Path) -> PathBuf {
    project_dir.join(SETTINGS_FILE_NAME)
}

pub fn load_settings(project_dir: &Path) -> Result<Settings> {
    let path = settings_path(project_dir);

    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("parsing {:?}", path))
}

/// Expands `~` and resolves the project directory to an absolute path
pub fn resolve_project_dir(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::tilde(raw).into_owned();
    fs::canonicalize(&expanded).with_context(|| format!("project directory {expanded:?}"))
}

pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(stripped) = s.strip_suffix("ms") {
        let millis: u64 = stripped.parse()?;
        Ok(Duration::from_millis(millis))
    } else if let Some(stripped) = s.strip_suffix('s') {
        let secs: u64 = stripped.parse()?;
        Ok(Duration::from_secs(secs))
    } else if let Some(stripped) = s.strip_suffix('m') {
        let mins: u64 = stripped.parse()?;
        let secs = mins.checked_mul(60).context("duration too large")?;
        Ok(Duration::from_secs(secs))
    } else if let Some(stripped) = s.strip_suffix('h') {
        let hours: u64 = stripped.parse()?;
        let secs = hours.checked_mul(3600).context("duration too large")?;
        Ok(Duration::from_secs(secs))
    } else {
        Err(anyhow!("invalid duration format: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration(" 5m ").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("10").is_err());
    }

    #[test]
    fn rejects_overflowing_durations() {
        let err = parse_duration("999999999999999999h").unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(parse_duration("999999999999999999m").is_err());
        assert!(parse_duration("99999999999999999999s").is_err());
    }

    #[test]
    fn missing_settings_file_gives_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings = load_settings(temp_dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn loads_settings_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            settings_path(temp_dir.path()),
            r#"
engine = "podman"
step_timeout = "10m"
teardown_on_success = true
"#,
        )
        .unwrap();

        let settings = load_settings(temp_dir.path()).unwrap();
        assert_eq!(settings.engine.as_deref(), Some("podman"));
        assert_eq!(
            settings.step_timeout().unwrap(),
            Some(Duration::from_secs(600))
        );
        assert_eq!(settings.teardown_on_success, Some(true));
    }

    #[test]
    fn merge_prefers_other_values() {
        let mut base = Settings {
            engine: Some("podman".into()),
            step_timeout: Some("1m".into()),
            teardown_on_success: None,
        };
        base.merge(Settings {
            engine: Some("docker".into()),
            step_timeout: None,
            teardown_on_success: Some(false),
        });

        assert_eq!(base.engine.as_deref(), Some("docker"));
        assert_eq!(base.step_timeout.as_deref(), Some("1m"));
        assert_eq!(base.teardown_on_success, Some(false));
    }

    #[test]
    fn resolves_existing_project_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let resolved = resolve_project_dir(temp_dir.path().to_str().unwrap()).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolve_project_dir("/definitely/not/here/dockunit").is_err());
    }
}
