use crate::domain::EnvironmentDefinition;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_NAMES: [&str; 3] = ["Dockunit.json", "Dockunit.yml", "Dockunit.yaml"];

#[derive(Deserialize, Debug, Default)]
struct ManifestDocument {
    #[serde(default)]
    containers: Option<Vec<EnvironmentDefinition>>,
}

/// Finds the first manifest file present in `project_dir`
pub fn manifest_path(project_dir: &Path) -> Option<PathBuf> {
    MANIFEST_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|path| path.is_file())
}

/// Loads and validates the container definitions of a project
pub fn load_manifest(project_dir: &Path) -> Result<Vec<EnvironmentDefinition>> {
    let Some(path) = manifest_path(project_dir) else {
        bail!(
            "no Dockunit.json found in {:?} (looked for {})",
            project_dir,
            MANIFEST_NAMES.join(", ")
        );
    };

    let content = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    parse_manifest(&content, &path)
}

pub fn parse_manifest(content: &str, path: &Path) -> Result<Vec<EnvironmentDefinition>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "yml" | "yaml"));

    let doc: ManifestDocument = if is_yaml {
        serde_yml::from_str(content).with_context(|| format!("parsing {:?}", path))?
    } else {
        serde_json::from_str(content).with_context(|| format!("parsing {:?}", path))?
    };

    let definitions = doc.containers.unwrap_or_default();

    for (index, definition) in definitions.iter().enumerate() {
        definition
            .validate()
            .with_context(|| format!("invalid container #{index} in {:?}", path))?;
    }

    Ok(definitions)
}
