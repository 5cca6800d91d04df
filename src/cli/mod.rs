pub mod args;
pub mod summary;

pub use args::Cli;
pub use summary::{ExitCodes, Summary};

use crate::domain::{ContainerEngine, EngineError, RunConfig, TestArgs};
use crate::infra::config::{Settings, load_settings, resolve_project_dir};
use crate::infra::engine_adapter::DEFAULT_ENGINE;
use crate::infra::{EngineAdapter, load_manifest};
use crate::services::Orchestrator;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error};

/// Runs the whole command and maps the outcome to a process exit code
pub fn execute(cli: Cli) -> u8 {
    match run(cli) {
        Ok(summary) => summary.report(),
        Err(e) => {
            error!("{e:#}");
            match e.downcast_ref::<EngineError>() {
                Some(EngineError::Unavailable(_)) => ExitCodes::ENGINE_UNAVAILABLE,
                _ => ExitCodes::SETUP_ERROR,
            }
        }
    }
}

fn run(cli: Cli) -> Result<Summary> {
    let project_dir = resolve_project_dir(&cli.path)?;

    let mut settings = load_settings(&project_dir)?;
    settings.merge(Settings {
        engine: cli.engine.clone(),
        step_timeout: cli.timeout.clone(),
        teardown_on_success: cli.teardown.then_some(true),
    });

    let step_timeout = settings.step_timeout().context("--du-timeout")?;
    let binary = settings.engine.as_deref().unwrap_or(DEFAULT_ENGINE);
    let engine = Arc::new(EngineAdapter::new(binary).with_step_timeout(step_timeout));

    if !engine.is_available() {
        return Err(EngineError::Unavailable(binary.to_string()).into());
    }

    let definitions = load_manifest(&project_dir)?;
    debug!(
        "Loaded {} container(s) from {:?}",
        definitions.len(),
        project_dir
    );

    let config = RunConfig {
        verbosity: cli.verbose,
        project_dir,
        test_args: TestArgs::parse(cli.test_args),
        teardown_on_success: settings.teardown_on_success.unwrap_or(false),
    };

    let mut orchestrator = Orchestrator::new(definitions, engine, Arc::new(config));
    let statuses = orchestrator.run(cli.container)?;

    Ok(Summary::new(&statuses))
}
