use crate::domain::{ContainerEngine, EnvironmentDefinition, RunConfig, RunStatus};
use crate::services::Environment;
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs the environments of a manifest one after another and collects their statuses
#[derive(Debug)]
pub struct Orchestrator {
    environments: Vec<Environment>,
}

impl Orchestrator {
    pub fn new(
        definitions: Vec<EnvironmentDefinition>,
        engine: Arc<dyn ContainerEngine>,
        config: Arc<RunConfig>,
    ) -> Self {
        let environments = definitions
            .into_iter()
            .map(|def| Environment::new(def, engine.clone(), config.clone()))
            .collect();

        Self { environments }
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    /// Runs the selected environment, or all of them in declared order.
    ///
    /// A failing environment never stops the ones after it. The only error is
    /// a selector pointing past the end of the manifest, reported before
    /// anything runs.
    pub fn run(&mut self, selector: Option<usize>) -> Result<Vec<RunStatus>> {
        if let Some(index) = selector {
            let count = self.environments.len();
            let Some(env) = self.environments.get_mut(index) else {
                bail!("no container at index {index} (manifest declares {count})");
            };
            debug!("Running only container #{index}");
            return Ok(vec![env.run()]);
        }

        info!("Running {} container(s)", self.environments.len());

        let mut statuses = Vec::with_capacity(self.environments.len());
        for env in &mut self.environments {
            statuses.push(env.run());
        }

        Ok(statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockEngine;

    fn create_test_orchestrator(
        definitions: Vec<EnvironmentDefinition>,
    ) -> (Orchestrator, Arc<MockEngine>) {
        let mock = Arc::new(MockEngine::new());
        let orchestrator =
            Orchestrator::new(definitions, mock.clone(), Arc::new(RunConfig::new("/src")));
        (orchestrator, mock)
    }

    fn three_images() -> Vec<EnvironmentDefinition> {
        vec![
            EnvironmentDefinition::new("php:7.4", "phpunit-74"),
            EnvironmentDefinition::new("php:8.1", "phpunit-81"),
            EnvironmentDefinition::new("php:8.2", "phpunit-82"),
        ]
    }

    #[test]
    fn test_empty_manifest_runs_nothing() {
        let (mut orchestrator, mock) = create_test_orchestrator(vec![]);

        let result = orchestrator.run(None).unwrap();
        assert!(result.is_empty());
        assert!(mock.get_commands().is_empty());
    }

    #[test]
    fn test_run_all_keeps_declared_order() {
        let (mut orchestrator, mock) = create_test_orchestrator(three_images());

        let result = orchestrator.run(None).unwrap();
        assert_eq!(result, vec![RunStatus::Passed; 3]);

        let pulls: Vec<String> = mock
            .get_commands()
            .into_iter()
            .filter(|c| c.starts_with("pull:"))
            .collect();
        assert_eq!(pulls, vec!["pull:php:7.4", "pull:php:8.1", "pull:php:8.2"]);
    }

    #[test]
    fn test_run_all_continues_after_failure() {
        let (mut orchestrator, mock) = create_test_orchestrator(three_images());
        mock.set_fail_on("exec:phpunit-74");

        let result = orchestrator.run(None).unwrap();
        assert_eq!(
            result,
            vec![RunStatus::Failed, RunStatus::Passed, RunStatus::Passed]
        );
    }

    #[test]
    fn test_selector_runs_only_that_environment() {
        let (mut orchestrator, mock) = create_test_orchestrator(three_images());

        let result = orchestrator.run(Some(1)).unwrap();
        assert_eq!(result, vec![RunStatus::Passed]);

        let commands = mock.get_commands();
        assert!(commands.contains(&"pull:php:8.1".to_string()));
        assert!(!commands.contains(&"pull:php:7.4".to_string()));
        assert!(!commands.contains(&"pull:php:8.2".to_string()));
        assert!(orchestrator.environments()[1].live_handle().is_some());
        assert!(orchestrator.environments()[0].live_handle().is_none());
    }

    #[test]
    fn test_selector_out_of_range() {
        let (mut orchestrator, mock) = create_test_orchestrator(three_images());

        assert!(orchestrator.run(Some(3)).is_err());
        assert!(mock.get_commands().is_empty());
    }
}
