use dockunit::domain::{EnvironmentDefinition, RunConfig, RunStatus};
use dockunit::services::Orchestrator;
use dockunit::test_support::MockEngine;
use std::sync::Arc;

fn create_orchestrator(definitions: Vec<EnvironmentDefinition>) -> (Orchestrator, Arc<MockEngine>) {
    let mock = Arc::new(MockEngine::new());
    let config = Arc::new(RunConfig::new("/home/dev/code/app"));
    let orchestrator = Orchestrator::new(definitions, mock.clone(), config);
    (orchestrator, mock)
}

fn count(commands: &[String], prefix: &str) -> usize {
    commands.iter().filter(|c| c.starts_with(prefix)).count()
}

#[test]
fn test_second_environment_fails_at_tests() {
    let (mut orchestrator, mock) = create_orchestrator(vec![
        EnvironmentDefinition::new("php:8.1", "phpunit --group a"),
        EnvironmentDefinition::new("php:8.2", "phpunit --group b"),
    ]);
    mock.set_fail_on("exec:phpunit --group b");

    let result = orchestrator.run(None).unwrap();
    assert_eq!(result, vec![RunStatus::Passed, RunStatus::Failed]);
    assert_eq!(
        result.iter().map(|s| s.code()).collect::<Vec<_>>(),
        vec![0, 255]
    );

    // only the second container is torn down
    let commands = mock.get_commands();
    assert_eq!(count(&commands, "stop:"), 1);
    assert_eq!(count(&commands, "remove:"), 1);
    assert!(commands.contains(&"stop:c2".to_string()));
    assert!(commands.contains(&"remove:c2".to_string()));

    assert_eq!(
        orchestrator.environments()[0]
            .live_handle()
            .map(|h| h.to_string()),
        Some("c1".to_string())
    );
    assert!(orchestrator.environments()[1].live_handle().is_none());
}

#[test]
fn test_empty_manifest() {
    let (mut orchestrator, mock) = create_orchestrator(Vec::new());

    assert!(orchestrator.is_empty());
    assert_eq!(orchestrator.run(None).unwrap(), Vec::<RunStatus>::new());
    assert!(mock.get_commands().is_empty());
}

#[test]
fn test_selector_picks_second_of_three() {
    let (mut orchestrator, mock) = create_orchestrator(vec![
        EnvironmentDefinition::new("node:18", "npm test").with_pretty_name("Node 18"),
        EnvironmentDefinition::new("node:20", "npm test").with_pretty_name("Node 20"),
        EnvironmentDefinition::new("node:22", "npm test").with_pretty_name("Node 22"),
    ]);

    let result = orchestrator.run(Some(1)).unwrap();
    assert_eq!(result.len(), 1);

    let commands = mock.get_commands();
    assert_eq!(count(&commands, "pull:"), 1);
    assert_eq!(commands[0], "pull:node:20");
    assert_eq!(orchestrator.environments()[1].name(), "Node 20");
}

#[test]
fn test_full_run_length_matches_even_when_everything_fails() {
    let (mut orchestrator, mock) = create_orchestrator(vec![
        EnvironmentDefinition::new("a", "t"),
        EnvironmentDefinition::new("b", "t"),
        EnvironmentDefinition::new("c", "t"),
    ]);
    mock.set_fail_on("pull");

    let result = orchestrator.run(None).unwrap();
    assert_eq!(result, vec![RunStatus::Failed; 3]);

    let commands = mock.get_commands();
    assert_eq!(count(&commands, "pull:"), 3);
    assert_eq!(count(&commands, "run:"), 0);
    assert_eq!(count(&commands, "stop:"), 0);
    assert_eq!(count(&commands, "remove:"), 0);
}

#[test]
fn test_hooks_run_in_order_and_stop_at_failure() {
    let (mut orchestrator, mock) = create_orchestrator(vec![
        EnvironmentDefinition::new("ruby:3.3", "bundle exec rspec")
            .with_before_scripts(["bundle install", "bin/setup-db", "bin/seed"]),
    ]);
    mock.set_fail_on("exec:bin/setup-db");

    assert_eq!(orchestrator.run(None).unwrap(), vec![RunStatus::Failed]);

    let execs: Vec<String> = mock
        .get_commands()
        .into_iter()
        .filter(|c| c.starts_with("exec:"))
        .collect();
    assert_eq!(
        execs,
        vec![
            "exec:c1:backup",
            "exec:c1:bundle install",
            "exec:c1:bin/setup-db",
        ]
    );
}
