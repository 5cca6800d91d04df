pub mod cli;
pub mod domain;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{ContainerEngine, EnvironmentDefinition, RunConfig, RunStatus, TestArgs};
pub use infra::EngineAdapter;
pub use services::{Environment, Orchestrator};
