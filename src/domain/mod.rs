mod config;
mod environment;
pub mod error;
mod test_args;
pub mod traits;

pub use config::RunConfig;
pub use environment::{ContainerHandle, EnvironmentDefinition, RunStatus};
pub use error::{EngineError, LifecycleError, Step};
pub use test_args::{FlagValue, TestArgs};
pub use traits::{ContainerEngine, MountSpec, OutputMode};
