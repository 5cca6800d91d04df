pub mod environment;
mod orchestrator;

pub use environment::Environment;
pub use orchestrator::Orchestrator;
