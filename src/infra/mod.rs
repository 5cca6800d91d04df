pub mod config;
pub mod engine_adapter;
pub mod manifest;

pub use engine_adapter::EngineAdapter;
pub use manifest::load_manifest;
