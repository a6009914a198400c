pub mod config;
pub mod engine;
pub mod model;
pub mod notify;
pub mod observability;
pub mod scheduler;
pub mod status;
pub mod store;

pub use config::MatchConfig;
pub use engine::{Engine, EngineError};
