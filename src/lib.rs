pub mod config;
pub mod handlers;
pub mod models;
pub mod queue;
pub mod store;

pub use config::{Config, ConfigError};
pub use models::*;
pub use queue::{ItemQueue, QueueError, QueueStats};
pub use store::{ItemStore, StoreError};
