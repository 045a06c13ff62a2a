//! Configuration and on-disk session persistence.

pub mod loader;
pub mod session_store;
pub mod types;

pub use loader::ConfigError;
pub use session_store::{SessionRecord, SessionStore, StoreError};
pub use types::{ClientConfig, Config, Endpoints};
