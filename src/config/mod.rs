//! Bridge configuration.
//!
//! The configuration is a JSON file holding the relay URL and the list of
//! assistants. It is loaded once at startup, validated, and then handed by
//! value to the components that need it; nothing reads it from a global.

mod error;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use types::{
    AssistantEntry, BridgeConfig, DEFAULT_BACKEND_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS,
    ENV_RELAY_URL,
};
