// Bridge between a worker-hosted VCS module and the page that owns the worker
pub mod bridge;
pub mod channel;
pub mod config;
pub mod context;
pub mod display;
pub mod error;
pub mod input;
pub mod loader;
pub mod message;
pub mod prelude;

#[cfg(all(feature = "guest", target_arch = "wasm32"))]
pub mod guest;

// Re-exports
pub use bridge::{HostBridge, Notifier};
pub use config::BridgeConfig;
pub use error::{BootError, BridgeError, ConfigError, LoadError};
pub use message::{ClientMessage, DebugValue, WorkerMessage};
