//! Convenient imports for hosts and modules built on web2600-bridge
//!
//! ```rust
//! use web2600_bridge::prelude::*;
//! ```

// Bridge API
pub use crate::bridge::{HostBridge, Notifier};
pub use crate::channel::{MessageChannel, QueueChannel};
pub use crate::config::BridgeConfig;
pub use crate::context::{WorkerContext, WorkerSupport};
pub use crate::loader::{ModuleHost, ModuleInstance, ModuleRuntime, ModuleSource};

// Protocol
pub use crate::message::{ClientMessage, DebugValue, WorkerMessage};

// Module-side helpers
pub use crate::display::{Canvas, PixelRenderer, SignalAttributes, TvSpec};
pub use crate::input::{Joystick, JoystickButton, JoystickEvent, PlayerId};

// Errors
pub use crate::error::{BootError, BridgeError, ConfigError, LoadError};
