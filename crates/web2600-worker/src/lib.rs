#![warn(clippy::all, rust_2018_idioms)]
//! Dedicated-worker host for a web2600 module.
//!
//! Loads the module binary, binds its `env` imports to a [`HostBridge`] and
//! relays what it reports to the page with `postMessage`. Keyboard messages
//! from the page are fed back to the module as joystick input.
//!
//! [`HostBridge`]: web2600_bridge::HostBridge

pub mod abi;

#[cfg(target_arch = "wasm32")]
mod context;
#[cfg(target_arch = "wasm32")]
mod entry;
#[cfg(target_arch = "wasm32")]
mod messenger;
#[cfg(target_arch = "wasm32")]
mod runtime;

#[cfg(target_arch = "wasm32")]
pub use entry::{shutdown, start};
