//! Colour-bar test card built as a worker module.
//!
//! Exercises the whole path a real emulator build takes: the canvas renderer,
//! the `env` imports and the `run`/`frame`/`input` exports.

pub mod card;

#[cfg(target_arch = "wasm32")]
mod exports;

pub use card::TestCard;
