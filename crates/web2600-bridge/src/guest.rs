//! Module-side half of the bridge.
//!
//! A module built with the `guest` feature reaches the worker through these
//! `env` imports. Strings and pixel buffers are passed as pointer/length
//! pairs into the module's own linear memory; the worker copies them out
//! before the call returns.

use crate::bridge::Notifier;
use crate::error::BridgeError;
use crate::message::DebugValue;

#[link(wasm_import_module = "env")]
unsafe extern "C" {
    #[link_name = "log"]
    fn host_log(ptr: *const u8, len: usize);

    #[link_name = "updateDebug"]
    fn host_update_debug(ptr: *const u8, len: usize, value: f64);

    #[link_name = "updateDebugText"]
    fn host_update_debug_text(ptr: *const u8, len: usize, value_ptr: *const u8, value_len: usize);

    #[link_name = "updateCanvas"]
    fn host_update_canvas(ptr: *const u8, len: usize);

    #[link_name = "updateCanvasSize"]
    fn host_update_canvas_size(width: u32, height: u32);
}

/// [`Notifier`] for code running inside the worker-hosted module.
///
/// The imports cannot fail from the module's point of view; send failures are
/// reported on the worker side.
#[derive(Copy, Clone, Debug, Default)]
pub struct GuestNotifier;

impl Notifier for GuestNotifier {
    fn log(&self, msg: &str) -> Result<(), BridgeError> {
        // SAFETY: pointer and length describe a live &str for the duration of the call
        unsafe { host_log(msg.as_ptr(), msg.len()) };
        Ok(())
    }

    fn update_debug(&self, target: &str, value: DebugValue) -> Result<(), BridgeError> {
        // Numbers and bools travel as f64, text through its own import
        let number = match value {
            DebugValue::Bool(b) => f64::from(u8::from(b)),
            DebugValue::Int(i) => i as f64,
            DebugValue::Float(f) => f,
            DebugValue::Text(text) => {
                // SAFETY: both slices outlive the call
                unsafe { host_update_debug_text(target.as_ptr(), target.len(), text.as_ptr(), text.len()) };
                return Ok(());
            }
        };
        // SAFETY: target outlives the call
        unsafe { host_update_debug(target.as_ptr(), target.len(), number) };
        Ok(())
    }

    fn update_canvas(&self, pixels: &[u8]) -> Result<(), BridgeError> {
        // SAFETY: pixels outlives the call
        unsafe { host_update_canvas(pixels.as_ptr(), pixels.len()) };
        Ok(())
    }

    fn update_canvas_size(&self, width: u32, height: u32) -> Result<(), BridgeError> {
        // SAFETY: plain integers
        unsafe { host_update_canvas_size(width, height) };
        Ok(())
    }
}
