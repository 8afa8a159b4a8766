// Import surface a module sees, and the checks applied to what it passes in
use web2600_bridge::{BridgeError, DebugValue};

pub const IMPORT_MODULE: &str = "env";

pub const IMPORT_LOG: &str = "log";
pub const IMPORT_UPDATE_DEBUG: &str = "updateDebug";
pub const IMPORT_UPDATE_DEBUG_TEXT: &str = "updateDebugText";
pub const IMPORT_UPDATE_CANVAS: &str = "updateCanvas";
pub const IMPORT_UPDATE_CANVAS_SIZE: &str = "updateCanvasSize";

pub const EXPORT_MEMORY: &str = "memory";
pub const EXPORT_RUN: &str = "run";
pub const EXPORT_FRAME: &str = "frame";
pub const EXPORT_INPUT: &str = "input";

/// Largest integer an f64 holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Numeric debug values arrive as f64; whole numbers go back out as integers
pub fn debug_value_from_f64(value: f64) -> DebugValue {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        DebugValue::Int(value as i64)
    } else {
        DebugValue::Float(value)
    }
}

/// Validates a pointer/length pair against the module's memory size
pub fn check_range(memory_len: u32, ptr: u32, len: u32) -> Result<(), BridgeError> {
    match ptr.checked_add(len) {
        Some(end) if end <= memory_len => Ok(()),
        _ => Err(BridgeError::Protocol(format!(
            "range {ptr}+{len} outside module memory of {memory_len} bytes"
        ))),
    }
}
