use crate::error::BridgeError;
use serde::{Deserialize, Serialize};

/// Envelopes posted from the worker to the page.
///
/// The set of `cmd` tags is closed. A receiver that sees any other tag must
/// reject the envelope, which is what [`WorkerMessage::decode`] does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum WorkerMessage {
    Log { msg: String },
    UpdateDebug { target: String, value: DebugValue },
    UpdateCanvas { image: Vec<u8> },
    UpdateCanvasSize { width: u32, height: u32 },
}

impl WorkerMessage {
    pub fn cmd(&self) -> &'static str {
        match self {
            WorkerMessage::Log { .. } => "log",
            WorkerMessage::UpdateDebug { .. } => "updateDebug",
            WorkerMessage::UpdateCanvas { .. } => "updateCanvas",
            WorkerMessage::UpdateCanvasSize { .. } => "updateCanvasSize",
        }
    }

    pub fn encode(&self) -> Result<String, BridgeError> {
        serde_json::to_string(self).map_err(|e| BridgeError::Protocol(e.to_string()))
    }

    pub fn decode(raw: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(raw).map_err(|e| BridgeError::Protocol(e.to_string()))
    }
}

/// Value half of an `updateDebug` envelope. Serializes as the bare value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DebugValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for DebugValue {
    fn from(v: bool) -> Self {
        DebugValue::Bool(v)
    }
}

impl From<i64> for DebugValue {
    fn from(v: i64) -> Self {
        DebugValue::Int(v)
    }
}

/// Largest integer a JS number holds exactly
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

impl From<u64> for DebugValue {
    /// Past [`MAX_SAFE_INTEGER`] the value goes out as a float, which the page
    /// can still receive
    fn from(v: u64) -> Self {
        if v <= MAX_SAFE_INTEGER {
            DebugValue::Int(v as i64)
        } else {
            DebugValue::Float(v as f64)
        }
    }
}

impl From<i32> for DebugValue {
    fn from(v: i32) -> Self {
        DebugValue::Int(v as i64)
    }
}

impl From<u32> for DebugValue {
    fn from(v: u32) -> Self {
        DebugValue::Int(v as i64)
    }
}

impl From<f64> for DebugValue {
    fn from(v: f64) -> Self {
        DebugValue::Float(v)
    }
}

impl From<&str> for DebugValue {
    fn from(v: &str) -> Self {
        DebugValue::Text(v.to_string())
    }
}

impl From<String> for DebugValue {
    fn from(v: String) -> Self {
        DebugValue::Text(v)
    }
}

/// Envelopes posted from the page to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum ClientMessage {
    KeyDown { key: u32 },
    KeyUp { key: u32 },
}

impl ClientMessage {
    pub fn decode(raw: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(raw).map_err(|e| BridgeError::Protocol(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_wire_format() {
        let msg = WorkerMessage::Log { msg: "boot".into() };
        assert_eq!(serde_json::to_value(&msg).unwrap(), json!({"cmd": "log", "msg": "boot"}));
    }

    #[test]
    fn test_canvas_size_wire_format() {
        let msg = WorkerMessage::UpdateCanvasSize {
            width: 320,
            height: 240,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"cmd": "updateCanvasSize", "width": 320, "height": 240})
        );
    }

    #[test]
    fn test_debug_value_serializes_bare() {
        let cases = [
            (DebugValue::from(42u32), json!(42)),
            (DebugValue::from(true), json!(true)),
            (DebugValue::from(0.5), json!(0.5)),
            (DebugValue::from("NTSC"), json!("NTSC")),
        ];

        for (value, expected) in cases {
            let msg = WorkerMessage::UpdateDebug {
                target: "frameNum".into(),
                value,
            };
            assert_eq!(
                serde_json::to_value(&msg).unwrap(),
                json!({"cmd": "updateDebug", "target": "frameNum", "value": expected})
            );
        }
    }

    #[test]
    fn test_canvas_image_is_passed_through() {
        let msg = WorkerMessage::UpdateCanvas {
            image: vec![0xFF, 0x00, 0x80, 0xFF],
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"cmd": "updateCanvas", "image": [255, 0, 128, 255]})
        );
    }

    #[test]
    fn test_cmd_matches_serialized_tag() {
        let messages = [
            WorkerMessage::Log { msg: String::new() },
            WorkerMessage::UpdateDebug {
                target: "t".into(),
                value: DebugValue::Int(0),
            },
            WorkerMessage::UpdateCanvas { image: vec![] },
            WorkerMessage::UpdateCanvasSize { width: 0, height: 0 },
        ];
        for msg in messages {
            let value = serde_json::to_value(&msg).unwrap();
            assert_eq!(value["cmd"], msg.cmd());
        }
    }

    #[test]
    fn test_unknown_tag_is_protocol_violation() {
        let err = WorkerMessage::decode(r#"{"cmd":"playSound","freq":440}"#).unwrap_err();
        assert!(matches!(err, BridgeError::Protocol(_)));

        let err = WorkerMessage::decode(r#"{"msg":"no tag"}"#).unwrap_err();
        assert!(matches!(err, BridgeError::Protocol(_)));
    }

    #[test]
    fn test_decode_known_envelope() {
        let msg = WorkerMessage::decode(r#"{"cmd":"updateDebug","target":"frameNum","value":7}"#).unwrap();
        assert_eq!(
            msg,
            WorkerMessage::UpdateDebug {
                target: "frameNum".into(),
                value: DebugValue::Int(7),
            }
        );
    }

    #[test]
    fn test_client_message_decode() {
        assert_eq!(
            ClientMessage::decode(r#"{"cmd":"keyDown","key":37}"#).unwrap(),
            ClientMessage::KeyDown { key: 37 }
        );
        assert_eq!(
            ClientMessage::decode(r#"{"cmd":"keyUp","key":32}"#).unwrap(),
            ClientMessage::KeyUp { key: 32 }
        );
        assert!(ClientMessage::decode(r#"{"cmd":"reset"}"#).is_err());
    }

    #[test]
    fn test_large_counters_stay_representable_in_js() {
        assert_eq!(DebugValue::from(MAX_SAFE_INTEGER), DebugValue::Int(9_007_199_254_740_991));
        assert_eq!(
            DebugValue::from(MAX_SAFE_INTEGER + 1),
            DebugValue::Float(9_007_199_254_740_992.0)
        );
        assert_eq!(DebugValue::from(u64::MAX), DebugValue::Float(u64::MAX as f64));
    }
}
