use js_sys::{Object, Reflect, Uint8Array};
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web2600_bridge::channel::MessageChannel;
use web2600_bridge::message::{ClientMessage, WorkerMessage};
use web2600_bridge::BridgeError;
use web_sys::{DedicatedWorkerGlobalScope, MessageEvent};

use crate::entry::WorkerHost;
use crate::runtime::describe;

/// Posts envelopes to the page through the worker's global scope
pub struct WorkerChannel {
    scope: DedicatedWorkerGlobalScope,
}

impl WorkerChannel {
    /// Only meaningful once the context check has passed; before that the
    /// bridge never exists and nothing is posted through this.
    pub fn from_global() -> Self {
        Self {
            scope: js_sys::global().unchecked_into(),
        }
    }
}

impl MessageChannel for WorkerChannel {
    fn post(&self, message: WorkerMessage) -> Result<(), BridgeError> {
        let value = to_js(&message)?;
        self.scope
            .post_message(&value)
            .map_err(|e| BridgeError::Channel(describe(&e)))
    }
}

/// Pixel buffers go out as a `Uint8Array` the page can hand straight to
/// `ImageData`; everything else takes the serde route.
fn to_js(message: &WorkerMessage) -> Result<JsValue, BridgeError> {
    match message {
        WorkerMessage::UpdateCanvas { image } => {
            let obj = Object::new();
            set(&obj, "cmd", &JsValue::from(message.cmd()))?;
            set(&obj, "image", &Uint8Array::from(image.as_slice()))?;
            Ok(obj.into())
        }
        _ => serde_wasm_bindgen::to_value(message).map_err(|e| BridgeError::Protocol(e.to_string())),
    }
}

fn set(obj: &Object, key: &str, value: &JsValue) -> Result<(), BridgeError> {
    Reflect::set(obj, &key.into(), value)
        .map(|_| ())
        .map_err(|e| BridgeError::Protocol(describe(&e)))
}

/// Routes page messages to the host. Anything that is not a known key event
/// is logged back to the page verbatim.
pub fn init_message_listener(host: Rc<RefCell<WorkerHost>>) -> Result<(), JsValue> {
    let scope: DedicatedWorkerGlobalScope = js_sys::global().unchecked_into();

    let closure = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        let data = event.data();
        let Ok(mut host) = host.try_borrow_mut() else {
            warn!("host busy, dropped page message");
            return;
        };

        match serde_wasm_bindgen::from_value::<ClientMessage>(data.clone()) {
            Ok(message) => {
                debug!("page message: {message:?}");
                if let Err(e) = host.handle_message(message) {
                    warn!("input not delivered: {e}");
                }
            }
            Err(_) => {
                let raw = js_sys::JSON::stringify(&data)
                    .ok()
                    .and_then(|s| s.as_string())
                    .unwrap_or_else(|| describe(&data));
                host.reject_message(&raw);
            }
        }
    });

    scope.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
