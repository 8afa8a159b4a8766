use crate::context::BrowserContext;
use crate::messenger::{self, WorkerChannel};
use crate::runtime::{FetchSource, WasmInstance, WebAssemblyRuntime, describe};
use log::{error, info};
use once_cell::unsync::OnceCell;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web2600_bridge::loader::{ModuleHost, boot};
use web2600_bridge::{BridgeConfig, BridgeError, ConfigError};
use web_sys::WorkerGlobalScope;

pub type WorkerHost = ModuleHost<WorkerChannel, WasmInstance>;

/// Global the page may set before the worker script loads, either as an
/// object or as a JSON string
const CONFIG_GLOBAL: &str = "web2600Config";

thread_local! {
    static HOST: OnceCell<Rc<RefCell<WorkerHost>>> = const { OnceCell::new() };
    static FRAME_TIMER: Cell<Option<i32>> = const { Cell::new(None) };
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);

fn read_config() -> Result<BridgeConfig, ConfigError> {
    let value = js_sys::Reflect::get(&js_sys::global(), &CONFIG_GLOBAL.into())
        .map_err(|e| ConfigError::Host(describe(&e)))?;
    if value.is_undefined() || value.is_null() {
        return Ok(BridgeConfig::default());
    }

    let config = match value.as_string() {
        Some(raw) => BridgeConfig::from_json(&raw)?,
        None => serde_wasm_bindgen::from_value::<BridgeConfig>(value).map_err(|e| ConfigError::Host(e.to_string()))?,
    };
    config.level_filter()?;
    Ok(config)
}

fn init_logging(config: &BridgeConfig) -> Result<(), ConfigError> {
    console_log::init_with_level(config.console_level()?).ok();
    Ok(())
}

fn install(host: &Rc<RefCell<WorkerHost>>) -> Result<(), BridgeError> {
    HOST.with(|cell| {
        let _ = cell.set(host.clone());
    });
    messenger::init_message_listener(host.clone()).map_err(|e| BridgeError::Channel(describe(&e)))
}

/// Worker entry point.
///
/// Outside a dedicated worker this returns immediately without reading the
/// configuration or posting anything. A failed module load rejects the
/// returned promise, which the browser reports as an unhandled rejection.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let host = boot(
        &BrowserContext,
        WorkerChannel::from_global,
        || {
            let config = read_config()?;
            init_logging(&config)?;
            Ok(config)
        },
        install,
        &FetchSource::from_global(),
        &WebAssemblyRuntime,
    )
    .await
    .map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))?;

    let Some(host) = host else {
        return Ok(());
    };
    let (wants_frames, interval_ms) = {
        let host = host.borrow();
        (host.wants_frames(), host.config().frame_interval_ms)
    };
    if wants_frames {
        start_frames(host, interval_ms)?;
    }
    Ok(())
}

/// Calls the module's `frame` export on a fixed interval. Between ticks the
/// worker's event loop delivers page messages.
fn start_frames(host: Rc<RefCell<WorkerHost>>, interval_ms: u32) -> Result<(), JsValue> {
    let scope: WorkerGlobalScope = js_sys::global().unchecked_into();

    let closure = Closure::<dyn FnMut()>::new(move || {
        let Ok(mut host) = host.try_borrow_mut() else {
            return;
        };
        if let Err(e) = host.frame() {
            error!("module stopped: {e}");
            host.teardown();
            stop_frames();
        }
    });

    let handle = scope.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        i32::try_from(interval_ms).unwrap_or(i32::MAX),
    )?;
    closure.forget();

    FRAME_TIMER.with(|timer| timer.set(Some(handle)));
    info!("driving frames every {interval_ms}ms");
    Ok(())
}

fn stop_frames() {
    if let Some(handle) = FRAME_TIMER.with(|timer| timer.take()) {
        let scope: WorkerGlobalScope = js_sys::global().unchecked_into();
        scope.clear_interval_with_handle(handle);
    }
}

/// Stops the frame timer, drops the module and closes the bridge
#[wasm_bindgen]
pub fn shutdown() -> Result<(), JsValue> {
    stop_frames();
    HOST.with(|cell| match cell.get() {
        Some(host) => {
            let mut host = host
                .try_borrow_mut()
                .map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))?;
            host.teardown();
            Ok(())
        }
        None => Ok(()),
    })
}
