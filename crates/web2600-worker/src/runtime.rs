use crate::abi::{
    self, EXPORT_FRAME, EXPORT_INPUT, EXPORT_MEMORY, EXPORT_RUN, IMPORT_LOG, IMPORT_MODULE,
    IMPORT_UPDATE_CANVAS, IMPORT_UPDATE_CANVAS_SIZE, IMPORT_UPDATE_DEBUG, IMPORT_UPDATE_DEBUG_TEXT,
};
use js_sys::{ArrayBuffer, Function, Object, Reflect, Uint8Array, WebAssembly};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web2600_bridge::bridge::report;
use web2600_bridge::input::JoystickEvent;
use web2600_bridge::loader::{ModuleInstance, ModuleRuntime, ModuleSource};
use web2600_bridge::{BridgeError, DebugValue, LoadError, Notifier};
use web_sys::{Response, WorkerGlobalScope};

/// Best-effort text for a thrown JS value
pub fn describe(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Fetches the module binary relative to the worker script
pub struct FetchSource {
    scope: WorkerGlobalScope,
}

impl FetchSource {
    pub fn from_global() -> Self {
        Self {
            scope: js_sys::global().unchecked_into(),
        }
    }
}

impl ModuleSource for FetchSource {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        let fetch_err = |e: JsValue| LoadError::Fetch {
            url: location.to_string(),
            reason: describe(&e),
        };

        let response: Response = JsFuture::from(self.scope.fetch_with_str(location))
            .await
            .map_err(fetch_err)?
            .dyn_into()
            .map_err(fetch_err)?;

        if !response.ok() {
            return Err(LoadError::Status {
                url: location.to_string(),
                status: response.status(),
            });
        }

        let buffer = JsFuture::from(response.array_buffer().map_err(fetch_err)?)
            .await
            .map_err(fetch_err)?;
        Ok(Uint8Array::new(&buffer).to_vec())
    }
}

type SharedMemory = Rc<RefCell<Option<WebAssembly::Memory>>>;

/// Copies `len` bytes at `ptr` out of the module's linear memory
fn read_bytes(memory: &SharedMemory, ptr: u32, len: u32) -> Result<Vec<u8>, BridgeError> {
    let memory = memory.borrow();
    let memory = memory
        .as_ref()
        .ok_or_else(|| BridgeError::Protocol("module called out before memory was bound".into()))?;

    let buffer: ArrayBuffer = memory.buffer().unchecked_into();
    abi::check_range(buffer.byte_length(), ptr, len)?;
    Ok(Uint8Array::new_with_byte_offset_and_length(&buffer, ptr, len).to_vec())
}

fn read_string(memory: &SharedMemory, ptr: u32, len: u32) -> Result<String, BridgeError> {
    let bytes = read_bytes(memory, ptr, len)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// The `env` import object plus the closures backing it. Dropping this
/// invalidates the imports, so the instance keeps it alive.
struct Imports {
    object: Object,
    _log: Closure<dyn Fn(u32, u32)>,
    _update_debug: Closure<dyn Fn(u32, u32, f64)>,
    _update_debug_text: Closure<dyn Fn(u32, u32, u32, u32)>,
    _update_canvas: Closure<dyn Fn(u32, u32)>,
    _update_canvas_size: Closure<dyn Fn(u32, u32)>,
}

impl Imports {
    fn bind(notifier: Rc<dyn Notifier>, memory: SharedMemory) -> Result<Self, LoadError> {
        let log = {
            let (n, m) = (notifier.clone(), memory.clone());
            Closure::<dyn Fn(u32, u32)>::new(move |ptr, len| {
                report(read_string(&m, ptr, len).and_then(|msg| n.log(&msg)));
            })
        };

        let update_debug = {
            let (n, m) = (notifier.clone(), memory.clone());
            Closure::<dyn Fn(u32, u32, f64)>::new(move |ptr, len, value| {
                report(
                    read_string(&m, ptr, len)
                        .and_then(|target| n.update_debug(&target, abi::debug_value_from_f64(value))),
                );
            })
        };

        let update_debug_text = {
            let (n, m) = (notifier.clone(), memory.clone());
            Closure::<dyn Fn(u32, u32, u32, u32)>::new(move |ptr, len, value_ptr, value_len| {
                report(read_string(&m, ptr, len).and_then(|target| {
                    let value = read_string(&m, value_ptr, value_len)?;
                    n.update_debug(&target, DebugValue::Text(value))
                }));
            })
        };

        let update_canvas = {
            let (n, m) = (notifier.clone(), memory.clone());
            Closure::<dyn Fn(u32, u32)>::new(move |ptr, len| {
                report(read_bytes(&m, ptr, len).and_then(|pixels| n.update_canvas(&pixels)));
            })
        };

        let update_canvas_size = {
            let n = notifier;
            Closure::<dyn Fn(u32, u32)>::new(move |width, height| {
                report(n.update_canvas_size(width, height));
            })
        };

        let env = Object::new();
        let entries: [(&str, &JsValue); 5] = [
            (IMPORT_LOG, log.as_ref()),
            (IMPORT_UPDATE_DEBUG, update_debug.as_ref()),
            (IMPORT_UPDATE_DEBUG_TEXT, update_debug_text.as_ref()),
            (IMPORT_UPDATE_CANVAS, update_canvas.as_ref()),
            (IMPORT_UPDATE_CANVAS_SIZE, update_canvas_size.as_ref()),
        ];
        for (name, func) in entries {
            set(&env, name, func)?;
        }

        let object = Object::new();
        set(&object, IMPORT_MODULE, &env)?;

        Ok(Self {
            object,
            _log: log,
            _update_debug: update_debug,
            _update_debug_text: update_debug_text,
            _update_canvas: update_canvas,
            _update_canvas_size: update_canvas_size,
        })
    }
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), LoadError> {
    Reflect::set(target, &key.into(), value)
        .map(|_| ())
        .map_err(|e| LoadError::Instantiate(describe(&e)))
}

/// Looks up an exported function; `Ok(None)` when the module doesn't have it
fn export_fn(exports: &Object, name: &str) -> Result<Option<Function>, LoadError> {
    let value = Reflect::get(exports, &name.into()).map_err(|e| LoadError::Instantiate(describe(&e)))?;
    if value.is_undefined() {
        return Ok(None);
    }
    value
        .dyn_into::<Function>()
        .map(Some)
        .map_err(|_| LoadError::MissingExport(name.to_string()))
}

/// `WebAssembly.instantiate` with the bridge bound as the module's imports
pub struct WebAssemblyRuntime;

impl ModuleRuntime for WebAssemblyRuntime {
    type Instance = WasmInstance;

    async fn instantiate(
        &self,
        binary: &[u8],
        notifier: Rc<dyn Notifier>,
    ) -> Result<WasmInstance, LoadError> {
        let memory: SharedMemory = Rc::new(RefCell::new(None));
        let imports = Imports::bind(notifier, memory.clone())?;

        let result = JsFuture::from(WebAssembly::instantiate_buffer(binary, &imports.object))
            .await
            .map_err(|e| LoadError::Instantiate(describe(&e)))?;
        let instance: WebAssembly::Instance = Reflect::get(&result, &"instance".into())
            .and_then(|v| v.dyn_into())
            .map_err(|e| LoadError::Instantiate(describe(&e)))?;
        let exports = instance.exports();

        let module_memory = Reflect::get(&exports, &EXPORT_MEMORY.into())
            .ok()
            .and_then(|v| v.dyn_into::<WebAssembly::Memory>().ok())
            .ok_or_else(|| LoadError::MissingExport(EXPORT_MEMORY.to_string()))?;
        *memory.borrow_mut() = Some(module_memory);

        let run = export_fn(&exports, EXPORT_RUN)?.ok_or_else(|| LoadError::MissingExport(EXPORT_RUN.to_string()))?;

        Ok(WasmInstance {
            run,
            frame: export_fn(&exports, EXPORT_FRAME)?,
            input: export_fn(&exports, EXPORT_INPUT)?,
            _imports: imports,
            _instance: instance,
        })
    }
}

pub struct WasmInstance {
    run: Function,
    frame: Option<Function>,
    input: Option<Function>,
    _imports: Imports,
    _instance: WebAssembly::Instance,
}

fn trap(export: &str) -> impl Fn(JsValue) -> LoadError + '_ {
    move |e| LoadError::Trap {
        export: export.to_string(),
        reason: describe(&e),
    }
}

impl ModuleInstance for WasmInstance {
    fn run(&mut self) -> Result<(), LoadError> {
        self.run.call0(&JsValue::UNDEFINED).map_err(trap(EXPORT_RUN))?;
        Ok(())
    }

    fn wants_frames(&self) -> bool {
        self.frame.is_some()
    }

    fn frame(&mut self) -> Result<(), LoadError> {
        if let Some(frame) = &self.frame {
            frame.call0(&JsValue::UNDEFINED).map_err(trap(EXPORT_FRAME))?;
        }
        Ok(())
    }

    fn handle_input(&mut self, event: JoystickEvent) -> Result<(), LoadError> {
        let Some(input) = &self.input else {
            return Ok(());
        };
        input
            .call3(
                &JsValue::UNDEFINED,
                &JsValue::from(event.player.index() as u32),
                &JsValue::from(event.button.bits()),
                &JsValue::from(event.pressed),
            )
            .map_err(trap(EXPORT_INPUT))?;
        Ok(())
    }
}
