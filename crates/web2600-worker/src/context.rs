use wasm_bindgen::JsCast;
use web2600_bridge::context::WorkerContext;
use web_sys::DedicatedWorkerGlobalScope;

/// Answers for whatever global scope this wasm was started in
pub struct BrowserContext;

impl WorkerContext for BrowserContext {
    fn supports_module_loading(&self) -> bool {
        let global = js_sys::global();
        global.is_instance_of::<DedicatedWorkerGlobalScope>()
            && js_sys::Reflect::has(&global, &"WebAssembly".into()).unwrap_or(false)
    }
}
