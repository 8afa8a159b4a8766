use crate::bridge::{HostBridge, Notifier};
use crate::channel::MessageChannel;
use crate::config::BridgeConfig;
use crate::context::WorkerContext;
use crate::error::{BootError, BridgeError, ConfigError, LoadError};
use crate::input::{Joystick, JoystickEvent};
use crate::message::ClientMessage;
use log::{debug, error, info};
use std::cell::RefCell;
use std::rc::Rc;

/// Where the module binary comes from
#[allow(async_fn_in_trait)]
pub trait ModuleSource {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError>;
}

/// Turns a module binary into a runnable instance whose imports are bound to
/// `notifier`
#[allow(async_fn_in_trait)]
pub trait ModuleRuntime {
    type Instance: ModuleInstance;

    async fn instantiate(
        &self,
        binary: &[u8],
        notifier: Rc<dyn Notifier>,
    ) -> Result<Self::Instance, LoadError>;
}

pub trait ModuleInstance {
    /// Starts the module. Called exactly once, right after instantiation
    fn run(&mut self) -> Result<(), LoadError>;

    /// Whether the module wants [`ModuleInstance::frame`] called periodically
    fn wants_frames(&self) -> bool {
        false
    }

    fn frame(&mut self) -> Result<(), LoadError> {
        Ok(())
    }

    fn handle_input(&mut self, _event: JoystickEvent) -> Result<(), LoadError> {
        Ok(())
    }
}

/// Fetch, instantiate and run a module: the bridge's one asynchronous step.
///
/// No retry, no timeout, no cancellation. Any failure leaves `bridge` usable.
pub async fn load_module<C, S, R>(
    config: &BridgeConfig,
    bridge: Rc<HostBridge<C>>,
    source: &S,
    runtime: &R,
) -> Result<R::Instance, LoadError>
where
    C: MessageChannel + 'static,
    S: ModuleSource,
    R: ModuleRuntime,
{
    info!("loading module from {}", config.module_url);
    let binary = source.fetch(&config.module_url).await?;
    debug!("fetched {} bytes", binary.len());

    let notifier: Rc<dyn Notifier> = bridge;
    let mut instance = runtime.instantiate(&binary, notifier).await?;
    instance.run()?;

    info!("module running");
    Ok(instance)
}

/// Owns the bridge and, once loaded, the module instance for the lifetime of
/// the worker
pub struct ModuleHost<C: MessageChannel, I: ModuleInstance> {
    config: BridgeConfig,
    bridge: Rc<HostBridge<C>>,
    instance: Option<I>,
    joystick: Joystick,
}

impl<C: MessageChannel, I: ModuleInstance> std::fmt::Debug for ModuleHost<C, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleHost")
            .field("config", &self.config)
            .field("loaded", &self.instance.is_some())
            .finish_non_exhaustive()
    }
}

impl<C, I> ModuleHost<C, I>
where
    C: MessageChannel + 'static,
    I: ModuleInstance,
{
    pub fn new(config: BridgeConfig, bridge: HostBridge<C>) -> Self {
        Self {
            config,
            bridge: Rc::new(bridge),
            instance: None,
            joystick: Joystick::new(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn bridge(&self) -> &Rc<HostBridge<C>> {
        &self.bridge
    }

    pub fn joystick(&self) -> &Joystick {
        &self.joystick
    }

    pub fn is_running(&self) -> bool {
        self.instance.is_some()
    }

    /// Loads and starts the module in one go. Hosts that cannot hold `&mut self`
    /// across an await point use [`boot`], or [`load_module`] and
    /// [`ModuleHost::attach`].
    pub async fn load<S, R>(&mut self, source: &S, runtime: &R) -> Result<(), LoadError>
    where
        S: ModuleSource,
        R: ModuleRuntime<Instance = I>,
    {
        match load_module(&self.config, self.bridge.clone(), source, runtime).await {
            Ok(instance) => self.attach(instance),
            Err(e) => {
                error!("module load failed: {e}");
                Err(e)
            }
        }
    }

    /// Takes ownership of an instance that is already running. Buttons held
    /// while it was loading are pressed on it first, so later releases match.
    pub fn attach(&mut self, mut instance: I) -> Result<(), LoadError> {
        for event in self.joystick.held() {
            debug!("replaying held input {event:?}");
            instance.handle_input(event)?;
        }
        self.instance = Some(instance);
        Ok(())
    }

    pub fn wants_frames(&self) -> bool {
        self.instance.as_ref().is_some_and(|i| i.wants_frames())
    }

    /// Advances the module one frame. Returns `false` when there is nothing to drive
    pub fn frame(&mut self) -> Result<bool, LoadError> {
        match self.instance.as_mut() {
            Some(instance) if instance.wants_frames() => {
                instance.frame()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Applies a page message to the joystick and forwards the resulting event
    pub fn handle_message(&mut self, message: ClientMessage) -> Result<(), LoadError> {
        let Some(event) = self.joystick.apply(message) else {
            return Ok(());
        };

        match self.instance.as_mut() {
            Some(instance) => instance.handle_input(event),
            None => {
                debug!("input {event:?} before module start, not forwarded");
                Ok(())
            }
        }
    }

    /// Messages the host could not decode are echoed back as a log line
    pub fn reject_message(&self, raw: &str) {
        crate::bridge::report(self.bridge.log(raw));
    }

    /// Drops the instance and closes the bridge
    pub fn teardown(&mut self) {
        self.instance = None;
        self.bridge.teardown();
    }
}

/// Worker start-up: context check, configuration, bridge, `install`, then load.
///
/// Without module loading support this returns `Ok(None)` before `config` or
/// `channel` are called. `install` sees the host before the load starts, so
/// page messages can be routed to it while the module is fetched. A failed
/// load still leaves the installed host and its bridge in place.
pub async fn boot<W, C, I, S, R>(
    context: &W,
    channel: impl FnOnce() -> C,
    config: impl FnOnce() -> Result<BridgeConfig, ConfigError>,
    install: impl FnOnce(&Rc<RefCell<ModuleHost<C, I>>>) -> Result<(), BridgeError>,
    source: &S,
    runtime: &R,
) -> Result<Option<Rc<RefCell<ModuleHost<C, I>>>>, BootError>
where
    W: WorkerContext,
    C: MessageChannel + 'static,
    I: ModuleInstance,
    S: ModuleSource,
    R: ModuleRuntime<Instance = I>,
{
    if !context.supports_module_loading() {
        return Ok(None);
    }

    let config = config()?;
    let Some(bridge) = HostBridge::initialize(context, channel()) else {
        return Ok(None);
    };
    let host = Rc::new(RefCell::new(ModuleHost::new(config.clone(), bridge)));
    install(&host)?;

    let bridge = host.borrow().bridge().clone();
    let instance = load_module(&config, bridge, source, runtime)
        .await
        .inspect_err(|e| error!("module load failed: {e}"))?;
    host.borrow_mut().attach(instance)?;
    Ok(Some(host))
}
