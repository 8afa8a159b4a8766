use crate::channel::MessageChannel;
use crate::context::WorkerContext;
use crate::error::BridgeError;
use crate::message::{DebugValue, WorkerMessage};
use log::{debug, error, info};
use std::cell::Cell;
use std::rc::Rc;

/// The four notifications a running module can raise.
///
/// Every call turns into exactly one envelope on the channel, carrying the
/// arguments unchanged.
pub trait Notifier {
    fn log(&self, msg: &str) -> Result<(), BridgeError>;
    fn update_debug(&self, target: &str, value: DebugValue) -> Result<(), BridgeError>;
    fn update_canvas(&self, pixels: &[u8]) -> Result<(), BridgeError>;
    fn update_canvas_size(&self, width: u32, height: u32) -> Result<(), BridgeError>;
}

impl<N: Notifier + ?Sized> Notifier for Rc<N> {
    fn log(&self, msg: &str) -> Result<(), BridgeError> {
        (**self).log(msg)
    }

    fn update_debug(&self, target: &str, value: DebugValue) -> Result<(), BridgeError> {
        (**self).update_debug(target, value)
    }

    fn update_canvas(&self, pixels: &[u8]) -> Result<(), BridgeError> {
        (**self).update_canvas(pixels)
    }

    fn update_canvas_size(&self, width: u32, height: u32) -> Result<(), BridgeError> {
        (**self).update_canvas_size(width, height)
    }
}

/// Hands a failed notification to the host's error reporting (the console,
/// once a logger is installed) so callers without a `Result` path don't drop it.
pub fn report(result: Result<(), BridgeError>) {
    if let Err(e) = result {
        error!("notification lost: {e}");
    }
}

/// Stateless adapter from notifier calls to envelopes on a message channel
pub struct HostBridge<C: MessageChannel> {
    channel: C,
    closed: Cell<bool>,
}

impl<C: MessageChannel> HostBridge<C> {
    /// Builds a bridge if `context` can host a module, `None` otherwise.
    ///
    /// An unsupported context is not an error: the bridge simply never
    /// exists, so nothing is loaded and nothing is posted.
    pub fn initialize(context: &impl WorkerContext, channel: C) -> Option<Self> {
        if !context.supports_module_loading() {
            debug!("worker module loading unavailable, bridge not started");
            return None;
        }

        info!("bridge initialized");
        Some(Self {
            channel,
            closed: Cell::new(false),
        })
    }

    /// Closes the bridge. Later notifications fail with [`BridgeError::Closed`]
    pub fn teardown(&self) {
        if !self.closed.replace(true) {
            info!("bridge torn down");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    fn post(&self, message: WorkerMessage) -> Result<(), BridgeError> {
        if self.closed.get() {
            return Err(BridgeError::Closed);
        }
        self.channel.post(message)
    }
}

impl<C: MessageChannel> Notifier for HostBridge<C> {
    fn log(&self, msg: &str) -> Result<(), BridgeError> {
        self.post(WorkerMessage::Log {
            msg: msg.to_string(),
        })
    }

    fn update_debug(&self, target: &str, value: DebugValue) -> Result<(), BridgeError> {
        self.post(WorkerMessage::UpdateDebug {
            target: target.to_string(),
            value,
        })
    }

    fn update_canvas(&self, pixels: &[u8]) -> Result<(), BridgeError> {
        self.post(WorkerMessage::UpdateCanvas {
            image: pixels.to_vec(),
        })
    }

    fn update_canvas_size(&self, width: u32, height: u32) -> Result<(), BridgeError> {
        self.post(WorkerMessage::UpdateCanvasSize { width, height })
    }
}
