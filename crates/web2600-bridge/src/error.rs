use thiserror::Error;

/// Failures of the outbound notification path
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("message channel send failed: {0}")]
    Channel(String),

    #[error("bridge has been torn down")]
    Closed,

    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// Failures while fetching, instantiating or driving the computation module
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("fetch of {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("module instantiation failed: {0}")]
    Instantiate(String),

    #[error("module does not export `{0}`")]
    MissingExport(String),

    #[error("module trapped in `{export}`: {reason}")]
    Trap { export: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bridge configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown log level: {0}")]
    LogLevel(String),

    #[error("configuration could not be read from the host: {0}")]
    Host(String),
}

/// Failures of the worker start-up sequence
#[derive(Debug, Error)]
pub enum BootError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Load(#[from] LoadError),
}
