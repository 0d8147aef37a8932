use thiserror::Error;

/// Errors returned by the builders when a configuration value is invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An endpoint was configured with an empty (or whitespace-only) address.
    #[error("Endpoint address must not be empty")]
    EmptyEndpointAddress,

    /// The same endpoint address was registered twice.
    ///
    /// Failover skips endpoints by address, so duplicates would be retried against the same
    /// provider.
    #[error("Endpoint {0} is registered more than once")]
    DuplicateEndpoint(String),

    /// The per-call timeout is invalid (must be greater than zero).
    #[error("Call timeout must be greater than 0")]
    InvalidCallTimeout,

    /// The liveness probe timeout is invalid (must be greater than zero).
    #[error("Probe timeout must be greater than 0")]
    InvalidProbeTimeout,

    /// The log fetch window width is invalid (must be greater than zero).
    #[error("Chunk width must be greater than 0")]
    InvalidChunkWidth,
}
