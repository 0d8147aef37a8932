use std::{collections::HashSet, time::Duration};

use alloy::network::Ethereum;

use crate::{
    ConfigError,
    failover::{Connector, EndpointRegistry, FailoverProvider, RpcConnector},
};

/// Default upper bound for a single call attempt.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);
/// Default upper bound for establishing a transport, and separately for the liveness probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for constructing a [`FailoverProvider`].
///
/// Endpoints are tried in registration order: the primary first, then each fallback.
#[derive(Clone, Debug)]
pub struct FailoverProviderBuilder<C> {
    connector: C,
    primary: String,
    fallbacks: Vec<String>,
    call_timeout: Duration,
    probe_timeout: Duration,
}

impl FailoverProviderBuilder<RpcConnector<Ethereum>> {
    /// Creates a builder for Ethereum RPC endpoints reached through Alloy.
    #[must_use]
    pub fn new(primary: impl Into<String>) -> Self {
        Self::with_connector(RpcConnector::new(), primary)
    }
}

impl<C: Connector> FailoverProviderBuilder<C> {
    /// Creates a builder that opens endpoints through `connector`.
    #[must_use]
    pub fn with_connector(connector: C, primary: impl Into<String>) -> Self {
        Self {
            connector,
            primary: primary.into(),
            fallbacks: vec![],
            call_timeout: DEFAULT_CALL_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Appends a fallback endpoint.
    #[must_use]
    pub fn fallback(mut self, address: impl Into<String>) -> Self {
        self.fallbacks.push(address.into());
        self
    }

    /// Appends several fallback endpoints, keeping their order.
    #[must_use]
    pub fn fallbacks<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallbacks.extend(addresses.into_iter().map(Into::into));
        self
    }

    /// Sets the timeout applied to each call attempt. An elapsed timeout counts as a transient
    /// failure.
    #[must_use]
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Sets the timeout for establishing a transport and for the liveness probe.
    #[must_use]
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Validates the configuration and builds the provider.
    ///
    /// No connection is opened here; endpoints are opened on demand.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::EmptyEndpointAddress`] if any address is blank.
    /// * [`ConfigError::DuplicateEndpoint`] if an address is registered twice.
    /// * [`ConfigError::InvalidCallTimeout`] / [`ConfigError::InvalidProbeTimeout`] if a timeout
    ///   is zero.
    pub fn build(self) -> Result<FailoverProvider<C>, ConfigError> {
        if self.call_timeout.is_zero() {
            return Err(ConfigError::InvalidCallTimeout);
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::InvalidProbeTimeout);
        }

        let mut seen = HashSet::new();
        for address in std::iter::once(&self.primary).chain(&self.fallbacks) {
            let address = address.trim();
            if address.is_empty() {
                return Err(ConfigError::EmptyEndpointAddress);
            }
            if !seen.insert(address) {
                return Err(ConfigError::DuplicateEndpoint(address.to_string()));
            }
        }

        debug!(
            call_timeout_ms = self.call_timeout.as_millis(),
            probe_timeout_ms = self.probe_timeout.as_millis(),
            fallback_count = self.fallbacks.len(),
            "Building FailoverProvider"
        );

        let registry = EndpointRegistry::new(
            self.primary.trim(),
            self.fallbacks.iter().map(|address| address.trim().to_string()),
        );

        Ok(FailoverProvider {
            registry,
            connector: self.connector,
            call_timeout: self.call_timeout,
            probe_timeout: self.probe_timeout,
        })
    }
}
