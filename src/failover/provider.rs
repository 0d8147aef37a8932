use std::{collections::HashSet, time::Duration};

use alloy::primitives::BlockNumber;
use tokio::time::timeout;

use crate::failover::{
    AllProvidersExhausted, BlockNumberQuery, CallDescriptor, CallFailure, ChainReader, Classify,
    ConnectError, Connection, Connector, Endpoint, EndpointRegistry, ExecuteError, connector,
};

/// Failover-aware access to a ranked set of RPC endpoints.
///
/// Holds no open connections. Every connection is opened on demand and owned by the caller,
/// and every retry opens a fresh one.
#[derive(Clone, Debug)]
pub struct FailoverProvider<C> {
    pub(crate) registry: EndpointRegistry,
    pub(crate) connector: C,
    pub(crate) call_timeout: Duration,
    pub(crate) probe_timeout: Duration,
}

impl<C: Connector> FailoverProvider<C> {
    #[must_use]
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Opens and probes a single endpoint. Does not retry.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Unreachable`] or [`ConnectError::NotLive`].
    pub async fn open(&self, endpoint: &Endpoint) -> Result<Connection<C::Provider>, ConnectError> {
        let result = connector::open(&self.connector, endpoint, self.probe_timeout).await;
        if let Err(err) = &result {
            warn!(error = %err, "Failed to open endpoint");
        }
        result
    }

    /// Opens the highest ranked live endpoint.
    ///
    /// # Errors
    ///
    /// See [`acquire`](Self::acquire).
    pub async fn connect(&self) -> Result<Connection<C::Provider>, AllProvidersExhausted> {
        self.acquire(&HashSet::new()).await
    }

    /// Walks the registry in rank order and returns the first endpoint that opens, skipping
    /// every address in `skip`.
    ///
    /// # Errors
    ///
    /// Returns [`AllProvidersExhausted`] listing every attempted endpoint, in rank order, if
    /// none of them could be opened.
    pub async fn acquire(
        &self,
        skip: &HashSet<String>,
    ) -> Result<Connection<C::Provider>, AllProvidersExhausted> {
        let mut attempts = Vec::new();

        for endpoint in self.registry.iter().filter(|endpoint| !skip.contains(endpoint.address())) {
            trace!(endpoint = %endpoint, "Opening endpoint");
            match self.open(endpoint).await {
                Ok(connection) => {
                    if !endpoint.is_primary() {
                        info!(endpoint = %endpoint, "Using fallback endpoint");
                    }
                    return Ok(connection);
                }
                Err(err) => attempts.push(err),
            }
        }

        error!(attempted = attempts.len(), skipped = skip.len(), "No live endpoint left");
        Err(AllProvidersExhausted { attempts })
    }

    /// Runs `descriptor` on `connection`, failing over to other endpoints on transient errors.
    ///
    /// On a transient failure the failed endpoint is skipped, the next live endpoint is
    /// acquired, the descriptor is rebound to it and the call is retried. Each endpoint is
    /// tried at most once, so a call is attempted at most `1 + fallbacks` times. Fatal errors
    /// are returned straight away, from the first attempt or any retry.
    ///
    /// # Errors
    ///
    /// * [`ExecuteError::Fatal`] if the call fails with a non-transient error.
    /// * [`ExecuteError::AllProvidersExhausted`] carrying the first attempt's error if no
    ///   endpoint completes the call.
    pub async fn execute<D>(
        &self,
        connection: &Connection<C::Provider>,
        descriptor: D,
    ) -> Result<D::Output, ExecuteError<D::Error>>
    where
        D: CallDescriptor<C::Provider>,
    {
        let original = match self.attempt(&descriptor).await {
            Ok(output) => return Ok(output),
            Err(CallFailure::Call(err)) if !err.is_transient() => {
                error!(
                    endpoint = %connection.endpoint(),
                    error = %err,
                    "Call failed with fatal error"
                );
                return Err(ExecuteError::Fatal(err));
            }
            Err(failure) => failure,
        };

        warn!(
            endpoint = %connection.endpoint(),
            error = %original,
            "Call failed with transient error, failing over"
        );

        let mut attempted = vec![connection.endpoint().clone()];
        let mut skip = HashSet::from([connection.endpoint().address().to_string()]);

        loop {
            let fallback = match self.acquire(&skip).await {
                Ok(fallback) => fallback,
                Err(exhausted) => {
                    error!(
                        error = %exhausted,
                        attempts = attempted.len(),
                        "All providers failed, returning the original error"
                    );
                    return Err(ExecuteError::AllProvidersExhausted { original, attempted });
                }
            };

            // endpoints ranked ahead of the acquired one just failed to open
            let acquired_rank = fallback.endpoint().rank();
            skip.extend(
                self.registry
                    .iter()
                    .take_while(|endpoint| endpoint.rank() <= acquired_rank)
                    .map(|endpoint| endpoint.address().to_string()),
            );
            attempted.push(fallback.endpoint().clone());

            let rebound = descriptor.rebind(&fallback);
            match self.attempt(&rebound).await {
                Ok(output) => {
                    info!(endpoint = %fallback.endpoint(), "Fallback endpoint succeeded");
                    return Ok(output);
                }
                Err(CallFailure::Call(err)) if !err.is_transient() => {
                    error!(
                        endpoint = %fallback.endpoint(),
                        error = %err,
                        "Fallback call failed with fatal error"
                    );
                    return Err(ExecuteError::Fatal(err));
                }
                Err(failure) => {
                    warn!(
                        endpoint = %fallback.endpoint(),
                        error = %failure,
                        "Fallback endpoint failed"
                    );
                }
            }
        }
    }

    /// Fetches the latest block number, failing over like [`execute`](Self::execute).
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn latest_block(
        &self,
        connection: &Connection<C::Provider>,
    ) -> Result<BlockNumber, ExecuteError<<C::Provider as ChainReader>::Error>>
    where
        C::Provider: ChainReader,
    {
        self.execute(connection, BlockNumberQuery::new(connection)).await
    }

    /// Runs a single call attempt bounded by the call timeout.
    async fn attempt<D>(&self, descriptor: &D) -> Result<D::Output, CallFailure<D::Error>>
    where
        D: CallDescriptor<C::Provider>,
    {
        match timeout(self.call_timeout, descriptor.call()).await {
            Ok(result) => result.map_err(CallFailure::Call),
            Err(_) => Err(CallFailure::Timeout(self.call_timeout)),
        }
    }
}
