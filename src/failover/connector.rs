use std::{fmt::Display, marker::PhantomData, time::Duration};

use alloy::{
    network::{Ethereum, Network},
    primitives::{Address, B256, BlockNumber},
    providers::{Provider, RootProvider},
    rpc::types::{Filter, Log},
    transports::{RpcError, TransportErrorKind},
};
use tokio::time::timeout;

use crate::failover::{Classify, ConnectError, Endpoint};

/// Opens transports to endpoint addresses and checks that they are live.
///
/// Implement this to plug a custom transport (or a mock) into
/// [`FailoverProvider`](crate::failover::FailoverProvider).
pub trait Connector: Send + Sync {
    /// The client handle produced by a successful connection.
    type Provider: Clone + Send + Sync;
    type Error: Display;

    /// Establishes a transport to `address`. Must not retry internally.
    fn connect(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Self::Provider, Self::Error>> + Send;

    /// Runs a lightweight call any healthy, in-sync node answers. Returns `false` when the
    /// node does not.
    fn probe(&self, provider: &Self::Provider) -> impl Future<Output = bool> + Send;
}

/// Read access to chain data needed by the log fetcher and the liveness probe.
pub trait ChainReader: Clone + Send + Sync {
    type Error: Classify + Display + Send;

    fn block_number(&self) -> impl Future<Output = Result<BlockNumber, Self::Error>> + Send;

    /// Fetches raw logs emitted by `address` with `event_signature` as first topic, in the
    /// inclusive block range `from_block..=to_block`.
    fn query_logs(
        &self,
        address: Address,
        event_signature: B256,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> impl Future<Output = Result<Vec<Log>, Self::Error>> + Send;
}

/// A live, probed provider bound to exactly one [`Endpoint`].
#[derive(Clone, Debug)]
pub struct Connection<P> {
    endpoint: Endpoint,
    provider: P,
}

impl<P> Connection<P> {
    /// Wraps an already probed `provider` opened against `endpoint`.
    #[must_use]
    pub fn new(endpoint: Endpoint, provider: P) -> Self {
        Self { endpoint, provider }
    }

    /// The endpoint this connection was opened against.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The client handle. Anything built from it is bound to this connection.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// Connects to `endpoint` and probes it, each step bounded by `probe_timeout`.
///
/// # Errors
///
/// * [`ConnectError::Unreachable`] if the transport cannot be established in time.
/// * [`ConnectError::NotLive`] if the liveness probe fails or times out.
pub async fn open<C: Connector>(
    connector: &C,
    endpoint: &Endpoint,
    probe_timeout: Duration,
) -> Result<Connection<C::Provider>, ConnectError> {
    let provider = match timeout(probe_timeout, connector.connect(endpoint.address())).await {
        Ok(Ok(provider)) => provider,
        Ok(Err(err)) => {
            return Err(ConnectError::Unreachable {
                endpoint: endpoint.clone(),
                reason: err.to_string(),
            });
        }
        Err(_) => {
            return Err(ConnectError::Unreachable {
                endpoint: endpoint.clone(),
                reason: format!("connection not established within {probe_timeout:?}"),
            });
        }
    };

    match timeout(probe_timeout, connector.probe(&provider)).await {
        Ok(true) => Ok(Connection::new(endpoint.clone(), provider)),
        Ok(false) => Err(ConnectError::NotLive {
            endpoint: endpoint.clone(),
            reason: "liveness probe failed".to_string(),
        }),
        Err(_) => Err(ConnectError::NotLive {
            endpoint: endpoint.clone(),
            reason: format!("liveness probe timed out after {probe_timeout:?}"),
        }),
    }
}

/// [`Connector`] backed by Alloy's [`RootProvider`].
///
/// The transport (HTTP, WebSocket or IPC) is picked from the address scheme. The liveness
/// probe is `eth_blockNumber`.
#[derive(Debug)]
pub struct RpcConnector<N: Network = Ethereum> {
    _network: PhantomData<fn() -> N>,
}

impl<N: Network> RpcConnector<N> {
    #[must_use]
    pub fn new() -> Self {
        Self { _network: PhantomData }
    }
}

impl<N: Network> Default for RpcConnector<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Network> Clone for RpcConnector<N> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<N: Network> Connector for RpcConnector<N> {
    type Provider = RootProvider<N>;
    type Error = RpcError<TransportErrorKind>;

    async fn connect(&self, address: &str) -> Result<RootProvider<N>, Self::Error> {
        RootProvider::connect(address).await
    }

    async fn probe(&self, provider: &RootProvider<N>) -> bool {
        match provider.get_block_number().await {
            Ok(block_number) => {
                trace!(block_number = block_number, "Liveness probe succeeded");
                true
            }
            Err(err) => {
                debug!(error = %err, "Liveness probe failed");
                false
            }
        }
    }
}

impl<N: Network> ChainReader for RootProvider<N> {
    type Error = RpcError<TransportErrorKind>;

    async fn block_number(&self) -> Result<BlockNumber, Self::Error> {
        self.get_block_number().await
    }

    async fn query_logs(
        &self,
        address: Address,
        event_signature: B256,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<Log>, Self::Error> {
        let filter = Filter::new()
            .address(address)
            .event_signature(event_signature)
            .from_block(from_block)
            .to_block(to_block);
        self.get_logs(&filter).await
    }
}
