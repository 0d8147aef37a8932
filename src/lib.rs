//! Resilient-RPC keeps read-only EVM queries running when individual RPC providers misbehave.
//!
//! The crate has three layers, each built on the one before:
//!
//! - [`failover::FailoverProvider`] opens connections to a ranked list of endpoints, probing
//!   each for liveness and falling through to the next one when it is unreachable or stale.
//! - [`failover::FailoverProvider::execute`] runs any [`failover::CallDescriptor`] (contract
//!   calls, log queries, block number lookups). Transient failures such as rate limits,
//!   dropped connections, timeouts or lagging nodes move the call to the next live endpoint.
//!   Anything else is returned immediately.
//! - [`log_fetcher::ChunkedLogFetcher`] scans wide block ranges for one event in
//!   provider-safe windows, skipping and reporting windows no endpoint could serve.
//!
//! # Connection-bound handles
//!
//! A [`contract::ContractHandle`] is only an address and an interface description. It is bound
//! to a connection with [`contract::ContractHandle::bind`], and a call that fails over is
//! rebound to the new connection rather than reusing the old binding.
//!
//! # Ordering and duplicates
//!
//! Everything runs sequentially. Windows are fetched in ascending block order and records are
//! returned in that order. When a window is retried on another endpoint the nodes may disagree
//! near the chain tip, so duplicate or missing events around retry boundaries are possible.

#[macro_use]
mod logging;

pub mod contract;
pub mod failover;
pub mod log_fetcher;

mod error;

pub use contract::{BoundContract, ContractCall, ContractHandle, EventLookupError};
pub use error::ConfigError;
pub use failover::{
    AllProvidersExhausted, CallDescriptor, ChainReader, Classify, ConnectError, Connection,
    Connector, Endpoint, EndpointRegistry, ExecuteError, FailoverProvider,
    FailoverProviderBuilder, RpcConnector, Severity,
};
pub use log_fetcher::{
    ChunkedLogFetcher, ChunkedLogFetcherBuilder, DEFAULT_CHUNK_WIDTH, EventRecord, LogFetchReport,
};
