//! Endpoint failover and failover-aware call execution.
//!
//! This module exposes [`FailoverProvider`], which owns a ranked [`EndpointRegistry`] and a
//! [`Connector`] and provides:
//! * [`FailoverProvider::open`]: connect to one endpoint and probe it for liveness
//! * [`FailoverProvider::acquire`]: walk the registry in rank order until an endpoint opens
//! * [`FailoverProvider::execute`]: run a [`CallDescriptor`], and on a transient failure replay
//!   it on the next live endpoint after rebinding it to that connection
//!
//! # How it works
//!
//! Errors are split by [`Classify`] into [`Severity::Transient`] (rate limits, dropped
//! connections, timeouts, lagging nodes) and [`Severity::Fatal`] (everything else). Fatal
//! errors are returned immediately. Transient errors trigger a failover: the failed endpoint is
//! skipped, the next live one is acquired and the call is retried there. Every endpoint gets at
//! most one attempt per call. If they all fail, the error from the *first* attempt is returned
//! inside [`ExecuteError::AllProvidersExhausted`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use resilient_rpc::failover::FailoverProviderBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = FailoverProviderBuilder::new("https://mainnet.base.org")
//!     .fallback("https://base.llamarpc.com")
//!     .fallback("https://base-rpc.publicnode.com")
//!     .call_timeout(Duration::from_secs(30))
//!     .build()?;
//!
//! let connection = provider.connect().await?;
//! let latest = provider.latest_block(&connection).await?;
//! println!("Latest block on {}: {latest}", connection.endpoint());
//! # Ok(()) }
//! ```

pub mod builder;
pub mod call;
pub mod classify;
pub mod connector;
pub mod endpoint;
pub mod error;
pub mod provider;

pub use builder::*;
pub use call::{BlockNumberQuery, CallDescriptor, LogQuery};
pub use classify::{Classify, Severity, TRANSIENT_INDICATORS, classify_message};
pub use connector::{ChainReader, Connection, Connector, RpcConnector};
pub use endpoint::{Endpoint, EndpointRegistry};
pub use error::{AllProvidersExhausted, CallFailure, ConnectError, ExecuteError};
pub use provider::FailoverProvider;
