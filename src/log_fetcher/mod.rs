//! Chunked historical event log retrieval.
//!
//! Providers cap the block span of `eth_getLogs`, so wide scans are split into windows of at
//! most [`DEFAULT_CHUNK_WIDTH`] blocks and fetched one window at a time through a
//! [`FailoverProvider`](crate::failover::FailoverProvider). A window that cannot be fetched
//! from any endpoint is recorded as a gap instead of aborting the scan.
//!
//! # Examples
//!
//! ```rust,no_run
//! use alloy::{json_abi::JsonAbi, primitives::address};
//! use resilient_rpc::{
//!     contract::ContractHandle, failover::FailoverProviderBuilder, log_fetcher::ChunkedLogFetcher,
//! };
//!
//! # async fn example(abi: JsonAbi) -> anyhow::Result<()> {
//! let provider = FailoverProviderBuilder::new("https://mainnet.base.org")
//!     .fallback("https://base.llamarpc.com")
//!     .build()?;
//! let connection = provider.connect().await?;
//! let latest = provider.latest_block(&connection).await?;
//!
//! let minter = ContractHandle::new(address!("e89afdefebdba033f6e750615f0a0f1a37c78c4a"), abi);
//! let fetcher = ChunkedLogFetcher::builder().chunk_width(9_900).build()?;
//! let report =
//!     fetcher.fetch_logs(&provider, &connection, &minter, "XENBurned", 0..=latest).await;
//!
//! println!(
//!     "{} burns, {} skipped windows, {} dropped logs",
//!     report.records.len(),
//!     report.skipped_window_count(),
//!     report.dropped_records
//! );
//! # Ok(()) }
//! ```

mod builder;
mod fetcher;
mod record;
mod window_iterator;

use std::time::Duration;

pub use builder::ChunkedLogFetcherBuilder;
pub use fetcher::{ChunkedLogFetcher, LogFetchReport};
pub use record::{DecodeError, EventField, EventRecord};
pub use window_iterator::WindowIterator;

/// Default window width, in blocks. Stays under the common 10,000 block `eth_getLogs` cap.
pub const DEFAULT_CHUNK_WIDTH: u64 = 9_900;
/// Default pause between consecutive windows.
pub const DEFAULT_WINDOW_PAUSE: Duration = Duration::from_millis(250);
