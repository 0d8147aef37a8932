use std::{ops::RangeInclusive, time::Duration};

use alloy::{json_abi::Event, primitives::BlockNumber, rpc::types::Log};
use tokio::time::sleep;

use crate::{
    contract::ContractHandle,
    failover::{ChainReader, Connection, Connector, ExecuteError, FailoverProvider, LogQuery},
    log_fetcher::{ChunkedLogFetcherBuilder, EventRecord, WindowIterator},
};

/// Result of a chunked log scan.
///
/// Infrastructure failures never fail a scan as a whole: windows that could not be fetched
/// from any endpoint are listed in `skipped_windows` and undecodable logs are counted in
/// `dropped_records`. Anything pointing at a bad request ends the scan through `abandoned`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogFetchReport {
    /// Decoded records in ascending block order.
    pub records: Vec<EventRecord>,
    /// Windows whose query failed on every endpoint, in ascending order.
    pub skipped_windows: Vec<RangeInclusive<BlockNumber>>,
    /// Logs that were fetched but did not decode against the event description.
    pub dropped_records: usize,
    /// Set when the scan was abandoned. An abandoned scan carries no records.
    pub abandoned: Option<String>,
}

impl LogFetchReport {
    #[must_use]
    pub fn skipped_window_count(&self) -> usize {
        self.skipped_windows.len()
    }

    /// `true` if every window was fetched, every log decoded and the scan was not abandoned.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.abandoned.is_none() && self.skipped_windows.is_empty() && self.dropped_records == 0
    }

    /// Drops any records collected so far and marks the scan as abandoned.
    fn abandon(mut self, diagnostic: String) -> Self {
        error!(diagnostic = %diagnostic, "Abandoning log scan");
        self.records.clear();
        self.abandoned = Some(diagnostic);
        self
    }
}

/// Fetches historical event logs over wide block ranges in provider-safe windows.
///
/// Windows are fetched one at a time, oldest first, each through
/// [`FailoverProvider::execute`], so a window that fails transiently is retried on the
/// fallback endpoints before it is given up on.
#[derive(Clone, Debug)]
pub struct ChunkedLogFetcher {
    pub(crate) chunk_width: u64,
    pub(crate) window_pause: Duration,
}

impl Default for ChunkedLogFetcher {
    fn default() -> Self {
        Self { chunk_width: super::DEFAULT_CHUNK_WIDTH, window_pause: super::DEFAULT_WINDOW_PAUSE }
    }
}

impl ChunkedLogFetcher {
    #[must_use]
    pub fn builder() -> ChunkedLogFetcherBuilder {
        ChunkedLogFetcherBuilder::new()
    }

    #[must_use]
    pub fn chunk_width(&self) -> u64 {
        self.chunk_width
    }

    #[must_use]
    pub fn window_pause(&self) -> Duration {
        self.window_pause
    }

    /// The windows a scan of `range` queries, in order.
    #[must_use]
    pub fn windows(&self, range: RangeInclusive<BlockNumber>) -> WindowIterator {
        WindowIterator::new(*range.start(), *range.end(), self.chunk_width)
    }

    /// Fetches and decodes every `event_name` log emitted by `contract` in `range`.
    ///
    /// `event_name` is a bare event name or, for overloaded events, a full signature.
    ///
    /// Each window starts on `connection` and fails over through `provider` on transient
    /// errors. A window that exhausts every endpoint is skipped and recorded in the report,
    /// and the scan moves on to the next window.
    ///
    /// The scan is abandoned, with no records and a diagnostic in
    /// [`LogFetchReport::abandoned`], when the event cannot be resolved from the contract's
    /// interface, when it is anonymous, or when a window query fails with a fatal error.
    pub async fn fetch_logs<C>(
        &self,
        provider: &FailoverProvider<C>,
        connection: &Connection<C::Provider>,
        contract: &ContractHandle,
        event_name: &str,
        range: RangeInclusive<BlockNumber>,
    ) -> LogFetchReport
    where
        C: Connector,
        C::Provider: ChainReader,
    {
        let mut report = LogFetchReport::default();

        let event = match contract.event(event_name) {
            Ok(event) => event,
            Err(err) => return report.abandon(err.to_string()),
        };
        // anonymous events carry no signature topic, so a window query cannot select them
        if event.anonymous {
            return report.abandon(format!(
                "event `{event_name}` of {} is anonymous and cannot be filtered by signature",
                contract.address()
            ));
        }
        let event_signature = event.selector();

        let windows = self.windows(range);
        let total_windows = windows.total_windows();
        info!(
            event = event_name,
            contract = %contract.address(),
            total_windows = total_windows,
            "Starting chunked log scan"
        );

        for (index, window) in windows.enumerate() {
            if index > 0 && !self.window_pause.is_zero() {
                sleep(self.window_pause).await;
            }

            let query =
                LogQuery::new(connection, contract.address(), event_signature, window.clone());
            match provider.execute(connection, query).await {
                Ok(logs) => {
                    debug!(
                        from_block = *window.start(),
                        to_block = *window.end(),
                        log_count = logs.len(),
                        "Fetched window"
                    );
                    Self::decode_window(event, logs, &mut report);
                }
                Err(ExecuteError::Fatal(err)) => {
                    return report.abandon(format!(
                        "log query for blocks {}..={} failed: {err}",
                        window.start(),
                        window.end()
                    ));
                }
                Err(err @ ExecuteError::AllProvidersExhausted { .. }) => {
                    warn!(
                        from_block = *window.start(),
                        to_block = *window.end(),
                        error = %err,
                        "Skipping window"
                    );
                    report.skipped_windows.push(window);
                }
            }
        }

        if report.is_complete() {
            info!(record_count = report.records.len(), "Chunked log scan finished");
        } else {
            warn!(
                record_count = report.records.len(),
                skipped_windows = report.skipped_window_count(),
                dropped_records = report.dropped_records,
                "Chunked log scan finished with gaps"
            );
        }

        report
    }

    fn decode_window(event: &Event, logs: Vec<Log>, report: &mut LogFetchReport) {
        let mut decoded = Vec::with_capacity(logs.len());
        for log in &logs {
            match EventRecord::decode(event, log) {
                Ok(record) => decoded.push(record),
                Err(err) => {
                    warn!(
                        block_number = ?log.block_number,
                        log_index = ?log.log_index,
                        error = %err,
                        "Dropping undecodable log"
                    );
                    report.dropped_records += 1;
                }
            }
        }
        decoded.sort_by_key(|record| (record.block_number, record.log_index));
        report.records.extend(decoded);
    }
}
