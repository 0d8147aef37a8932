use std::time::Duration;

use crate::{
    ConfigError,
    log_fetcher::{ChunkedLogFetcher, DEFAULT_CHUNK_WIDTH, DEFAULT_WINDOW_PAUSE},
};

/// Builder/configuration for [`ChunkedLogFetcher`].
#[derive(Clone, Debug)]
pub struct ChunkedLogFetcherBuilder {
    /// Width of each log query window, in blocks.
    pub chunk_width: u64,
    /// Pause inserted between consecutive windows.
    pub window_pause: Duration,
}

impl Default for ChunkedLogFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedLogFetcherBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self { chunk_width: DEFAULT_CHUNK_WIDTH, window_pause: DEFAULT_WINDOW_PAUSE }
    }

    /// Sets the window width in blocks.
    ///
    /// Keep this below the `eth_getLogs` range cap of the configured providers (commonly
    /// 10,000 blocks). Must be greater than 0.
    #[must_use]
    pub fn chunk_width(mut self, chunk_width: u64) -> Self {
        self.chunk_width = chunk_width;
        self
    }

    /// Sets the pause between windows, used to stay under per-second rate limits.
    #[must_use]
    pub fn window_pause(mut self, window_pause: Duration) -> Self {
        self.window_pause = window_pause;
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidChunkWidth`] if the chunk width is 0.
    pub fn build(self) -> Result<ChunkedLogFetcher, ConfigError> {
        if self.chunk_width == 0 {
            return Err(ConfigError::InvalidChunkWidth);
        }
        Ok(ChunkedLogFetcher { chunk_width: self.chunk_width, window_pause: self.window_pause })
    }
}
