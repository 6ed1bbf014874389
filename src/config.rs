//! Split configuration passed explicitly to the chunk writer.

use crate::error::{Result, SplitError};

/// Default chunk budget in megabytes.
pub const DEFAULT_MAX_SIZE_MB: u64 = 80;

/// Bytes in one megabyte as used for the budget (`1024 * 1024`).
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Settings for a single split run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    /// Maximum byte size of an output file (oversized single lines excepted).
    pub max_chunk_bytes: u64,
    /// Draws a byte progress bar over the input while streaming.
    pub show_progress: bool,
}

impl SplitConfig {
    /// Returns a builder initialised with [`SplitConfig::default`].
    #[must_use]
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder::default()
    }

    /// Builds a validated configuration from a megabyte budget.
    pub fn from_megabytes(max_size_mb: u64) -> Result<Self> {
        Self::builder().max_size_mb(max_size_mb).build()
    }

    /// Checks the budget is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_bytes == 0 {
            return Err(SplitError::InvalidConfig(
                "max chunk size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: DEFAULT_MAX_SIZE_MB * BYTES_PER_MB,
            show_progress: false,
        }
    }
}

/// Builder for [`SplitConfig`].
#[derive(Debug, Default, Clone)]
pub struct SplitConfigBuilder {
    cfg: SplitConfig,
    overflow_mb: Option<u64>,
}

impl SplitConfigBuilder {
    /// Creates a builder with [`SplitConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the budget in megabytes (`mb * 1_048_576` bytes).
    #[must_use]
    pub fn max_size_mb(mut self, mb: u64) -> Self {
        match mb.checked_mul(BYTES_PER_MB) {
            Some(bytes) => {
                self.cfg.max_chunk_bytes = bytes;
                self.overflow_mb = None;
            }
            None => self.overflow_mb = Some(mb),
        }
        self
    }

    /// Sets the budget directly in bytes.
    #[must_use]
    pub fn max_chunk_bytes(mut self, bytes: u64) -> Self {
        self.cfg.max_chunk_bytes = bytes;
        self.overflow_mb = None;
        self
    }

    /// Enables or disables the progress bar.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`SplitConfig`].
    pub fn build(self) -> Result<SplitConfig> {
        if let Some(mb) = self.overflow_mb {
            return Err(SplitError::InvalidConfig(format!(
                "max size of {mb} MB does not fit in a 64-bit byte count"
            )));
        }
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}
