use crate::error::{TsdbError, TsdbResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of samples decoded per batch when no explicit size is configured.
pub const BATCH_SIZE_DEFAULT: usize = 12;
pub const BATCH_SIZE_MIN: usize = 1;
pub const BATCH_SIZE_MAX: usize = 1024;

/// Construction-time settings for a merge iterator.
///
/// The merge strategy itself is chosen through the iterator's type parameter,
/// so nothing here can be flipped while a query is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Upper bound on the number of samples held by a single batch.
    pub batch_size: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE_DEFAULT,
        }
    }
}

impl MergeConfig {
    pub fn with_batch_size(batch_size: usize) -> TsdbResult<Self> {
        let config = Self { batch_size };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TsdbResult<()> {
        if !(BATCH_SIZE_MIN..=BATCH_SIZE_MAX).contains(&self.batch_size) {
            return Err(TsdbError::InvalidConfiguration(format!(
                "Invalid value ({}) for \"batch_size\". Must be in the range [{BATCH_SIZE_MIN}, {BATCH_SIZE_MAX}]",
                self.batch_size
            )));
        }
        Ok(())
    }

    /// Clamp a caller supplied size hint to what a batch can hold.
    #[inline]
    pub fn clamp_size(&self, size: usize) -> usize {
        size.clamp(BATCH_SIZE_MIN, self.batch_size)
    }
}

impl FromStr for MergeConfig {
    type Err = TsdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: MergeConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
