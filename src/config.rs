use chrono::{FixedOffset, Offset, Utc};

use crate::error::ConfigError;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// What to do with a row that fails to normalize.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum MalformedRowPolicy {
    /// The first malformed row fails the whole call.
    #[default]
    Abort,
    /// Malformed rows are dropped and reported.
    Skip,
}

#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    offset: FixedOffset,
    timestamp_format: String,
    policy: MalformedRowPolicy,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_owned(),
            policy: MalformedRowPolicy::default(),
        }
    }
}

impl NormalizerConfig {
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_offset_seconds(self, seconds: i32) -> Result<Self, ConfigError> {
        let offset =
            FixedOffset::east_opt(seconds).ok_or(ConfigError::InvalidOffset(seconds as i64))?;
        Ok(self.with_offset(offset))
    }

    pub fn with_offset_hours(self, hours: i32) -> Result<Self, ConfigError> {
        let seconds = hours as i64 * 3600;
        let seconds = i32::try_from(seconds).map_err(|_| ConfigError::InvalidOffset(seconds))?;
        self.with_offset_seconds(seconds)
    }

    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    pub fn with_policy(mut self, policy: MalformedRowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    pub fn policy(&self) -> MalformedRowPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::{MalformedRowPolicy, NormalizerConfig};
    use crate::error::ConfigError;

    #[test]
    fn unittest_default_config() {
        let config = NormalizerConfig::default();

        assert_eq!(config.offset().local_minus_utc(), 0);
        assert_eq!(config.policy(), MalformedRowPolicy::Abort);
    }

    #[test]
    fn unittest_offset_hours() -> eyre::Result<()> {
        let config = NormalizerConfig::default().with_offset_hours(-5)?;
        assert_eq!(config.offset().local_minus_utc(), -5 * 3600);

        let err = NormalizerConfig::default().with_offset_hours(30).unwrap_err();
        assert_eq!(err, ConfigError::InvalidOffset(30 * 3600));

        Ok(())
    }
}
