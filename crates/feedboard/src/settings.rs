//! Compiled-in configuration.

use crate::source::SourceId;
use std::collections::HashSet;

/// Channels watched on startup, in display order.
pub const CHANNELS: [&str; 5] = ["kingsleague", "riversgg", "thegrefg", "elspreen", "aroyitt"];

/// Messages kept per channel.
pub const BUFFER_CAPACITY: usize = 10;

/// Bound of the queue between feeds/terminal and the interaction loop.
pub const INTAKE_CAPACITY: usize = 100;

/// Environment variable naming a file to write logs to. Unset: no logging.
pub const LOG_FILE_ENV: &str = "FEEDBOARD_LOG";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("no channels configured")]
    NoSources,
    #[error("channel `{0}` is listed twice")]
    DuplicateSource(SourceId),
    #[error("channel name must not be empty")]
    EmptySource,
    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,
}

/// Startup settings of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub sources: Vec<SourceId>,
    pub buffer_capacity: usize,
    pub intake_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sources: CHANNELS.iter().map(|c| SourceId::from(*c)).collect(),
            buffer_capacity: BUFFER_CAPACITY,
            intake_capacity: INTAKE_CAPACITY,
        }
    }
}

impl Settings {
    /// Reject settings the dashboard cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.sources.is_empty() {
            return Err(SettingsError::NoSources);
        }
        if self.buffer_capacity == 0 {
            return Err(SettingsError::ZeroCapacity);
        }
        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.as_str().trim().is_empty() {
                return Err(SettingsError::EmptySource);
            }
            if !seen.insert(source) {
                return Err(SettingsError::DuplicateSource(source.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.validate(), Ok(()));
        assert_eq!(settings.sources.len(), CHANNELS.len());
        assert_eq!(settings.buffer_capacity, 10);
    }

    #[test]
    fn rejects_bad_settings() {
        let mut s = Settings::default();
        s.sources.clear();
        assert_eq!(s.validate(), Err(SettingsError::NoSources));

        let mut s = Settings::default();
        s.buffer_capacity = 0;
        assert_eq!(s.validate(), Err(SettingsError::ZeroCapacity));

        let mut s = Settings::default();
        s.sources.push(SourceId::from("riversgg"));
        assert_eq!(
            s.validate(),
            Err(SettingsError::DuplicateSource(SourceId::from("riversgg")))
        );

        let mut s = Settings::default();
        s.sources.push(SourceId::from(" "));
        assert_eq!(s.validate(), Err(SettingsError::EmptySource));
    }
}
