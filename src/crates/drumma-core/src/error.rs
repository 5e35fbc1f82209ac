use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Rejected converter configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value} for {option}: not in range {min}-{max}")]
    OutOfRange {
        option: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl ConfigError {
    pub fn out_of_range(option: &'static str, value: impl Into<i64>, min: i64, max: i64) -> Self {
        ConfigError::OutOfRange {
            option,
            value: value.into(),
            min,
            max,
        }
    }

    /// Name of the offending option
    pub fn option(&self) -> &'static str {
        match self {
            ConfigError::OutOfRange { option, .. } => option,
        }
    }
}
