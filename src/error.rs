use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
/// Enum for various errors raised while merging series chunks.
pub enum TsdbError {
    #[error("Invalid configuration. {0}")]
    InvalidConfiguration(String),

    #[error("Decoding error. {0}")]
    DecodingError(String),

    #[error("Invalid chunk. {0}")]
    InvalidChunk(String),

    #[error("{0}")]
    General(String),

    #[error("TSDB: error decoding chunk")]
    ChunkDecoding,
}

pub type TsdbResult<T = ()> = Result<T, TsdbError>;

impl From<&str> for TsdbError {
    fn from(s: &str) -> Self {
        TsdbError::General(s.to_string())
    }
}

impl From<String> for TsdbError {
    fn from(s: String) -> Self {
        TsdbError::General(s)
    }
}

impl From<serde_json::Error> for TsdbError {
    fn from(e: serde_json::Error) -> Self {
        TsdbError::InvalidConfiguration(e.to_string())
    }
}
