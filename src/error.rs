use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    /// No JSON-shaped substring could be recovered from the oracle response.
    #[error("No JSON object found in oracle response: {snippet}")]
    ParseFailure { snippet: String },

    /// A field was present but semantically invalid, e.g. an unrecognized
    /// direction token. Fatal to the single generation attempt.
    #[error("Invalid value for field '{field}': {detail}")]
    SchemaViolation { field: String, detail: String },

    #[error("Reasoning oracle call failed: {0}")]
    OracleCall(String),

    #[error("Account balances have not been computed for this period")]
    MissingBalances,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, JournalError>;
