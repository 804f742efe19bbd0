use thiserror::Error;

/// Unified error type for the entire portfolio-ledger-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input validation ────────────────────────────────────────────
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field '{field}' is not a number: '{value}'")]
    NotANumber { field: String, value: String },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    // ── Ledger ──────────────────────────────────────────────────────
    #[error("Index {index} is out of range for a list of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Quotes / Network ────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No quote provider available for {0}")]
    NoProvider(String),

    #[error("Quote not available for {0}")]
    QuoteNotAvailable(String),
}

impl CoreError {
    /// `true` for errors caused by rejected user input (shown next to a form field).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::MissingField(_)
                | CoreError::NotANumber { .. }
                | CoreError::InvalidAmount(_)
                | CoreError::InvalidDate(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Quote endpoints carry the API token in the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
