use thiserror::Error;

/// Unified error type for the entire vc-dashboard-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// Empty inputs and unknown project names in a selection are NOT errors:
/// they produce empty (or partial) results instead.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input data ──────────────────────────────────────────────────
    #[error("Invalid investment data: {0}")]
    DataError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    // ── Dashboard state ─────────────────────────────────────────────
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Firm not found: {0}")]
    FirmNotFound(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    // ── Credential storage ──────────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed — wrong password or corrupted file")]
    Decryption,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // The CryptoRank key travels as a query parameter, so strip the query
        // from any URL reqwest embeds in its message.
        CoreError::Network(redact_query(&e.to_string()))
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}

/// Remove everything after the first `?` (the query string) from a message.
pub(crate) fn redact_query(msg: &str) -> String {
    match msg.find('?') {
        Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
        None => msg.to_string(),
    }
}
