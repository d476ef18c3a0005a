use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlexError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("XML parsing error: {0}")]
    Xml(String),

    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Retrieval failed: {0}")]
    RetrievalFailed(String),

    #[error("Failed to retrieve report after {0} attempts")]
    RetriesExhausted(u32),

    #[error("Report retrieval timeout after {0} attempts")]
    Timeout(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
