use thiserror::Error;

#[derive(Error, Debug)]
pub enum StopLossError {
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Order placement failed for {symbol}: {message}")]
    OrderFailed { symbol: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
