use thiserror::Error;

use crate::flex::FlexError;
use crate::stoploss::StopLossError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Flex query failed: {0}")]
    Flex(#[from] FlexError),

    #[error("Stop-loss operation failed: {0}")]
    StopLoss(#[from] StopLossError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration key: {0}")]
    MissingKey(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
