pub mod flex_client;
pub mod flex_errors;
pub mod flex_model;
mod xml;

pub use flex_client::{FetchConfig, FlexQueryClient};
pub use flex_errors::FlexError;
pub use flex_model::{FlexStatement, PollOutcome, StatementSet};
