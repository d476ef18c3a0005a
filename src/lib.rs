//! Core pipeline for Interactive Brokers Flex statements: fetch reports over
//! the Flex Query web service, normalize the semi-structured statements into
//! flat record tables, and compute China tax and performance summaries. A
//! trailing stop-loss monitor over a trading gateway seam rounds out the
//! toolkit.

pub mod constants;
pub mod errors;
pub mod flex;
pub mod fx;
pub mod parsers;
pub mod performance;
pub mod settings;
pub mod stoploss;
pub mod summary;
mod utils;

pub use errors::{Error, Result};
pub use parsers::*;
pub use performance::*;
pub use summary::*;
