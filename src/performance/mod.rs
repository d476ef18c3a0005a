pub mod performance_model;
pub mod performance_service;

pub use performance_model::{PerformanceReport, PerformanceSummary, PositionDetails};
pub use performance_service::calculate_performance;
