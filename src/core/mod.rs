//! Core screening and scorecard logic

pub mod config;
pub mod journal;
pub mod log;
pub mod pacing;
pub mod period;
pub mod records;
pub mod scorecard;
pub mod scoring;
pub mod structuring;

// Re-export main types for cleaner imports
pub use scorecard::{ScorecardReport, build_report};
pub use structuring::{DealAnalysis, DealFinancialInputs, analyze};
