//! Academic standing for grade records: credit-weighted GPA, semester
//! breakdown, trend and risk classification, plus the sources and reports
//! the command-line tool builds on top of them.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod roster;
pub mod sources;
pub mod standing;

pub use config::StandingPolicy;
pub use error::ValidationError;
pub use models::{AnalyticsSummary, GradeRecord, RiskLevel, SemesterGpa, Trend};
