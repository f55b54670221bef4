use thiserror::Error;

/// Input the strict calculator refuses to tolerate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("record {index}: credit hours must not be negative (got {value})")]
    NegativeCreditHours { index: usize, value: i64 },

    #[error("record {index}: score is not a finite number")]
    NonFiniteScore { index: usize },

    #[error("record {index}: score {value} is outside 0-100")]
    ScoreOutOfRange { index: usize, value: f64 },
}
