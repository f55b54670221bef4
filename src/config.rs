use serde::{Deserialize, Serialize};

/// GPA below which a student without low grades is still flagged `medium`.
pub const DEFAULT_MEDIUM_GPA_THRESHOLD: f64 = 2.5;

/// Knobs for the places where dashboards historically disagreed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandingPolicy {
    /// Count grades that are not yet published.
    pub include_pending_grades: bool,
    /// Minimum semester-over-semester GPA change that counts as a trend.
    pub trend_tolerance: f64,
    pub medium_gpa_threshold: f64,
}

impl Default for StandingPolicy {
    fn default() -> Self {
        Self {
            include_pending_grades: false,
            trend_tolerance: 0.0,
            medium_gpa_threshold: DEFAULT_MEDIUM_GPA_THRESHOLD,
        }
    }
}

/// Connection settings for the remote grade API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: String,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        use anyhow::Context;

        let base_url = std::env::var("GRADEBOOK_API_URL")
            .context("GRADEBOOK_API_URL must be set to the grade API base URL")?;
        let token = std::env::var("GRADEBOOK_API_TOKEN")
            .context("GRADEBOOK_API_TOKEN must be set to a valid auth token")?;
        Ok(Self { base_url, token })
    }
}
