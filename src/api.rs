//! Client for the remote grade API.
//!
//! The auth token lives in an explicit [`Session`] handed to the client;
//! nothing here reads process-wide state.

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::config::ApiConfig;
use crate::models::GradeRecord;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("grade API returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("failed to decode grade API response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Clone)]
pub struct Session {
    pub base_url: String,
    pub token: String,
}

impl Session {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl From<ApiConfig> for Session {
    fn from(config: ApiConfig) -> Self {
        Session::new(config.base_url, config.token)
    }
}

pub struct GradeApiClient {
    client: Client,
    session: Session,
}

impl GradeApiClient {
    pub fn new(session: Session) -> Self {
        Self {
            client: Client::new(),
            session,
        }
    }

    /// Fetches every grade the API holds for one student.
    pub async fn fetch_student_grades(&self, student_id: &str) -> Result<Vec<GradeRecord>> {
        let url = self.session.endpoint("grades");
        tracing::debug!(%url, student_id, "fetching grades");

        let response = self
            .client
            .get(&url)
            .query(&[("studentId", student_id)])
            .bearer_auth(&self.session.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "grade API request failed");
            return Err(ApiError::Status { status, url });
        }

        let body = response.text().await?;
        decode_grades(&body)
    }
}

pub fn decode_grades(body: &str) -> Result<Vec<GradeRecord>> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let session = Session::new("https://grades.example.edu/api/", "token");
        assert_eq!(
            session.endpoint("/grades"),
            "https://grades.example.edu/api/grades"
        );
        let bare = Session::new("https://grades.example.edu/api", "token");
        assert_eq!(bare.endpoint("grades"), "https://grades.example.edu/api/grades");
    }

    #[test]
    fn decodes_grade_array() {
        let grades = decode_grades(
            r#"[{"grade":"B+","score":87,"creditHours":4,"semester":"Fall 2024","status":"published"}]"#,
        )
        .unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].effective_credit_hours(), 4);
        assert_eq!(grades[0].score, Some(87.0));
    }

    #[test]
    fn decodes_loose_records() {
        let grades = decode_grades(
            r#"[{"grade":"A","creditHours":3.0},{"grade":null,"status":"Pending"}]"#,
        )
        .unwrap();
        assert_eq!(grades.len(), 2);
        assert_eq!(grades[0].credit_hours, Some(3));
        assert_eq!(grades[1].grade, "");
        assert!(grades[1].is_pending());
    }

    #[test]
    fn decode_errors_are_typed() {
        let err = decode_grades("not json").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn session_from_config() {
        let session: Session = ApiConfig {
            base_url: "http://localhost:4000".to_string(),
            token: "abc".to_string(),
        }
        .into();
        assert_eq!(session.token, "abc");
        assert_eq!(session.endpoint("grades"), "http://localhost:4000/grades");
    }
}
