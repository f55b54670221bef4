use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Credit hours assumed when a record carries none (or a non-positive value).
pub const DEFAULT_CREDIT_HOURS: u64 = 3;

/// Bucket label used for records without a semester.
pub const UNKNOWN_SEMESTER: &str = "Unknown";

/// Publication state. Anything other than "pending" (any case, padded or
/// not) reads as published, whichever source the record came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum GradeStatus {
    Pending,
    #[default]
    Published,
}

impl GradeStatus {
    pub fn from_label(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("pending") => GradeStatus::Pending,
            _ => GradeStatus::Published,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GradeStatus::Pending => "pending",
            GradeStatus::Published => "published",
        }
    }
}

impl From<Option<String>> for GradeStatus {
    fn from(value: Option<String>) -> Self {
        GradeStatus::from_label(value.as_deref())
    }
}

/// A null or missing grade reads as an empty (unknown) grade.
fn nullable_grade<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CreditHoursRepr {
    Integer(i64),
    Float(f64),
}

/// Accepts `3` as well as `3.0`; fractional credit hours are rejected.
pub(crate) fn credit_hours<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<CreditHoursRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(CreditHoursRepr::Integer(value)) => Ok(Some(value)),
        Some(CreditHoursRepr::Float(value))
            if value.is_finite()
                && value.fract() == 0.0
                && value >= i64::MIN as f64
                && value < i64::MAX as f64 =>
        {
            Ok(Some(value as i64))
        }
        Some(CreditHoursRepr::Float(value)) => Err(serde::de::Error::custom(format!(
            "credit hours must be a whole number, got {value}"
        ))),
    }
}

/// One evaluated course enrollment outcome as delivered by the grade API.
///
/// Every field is optional on the wire. Defaults are applied by the accessor
/// methods, never by mutating the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    #[serde(default, deserialize_with = "nullable_grade")]
    pub grade: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, alias = "credit_hours", deserialize_with = "credit_hours")]
    pub credit_hours: Option<i64>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub status: GradeStatus,
    #[serde(default)]
    pub course: Option<String>,
}

impl GradeRecord {
    pub fn new(grade: impl Into<String>) -> Self {
        Self {
            grade: grade.into(),
            ..Self::default()
        }
    }

    pub fn with_credits(mut self, credit_hours: i64) -> Self {
        self.credit_hours = Some(credit_hours);
        self
    }

    pub fn with_semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = Some(semester.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_status(mut self, status: GradeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    /// Credit hours used as the GPA weight: the recorded value when positive,
    /// otherwise [`DEFAULT_CREDIT_HOURS`].
    pub fn effective_credit_hours(&self) -> u64 {
        match self.credit_hours {
            Some(hours) if hours > 0 => hours.unsigned_abs(),
            _ => DEFAULT_CREDIT_HOURS,
        }
    }

    pub fn effective_score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    pub fn semester_label(&self) -> &str {
        self.semester.as_deref().unwrap_or(UNKNOWN_SEMESTER)
    }

    pub fn is_pending(&self) -> bool {
        self.status == GradeStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterGpa {
    pub semester: String,
    pub gpa: f64,
    pub course_count: usize,
}

/// Course counts per letter bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeDistribution {
    #[serde(rename = "A")]
    pub a: usize,
    #[serde(rename = "B")]
    pub b: usize,
    #[serde(rename = "C")]
    pub c: usize,
    #[serde(rename = "D")]
    pub d: usize,
    #[serde(rename = "F")]
    pub f: usize,
}

impl GradeDistribution {
    pub fn total(&self) -> usize {
        self.a + self.b + self.c + self.d + self.f
    }

    pub fn buckets(&self) -> [(&'static str, usize); 5] {
        [
            ("A", self.a),
            ("B", self.b),
            ("C", self.c),
            ("D", self.d),
            ("F", self.f),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        }
    }
}

/// Ordered so that `High` sorts greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub failing_courses_count: usize,
    pub low_grades_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Green,
    Blue,
    Orange,
    Red,
    DarkRed,
}

impl ColorToken {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorToken::Green => "green",
            ColorToken::Blue => "blue",
            ColorToken::Orange => "orange",
            ColorToken::Red => "red",
            ColorToken::DarkRed => "darkred",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(rename = "overallGPA")]
    pub overall_gpa: f64,
    pub total_courses: usize,
    pub total_credits: u64,
    pub average_score: f64,
    pub grade_distribution: GradeDistribution,
    #[serde(rename = "semesterGPAs")]
    pub semester_gpas: Vec<SemesterGpa>,
    pub trend: Trend,
    pub risk_level: RiskLevel,
    pub failing_courses_count: usize,
    pub low_grades_count: usize,
}

/// A grade record tagged with the student it belongs to.
#[derive(Debug, Clone)]
pub struct StudentGrade {
    pub student_id: Uuid,
    pub student_name: String,
    pub student_email: String,
    pub cohort: String,
    pub record: GradeRecord,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStanding {
    pub student_id: Uuid,
    pub student_name: String,
    pub student_email: String,
    pub cohort: String,
    pub summary: AnalyticsSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_documented_defaults() {
        let record: GradeRecord = serde_json::from_str(r#"{"grade":"B"}"#).unwrap();
        assert_eq!(record.effective_credit_hours(), 3);
        assert_eq!(record.effective_score(), 0.0);
        assert_eq!(record.semester_label(), "Unknown");
        assert_eq!(record.status, GradeStatus::Published);
    }

    #[test]
    fn null_grade_reads_as_unknown() {
        let record: GradeRecord =
            serde_json::from_str(r#"{"grade":null,"status":"pending"}"#).unwrap();
        assert_eq!(record.grade, "");
        assert!(record.is_pending());

        let record: GradeRecord = serde_json::from_str(r#"{"creditHours":4}"#).unwrap();
        assert_eq!(record.grade, "");
    }

    #[test]
    fn whole_float_credit_hours_are_accepted() {
        let record: GradeRecord =
            serde_json::from_str(r#"{"grade":"A","creditHours":4.0}"#).unwrap();
        assert_eq!(record.credit_hours, Some(4));

        let record: GradeRecord =
            serde_json::from_str(r#"{"grade":"A","creditHours":null}"#).unwrap();
        assert_eq!(record.effective_credit_hours(), 3);

        assert!(serde_json::from_str::<GradeRecord>(r#"{"grade":"A","creditHours":2.5}"#).is_err());
    }

    #[test]
    fn large_credit_hours_are_not_clamped() {
        let hours = i64::from(u32::MAX) + 10;
        assert_eq!(
            GradeRecord::new("A").with_credits(hours).effective_credit_hours(),
            u64::from(u32::MAX) + 10
        );
    }

    #[test]
    fn non_positive_credit_hours_fall_back_to_three() {
        assert_eq!(GradeRecord::new("A").with_credits(0).effective_credit_hours(), 3);
        assert_eq!(GradeRecord::new("A").with_credits(-2).effective_credit_hours(), 3);
        assert_eq!(GradeRecord::new("A").with_credits(4).effective_credit_hours(), 4);
    }

    #[test]
    fn parses_api_shape() {
        let record: GradeRecord = serde_json::from_str(
            r#"{"grade":"A-","score":91.5,"creditHours":4,"semester":"Fall 2024","status":"pending","course":"MATH 201"}"#,
        )
        .unwrap();
        assert_eq!(record.grade, "A-");
        assert_eq!(record.score, Some(91.5));
        assert_eq!(record.credit_hours, Some(4));
        assert_eq!(record.semester.as_deref(), Some("Fall 2024"));
        assert!(record.is_pending());
        assert_eq!(record.course.as_deref(), Some("MATH 201"));
    }

    #[test]
    fn approved_status_reads_as_published() {
        let record: GradeRecord =
            serde_json::from_str(r#"{"grade":"C","status":"approved"}"#).unwrap();
        assert_eq!(record.status, GradeStatus::Published);
    }

    #[test]
    fn summary_serializes_with_dashboard_keys() {
        let summary = AnalyticsSummary {
            overall_gpa: 3.0,
            total_courses: 1,
            total_credits: 3,
            average_score: 85.0,
            grade_distribution: GradeDistribution {
                b: 1,
                ..GradeDistribution::default()
            },
            semester_gpas: vec![SemesterGpa {
                semester: "Fall 2024".to_string(),
                gpa: 3.0,
                course_count: 1,
            }],
            trend: Trend::Stable,
            risk_level: RiskLevel::Low,
            failing_courses_count: 0,
            low_grades_count: 0,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["overallGPA"], 3.0);
        assert_eq!(value["gradeDistribution"]["B"], 1);
        assert_eq!(value["semesterGPAs"][0]["courseCount"], 1);
        assert_eq!(value["riskLevel"], "low");
    }
}
