use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::models::{GradeRecord, GradeStatus};

/// One CSV row. Blank cells read as missing values.
#[derive(Debug, Deserialize)]
pub struct CsvGradeRow {
    pub grade: String,
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "crate::models::credit_hours")]
    pub credit_hours: Option<i64>,
    pub semester: Option<String>,
    pub status: Option<String>,
    pub course: Option<String>,
}

impl From<CsvGradeRow> for GradeRecord {
    fn from(row: CsvGradeRow) -> Self {
        GradeRecord {
            grade: row.grade,
            score: row.score,
            credit_hours: row.credit_hours,
            semester: row.semester.filter(|s| !s.is_empty()),
            status: GradeStatus::from_label(row.status.as_deref()),
            course: row.course.filter(|s| !s.is_empty()),
        }
    }
}

pub fn parse_json_grades(body: &str) -> anyhow::Result<Vec<GradeRecord>> {
    serde_json::from_str(body).context("expected a JSON array of grade records")
}

pub fn read_csv_grades<R: Read>(reader: R) -> anyhow::Result<Vec<GradeRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (line, result) in reader.deserialize::<CsvGradeRow>().enumerate() {
        let row = result.with_context(|| format!("invalid grade row {}", line + 1))?;
        records.push(row.into());
    }

    Ok(records)
}

/// Loads grade records from a `.json` or `.csv` file.
pub fn load_grade_file(path: &Path) -> anyhow::Result<Vec<GradeRecord>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let records = match extension.as_deref() {
        Some("json") => {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_json_grades(&body)?
        }
        Some("csv") => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            read_csv_grades(file)?
        }
        _ => bail!(
            "unsupported grade file {}: expected .json or .csv",
            path.display()
        ),
    };

    tracing::debug!(path = %path.display(), count = records.len(), "loaded grade file");
    Ok(records)
}
