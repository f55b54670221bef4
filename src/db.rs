use anyhow::Context;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{GradeRecord, GradeStatus, StudentGrade};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn upsert_student(
    pool: &PgPool,
    full_name: &str,
    email: &str,
    cohort: &str,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO gradebook.students (id, full_name, email, cohort)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name, cohort = EXCLUDED.cohort
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(full_name)
    .bind(email)
    .bind(cohort)
    .fetch_one(pool)
    .await?
    .get("id");
    Ok(id)
}

/// Inserts one grade; returns false when `source_key` was already loaded.
async fn insert_grade(
    pool: &PgPool,
    student_id: Uuid,
    record: &GradeRecord,
    recorded_on: NaiveDate,
    source_key: &str,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO gradebook.grades
        (id, student_id, course, grade, score, credit_hours, semester, status, recorded_on, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(record.course.as_deref())
    .bind(&record.grade)
    .bind(record.score)
    .bind(record.credit_hours)
    .bind(record.semester.as_deref())
    .bind(record.status.as_str())
    .bind(recorded_on)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let students = vec![
        ("Avery Lee", "avery.lee@example.edu", "2026"),
        ("Jules Moreno", "jules.moreno@example.edu", "2025"),
        ("Kiara Patel", "kiara.patel@example.edu", "2026"),
    ];

    let mut ids = Vec::new();
    for (name, email, cohort) in students {
        ids.push((email, upsert_student(pool, name, email, cohort).await?));
    }

    let fall = NaiveDate::from_ymd_opt(2024, 12, 15).context("invalid date")?;
    let spring = NaiveDate::from_ymd_opt(2025, 5, 10).context("invalid date")?;

    let grades = vec![
        ("seed-001", 0, "MATH 201", "A", 94.0, 4, "Fall 2024", GradeStatus::Published, fall),
        ("seed-002", 0, "HIST 110", "B+", 88.0, 3, "Fall 2024", GradeStatus::Published, fall),
        ("seed-003", 0, "CHEM 120", "A-", 91.0, 4, "Spring 2025", GradeStatus::Published, spring),
        ("seed-004", 1, "ENGL 101", "C", 73.0, 3, "Fall 2024", GradeStatus::Published, fall),
        ("seed-005", 1, "MATH 120", "C-", 70.0, 3, "Spring 2025", GradeStatus::Published, spring),
        ("seed-006", 2, "BIO 110", "B", 84.0, 4, "Fall 2024", GradeStatus::Published, fall),
        ("seed-007", 2, "PHYS 150", "F", 48.0, 4, "Spring 2025", GradeStatus::Published, spring),
        ("seed-008", 2, "ECON 101", "B-", 80.0, 3, "Spring 2025", GradeStatus::Pending, spring),
    ];

    for (source_key, student, course, grade, score, credits, semester, status, recorded_on) in grades
    {
        let (_, student_id) = ids[student];
        let record = GradeRecord::new(grade)
            .with_course(course)
            .with_score(score)
            .with_credits(credits)
            .with_semester(semester)
            .with_status(status);
        insert_grade(pool, student_id, &record, recorded_on, source_key).await?;
    }

    Ok(())
}

fn grade_from_row(row: &PgRow) -> GradeRecord {
    let status: String = row.get("status");
    GradeRecord {
        grade: row.get("grade"),
        score: row.get("score"),
        credit_hours: row.get("credit_hours"),
        semester: row.get("semester"),
        status: GradeStatus::from_label(Some(&status)),
        course: row.get("course"),
    }
}

const GRADE_COLUMNS: &str = "sc.id as student_id, sc.full_name, sc.email, sc.cohort, \
     g.course, g.grade, g.score, g.credit_hours, g.semester, g.status";

/// Grades for one student in recording order, so semester buckets come out
/// in the order they were taken.
pub async fn fetch_student_grades(pool: &PgPool, email: &str) -> anyhow::Result<Vec<GradeRecord>> {
    let query = format!(
        "SELECT {GRADE_COLUMNS} \
         FROM gradebook.grades g \
         JOIN gradebook.students sc ON sc.id = g.student_id \
         WHERE sc.email = $1 \
         ORDER BY g.recorded_on, g.created_at"
    );

    let rows = sqlx::query(&query).bind(email).fetch_all(pool).await?;
    Ok(rows.iter().map(grade_from_row).collect())
}

pub async fn fetch_student_name(pool: &PgPool, email: &str) -> anyhow::Result<Option<String>> {
    let row = sqlx::query("SELECT full_name FROM gradebook.students WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.get("full_name")))
}

pub async fn fetch_cohort_grades(
    pool: &PgPool,
    cohort: Option<&str>,
) -> anyhow::Result<Vec<StudentGrade>> {
    let mut query = format!(
        "SELECT {GRADE_COLUMNS} \
         FROM gradebook.grades g \
         JOIN gradebook.students sc ON sc.id = g.student_id"
    );

    if cohort.is_some() {
        query.push_str(" WHERE sc.cohort = $1");
    }
    query.push_str(" ORDER BY g.recorded_on, g.created_at");

    let mut rows = sqlx::query(&query);
    if let Some(value) = cohort {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut grades = Vec::with_capacity(records.len());

    for row in records {
        grades.push(StudentGrade {
            student_id: row.get("student_id"),
            student_name: row.get("full_name"),
            student_email: row.get("email"),
            cohort: row.get("cohort"),
            record: grade_from_row(&row),
        });
    }

    Ok(grades)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        cohort: String,
        course: Option<String>,
        grade: String,
        score: Option<f64>,
        #[serde(default, deserialize_with = "crate::models::credit_hours")]
        credit_hours: Option<i64>,
        semester: Option<String>,
        status: Option<String>,
        recorded_on: NaiveDate,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let student_id = upsert_student(pool, &row.full_name, &row.email, &row.cohort).await?;

        let record = GradeRecord {
            grade: row.grade,
            score: row.score,
            credit_hours: row.credit_hours,
            semester: row.semester.filter(|s| !s.is_empty()),
            status: GradeStatus::from_label(row.status.as_deref()),
            course: row.course.filter(|s| !s.is_empty()),
        };
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        if insert_grade(pool, student_id, &record, row.recorded_on, &source_key).await? {
            inserted += 1;
        } else {
            tracing::debug!(%source_key, "grade already imported");
        }
    }

    Ok(inserted)
}
