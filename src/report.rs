use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{AnalyticsSummary, GradeRecord, StudentStanding};
use crate::standing;

/// Records worth calling out to an advisor: failing or low-but-passing.
pub fn courses_needing_attention(records: &[GradeRecord]) -> Vec<&GradeRecord> {
    records
        .iter()
        .filter(|r| matches!(r.grade.as_str(), "F" | "D" | "C-"))
        .collect()
}

pub fn build_report(
    subject: &str,
    summary: &AnalyticsSummary,
    records: &[GradeRecord],
    generated_on: NaiveDate,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Academic Standing Report");
    let _ = writeln!(output, "Generated for {} on {}", subject, generated_on);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Standing");
    let _ = writeln!(output, "- Overall GPA: {:.2}", summary.overall_gpa);
    let _ = writeln!(
        output,
        "- Courses: {} ({} credit hours)",
        summary.total_courses, summary.total_credits
    );
    let _ = writeln!(output, "- Average score: {:.2}", summary.average_score);
    let _ = writeln!(output, "- Trend: {}", summary.trend.as_str());
    let _ = writeln!(
        output,
        "- Risk: {} ({} failing, {} low)",
        summary.risk_level.as_str(),
        summary.failing_courses_count,
        summary.low_grades_count
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Grade Distribution");

    if summary.total_courses == 0 {
        let _ = writeln!(output, "No grades recorded.");
    } else {
        for (bucket, count) in summary.grade_distribution.buckets() {
            let _ = writeln!(output, "- {}: {}", bucket, count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Semester GPAs");

    if summary.semester_gpas.is_empty() {
        let _ = writeln!(output, "No semesters recorded.");
    } else {
        for semester in summary.semester_gpas.iter() {
            let _ = writeln!(
                output,
                "- {}: {:.2} across {} courses",
                semester.semester, semester.gpa, semester.course_count
            );
        }
    }

    let attention = courses_needing_attention(records);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Courses Needing Attention");

    if attention.is_empty() {
        let _ = writeln!(output, "No failing or low grades recorded.");
    } else {
        for record in attention {
            let _ = writeln!(
                output,
                "- {} ({}): {} [{}]",
                record.course.as_deref().unwrap_or("Unnamed course"),
                record.semester_label(),
                record.grade,
                standing::grade_color(&record.grade).as_str()
            );
        }
    }

    output
}

pub fn build_roster_report(
    label: Option<&str>,
    standings: &[StudentStanding],
    generated_on: NaiveDate,
) -> String {
    let mut output = String::new();
    let label = label.unwrap_or("all cohorts");

    let _ = writeln!(output, "# Cohort Standing Report");
    let _ = writeln!(output, "Generated for {} on {}", label, generated_on);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Students by Risk");

    if standings.is_empty() {
        let _ = writeln!(output, "No students with grades recorded.");
    } else {
        for standing in standings {
            let _ = writeln!(
                output,
                "- {} ({}, {}) GPA {:.2}, risk {}, trend {}",
                standing.student_name,
                standing.student_email,
                standing.cohort,
                standing.summary.overall_gpa,
                standing.summary.risk_level.as_str(),
                standing.summary.trend.as_str()
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StandingPolicy;

    fn generated_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    #[test]
    fn report_lists_standing_and_attention() {
        let records = vec![
            GradeRecord::new("A")
                .with_credits(3)
                .with_semester("Fall 2024")
                .with_course("BIO 110"),
            GradeRecord::new("D")
                .with_credits(3)
                .with_semester("Spring 2025")
                .with_course("CHEM 120"),
        ];
        let summary = standing::summarize(&records, &StandingPolicy::default());
        let report = build_report("Avery Lee", &summary, &records, generated_on());

        assert!(report.starts_with("# Academic Standing Report"));
        assert!(report.contains("Generated for Avery Lee on 2026-05-01"));
        assert!(report.contains("- Overall GPA: 2.50"));
        assert!(report.contains("- Trend: declining"));
        assert!(report.contains("- Risk: medium (0 failing, 1 low)"));
        assert!(report.contains("- Fall 2024: 4.00 across 1 courses"));
        assert!(report.contains("- CHEM 120 (Spring 2025): D [red]"));
        assert!(!report.contains("BIO 110"));
    }

    #[test]
    fn empty_report_says_so() {
        let summary = standing::summarize(&[], &StandingPolicy::default());
        let report = build_report("nobody", &summary, &[], generated_on());
        assert!(report.contains("No grades recorded."));
        assert!(report.contains("No semesters recorded."));
        assert!(report.contains("No failing or low grades recorded."));
    }

    #[test]
    fn roster_report_defaults_label() {
        let report = build_roster_report(None, &[], generated_on());
        assert!(report.contains("Generated for all cohorts"));
        assert!(report.contains("No students with grades recorded."));
    }
}
