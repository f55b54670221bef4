//! Academic standing: GPA, per-semester breakdown, trend and risk.
//!
//! Every function here is pure. Malformed records are tolerated through the
//! defaults documented on [`GradeRecord`]; use [`summarize_strict`] when the
//! caller would rather reject them.

use std::collections::HashMap;

use tracing::warn;

use crate::config::StandingPolicy;
use crate::error::ValidationError;
use crate::models::{
    AnalyticsSummary, ColorToken, GradeDistribution, GradeRecord, RiskAssessment, RiskLevel,
    SemesterGpa, Trend,
};

/// Grade points on the 4.0 scale, or `None` for a grade outside the table.
pub fn grade_points(grade: &str) -> Option<f64> {
    let points = match grade {
        "A" => 4.0,
        "A-" => 3.7,
        "B+" => 3.3,
        "B" => 3.0,
        "B-" => 2.7,
        "C+" => 2.3,
        "C" => 2.0,
        "C-" => 1.7,
        "D" => 1.0,
        "F" => 0.0,
        _ => return None,
    };
    Some(points)
}

/// Rounds to two decimal places the way a dashboard's `toFixed(2)` does:
/// from the exact binary value, so 3.925 (stored as 3.92499...) gives 3.92,
/// and exact ties go away from zero, so 2.125 gives 2.13.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // A double sits exactly halfway between two hundredths only when it is
    // an odd multiple of 1/8. Scaling by powers of two is exact.
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        let hundredths = (value * 100.0).abs().ceil();
        return hundredths.copysign(value) / 100.0;
    }
    // `{:.2}` rounds the exact value; ties were handled above.
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Credit-weighted GPA. Unknown grades earn 0 points but keep their credits.
pub fn compute_gpa<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a GradeRecord>,
{
    let mut total_points = 0.0;
    let mut total_credits: u64 = 0;

    for record in records {
        let credits = record.effective_credit_hours();
        let points = grade_points(&record.grade).unwrap_or_else(|| {
            warn!(grade = %record.grade, "unknown letter grade counted as 0 points");
            0.0
        });
        total_points += points * credits as f64;
        total_credits = total_credits.saturating_add(credits);
    }

    if total_credits == 0 {
        return 0.0;
    }
    round2(total_points / total_credits as f64)
}

/// Per-semester GPA in first-seen semester order.
pub fn group_by_semester<'a, I>(records: I) -> Vec<SemesterGpa>
where
    I: IntoIterator<Item = &'a GradeRecord>,
{
    let mut order: Vec<(&'a str, Vec<&'a GradeRecord>)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for record in records {
        let label = record.semester_label();
        let slot = *index.entry(label).or_insert_with(|| {
            order.push((label, Vec::new()));
            order.len() - 1
        });
        order[slot].1.push(record);
    }

    order
        .into_iter()
        .map(|(semester, group)| SemesterGpa {
            semester: semester.to_string(),
            gpa: compute_gpa(group.iter().copied()),
            course_count: group.len(),
        })
        .collect()
}

fn is_low_grade(grade: &str) -> bool {
    matches!(grade, "D" | "C-")
}

pub fn classify_risk<'a, I>(records: I, policy: &StandingPolicy) -> RiskAssessment
where
    I: IntoIterator<Item = &'a GradeRecord>,
{
    let records: Vec<&GradeRecord> = records.into_iter().collect();
    let failing_courses_count = records.iter().filter(|r| r.grade == "F").count();
    let low_grades_count = records.iter().filter(|r| is_low_grade(&r.grade)).count();

    let risk_level = if failing_courses_count > 0 {
        RiskLevel::High
    } else if low_grades_count > 0
        || compute_gpa(records.iter().copied()) < policy.medium_gpa_threshold
    {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    RiskAssessment {
        risk_level,
        failing_courses_count,
        low_grades_count,
    }
}

pub fn classify_risk_default<'a, I>(records: I) -> RiskAssessment
where
    I: IntoIterator<Item = &'a GradeRecord>,
{
    classify_risk(records, &StandingPolicy::default())
}

/// Direction of the last two semesters, strict comparison.
pub fn compute_trend(semester_gpas: &[SemesterGpa]) -> Trend {
    compute_trend_with_tolerance(semester_gpas, 0.0)
}

/// Like [`compute_trend`], but a change must exceed `tolerance` to count.
pub fn compute_trend_with_tolerance(semester_gpas: &[SemesterGpa], tolerance: f64) -> Trend {
    let [.., previous, last] = semester_gpas else {
        return Trend::Stable;
    };
    let tolerance = tolerance.max(0.0);
    let delta = last.gpa - previous.gpa;

    if delta > tolerance {
        Trend::Improving
    } else if -delta > tolerance {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

pub fn grade_color(grade: &str) -> ColorToken {
    match grade.chars().next() {
        Some('A') => ColorToken::Green,
        Some('B') => ColorToken::Blue,
        Some('C') => ColorToken::Orange,
        Some('D') => ColorToken::Red,
        _ => ColorToken::DarkRed,
    }
}

/// Counts per letter bucket. Anything not starting with A-D lands in F,
/// the same fallback [`grade_color`] uses.
pub fn grade_distribution<'a, I>(records: I) -> GradeDistribution
where
    I: IntoIterator<Item = &'a GradeRecord>,
{
    let mut distribution = GradeDistribution::default();
    for record in records {
        match record.grade.chars().next() {
            Some('A') => distribution.a += 1,
            Some('B') => distribution.b += 1,
            Some('C') => distribution.c += 1,
            Some('D') => distribution.d += 1,
            _ => distribution.f += 1,
        }
    }
    distribution
}

/// Full dashboard summary for one student's records.
pub fn summarize(records: &[GradeRecord], policy: &StandingPolicy) -> AnalyticsSummary {
    let considered: Vec<&GradeRecord> = records
        .iter()
        .filter(|r| policy.include_pending_grades || !r.is_pending())
        .collect();

    let total_courses = considered.len();
    let total_credits = considered
        .iter()
        .fold(0u64, |total, r| total.saturating_add(r.effective_credit_hours()));
    let average_score = if total_courses == 0 {
        0.0
    } else {
        round2(considered.iter().map(|r| r.effective_score()).sum::<f64>() / total_courses as f64)
    };

    let semester_gpas = group_by_semester(considered.iter().copied());
    let trend = compute_trend_with_tolerance(&semester_gpas, policy.trend_tolerance);
    let risk = classify_risk(considered.iter().copied(), policy);

    AnalyticsSummary {
        overall_gpa: compute_gpa(considered.iter().copied()),
        total_courses,
        total_credits,
        average_score,
        grade_distribution: grade_distribution(considered.iter().copied()),
        semester_gpas,
        trend,
        risk_level: risk.risk_level,
        failing_courses_count: risk.failing_courses_count,
        low_grades_count: risk.low_grades_count,
    }
}

/// Rejects records the permissive path would otherwise paper over.
pub fn validate(records: &[GradeRecord]) -> Result<(), ValidationError> {
    for (index, record) in records.iter().enumerate() {
        if let Some(value) = record.credit_hours {
            if value < 0 {
                return Err(ValidationError::NegativeCreditHours { index, value });
            }
        }
        if let Some(value) = record.score {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteScore { index });
            }
            if !(0.0..=100.0).contains(&value) {
                return Err(ValidationError::ScoreOutOfRange { index, value });
            }
        }
    }
    Ok(())
}

pub fn summarize_strict(
    records: &[GradeRecord],
    policy: &StandingPolicy,
) -> Result<AnalyticsSummary, ValidationError> {
    validate(records)?;
    Ok(summarize(records, policy))
}
