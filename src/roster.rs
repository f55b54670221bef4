use std::collections::HashMap;

use uuid::Uuid;

use crate::config::StandingPolicy;
use crate::models::{GradeRecord, StudentGrade, StudentStanding};
use crate::standing;

/// Summarizes each student and orders the list for an advisory view:
/// highest risk first, then lowest GPA, then name.
pub fn rank_students(grades: &[StudentGrade], policy: &StandingPolicy) -> Vec<StudentStanding> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut grouped: HashMap<Uuid, (&StudentGrade, Vec<GradeRecord>)> = HashMap::new();

    for grade in grades {
        let entry = grouped.entry(grade.student_id).or_insert_with(|| {
            order.push(grade.student_id);
            (grade, Vec::new())
        });
        entry.1.push(grade.record.clone());
    }

    let mut standings: Vec<StudentStanding> = order
        .into_iter()
        .filter_map(|id| grouped.remove(&id))
        .map(|(student, records)| StudentStanding {
            student_id: student.student_id,
            student_name: student.student_name.clone(),
            student_email: student.student_email.clone(),
            cohort: student.cohort.clone(),
            summary: standing::summarize(&records, policy),
        })
        .collect();

    standings.sort_by(|a, b| {
        b.summary
            .risk_level
            .cmp(&a.summary.risk_level)
            .then_with(|| a.summary.overall_gpa.total_cmp(&b.summary.overall_gpa))
            .then_with(|| a.student_name.cmp(&b.student_name))
    });
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;

    fn student_grade(id: Uuid, name: &str, grade: &str) -> StudentGrade {
        StudentGrade {
            student_id: id,
            student_name: name.to_string(),
            student_email: format!("{}@example.com", name.to_lowercase()),
            cohort: "2026".to_string(),
            record: GradeRecord::new(grade).with_credits(3).with_semester("Fall 2024"),
        }
    }

    #[test]
    fn groups_records_by_student() {
        let avery = Uuid::new_v4();
        let grades = vec![
            student_grade(avery, "Avery", "A"),
            student_grade(avery, "Avery", "B"),
        ];

        let standings = rank_students(&grades, &StandingPolicy::default());
        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].summary.total_courses, 2);
        assert_eq!(standings[0].summary.overall_gpa, 3.5);
    }

    #[test]
    fn orders_by_risk_then_gpa() {
        let avery = Uuid::new_v4();
        let jules = Uuid::new_v4();
        let kiara = Uuid::new_v4();
        let morgan = Uuid::new_v4();
        let grades = vec![
            student_grade(avery, "Avery", "A"),
            student_grade(jules, "Jules", "C"),
            student_grade(kiara, "Kiara", "F"),
            student_grade(kiara, "Kiara", "A"),
            student_grade(morgan, "Morgan", "D"),
        ];

        let standings = rank_students(&grades, &StandingPolicy::default());
        let names: Vec<&str> = standings.iter().map(|s| s.student_name.as_str()).collect();
        assert_eq!(names, vec!["Kiara", "Morgan", "Jules", "Avery"]);
        assert_eq!(standings[0].summary.risk_level, RiskLevel::High);
        assert_eq!(standings[3].summary.risk_level, RiskLevel::Low);
    }

    #[test]
    fn empty_roster_is_empty() {
        assert!(rank_students(&[], &StandingPolicy::default()).is_empty());
    }
}
