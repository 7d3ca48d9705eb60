use crate::modules::results::domain::entities::StudentResult;
use serde::{Deserialize, Serialize};

/// Aggregated view of one student's accepted results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentOverallResult {
    pub student_id: String,
    pub course_results: Vec<StudentResultDetail>,
    pub overall_average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResultDetail {
    pub course_name: String,
    pub score: i32,
    pub grade: Option<String>,
}

impl StudentOverallResult {
    /// Build the aggregate from a student's records. Returns `None` when the
    /// student has no accepted records.
    pub fn from_records(student_id: &str, records: &[StudentResult]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let course_results = records
            .iter()
            .map(|r| StudentResultDetail {
                course_name: r.course_name.clone(),
                score: r.score,
                grade: r.grade.clone(),
            })
            .collect();

        let total: i64 = records.iter().map(|r| r.score as i64).sum();
        let overall_average_score = total as f64 / records.len() as f64;

        Some(Self {
            student_id: student_id.to_string(),
            course_results,
            overall_average_score,
        })
    }
}
