use serde::{Deserialize, Serialize};

/// One exam record: a single student's score for a single course.
///
/// Records arrive ungraded from the flat file; `grade` stays `None` until the
/// processor computes it. Any grade present on input is overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentResult {
    pub student_id: String,
    pub course_name: String,
    pub score: i32,
    pub grade: Option<String>,
}

impl StudentResult {
    pub fn new(student_id: String, course_name: String, score: i32) -> Self {
        Self {
            student_id,
            course_name,
            score,
            grade: None,
        }
    }

    pub fn with_grade(mut self, grade: &str) -> Self {
        self.grade = Some(grade.to_string());
        self
    }
}
