use crate::log_warn;
use crate::modules::results::domain::entities::StudentResult;
use crate::shared::errors::AppError;

pub struct Validator;

impl Validator {
    pub fn validate_student_id(student_id: &str) -> Result<(), AppError> {
        if student_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Student ID cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_course_name(course_name: &str) -> Result<(), AppError> {
        if course_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Course name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_score(score: i32) -> Result<(), AppError> {
        if !(0..=100).contains(&score) {
            return Err(AppError::ValidationError(
                "Score must be between 0 and 100".to_string(),
            ));
        }
        Ok(())
    }

    /// Business-rule check for one parsed exam record. Invalid records are
    /// filtered out of the pipeline, never treated as faults.
    pub fn is_valid_student_result(result: &StudentResult) -> bool {
        if let Err(e) = Self::validate_student_id(&result.student_id) {
            log_warn!("Invalid studentId '{}': {}", result.student_id, e);
            return false;
        }

        if let Err(e) = Self::validate_course_name(&result.course_name) {
            log_warn!("Invalid courseName '{}': {}", result.course_name, e);
            return false;
        }

        if let Err(e) = Self::validate_score(result.score) {
            log_warn!("Invalid score {}: {}", result.score, e);
            return false;
        }

        true
    }
}
