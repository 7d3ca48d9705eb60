/// Validates parsed exam records and derives the letter grade
use crate::log_warn;
use crate::modules::jobs::engine::ItemProcessor;
use crate::modules::results::domain::entities::StudentResult;
use crate::shared::errors::AppResult;
use crate::shared::utils::Validator;
use async_trait::async_trait;

/// Grade bands as data: inclusive lower bounds sorted descending, first
/// match wins. New bands slot in without touching caller code.
const GRADE_BANDS: &[(i32, &str)] = &[(90, "A"), (80, "B"), (70, "C"), (60, "D"), (0, "F")];

/// Letter grade for a score, `None` below every band
pub fn grade_for_score(score: i32) -> Option<&'static str> {
    GRADE_BANDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, grade)| *grade)
}

/// Pipeline processor: rejection is a first-class result (`Ok(None)`), never
/// a fault, and feeds the filter count.
pub struct StudentResultProcessor;

#[async_trait]
impl ItemProcessor<StudentResult> for StudentResultProcessor {
    async fn process(&self, item: &StudentResult) -> AppResult<Option<StudentResult>> {
        if !Validator::is_valid_student_result(item) {
            log_warn!("Rejecting record due to validation failure: {:?}", item);
            return Ok(None);
        }

        // Any input-supplied grade is overwritten with the derived one
        let mut graded = item.clone();
        graded.grade = grade_for_score(item.score).map(str::to_string);
        Ok(Some(graded))
    }
}
