/// Record validation and grading
pub mod processor;

pub use processor::{grade_for_score, StudentResultProcessor};
