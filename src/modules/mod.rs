pub mod grading;
pub mod jobs;
pub mod results;
