pub mod dto;

pub use dto::{StudentOverallResult, StudentResultDetail};
