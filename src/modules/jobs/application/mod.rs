pub mod service;

pub use service::{BatchJobService, JobStatusView};
