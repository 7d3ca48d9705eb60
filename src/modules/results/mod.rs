/// Accepted exam records and their persistence boundary
///
/// Architecture:
/// - Domain: StudentResult entity and repository trait
/// - Infrastructure: in-memory repository implementation
/// - Application: aggregated per-student result DTO
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports for easy access
pub use application::{StudentOverallResult, StudentResultDetail};
pub use domain::{entities::StudentResult, repository::StudentResultRepository};
pub use infrastructure::InMemoryStudentResultRepository;
