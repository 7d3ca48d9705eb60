// Shared kernel: error types, logging, validation helpers and the
// process-local cache used by the application services.

pub mod errors; // Shared error types
pub mod infrastructure; // Shared infrastructure (cache)
pub mod utils; // Shared utilities (logger, validation)

// Re-exports for convenience
pub use errors::{AppError, AppResult};
pub use infrastructure::MemoryCache;
