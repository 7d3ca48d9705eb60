pub mod staging;

pub use staging::{FileStagingArea, StagedFile};
