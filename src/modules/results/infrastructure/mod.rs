pub mod memory;

pub use memory::InMemoryStudentResultRepository;
