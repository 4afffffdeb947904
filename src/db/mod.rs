pub mod memory;
pub mod repository;

pub use memory::MemoryRepository;
pub use repository::{ItemFilter, ItemRepository, RepositoryError};
