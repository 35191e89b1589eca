pub mod json_store;
pub mod memory_repo;
pub mod sqlite_repo;

pub use json_store::JsonStore;
pub use memory_repo::MemoryRepo;
pub use sqlite_repo::SqliteRepo;
