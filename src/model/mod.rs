mod database;
pub use database::DbConnection;

pub mod entity;

mod error;
pub use error::{StoreError, StoreResult};

mod repo;
pub use repo::DocumentStore;

mod memory;
pub use memory::MemoryStore;

mod pg;
pub use pg::PgStore;
