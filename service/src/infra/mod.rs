//! Infrastructure layer.

pub mod database;

pub use self::database::{in_memory, Database, InMemory};
