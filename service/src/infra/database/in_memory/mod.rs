//! In-memory [`Database`] implementation.
//!
//! The non-durable reference store: a mutex-guarded state map implementing
//! every operation the engine's commands require. Tests run against it, and
//! so can any embedding host that doesn't need persistence.

pub mod client;
mod impls;

use derive_more::{Deref, Display, Error as StdError};

#[cfg(doc)]
use crate::infra::Database;

pub use self::client::{NonTx, Store, Tx};

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Deref)]
pub struct InMemory<T = NonTx>(T);

impl InMemory {
    /// Creates a new empty [`InMemory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self(NonTx::default())
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Operation executed on an already finished transaction.
    #[display("transaction is already finished")]
    TransactionFinished,
}
