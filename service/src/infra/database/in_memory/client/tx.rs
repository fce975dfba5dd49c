//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::infra::database::{self, in_memory};

use super::{State, Store};

/// Transactional in-memory database client.
///
/// Holds the shared [`State`] exclusively for the whole transaction, so a
/// transaction is a serialization point: no other client observes or
/// interleaves with its operations. Committing releases the hold.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Exclusive hold over the shared [`State`], given up on commit.
    guard: Arc<Mutex<Option<OwnedMutexGuard<State>>>>,
}

impl Tx {
    /// Acquires a new [`Tx`] client over the provided [`State`].
    pub(in crate::infra::database::in_memory) async fn acquire(
        state: Arc<Mutex<State>>,
    ) -> Self {
        Self {
            guard: Arc::new(Mutex::new(Some(state.lock_owned().await))),
        }
    }

    /// Commits this [`Tx`] client, releasing the exclusive hold.
    ///
    /// # Errors
    ///
    /// Never, actually: committing an already finished transaction is
    /// nothing to do.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        drop(self.guard.lock().await.take());
        Ok(())
    }
}

impl Store for Tx {
    async fn with_state<F, R>(
        &self,
        f: F,
    ) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&mut State) -> R,
    {
        let mut slot = self.guard.lock().await;
        let state = slot.as_mut().ok_or_else(|| {
            tracerr::new!(database::Error::InMemory(
                in_memory::Error::TransactionFinished
            ))
        })?;
        Ok(f(&mut **state))
    }
}
