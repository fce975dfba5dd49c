//! [`NonTx`] client definitions.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracerr::Traced;

use crate::infra::database;

use super::{State, Store};

/// Non-transactional in-memory database client.
///
/// Every operation locks the shared [`State`] just for its own duration.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared [`State`] of the database.
    state: Arc<Mutex<State>>,
}

impl NonTx {
    /// Returns the shared [`State`] of this client.
    pub(in crate::infra::database::in_memory) fn state(
        &self,
    ) -> &Arc<Mutex<State>> {
        &self.state
    }
}

impl Store for NonTx {
    async fn with_state<F, R>(
        &self,
        f: F,
    ) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&mut State) -> R,
    {
        let mut state = self.state.lock().await;
        Ok(f(&mut *state))
    }
}
