//! In-memory database clients.

pub mod non_tx;
pub mod tx;

use std::{collections::HashMap, future::Future};

use tracerr::Traced;

use crate::{
    domain::{bid, employee, task, Bid, Employee, PointTransaction, Task},
    infra::database,
};

pub use self::{non_tx::NonTx, tx::Tx};

/// Shared state of an in-memory database.
#[derive(Debug, Default)]
pub struct State {
    /// Stored [`Task`]s.
    pub(super) tasks: HashMap<task::Id, Task>,

    /// Stored [`Bid`]s.
    pub(super) bids: HashMap<bid::Id, Bid>,

    /// Stored [`Employee`]s.
    pub(super) employees: HashMap<employee::Id, Employee>,

    /// Append-only [`PointTransaction`] ledger.
    pub(super) ledger: Vec<PointTransaction>,
}

/// Access to the shared [`State`] of an in-memory database.
pub trait Store {
    /// Runs the provided closure over the [`State`].
    fn with_state<F, R>(
        &self,
        f: F,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>
    where
        F: FnOnce(&mut State) -> R;
}
