//! [`Command`] for withdrawing a placed [`Bid`].

use common::operations::{By, Commit, Insert, Lock, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{bid, employee, task, Bid, Employee, Task},
    infra::{database, Database},
    read::bid::Active,
    Service,
};

use super::Command;

/// [`Command`] for withdrawing a placed [`Bid`].
///
/// The bid row stays for audit; only its active flag flips. Used when a
/// bidder retracts their own offer, or administratively when the bidder is
/// reassigned or terminated. The task's bid indicator is recomputed within
/// the same transaction.
#[derive(Clone, Copy, Debug)]
pub struct WithdrawBid {
    /// ID of the [`Bid`] to withdraw.
    pub bid_id: bid::Id,

    /// ID of the initiating [`Employee`].
    pub initiator_id: employee::Id,
}

impl<Db> Command<WithdrawBid> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Bid>, bid::Id>>,
            Ok = Option<Bid>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Employee>, employee::Id>>,
            Ok = Option<Employee>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Task, task::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Bid>, bid::Id>>,
            Ok = Option<Bid>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Task>, task::Id>>,
            Ok = Option<Task>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Active<Bid>>, task::Id>>,
            Ok = Vec<Active<Bid>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Bid>, Ok = (), Err = Traced<database::Error>>
        + Database<Insert<Task>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Bid;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: WithdrawBid,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let WithdrawBid {
            bid_id,
            initiator_id,
        } = cmd;

        let bid = self
            .database()
            .execute(Select(By::<Option<Bid>, _>::new(bid_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BidNotExists(bid_id))
            .map_err(tracerr::wrap!())?;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Employee>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::EmployeeNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;
        if bid.bidder_id != initiator.id && !initiator.is_admin() {
            return Err(tracerr::new!(E::PermissionDenied {
                bid_id,
                employee_id: initiator_id,
            }));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(bid.task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut bid = tx
            .execute(Select(By::<Option<Bid>, _>::new(bid_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BidNotExists(bid_id))
            .map_err(tracerr::wrap!())?;
        if !bid.is_active {
            // Already withdrawn, nothing to redo.
            return Ok(bid);
        }

        bid.is_active = false;
        tx.execute(Insert(bid.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // The bid indicator must agree with the live bid set.
        let remaining = tx
            .execute(Select(By::<Vec<Active<Bid>>, _>::new(bid.task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let task = tx
            .execute(Select(By::<Option<Task>, _>::new(bid.task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(mut task) = task {
            if let Some(auction) = &mut task.auction {
                auction.has_bids = !remaining.is_empty();
            }
            tx.execute(Insert(task))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(bid)
    }
}

/// Error of [`WithdrawBid`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Bid`] with the provided ID does not exist.
    #[display("`Bid(id: {_0})` does not exist")]
    BidNotExists(#[error(not(source))] bid::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Employee`] with the provided ID does not exist.
    #[display("`Employee(id: {_0})` does not exist")]
    EmployeeNotExists(#[error(not(source))] employee::Id),

    /// The initiator may not withdraw this [`Bid`].
    #[display(
        "`Employee(id: {employee_id})` may not withdraw `Bid(id: {bid_id})`"
    )]
    PermissionDenied {
        /// ID of the [`Bid`] being withdrawn.
        bid_id: bid::Id,

        /// ID of the initiating [`Employee`].
        employee_id: employee::Id,
    },
}
