//! [`Command`] for placing a new [`Bid`] on an auctioned [`Task`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    auction::ranking,
    domain::{
        bid, employee,
        task::{self, Mode, Status, Value},
        Bid, Employee, Task,
    },
    infra::{database, Database},
    read::bid::Active,
    Service,
};

use super::Command;

/// [`Command`] for placing a new [`Bid`] on an auctioned [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct PlaceBid {
    /// ID of the [`Task`] to bid on.
    pub task_id: task::Id,

    /// ID of the bidding [`Employee`].
    pub bidder_id: employee::Id,

    /// Offered [`Value`].
    pub value: Value,
}

impl<Db> Command<PlaceBid> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Task>, task::Id>>,
            Ok = Option<Task>,
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

    async fn execute(&self, cmd: PlaceBid) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PlaceBid {
            task_id,
            bidder_id,
            value,
        } = cmd;
        let now = DateTime::now();

        let task = self
            .database()
            .execute(Select(By::<Option<Task>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TaskNotExists(task_id))
            .map_err(tracerr::wrap!())?;

        let bidder = self
            .database()
            .execute(Select(By::<Option<Employee>, _>::new(bidder_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|e| e.deleted_at.is_none())
            .ok_or(E::EmployeeNotExists(bidder_id))
            .map_err(tracerr::wrap!())?;

        if bidder.is_admin() {
            return Err(tracerr::new!(E::BidderIsAdministrator(bidder_id)));
        }
        if !task.is_auctionable() {
            return Err(tracerr::new!(E::TaskNotAuctionable(task_id)));
        }
        if value.mode() != task.mode {
            return Err(tracerr::new!(E::ValueModeMismatch {
                expected: task.mode,
            }));
        }
        if !bidder.grade().at_least(task.minimum_grade) {
            return Err(tracerr::new!(E::GradeTooLow {
                bidder: bidder.grade(),
                required: task.minimum_grade,
            }));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid racing a concurrent settlement of the same auction.
        tx.execute(Lock(By::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut task = tx
            .execute(Select(By::<Option<Task>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TaskNotExists(task_id))
            .map_err(tracerr::wrap!())?;

        // Freshness check: the auction may have just closed.
        if task.status != Status::Backlog {
            return Err(tracerr::new!(E::AuctionClosed(task_id)));
        }
        let Some(mut auction) = task.auction else {
            return Err(tracerr::new!(E::NoAuctionWindow(task_id)));
        };
        if now >= auction.planned_end_at.coerce() {
            return Err(tracerr::new!(E::AuctionClosed(task_id)));
        }

        let current = self
            .config()
            .schedule
            .current_value(Some(&auction), task.base_value, now)
            .ok_or(E::NoAuctionWindow(task_id))
            .map_err(tracerr::wrap!())?;

        let bids = tx
            .execute(Select(By::<Vec<Active<Bid>>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .map(|Active(bid)| bid)
            .collect::<Vec<_>>();

        let candidate = Bid {
            id: bid::Id::new(),
            task_id,
            bidder_id,
            bidder_name: bidder.name.clone(),
            bidder_points: bidder.points,
            bidder_grade: bidder.grade(),
            value,
            is_active: true,
            created_at: now.coerce(),
        };

        ranking::validate(&candidate, current, ranking::select_winner(&bids))
            .map_err(|e| match e {
                ranking::Rejection::NotBelowCurrentValue => E::BidTooLow {
                    offered: value,
                    current,
                },
                ranking::Rejection::BetterBidExists => {
                    E::BetterBidExists(task_id)
                }
            })
            .map_err(tracerr::wrap!())?;

        tx.execute(Insert(candidate.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // The price freezes at the value current when competition appeared.
        auction.has_bids = true;
        auction.current_price = Some(current);
        task.auction = Some(auction);
        tx.execute(Insert(task))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(candidate)
    }
}

/// Error of [`PlaceBid`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// The auction is already closed for new [`Bid`]s.
    #[display("auction of `Task(id: {_0})` is closed")]
    AuctionClosed(#[error(not(source))] task::Id),

    /// A better [`Bid`] is already placed.
    #[display("a better bid already exists on `Task(id: {_0})`")]
    BetterBidExists(#[error(not(source))] task::Id),

    /// The offered [`Value`] does not beat the current auction value.
    #[display("offered {offered} is not below the current value {current}")]
    BidTooLow {
        /// Offered [`Value`].
        offered: Value,

        /// Current auction [`Value`].
        current: Value,
    },

    /// Administrators are excluded from bidding.
    #[display("`Employee(id: {_0})` is an administrator and may not bid")]
    BidderIsAdministrator(#[error(not(source))] employee::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Employee`] with the provided ID does not exist.
    #[display("`Employee(id: {_0})` does not exist")]
    EmployeeNotExists(#[error(not(source))] employee::Id),

    /// The bidder's [`Grade`] is below the [`Task`]'s minimum.
    ///
    /// [`Grade`]: employee::Grade
    #[display("grade `{bidder}` is below the required `{required}`")]
    GradeTooLow {
        /// [`Grade`] of the bidder.
        ///
        /// [`Grade`]: employee::Grade
        bidder: employee::Grade,

        /// Minimum [`Grade`] required by the [`Task`].
        ///
        /// [`Grade`]: employee::Grade
        required: employee::Grade,
    },

    /// The [`Task`] has no auction window configured.
    #[display("`Task(id: {_0})` has no auction window")]
    NoAuctionWindow(#[error(not(source))] task::Id),

    /// The [`Task`] is never offered to bidders.
    #[display("`Task(id: {_0})` is not auctionable")]
    TaskNotAuctionable(#[error(not(source))] task::Id),

    /// [`Task`] with the provided ID does not exist.
    #[display("`Task(id: {_0})` does not exist")]
    TaskNotExists(#[error(not(source))] task::Id),

    /// The offered [`Value`]'s [`Mode`] differs from the [`Task`]'s.
    #[display("value mode differs from the task's `{expected}` mode")]
    ValueModeMismatch {
        /// [`Mode`] of the [`Task`].
        expected: Mode,
    },
}
