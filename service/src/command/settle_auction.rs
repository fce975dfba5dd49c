//! [`Command`] for settling the auction of a single [`Task`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    auction::{settlement, Decision},
    domain::{
        employee,
        task::{self, Status},
        Bid, Employee, Task,
    },
    infra::{database, Database},
    read::bid::{Active, Competing},
    Service,
};

use super::Command;

/// [`Command`] for settling the auction of a single [`Task`].
///
/// Invoked by the periodic sweeper for every auction whose close condition
/// may hold. Resolves to [`None`] whenever there is nothing to do: the
/// auction is still running, or another writer already closed it. Re-running
/// it on a settled [`Task`] is a no-op, never an error.
#[derive(Clone, Copy, Debug)]
pub struct SettleAuction {
    /// ID of the [`Task`] whose auction to settle.
    pub task_id: task::Id,
}

impl<Db> Command<SettleAuction> for Service<Db>
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
            Select<By<Vec<Competing<Bid>>, task::Id>>,
            Ok = Vec<Competing<Bid>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Active<Bid>>, task::Id>>,
            Ok = Vec<Active<Bid>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Bid>, Ok = (), Err = Traced<database::Error>>
        + Database<Insert<Task>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Option<Task>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SettleAuction,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SettleAuction { task_id } = cmd;
        let now = DateTime::now();

        let task = self
            .database()
            .execute(Select(By::<Option<Task>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TaskNotExists(task_id))
            .map_err(tracerr::wrap!())?;
        if task.status != Status::Backlog {
            // Already settled.
            return Ok(None);
        }

        let creator = self
            .database()
            .execute(Select(By::<Option<Employee>, _>::new(task.creator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::EmployeeNotExists(task.creator_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut task = tx
            .execute(Select(By::<Option<Task>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TaskNotExists(task_id))
            .map_err(tracerr::wrap!())?;
        if task.status != Status::Backlog {
            // Another writer closed this auction first: a benign no-op.
            return Ok(None);
        }

        let competing = tx
            .execute(Select(By::<Vec<Competing<Bid>>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .map(|Competing(bid)| bid)
            .collect::<Vec<_>>();

        let decision = settlement::decide(
            &self.config().schedule,
            &self.config().settlement,
            &task,
            &creator,
            &competing,
            now,
        );
        let (executor_id, value) = match decision {
            Decision::Leave => return Ok(None),
            Decision::AssignToCreator { value } => (creator.id, value),
            Decision::AssignToWinner { bid, value } => (bid.bidder_id, value),
        };

        task.executor_id = Some(executor_id);
        task.status = Status::InProgress;
        task.earned_value = Some(value);
        if let Some(auction) = &mut task.auction {
            auction.end_at = Some(now.coerce());
            auction.has_bids = false;
        }

        // The task leaves the backlog, so its whole bid set retires.
        let bids = tx
            .execute(Select(By::<Vec<Active<Bid>>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for Active(mut bid) in bids {
            bid.is_active = false;
            tx.execute(Insert(bid))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        tx.execute(Insert(task.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Some(task))
    }
}

/// Error of [`SettleAuction`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Employee`] with the provided ID does not exist.
    #[display("`Employee(id: {_0})` does not exist")]
    EmployeeNotExists(#[error(not(source))] employee::Id),

    /// [`Task`] with the provided ID does not exist.
    #[display("`Task(id: {_0})` does not exist")]
    TaskNotExists(#[error(not(source))] task::Id),
}
