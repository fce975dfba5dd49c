//! [`Command`] for starting an assigned [`Task`] manually.

use common::operations::{By, Commit, Insert, Lock, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        employee,
        task::{self, Status},
        Employee, Task,
    },
    infra::{database, Database},
    lifecycle::{self, Transition},
    Service,
};

use super::Command;

/// [`Command`] for starting an assigned [`Task`] manually.
///
/// Permitted to the executor, the department director, or an administrator.
/// Auction settlement performs the same transition automatically.
#[derive(Clone, Copy, Debug)]
pub struct StartTask {
    /// ID of the [`Task`] to start.
    pub task_id: task::Id,

    /// ID of the initiating [`Employee`].
    pub initiator_id: employee::Id,
}

impl<Db> Command<StartTask> for Service<Db>
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
        > + Database<Insert<Task>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Task;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: StartTask) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let StartTask {
            task_id,
            initiator_id,
        } = cmd;

        let task = self
            .database()
            .execute(Select(By::<Option<Task>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TaskNotExists(task_id))
            .map_err(tracerr::wrap!())?;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Employee>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::EmployeeNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;

        lifecycle::check(&task, Transition::Start, &initiator)
            .map_err(tracerr::from_and_wrap!(=> E))?;

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

        // Guards re-evaluated on the fresh row before the write.
        lifecycle::check(&task, Transition::Start, &initiator)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        task.status = Status::InProgress;
        tx.execute(Insert(task.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(task)
    }
}

/// Error of [`StartTask`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Employee`] with the provided ID does not exist.
    #[display("`Employee(id: {_0})` does not exist")]
    EmployeeNotExists(#[error(not(source))] employee::Id),

    /// Rejected lifecycle transition.
    #[display("{_0}")]
    #[from]
    Lifecycle(lifecycle::Error),

    /// [`Task`] with the provided ID does not exist.
    #[display("`Task(id: {_0})` does not exist")]
    TaskNotExists(#[error(not(source))] task::Id),
}
