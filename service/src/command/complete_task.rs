//! [`Command`] for completing a reviewed [`Task`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use rust_decimal::prelude::ToPrimitive as _;
use tracerr::Traced;

use crate::{
    domain::{
        employee::{self, Points},
        points::{self, Reason},
        task::{self, Status},
        Employee, PointTransaction, Task,
    },
    infra::{database, Database},
    lifecycle::{self, Transition},
    Service,
};

use super::Command;

/// [`Command`] for completing a reviewed [`Task`].
///
/// Stamps the completion instant and settles the executor's score: the base
/// award determined by the [`Task`]'s minimum grade, minus one point per
/// working hour of overdue, both recorded as immutable ledger entries. The
/// status flip and the ledger writes share one transaction, so a [`Task`]
/// is never `Done` without its ledger trail.
#[derive(Clone, Copy, Debug)]
pub struct CompleteTask {
    /// ID of the [`Task`] to complete.
    pub task_id: task::Id,

    /// ID of the initiating [`Employee`].
    pub initiator_id: employee::Id,
}

impl<Db> Command<CompleteTask> for Service<Db>
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
            Select<By<Option<Employee>, employee::Id>>,
            Ok = Option<Employee>,
            Err = Traced<database::Error>,
        > + Database<Insert<Task>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Insert<PointTransaction>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Update<employee::NewPoints>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Task;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteTask,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteTask {
            task_id,
            initiator_id,
        } = cmd;
        let now = DateTime::now();

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

        lifecycle::check(&task, Transition::Complete, &initiator)
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

        lifecycle::check(&task, Transition::Complete, &initiator)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let executor_id = task
            .executor_id
            .ok_or(E::ExecutorNotAssigned(task_id))
            .map_err(tracerr::wrap!())?;
        let executor = tx
            .execute(Select(By::<Option<Employee>, _>::new(executor_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::EmployeeNotExists(executor_id))
            .map_err(tracerr::wrap!())?;

        let done_at: task::CompletionDateTime = now.coerce();
        let base = task.minimum_grade.base_points();
        let overdue = self
            .config()
            .calendar
            .working_hours_between(task.deadline, done_at);
        let penalty = Points::from(overdue.ceil().to_i64().unwrap_or(0));
        let awarded = base - penalty;

        task.status = Status::Done;
        task.done_at = Some(done_at);
        task.assigned_points = Some(awarded);
        tx.execute(Insert(task.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Insert(PointTransaction {
            id: points::Id::new(),
            employee_id: executor_id,
            task_id: Some(task_id),
            amount: base,
            reason: Reason::TaskCompletion,
            created_at: now.coerce(),
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if penalty > Points::ZERO {
            tx.execute(Insert(PointTransaction {
                id: points::Id::new(),
                employee_id: executor_id,
                task_id: Some(task_id),
                amount: -penalty,
                reason: Reason::OverduePenalty,
                created_at: now.coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        tx.execute(Update(employee::NewPoints {
            employee_id: executor_id,
            points: executor.points + awarded,
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(task)
    }
}

/// Error of [`CompleteTask`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Employee`] with the provided ID does not exist.
    #[display("`Employee(id: {_0})` does not exist")]
    EmployeeNotExists(#[error(not(source))] employee::Id),

    /// The [`Task`] has no executor to award.
    #[display("`Task(id: {_0})` has no executor assigned")]
    ExecutorNotAssigned(#[error(not(source))] task::Id),

    /// Rejected lifecycle transition.
    #[display("{_0}")]
    #[from]
    Lifecycle(lifecycle::Error),

    /// [`Task`] with the provided ID does not exist.
    #[display("`Task(id: {_0})` does not exist")]
    TaskNotExists(#[error(not(source))] task::Id),
}

#[cfg(test)]
mod spec {
    use std::{str::FromStr as _, time::Duration};

    use common::{
        operations::{By, Insert, Select},
        Calendar, DateTime, Money,
    };
    use time::UtcOffset;

    use crate::{
        domain::{
            employee::{self, Grade, Points, Role},
            org,
            points::Reason,
            task::{self, Kind, Mode, Status, Value},
            Employee, PointTransaction, Task,
        },
        infra::InMemory,
        lifecycle,
        Config, Service,
    };

    use super::{Command as _, CompleteTask, ExecutionError};

    fn service() -> Service<InMemory> {
        let calendar = Calendar::with_offset(UtcOffset::UTC);
        let (service, _) =
            Service::new(Config::with_calendar(calendar), InMemory::new());
        service
    }

    fn employee(role: Role, department_id: org::DepartmentId) -> Employee {
        Employee {
            id: employee::Id::new(),
            name: "Priya Nair".parse().unwrap(),
            role,
            department_id,
            management_id: None,
            division_id: None,
            points: Points::from(150),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    fn reviewed_task(
        department_id: org::DepartmentId,
        executor_id: employee::Id,
        deadline: task::DeadlineDateTime,
    ) -> Task {
        Task {
            id: task::Id::new(),
            title: "Expense report".parse().unwrap(),
            description: "File the expense report".parse().unwrap(),
            kind: Kind::Unit,
            mode: Mode::Money,
            status: Status::UnderReview,
            department_id,
            management_id: None,
            division_id: None,
            creator_id: employee::Id::new(),
            executor_id: Some(executor_id),
            minimum_grade: Grade::C,
            deadline,
            base_value: Value::Money(Money::from_str("100USD").unwrap()),
            auction: None,
            earned_value: None,
            review_deadline: None,
            done_at: None,
            assigned_points: None,
            created_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn on_time_completion_awards_base_points() {
        let service = service();
        let dept = org::DepartmentId::new();
        let director = employee(Role::Director, dept);
        let executor = employee(Role::Employee, dept);
        let deadline =
            (DateTime::now() + Duration::from_secs(7 * 24 * 3_600)).coerce();
        let task = reviewed_task(dept, executor.id, deadline);
        let task_id = task.id;
        service.database().execute(Insert(director.clone())).await.unwrap();
        service.database().execute(Insert(executor.clone())).await.unwrap();
        service.database().execute(Insert(task)).await.unwrap();

        let done = service
            .execute(CompleteTask {
                task_id,
                initiator_id: director.id,
            })
            .await
            .unwrap();

        assert_eq!(done.status, Status::Done);
        assert!(done.done_at.is_some());
        // Minimum grade C awards its base of 20, no penalty.
        assert_eq!(done.assigned_points, Some(Points::from(20)));

        let ledger: Vec<PointTransaction> = service
            .database()
            .execute(Select(By::<Vec<PointTransaction>, _>::new(executor.id)))
            .await
            .unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].reason, Reason::TaskCompletion);
        assert_eq!(ledger[0].amount, Points::from(20));

        let updated: Option<Employee> = service
            .database()
            .execute(Select(By::<Option<Employee>, _>::new(executor.id)))
            .await
            .unwrap();
        assert_eq!(updated.unwrap().points, Points::from(170));
    }

    #[tokio::test]
    async fn late_completion_is_penalized_per_working_hour() {
        let service = service();
        let dept = org::DepartmentId::new();
        let director = employee(Role::Director, dept);
        let executor = employee(Role::Employee, dept);
        // Two weeks overdue: far more working hours than the base award.
        let deadline =
            (DateTime::now() - Duration::from_secs(14 * 24 * 3_600)).coerce();
        let task = reviewed_task(dept, executor.id, deadline);
        let task_id = task.id;
        service.database().execute(Insert(director.clone())).await.unwrap();
        service.database().execute(Insert(executor.clone())).await.unwrap();
        service.database().execute(Insert(task)).await.unwrap();

        let done = service
            .execute(CompleteTask {
                task_id,
                initiator_id: director.id,
            })
            .await
            .unwrap();

        let awarded = done.assigned_points.unwrap();
        assert!(awarded < Points::from(20));

        let ledger: Vec<PointTransaction> = service
            .database()
            .execute(Select(By::<Vec<PointTransaction>, _>::new(executor.id)))
            .await
            .unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].reason, Reason::TaskCompletion);
        assert_eq!(ledger[0].amount, Points::from(20));
        assert_eq!(ledger[1].reason, Reason::OverduePenalty);
        assert!(ledger[1].amount < Points::ZERO);

        let updated: Option<Employee> = service
            .database()
            .execute(Select(By::<Option<Employee>, _>::new(executor.id)))
            .await
            .unwrap();
        assert_eq!(
            updated.unwrap().points,
            Points::from(150) + awarded,
        );
    }

    #[tokio::test]
    async fn only_director_or_admin_may_complete() {
        let service = service();
        let dept = org::DepartmentId::new();
        let executor = employee(Role::Employee, dept);
        let deadline =
            (DateTime::now() + Duration::from_secs(24 * 3_600)).coerce();
        let task = reviewed_task(dept, executor.id, deadline);
        let task_id = task.id;
        service.database().execute(Insert(executor.clone())).await.unwrap();
        service.database().execute(Insert(task)).await.unwrap();

        let err = service
            .execute(CompleteTask {
                task_id,
                initiator_id: executor.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Lifecycle(
                lifecycle::Error::PermissionDenied { .. },
            ),
        ));
    }

    #[tokio::test]
    async fn completing_twice_is_rejected() {
        let service = service();
        let dept = org::DepartmentId::new();
        let director = employee(Role::Director, dept);
        let executor = employee(Role::Employee, dept);
        let deadline =
            (DateTime::now() + Duration::from_secs(24 * 3_600)).coerce();
        let task = reviewed_task(dept, executor.id, deadline);
        let task_id = task.id;
        service.database().execute(Insert(director.clone())).await.unwrap();
        service.database().execute(Insert(executor)).await.unwrap();
        service.database().execute(Insert(task)).await.unwrap();

        let _ = service
            .execute(CompleteTask {
                task_id,
                initiator_id: director.id,
            })
            .await
            .unwrap();

        let err = service
            .execute(CompleteTask {
                task_id,
                initiator_id: director.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Lifecycle(
                lifecycle::Error::InvalidTransition { .. },
            ),
        ));
    }
}
