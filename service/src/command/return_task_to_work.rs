//! [`Command`] for returning an under-review [`Task`] back to work.

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        employee,
        task::{self, Comment, Status},
        Employee, Task,
    },
    infra::{database, Database},
    lifecycle::{self, Transition},
    Service,
};

use super::Command;

/// [`Command`] for returning an under-review [`Task`] back to work.
#[derive(Clone, Debug)]
pub struct ReturnTaskToWork {
    /// ID of the [`Task`] to return.
    pub task_id: task::Id,

    /// [`Reason`] of the return.
    pub reason: Reason,
}

/// Reason of returning a [`Task`] back to work.
#[derive(Clone, Debug)]
pub enum Reason {
    /// A human reviewer rejected the result.
    ///
    /// Requires an explanatory [`Comment`]: the executor must learn why.
    Manual {
        /// ID of the initiating [`Employee`].
        initiator_id: employee::Id,

        /// Explanation of the return.
        comment: Comment,
    },

    /// The review deadline elapsed with no decision, so the sweeper returns
    /// the [`Task`] automatically. No comment is required on this path.
    ReviewExpired,
}

impl<Db> Command<ReturnTaskToWork> for Service<Db>
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
    type Ok = Option<Task>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ReturnTaskToWork,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReturnTaskToWork { task_id, reason } = cmd;
        let now = DateTime::now();

        let task = self
            .database()
            .execute(Select(By::<Option<Task>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TaskNotExists(task_id))
            .map_err(tracerr::wrap!())?;

        if let Reason::Manual { initiator_id, .. } = &reason {
            let initiator = self
                .database()
                .execute(Select(By::<Option<Employee>, _>::new(*initiator_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::EmployeeNotExists(*initiator_id))
                .map_err(tracerr::wrap!())?;

            lifecycle::check(&task, Transition::ReturnToWork, &initiator)
                .map_err(tracerr::from_and_wrap!(=> E))?;
        } else if task.status != Status::UnderReview {
            // The review was decided before the sweep got here.
            return Ok(None);
        }

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

        match &reason {
            Reason::Manual { .. } => {
                lifecycle::check_status(&task, Transition::ReturnToWork)
                    .map_err(tracerr::from_and_wrap!(=> E))?;
            }
            Reason::ReviewExpired => {
                let expired = task.status == Status::UnderReview
                    && task
                        .review_deadline
                        .is_some_and(|d| d.coerce() <= now);
                if !expired {
                    return Ok(None);
                }
            }
        }

        if let Reason::Manual {
            initiator_id,
            comment,
        } = &reason
        {
            log::info!(
                "`Task(id: {task_id})` returned to work by \
                 `Employee(id: {initiator_id})`: {comment}",
            );
        }

        task.status = Status::InProgress;
        task.review_deadline = None;
        tx.execute(Insert(task.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Some(task))
    }
}

/// Error of [`ReturnTaskToWork`] [`Command`] execution.
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

#[cfg(test)]
mod spec {
    use std::{str::FromStr as _, time::Duration};

    use common::{operations::Insert, Calendar, DateTime, Money};
    use time::UtcOffset;

    use crate::{
        domain::{
            employee::{self, Grade, Points, Role},
            org,
            task::{self, Kind, Mode, Status, Value},
            Employee, Task,
        },
        infra::InMemory,
        lifecycle,
        Config, Service,
    };

    use super::{Command as _, ExecutionError, Reason, ReturnTaskToWork};

    fn service() -> Service<InMemory> {
        let calendar = Calendar::with_offset(UtcOffset::UTC);
        let (service, _) =
            Service::new(Config::with_calendar(calendar), InMemory::new());
        service
    }

    fn employee(role: Role, department_id: org::DepartmentId) -> Employee {
        Employee {
            id: employee::Id::new(),
            name: "Ada Sterling".parse().unwrap(),
            role,
            department_id,
            management_id: None,
            division_id: None,
            points: Points::from(150),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    fn under_review_task(
        department_id: org::DepartmentId,
        creator_id: employee::Id,
        review_deadline: Option<task::ReviewDateTime>,
    ) -> Task {
        let now = DateTime::now();
        Task {
            id: task::Id::new(),
            title: "Payroll export".parse().unwrap(),
            description: "Export the payroll batch".parse().unwrap(),
            kind: Kind::Unit,
            mode: Mode::Money,
            status: Status::UnderReview,
            department_id,
            management_id: None,
            division_id: None,
            creator_id,
            executor_id: Some(employee::Id::new()),
            minimum_grade: Grade::D,
            deadline: (now + Duration::from_secs(7 * 24 * 3_600)).coerce(),
            base_value: Value::Money(Money::from_str("100USD").unwrap()),
            auction: None,
            earned_value: None,
            review_deadline,
            done_at: None,
            assigned_points: None,
            created_at: now.coerce(),
        }
    }

    #[tokio::test]
    async fn manual_return_clears_review_deadline() {
        let service = service();
        let dept = org::DepartmentId::new();
        let creator = employee(Role::Employee, dept);
        let deadline =
            (DateTime::now() + Duration::from_secs(24 * 3_600)).coerce();
        let task = under_review_task(dept, creator.id, Some(deadline));
        let task_id = task.id;
        service.database().execute(Insert(creator.clone())).await.unwrap();
        service.database().execute(Insert(task)).await.unwrap();

        let returned = service
            .execute(ReturnTaskToWork {
                task_id,
                reason: Reason::Manual {
                    initiator_id: creator.id,
                    comment: "Numbers don't add up, please redo"
                        .parse()
                        .unwrap(),
                },
            })
            .await
            .unwrap()
            .expect("task should return to work");

        assert_eq!(returned.status, Status::InProgress);
        assert!(returned.review_deadline.is_none());
    }

    #[tokio::test]
    async fn manual_return_requires_permission() {
        let service = service();
        let dept = org::DepartmentId::new();
        let creator = employee(Role::Employee, dept);
        let bystander = employee(Role::Employee, dept);
        let task = under_review_task(dept, creator.id, None);
        let task_id = task.id;
        service.database().execute(Insert(creator)).await.unwrap();
        service
            .database()
            .execute(Insert(bystander.clone()))
            .await
            .unwrap();
        service.database().execute(Insert(task)).await.unwrap();

        let err = service
            .execute(ReturnTaskToWork {
                task_id,
                reason: Reason::Manual {
                    initiator_id: bystander.id,
                    comment: "Looks off".parse().unwrap(),
                },
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
    async fn expired_review_returns_without_comment() {
        let service = service();
        let dept = org::DepartmentId::new();
        let creator = employee(Role::Employee, dept);
        let elapsed =
            (DateTime::now() - Duration::from_secs(3_600)).coerce();
        let task = under_review_task(dept, creator.id, Some(elapsed));
        let task_id = task.id;
        service.database().execute(Insert(creator)).await.unwrap();
        service.database().execute(Insert(task)).await.unwrap();

        let returned = service
            .execute(ReturnTaskToWork {
                task_id,
                reason: Reason::ReviewExpired,
            })
            .await
            .unwrap()
            .expect("expired review should force a return");

        assert_eq!(returned.status, Status::InProgress);
        assert!(returned.review_deadline.is_none());
    }

    #[tokio::test]
    async fn pending_review_is_left_alone() {
        let service = service();
        let dept = org::DepartmentId::new();
        let creator = employee(Role::Employee, dept);
        let pending =
            (DateTime::now() + Duration::from_secs(3_600)).coerce();
        let task = under_review_task(dept, creator.id, Some(pending));
        let task_id = task.id;
        service.database().execute(Insert(creator)).await.unwrap();
        service.database().execute(Insert(task)).await.unwrap();

        let outcome = service
            .execute(ReturnTaskToWork {
                task_id,
                reason: Reason::ReviewExpired,
            })
            .await
            .unwrap();
        assert!(outcome.is_none());
    }
}
