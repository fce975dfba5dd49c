//! [`ExpireReviews`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{By, Perform, Select, Start},
    DateTime,
};
use tokio::time::{interval, MissedTickBehavior};
use tracerr::Traced;
use tracing as log;

use crate::{
    command::{return_task_to_work, ReturnTaskToWork},
    domain,
    infra::{database, Database},
    read::task::Expired,
    Command, Service,
};

use super::Task;

/// Configuration for [`ExpireReviews`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between review expiration sweeps.
    pub interval: time::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: time::Duration::from_secs(5 * 60),
        }
    }
}

/// [`Task`] force-returning under-review tasks past their review deadline.
///
/// The automatic return needs no reviewer comment. Items are processed
/// independently; a failure on one task is logged and does not abort the
/// sweep of the remaining ones. The first sweep runs immediately at
/// startup, and ticks never overlap.
#[derive(Clone, Copy, Debug)]
pub struct ExpireReviews<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<ExpireReviews<Self>, Config>>> for Service<Db>
where
    ExpireReviews<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ExpireReviews<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = ExpireReviews {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::ExpireReviews` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for ExpireReviews<Service<Db>>
where
    Db: Database<
        Select<By<Vec<Expired<domain::Task>>, DateTime>>,
        Ok = Vec<Expired<domain::Task>>,
        Err = Traced<database::Error>,
    >,
    Service<Db>: Command<
        ReturnTaskToWork,
        Ok = Option<domain::Task>,
        Err = Traced<return_task_to_work::ExecutionError>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let now = DateTime::now();
        let tasks = self
            .service
            .database()
            .execute(Select(By::<Vec<Expired<domain::Task>>, _>::new(now)))
            .await
            .map_err(tracerr::wrap!())?;

        for Expired(task) in tasks {
            let task_id = task.id;
            let cmd = ReturnTaskToWork {
                task_id,
                reason: return_task_to_work::Reason::ReviewExpired,
            };
            match self.service.execute(cmd).await {
                Ok(Some(_)) => {
                    log::info!(
                        "expired review of `Task(id: {task_id})` returned \
                         to work",
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    log::error!(
                        "failed to expire review of \
                         `Task(id: {task_id})`: {e}",
                    );
                }
            }
        }

        Ok(())
    }
}

/// Error of [`ExpireReviews`] execution.
pub type ExecutionError = Traced<database::Error>;

#[cfg(test)]
mod spec {
    use std::{str::FromStr as _, time::Duration};

    use common::{
        operations::{By, Insert, Perform, Select},
        Calendar, DateTime, Money,
    };
    use time::UtcOffset;

    use crate::{
        domain::{
            employee,
            employee::Grade,
            org,
            task::{self, Kind, Mode, Status, Value},
            Task as DomainTask,
        },
        infra::InMemory,
        Config, Service, Task as _,
    };

    use super::{Config as TaskConfig, ExpireReviews};

    fn service() -> Service<InMemory> {
        let calendar = Calendar::with_offset(UtcOffset::UTC);
        let (service, _) =
            Service::new(Config::with_calendar(calendar), InMemory::new());
        service
    }

    fn under_review_task(
        review_deadline: task::ReviewDateTime,
    ) -> DomainTask {
        let now = DateTime::now();
        DomainTask {
            id: task::Id::new(),
            title: "Catalog cleanup".parse().unwrap(),
            description: "Clean the product catalog".parse().unwrap(),
            kind: Kind::Unit,
            mode: Mode::Money,
            status: Status::UnderReview,
            department_id: org::DepartmentId::new(),
            management_id: None,
            division_id: None,
            creator_id: employee::Id::new(),
            executor_id: Some(employee::Id::new()),
            minimum_grade: Grade::D,
            deadline: (now + Duration::from_secs(7 * 24 * 3_600)).coerce(),
            base_value: Value::Money(Money::from_str("100USD").unwrap()),
            auction: None,
            earned_value: None,
            review_deadline: Some(review_deadline),
            done_at: None,
            assigned_points: None,
            created_at: now.coerce(),
        }
    }

    #[tokio::test]
    async fn sweep_returns_only_expired_reviews() {
        let service = service();
        let now = DateTime::now();
        let expired =
            under_review_task((now - Duration::from_secs(3_600)).coerce());
        let expired_id = expired.id;
        let pending =
            under_review_task((now + Duration::from_secs(3_600)).coerce());
        let pending_id = pending.id;
        // The sweeper acts on its own: no employee records are needed.
        service.database().execute(Insert(expired)).await.unwrap();
        service.database().execute(Insert(pending)).await.unwrap();

        let sweep = ExpireReviews {
            config: TaskConfig::default(),
            service: service.clone(),
        };
        sweep.execute(Perform(())).await.unwrap();

        let returned: Option<DomainTask> = service
            .database()
            .execute(Select(By::<Option<DomainTask>, _>::new(expired_id)))
            .await
            .unwrap();
        let returned = returned.unwrap();
        assert_eq!(returned.status, Status::InProgress);
        assert!(returned.review_deadline.is_none());

        let untouched: Option<DomainTask> = service
            .database()
            .execute(Select(By::<Option<DomainTask>, _>::new(pending_id)))
            .await
            .unwrap();
        assert_eq!(untouched.unwrap().status, Status::UnderReview);
    }
}
