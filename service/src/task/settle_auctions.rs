//! [`SettleAuctions`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{By, Perform, Select, Start},
    DateTime,
};
use tokio::time::{interval, MissedTickBehavior};
use tracerr::Traced;
use tracing as log;

use crate::{
    command::{settle_auction, SettleAuction},
    domain,
    infra::{database, Database},
    read::task::Closeable,
    Command, Service,
};

use super::Task;

/// Configuration for [`SettleAuctions`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between auction settlement sweeps.
    pub interval: time::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: time::Duration::from_secs(5 * 60),
        }
    }
}

/// [`Task`] sweeping auctions whose close condition holds.
///
/// Every tick asks storage for the backlog auctions past their planned end
/// and settles each one independently: a failure on one auction is logged
/// and does not abort the rest of the sweep. The first sweep runs
/// immediately at startup, and ticks never overlap.
#[derive(Clone, Copy, Debug)]
pub struct SettleAuctions<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<SettleAuctions<Self>, Config>>> for Service<Db>
where
    SettleAuctions<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<SettleAuctions<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = SettleAuctions {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            // The sweep body is awaited before the next tick, so sweeps
            // never overlap.
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::SettleAuctions` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for SettleAuctions<Service<Db>>
where
    Db: Database<
        Select<By<Vec<Closeable<domain::Task>>, DateTime>>,
        Ok = Vec<Closeable<domain::Task>>,
        Err = Traced<database::Error>,
    >,
    Service<Db>: Command<
        SettleAuction,
        Ok = Option<domain::Task>,
        Err = Traced<settle_auction::ExecutionError>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let now = DateTime::now();
        let tasks = self
            .service
            .database()
            .execute(Select(By::<Vec<Closeable<domain::Task>>, _>::new(now)))
            .await
            .map_err(tracerr::wrap!())?;

        for Closeable(task) in tasks {
            let task_id = task.id;
            match self.service.execute(SettleAuction { task_id }).await {
                Ok(Some(_)) => {
                    log::info!("auction of `Task(id: {task_id})` settled");
                }
                Ok(None) => {}
                Err(e) => {
                    log::error!(
                        "failed to settle auction of \
                         `Task(id: {task_id})`: {e}",
                    );
                }
            }
        }

        Ok(())
    }
}

/// Error of [`SettleAuctions`] execution.
pub type ExecutionError = Traced<database::Error>;
