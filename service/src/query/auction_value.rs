//! [`Query`] of a [`Task`]'s current auction value.

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        task::{self, Value},
        Task,
    },
    infra::{database, Database},
    Service,
};

use super::Query;

/// [`Query`] of a [`Task`]'s current auction value.
///
/// This is the value a UI polls to render the ticking price. Resolves to
/// [`None`] for tasks without an auction window.
#[derive(Clone, Copy, Debug)]
pub struct AuctionValue {
    /// ID of the [`Task`] to evaluate.
    pub task_id: task::Id,
}

impl<Db> Query<AuctionValue> for Service<Db>
where
    Db: Database<
        Select<By<Option<Task>, task::Id>>,
        Ok = Option<Task>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Value>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: AuctionValue,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuctionValue { task_id } = query;

        let task = self
            .database()
            .execute(Select(By::<Option<Task>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TaskNotExists(task_id))
            .map_err(tracerr::wrap!())?;

        Ok(self.config().schedule.current_value(
            task.auction.as_ref(),
            task.base_value,
            DateTime::now(),
        ))
    }
}

/// Error of [`AuctionValue`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

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
            employee::{self, Grade},
            org,
            task::{self, Auction, Kind, Mode, Status, Value},
            Task,
        },
        infra::InMemory,
        Config, Service,
    };

    use super::{AuctionValue, Query as _};

    fn service() -> Service<InMemory> {
        let calendar = Calendar::with_offset(UtcOffset::UTC);
        let (service, _) =
            Service::new(Config::with_calendar(calendar), InMemory::new());
        service
    }

    fn task(auction: Option<Auction>) -> Task {
        let now = DateTime::now();
        Task {
            id: task::Id::new(),
            title: "Window inspection".parse().unwrap(),
            description: "Inspect the new windows".parse().unwrap(),
            kind: Kind::Unit,
            mode: Mode::Money,
            status: Status::Backlog,
            department_id: org::DepartmentId::new(),
            management_id: None,
            division_id: None,
            creator_id: employee::Id::new(),
            executor_id: None,
            minimum_grade: Grade::D,
            deadline: (now + Duration::from_secs(7 * 24 * 3_600)).coerce(),
            base_value: Value::Money(Money::from_str("100USD").unwrap()),
            auction,
            earned_value: None,
            review_deadline: None,
            done_at: None,
            assigned_points: None,
            created_at: now.coerce(),
        }
    }

    #[tokio::test]
    async fn reports_escalated_value_mid_window() {
        let service = service();
        let now = DateTime::now();
        let task = task(Some(Auction {
            start_at: (now - Duration::from_secs(7 * 3_600)).coerce(),
            planned_end_at: (now + Duration::from_secs(3 * 3_600)).coerce(),
            end_at: None,
            has_bids: false,
            current_price: None,
        }));
        let task_id = task.id;
        service.database().execute(Insert(task)).await.unwrap();

        let value = service
            .execute(AuctionValue { task_id })
            .await
            .unwrap();
        assert_eq!(
            value,
            Some(Value::Money(Money::from_str("125USD").unwrap())),
        );
    }

    #[tokio::test]
    async fn not_auctionable_without_window() {
        let service = service();
        let task = task(None);
        let task_id = task.id;
        service.database().execute(Insert(task)).await.unwrap();

        let value = service
            .execute(AuctionValue { task_id })
            .await
            .unwrap();
        assert_eq!(value, None);
    }
}
