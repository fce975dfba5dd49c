//! [`Task`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select},
    DateTime,
};
use itertools::Itertools as _;
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    domain::{
        task::{self, Status},
        Task,
    },
    infra::{
        database::{self, in_memory::Store},
        Database, InMemory,
    },
    read::task::{Closeable, Expired},
};

impl<C> Database<Select<By<Option<Task>, task::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Option<Task>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Task>, task::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_state(move |state| state.tasks.get(&id).cloned())
            .await
    }
}

impl<C> Database<Select<By<Vec<Closeable<Task>>, DateTime>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<Closeable<Task>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Closeable<Task>>, DateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let now = by.into_inner();
        self.with_state(move |state| {
            state
                .tasks
                .values()
                .filter(|t| {
                    t.status == Status::Backlog
                        && t.is_auctionable()
                        && t.auction.as_ref().is_some_and(|a| {
                            a.planned_end_at.coerce() <= now
                        })
                })
                .cloned()
                .sorted_by_key(|t| (t.created_at, Uuid::from(t.id)))
                .map(Closeable)
                .collect()
        })
        .await
    }
}

impl<C> Database<Select<By<Vec<Expired<Task>>, DateTime>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<Expired<Task>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Expired<Task>>, DateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let now = by.into_inner();
        self.with_state(move |state| {
            state
                .tasks
                .values()
                .filter(|t| {
                    t.status == Status::UnderReview
                        && t.review_deadline
                            .is_some_and(|d| d.coerce() <= now)
                })
                .cloned()
                .sorted_by_key(|t| (t.created_at, Uuid::from(t.id)))
                .map(Expired)
                .collect()
        })
        .await
    }
}

impl<C> Database<Insert<Task>> for InMemory<C>
where
    C: Store,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(task): Insert<Task>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(move |state| {
            let _ = state.tasks.insert(task.id, task);
        })
        .await
    }
}

impl<C> Database<Lock<By<Task, task::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Task, task::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // A transaction holds the whole state exclusively, so there is no
        // row-level lock left to take.
        let _ = by.into_inner();
        self.with_state(|_| ()).await
    }
}
