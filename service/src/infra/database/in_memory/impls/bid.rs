//! [`Bid`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{bid, employee::Role, task, Bid},
    infra::{
        database::{self, in_memory::Store},
        Database, InMemory,
    },
    read::bid::{Active, Competing},
};

impl<C> Database<Select<By<Option<Bid>, bid::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Option<Bid>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Bid>, bid::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_state(move |state| state.bids.get(&id).cloned())
            .await
    }
}

impl<C> Database<Select<By<Vec<Active<Bid>>, task::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<Active<Bid>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Active<Bid>>, task::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let task_id = by.into_inner();
        self.with_state(move |state| {
            state
                .bids
                .values()
                .filter(|b| b.task_id == task_id && b.is_active)
                .cloned()
                .sorted_by_key(|b| (b.created_at, b.id))
                .map(Active)
                .collect()
        })
        .await
    }
}

impl<C> Database<Select<By<Vec<Competing<Bid>>, task::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<Competing<Bid>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Competing<Bid>>, task::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let task_id = by.into_inner();
        self.with_state(move |state| {
            state
                .bids
                .values()
                .filter(|b| b.task_id == task_id && b.is_active)
                .filter(|b| {
                    state.employees.get(&b.bidder_id).is_some_and(|e| {
                        e.role != Role::Admin && e.deleted_at.is_none()
                    })
                })
                .cloned()
                .sorted_by_key(|b| (b.created_at, b.id))
                .map(Competing)
                .collect()
        })
        .await
    }
}

impl<C> Database<Insert<Bid>> for InMemory<C>
where
    C: Store,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(bid): Insert<Bid>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(move |state| {
            let _ = state.bids.insert(bid.id, bid);
        })
        .await
    }
}
