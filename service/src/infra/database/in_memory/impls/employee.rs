//! [`Employee`]- and ledger-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{employee, Employee, PointTransaction},
    infra::{
        database::{self, in_memory::Store},
        Database, InMemory,
    },
};

impl<C> Database<Select<By<Option<Employee>, employee::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Option<Employee>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Employee>, employee::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_state(move |state| state.employees.get(&id).cloned())
            .await
    }
}

impl<C> Database<Insert<Employee>> for InMemory<C>
where
    C: Store,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(employee): Insert<Employee>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(move |state| {
            let _ = state.employees.insert(employee.id, employee);
        })
        .await
    }
}

impl<C> Database<Update<employee::NewPoints>> for InMemory<C>
where
    C: Store,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(new): Update<employee::NewPoints>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(move |state| {
            if let Some(employee) = state.employees.get_mut(&new.employee_id)
            {
                employee.points = new.points;
            }
        })
        .await
    }
}

impl<C> Database<Insert<PointTransaction>> for InMemory<C>
where
    C: Store,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(tx): Insert<PointTransaction>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(move |state| state.ledger.push(tx)).await
    }
}

impl<C> Database<Select<By<Vec<PointTransaction>, employee::Id>>>
    for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<PointTransaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<PointTransaction>, employee::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let employee_id = by.into_inner();
        self.with_state(move |state| {
            state
                .ledger
                .iter()
                .filter(|tx| tx.employee_id == employee_id)
                .cloned()
                .collect()
        })
        .await
    }
}
