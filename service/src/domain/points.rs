//! [`PointTransaction`] ledger definitions.

use common::{define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{employee, task};
#[cfg(doc)]
use crate::domain::{Employee, Task};

/// Immutable ledger entry awarding or penalizing an [`Employee`]'s score.
///
/// Written only on [`Task`] completion or administrative action; never
/// updated or deleted afterwards.
#[derive(Clone, Debug)]
pub struct PointTransaction {
    /// ID of this [`PointTransaction`].
    pub id: Id,

    /// ID of the [`Employee`] whose score changes.
    pub employee_id: employee::Id,

    /// ID of the [`Task`] this entry is tied to, if any.
    pub task_id: Option<task::Id>,

    /// Signed [`Points`] amount of this entry.
    ///
    /// [`Points`]: employee::Points
    pub amount: employee::Points,

    /// [`Reason`] of this entry.
    pub reason: Reason,

    /// [`DateTime`] when this entry was written.
    pub created_at: CreationDateTime,
}

/// ID of a [`PointTransaction`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Reason of a [`PointTransaction`]."]
    enum Reason {
        #[doc = "Base award for completing a [`Task`]."]
        TaskCompletion = 1,

        #[doc = "Penalty for completing a [`Task`] past its deadline."]
        OverduePenalty = 2,

        #[doc = "Manual administrative correction."]
        Administrative = 3,
    }
}

/// [`DateTime`] when a [`PointTransaction`] was written.
pub type CreationDateTime = DateTimeOf<(PointTransaction, unit::Creation)>;
