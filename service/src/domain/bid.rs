//! [`Bid`] definitions.

use common::{unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{employee, task};
#[cfg(doc)]
use crate::domain::{Employee, Task};

/// Competing offer to execute a [`Task`] for the stated value.
///
/// Immutable after creation, except the [`is_active`] soft-delete flag:
/// historical bids stay visible for audit.
///
/// [`is_active`]: Bid::is_active
#[derive(Clone, Debug)]
pub struct Bid {
    /// ID of this [`Bid`].
    pub id: Id,

    /// ID of the [`Task`] this [`Bid`] competes for.
    pub task_id: task::Id,

    /// ID of the bidding [`Employee`].
    pub bidder_id: employee::Id,

    /// Name of the bidding [`Employee`] at bid time.
    pub bidder_name: employee::Name,

    /// [`Points`] of the bidding [`Employee`] at bid time.
    ///
    /// Snapshotted, not live-joined: later score changes don't reorder
    /// already placed bids.
    ///
    /// [`Points`]: employee::Points
    pub bidder_points: employee::Points,

    /// [`Grade`] of the bidding [`Employee`] at bid time.
    ///
    /// [`Grade`]: employee::Grade
    pub bidder_grade: employee::Grade,

    /// Offered [`Value`].
    ///
    /// [`Value`]: task::Value
    pub value: task::Value,

    /// Indicator whether this [`Bid`] still competes.
    pub is_active: bool,

    /// [`DateTime`] when this [`Bid`] was placed.
    pub created_at: CreationDateTime,
}

/// ID of a [`Bid`].
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
    Ord,
    PartialEq,
    PartialOrd,
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

/// [`DateTime`] when a [`Bid`] was placed.
pub type CreationDateTime = DateTimeOf<(Bid, unit::Creation)>;
