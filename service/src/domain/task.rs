//! [`Task`] definitions.

use std::{cmp::Ordering, fmt};

use common::{define_kind, unit, DateTimeOf, Minutes, Money};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{employee, org};
#[cfg(doc)]
use crate::domain::{Bid, Employee};

/// Unit of work, either assigned directly or auctioned.
#[derive(Clone, Debug)]
pub struct Task {
    /// ID of this [`Task`].
    pub id: Id,

    /// [`Title`] of this [`Task`].
    pub title: Title,

    /// [`Description`] of this [`Task`].
    pub description: Description,

    /// [`Kind`] of this [`Task`].
    pub kind: Kind,

    /// [`Mode`] of the value this [`Task`] is exchanged for.
    pub mode: Mode,

    /// [`Status`] of this [`Task`].
    pub status: Status,

    /// ID of the department this [`Task`] belongs to.
    pub department_id: org::DepartmentId,

    /// ID of the management this [`Task`] is scoped to, if any.
    pub management_id: Option<org::ManagementId>,

    /// ID of the division this [`Task`] is scoped to, if any.
    pub division_id: Option<org::DivisionId>,

    /// ID of the [`Employee`] who created this [`Task`].
    pub creator_id: employee::Id,

    /// ID of the [`Employee`] executing this [`Task`], once assigned.
    pub executor_id: Option<employee::Id>,

    /// Minimum [`Grade`] required to bid on this [`Task`].
    ///
    /// [`Grade`]: employee::Grade
    pub minimum_grade: employee::Grade,

    /// Hard completion deadline of this [`Task`].
    pub deadline: DeadlineDateTime,

    /// Base [`Value`] of this [`Task`], the floor of its auction.
    pub base_value: Value,

    /// [`Auction`] of this [`Task`].
    ///
    /// [`None`] for tasks never offered to bidders, [`Kind::Individual`]
    /// ones in particular.
    pub auction: Option<Auction>,

    /// [`Value`] owed to the executor, stamped at settlement.
    pub earned_value: Option<Value>,

    /// [`DateTime`] when the pending review of this [`Task`] expires.
    pub review_deadline: Option<ReviewDateTime>,

    /// [`DateTime`] when this [`Task`] was completed.
    pub done_at: Option<CompletionDateTime>,

    /// [`Points`] assigned to the executor on completion.
    ///
    /// [`Points`]: employee::Points
    pub assigned_points: Option<employee::Points>,

    /// [`DateTime`] when this [`Task`] was created.
    pub created_at: CreationDateTime,
}

impl Task {
    /// Returns the [`Status`] a newly created [`Task`] of the provided
    /// [`Kind`] starts in.
    ///
    /// [`Kind::Individual`] tasks are assigned directly and so skip
    /// [`Status::Backlog`] entirely.
    #[must_use]
    pub fn initial_status(kind: Kind) -> Status {
        match kind {
            Kind::Individual => Status::InProgress,
            Kind::Unit | Kind::Department => Status::Backlog,
        }
    }

    /// Returns whether this [`Task`] may be offered to bidders at all.
    #[must_use]
    pub fn is_auctionable(&self) -> bool {
        self.kind != Kind::Individual
    }
}

/// ID of a [`Task`].
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

/// Title of a [`Task`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `title` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 512
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Description of a [`Task`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `description` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description
            && !description.is_empty()
            && description.len() <= 4096
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Comment explaining why a [`Task`] was returned to work from review.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Comment(String);

impl Comment {
    /// Creates a new [`Comment`] if the given `comment` is non-empty.
    #[must_use]
    pub fn new(comment: impl Into<String>) -> Option<Self> {
        let comment = comment.into();
        let trimmed = !comment.trim().is_empty() && comment.len() <= 4096;
        trimmed.then_some(Self(comment))
    }
}

impl FromStr for Comment {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Comment`")
    }
}

define_kind! {
    #[doc = "Lifecycle status of a [`Task`]."]
    enum Status {
        #[doc = "Waiting for an executor, open for bids when auctioned."]
        Backlog = 1,

        #[doc = "Being executed."]
        InProgress = 2,

        #[doc = "Submitted for review."]
        UnderReview = 3,

        #[doc = "Accepted, terminal."]
        Done = 4,
    }
}

define_kind! {
    #[doc = "Kind of a [`Task`], defining its assignment scope."]
    enum Kind {
        #[doc = "Assigned directly to a single [`Employee`], never auctioned."]
        Individual = 1,

        #[doc = "Auctioned within a unit."]
        Unit = 2,

        #[doc = "Auctioned across a whole department."]
        Department = 3,
    }
}

define_kind! {
    #[doc = "Unit of value a [`Task`] is exchanged for."]
    enum Mode {
        #[doc = "A money amount."]
        Money = 1,

        #[doc = "A worked-minutes amount."]
        Time = 2,
    }
}

/// Mode-tagged value of a [`Task`] or a [`Bid`].
///
/// Carrying the amount together with its [`Mode`] makes "exactly one of the
/// money/time amounts is populated" structural.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Value {
    /// A [`Mode::Money`] amount.
    Money(Money),

    /// A [`Mode::Time`] amount.
    Time(Minutes),
}

impl Value {
    /// Returns the [`Mode`] of this [`Value`].
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Self::Money(_) => Mode::Money,
            Self::Time(_) => Mode::Time,
        }
    }

    /// Compares the amounts of two [`Value`]s, ascending.
    ///
    /// Values of different [`Mode`]s never compete within one auction; the
    /// cross-mode arms only keep this order total.
    #[must_use]
    pub fn cmp_amount(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Money(a), Self::Money(b)) => a.amount.cmp(&b.amount),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::Money(_), Self::Time(_)) => Ordering::Less,
            (Self::Time(_), Self::Money(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Money(money) => fmt::Display::fmt(money, f),
            Self::Time(minutes) => fmt::Display::fmt(minutes, f),
        }
    }
}

/// Auction state of a [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Auction {
    /// [`DateTime`] when the auction opens.
    pub start_at: AuctionStartDateTime,

    /// [`DateTime`] when the auction is planned to close.
    pub planned_end_at: AuctionPlannedEndDateTime,

    /// [`DateTime`] when the auction actually closed, stamped at settlement.
    pub end_at: Option<AuctionEndDateTime>,

    /// Indicator whether at least one active [`Bid`] references the task.
    ///
    /// Kept consistent with the live bid set transactionally.
    pub has_bids: bool,

    /// Last computed auction value, cached once a [`Bid`] exists.
    pub current_price: Option<Value>,
}

/// Marker type indicating an auction opening.
#[derive(Clone, Copy, Debug)]
pub struct AuctionStart;

/// Marker type indicating a planned auction close.
#[derive(Clone, Copy, Debug)]
pub struct AuctionPlannedEnd;

/// Marker type indicating an actual auction close.
#[derive(Clone, Copy, Debug)]
pub struct AuctionEnd;

/// Marker type indicating a [`Task`] completion deadline.
#[derive(Clone, Copy, Debug)]
pub struct Deadline;

/// Marker type indicating a [`Task`] review expiration.
#[derive(Clone, Copy, Debug)]
pub struct Review;

/// [`DateTime`] when a [`Task`]'s auction opens.
pub type AuctionStartDateTime = DateTimeOf<(Task, AuctionStart)>;

/// [`DateTime`] when a [`Task`]'s auction is planned to close.
pub type AuctionPlannedEndDateTime = DateTimeOf<(Task, AuctionPlannedEnd)>;

/// [`DateTime`] when a [`Task`]'s auction actually closed.
pub type AuctionEndDateTime = DateTimeOf<(Task, AuctionEnd)>;

/// [`DateTime`] of a [`Task`]'s hard completion deadline.
pub type DeadlineDateTime = DateTimeOf<(Task, Deadline)>;

/// [`DateTime`] when a [`Task`]'s pending review expires.
pub type ReviewDateTime = DateTimeOf<(Task, Review)>;

/// [`DateTime`] when a [`Task`] was completed.
pub type CompletionDateTime = DateTimeOf<(Task, unit::Completion)>;

/// [`DateTime`] when a [`Task`] was created.
pub type CreationDateTime = DateTimeOf<(Task, unit::Creation)>;
