//! [`Employee`] definitions.

use std::ops;

use common::{define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::org;

/// Platform employee.
#[derive(Clone, Debug)]
pub struct Employee {
    /// ID of this [`Employee`].
    pub id: Id,

    /// [`Name`] of this [`Employee`].
    pub name: Name,

    /// [`Role`] of this [`Employee`].
    pub role: Role,

    /// ID of the department this [`Employee`] belongs to.
    pub department_id: org::DepartmentId,

    /// ID of the management this [`Employee`] belongs to, if any.
    pub management_id: Option<org::ManagementId>,

    /// ID of the division this [`Employee`] belongs to, if any.
    pub division_id: Option<org::DivisionId>,

    /// Accumulated [`Points`] of this [`Employee`].
    pub points: Points,

    /// [`DateTime`] when this [`Employee`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Employee`] was deleted.
    pub deleted_at: Option<DeletionDateTime>,
}

impl Employee {
    /// Returns the [`Grade`] of this [`Employee`] derived from the
    /// accumulated [`Points`].
    #[must_use]
    pub fn grade(&self) -> Grade {
        Grade::from_points(self.points)
    }

    /// Returns whether this [`Employee`] is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns whether this [`Employee`] directs the provided department.
    #[must_use]
    pub fn is_director_of(&self, department_id: org::DepartmentId) -> bool {
        self.role == Role::Director && self.department_id == department_id
    }
}

/// ID of an [`Employee`].
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

/// Name of an [`Employee`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

define_kind! {
    #[doc = "Role of an [`Employee`]."]
    enum Role {
        #[doc = "Regular employee."]
        Employee = 1,

        #[doc = "Director of a department."]
        Director = 2,

        #[doc = "Platform administrator."]
        Admin = 3,
    }
}

/// Accumulated score of an [`Employee`], also the signed amount of a single
/// award or penalty.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Points(i64);

impl Points {
    /// Zero [`Points`].
    pub const ZERO: Self = Self(0);
}

impl ops::Add for Points {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl ops::Sub for Points {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl ops::Neg for Points {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

define_kind! {
    #[doc = "Grade of an [`Employee`], gating auction eligibility."]
    enum Grade {
        #[doc = "Entry grade."]
        D = 1,

        #[doc = "Junior grade."]
        C = 2,

        #[doc = "Middle grade."]
        B = 3,

        #[doc = "Senior grade."]
        A = 4,
    }
}

impl Grade {
    /// Derives a [`Grade`] from the provided accumulated [`Points`].
    #[must_use]
    pub fn from_points(points: Points) -> Self {
        match i64::from(points) {
            i64::MIN..=99 => Self::D,
            100..=299 => Self::C,
            300..=599 => Self::B,
            600..=i64::MAX => Self::A,
        }
    }

    /// Returns the base [`Points`] awarded for completing a task requiring
    /// this [`Grade`] as its minimum.
    #[must_use]
    pub fn base_points(self) -> Points {
        match self {
            Self::D => Points::from(10),
            Self::C => Points::from(20),
            Self::B => Points::from(30),
            Self::A => Points::from(40),
        }
    }

    /// Returns whether this [`Grade`] is at least the provided one.
    #[must_use]
    pub fn at_least(self, min: Self) -> bool {
        self.u8() >= min.u8()
    }
}

/// New [`Points`] total of an [`Employee`], applied via an update operation.
#[derive(Clone, Copy, Debug)]
pub struct NewPoints {
    /// ID of the [`Employee`] to update.
    pub employee_id: Id,

    /// New accumulated [`Points`] total.
    pub points: Points,
}

/// [`DateTime`] when an [`Employee`] was created.
pub type CreationDateTime = DateTimeOf<(Employee, unit::Creation)>;

/// [`DateTime`] when an [`Employee`] was deleted.
pub type DeletionDateTime = DateTimeOf<(Employee, unit::Deletion)>;

#[cfg(test)]
mod spec {
    use super::{Grade, Points};

    #[test]
    fn grade_thresholds() {
        assert_eq!(Grade::from_points(Points::from(0)), Grade::D);
        assert_eq!(Grade::from_points(Points::from(-50)), Grade::D);
        assert_eq!(Grade::from_points(Points::from(99)), Grade::D);
        assert_eq!(Grade::from_points(Points::from(100)), Grade::C);
        assert_eq!(Grade::from_points(Points::from(299)), Grade::C);
        assert_eq!(Grade::from_points(Points::from(300)), Grade::B);
        assert_eq!(Grade::from_points(Points::from(599)), Grade::B);
        assert_eq!(Grade::from_points(Points::from(600)), Grade::A);
    }

    #[test]
    fn higher_minimum_grade_awards_more_points() {
        assert!(Grade::A.base_points() > Grade::B.base_points());
        assert!(Grade::B.base_points() > Grade::C.base_points());
        assert!(Grade::C.base_points() > Grade::D.base_points());
    }

    #[test]
    fn grade_ordering() {
        assert!(Grade::A.at_least(Grade::D));
        assert!(Grade::B.at_least(Grade::B));
        assert!(!Grade::D.at_least(Grade::C));
    }
}
