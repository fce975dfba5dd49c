//! Organizational structure references.
//!
//! Departments, managements and divisions are owned by the embedding host;
//! the engine only carries their identities to scope [`Task`]s and check
//! directorship.
//!
//! [`Task`]: crate::domain::Task

use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID of a department.
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
pub struct DepartmentId(Uuid);

impl DepartmentId {
    /// Creates a new random [`DepartmentId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// ID of a management inside a department.
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
pub struct ManagementId(Uuid);

impl ManagementId {
    /// Creates a new random [`ManagementId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// ID of a division inside a management.
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
pub struct DivisionId(Uuid);

impl DivisionId {
    /// Creates a new random [`DivisionId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}
