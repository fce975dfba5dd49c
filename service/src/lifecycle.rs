//! [`Task`] lifecycle state machine.
//!
//! Pure transition table and actor guards. Commands evaluate these checks
//! before performing any write, so a rejected transition never mutates
//! state.

use derive_more::Display;

use crate::domain::{
    employee,
    task::{self, Status},
    Employee, Task,
};

/// Legal transition of a [`Task`] between two [`Status`]es.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transition {
    /// [`Status::Backlog`] → [`Status::InProgress`].
    ///
    /// Performed manually, or automatically by auction settlement.
    Start,

    /// [`Status::InProgress`] → [`Status::UnderReview`].
    SubmitForReview,

    /// [`Status::UnderReview`] → [`Status::InProgress`].
    ReturnToWork,

    /// [`Status::UnderReview`] → [`Status::Done`].
    Complete,
}

impl Transition {
    /// Returns the [`Status`] this [`Transition`] departs from.
    #[must_use]
    pub fn source(self) -> Status {
        match self {
            Self::Start => Status::Backlog,
            Self::SubmitForReview => Status::InProgress,
            Self::ReturnToWork | Self::Complete => Status::UnderReview,
        }
    }

    /// Returns the [`Status`] this [`Transition`] arrives at.
    #[must_use]
    pub fn target(self) -> Status {
        match self {
            Self::Start | Self::ReturnToWork => Status::InProgress,
            Self::SubmitForReview => Status::UnderReview,
            Self::Complete => Status::Done,
        }
    }
}

/// Checks that the provided [`Task`] is in the [`Transition`]'s source
/// [`Status`].
///
/// This is the status-only half of [`check()`], used by automatic paths
/// (settlement, review expiration) that act on behalf of no [`Employee`].
///
/// # Errors
///
/// [`Error::InvalidTransition`] if the [`Task`] is in any other [`Status`].
pub fn check_status(task: &Task, transition: Transition) -> Result<(), Error> {
    if task.status == transition.source() {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            from: task.status,
            to: transition.target(),
        })
    }
}

/// Checks that the provided [`Employee`] may perform the [`Transition`] on
/// the [`Task`].
///
/// # Errors
///
/// - [`Error::InvalidTransition`] if the [`Task`] is not in the
///   [`Transition`]'s source [`Status`].
/// - [`Error::ExecutorNotAssigned`] if [`Transition::Start`] is requested
///   for a [`Task`] without an executor.
/// - [`Error::PermissionDenied`] if the [`Employee`] has no right to perform
///   the [`Transition`].
pub fn check(
    task: &Task,
    transition: Transition,
    initiator: &Employee,
) -> Result<(), Error> {
    use Transition as T;

    check_status(task, transition)?;

    let is_executor = task.executor_id == Some(initiator.id);
    let is_creator = task.creator_id == initiator.id;
    let is_director = initiator.is_director_of(task.department_id);
    let is_admin = initiator.is_admin();

    let permitted = match transition {
        T::Start => {
            if task.executor_id.is_none() {
                return Err(Error::ExecutorNotAssigned(task.id));
            }
            is_executor || is_director || is_admin
        }
        T::SubmitForReview => is_executor || is_admin,
        T::ReturnToWork => is_creator || is_director || is_admin,
        T::Complete => is_director || is_admin,
    };

    if permitted {
        Ok(())
    } else {
        Err(Error::PermissionDenied {
            task_id: task.id,
            employee_id: initiator.id,
        })
    }
}

/// Error of checking a [`Transition`].
#[derive(Clone, Copy, Debug, Display, derive_more::Error)]
pub enum Error {
    /// The requested [`Status`] change is not a legal [`Transition`].
    #[display("illegal transition from `{from}` to `{to}`")]
    InvalidTransition {
        /// Current [`Status`] of the [`Task`].
        from: Status,

        /// Requested target [`Status`].
        to: Status,
    },

    /// [`Transition::Start`] requested for a [`Task`] without an executor.
    #[display("`Task(id: {_0})` has no executor assigned")]
    ExecutorNotAssigned(#[error(not(source))] task::Id),

    /// The initiator has no right to perform the [`Transition`].
    #[display(
        "`Employee(id: {employee_id})` may not transition `Task(id: {task_id})`"
    )]
    PermissionDenied {
        /// ID of the [`Task`] being transitioned.
        task_id: task::Id,

        /// ID of the initiating [`Employee`].
        employee_id: employee::Id,
    },
}
