//! Auction engine: pricing, ranking and settlement decisions.
//!
//! Everything here is pure: functions of a task snapshot, its bids and the
//! current instant. Mutations happen in [`command`]s only.
//!
//! [`command`]: crate::command

pub mod price;
pub mod ranking;
pub mod settlement;

pub use self::{
    price::Schedule,
    settlement::{Decision, Policy},
};
