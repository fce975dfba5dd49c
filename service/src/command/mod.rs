//! [`Command`] definition.

pub mod complete_task;
pub mod place_bid;
pub mod return_task_to_work;
pub mod settle_auction;
pub mod start_task;
pub mod submit_task_for_review;
pub mod withdraw_bid;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    complete_task::CompleteTask, place_bid::PlaceBid,
    return_task_to_work::ReturnTaskToWork, settle_auction::SettleAuction,
    start_task::StartTask, submit_task_for_review::SubmitTaskForReview,
    withdraw_bid::WithdrawBid,
};
