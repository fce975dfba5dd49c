//! Background [`Task`]s definitions.

mod background;
pub mod expire_reviews;
pub mod settle_auctions;

pub use common::Handler as Task;

pub use self::{
    background::Background, expire_reviews::ExpireReviews,
    settle_auctions::SettleAuctions,
};
