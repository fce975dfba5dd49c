//! Domain model of the work-allocation engine.

pub mod bid;
pub mod employee;
pub mod org;
pub mod points;
pub mod task;

pub use self::{
    bid::Bid, employee::Employee, points::PointTransaction, task::Task,
};
