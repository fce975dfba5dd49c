//! Service contains the work-allocation engine of the platform: auction
//! pricing and settlement, the task lifecycle state machine, and the
//! periodic sweeper driving both.
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod auction;
pub mod command;
pub mod domain;
pub mod infra;
pub mod lifecycle;
pub mod query;
pub mod read;
pub mod task;

use std::error::Error;

use common::{
    operations::{By, Start},
    Calendar,
};

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query, task::Task};

/// Review policy of submitted tasks.
#[derive(Clone, Copy, Debug)]
pub struct ReviewPolicy {
    /// Number of working hours a reviewer has to decide before the task is
    /// returned to work automatically.
    pub working_hours: u32,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self { working_hours: 48 }
    }
}

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Working-hours [`Calendar`] of the organization.
    pub calendar: Calendar,

    /// Auction pricing [`Schedule`].
    ///
    /// [`Schedule`]: auction::Schedule
    pub schedule: auction::Schedule,

    /// Auction settlement [`Policy`].
    ///
    /// [`Policy`]: auction::Policy
    pub settlement: auction::Policy,

    /// [`ReviewPolicy`] of submitted tasks.
    pub review: ReviewPolicy,

    /// [`task::SettleAuctions`] configuration.
    pub settle_auctions: task::settle_auctions::Config,

    /// [`task::ExpireReviews`] configuration.
    pub expire_reviews: task::expire_reviews::Config,
}

impl Config {
    /// Creates a new [`Config`] with the reference policies over the
    /// provided [`Calendar`].
    #[must_use]
    pub fn with_calendar(calendar: Calendar) -> Self {
        Self {
            calendar,
            schedule: auction::Schedule::default(),
            settlement: auction::Policy::default(),
            review: ReviewPolicy::default(),
            settle_auctions: task::settle_auctions::Config::default(),
            expire_reviews: task::expire_reviews::Config::default(),
        }
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters, spawning its
    /// sweeper [`Task`]s into the returned [`Background`] environment.
    ///
    /// [`Background`]: task::Background
    pub fn new(config: Config, database: Db) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::SettleAuctions<Self>,
                        task::settle_auctions::Config,
                    >,
                >,
                Ok = (),
                Err: Error + 'static,
            > + Task<
                Start<By<task::ExpireReviews<Self>, task::expire_reviews::Config>>,
                Ok = (),
                Err: Error + 'static,
            > + Clone
            + 'static,
    {
        let this = Service { config, database };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().settle_auctions)))
                .await
        });
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().expire_reviews))).await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}
