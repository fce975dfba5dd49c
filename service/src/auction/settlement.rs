//! Auction settlement decisions.

use std::time::Duration;

use common::DateTime;

use crate::{
    auction::{price::Schedule, ranking},
    domain::{
        task::{Status, Value},
        Bid, Employee, Task,
    },
};

/// Settlement policy of auctions receiving no bids.
#[derive(Clone, Copy, Debug)]
pub struct Policy {
    /// Grace period past the planned end during which a no-bid auction is
    /// still left open.
    ///
    /// Auctions with bids close promptly at the planned end instead.
    pub no_bid_grace: Duration,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            no_bid_grace: Duration::from_secs(3 * 3_600),
        }
    }
}

/// Decision over a single auction at a given instant.
#[derive(Clone, Debug)]
pub enum Decision {
    /// The auction stays open and is re-examined on the next sweep.
    Leave,

    /// No bids arrived in time: the task goes back to its creator at the
    /// escalated value.
    AssignToCreator {
        /// [`Value`] owed to the creator.
        value: Value,
    },

    /// The best [`Bid`] wins at exactly its offered value.
    AssignToWinner {
        /// The winning [`Bid`].
        bid: Bid,

        /// [`Value`] owed to the winner.
        value: Value,
    },
}

/// Returns whether a no-bid auction should fall back to its creator.
///
/// True once `now` is past the planned end plus the [`Policy`] grace period
/// and the auction still has no bids.
#[must_use]
pub fn should_auto_assign_to_creator(
    policy: &Policy,
    task: &Task,
    now: DateTime,
) -> bool {
    task.auction.as_ref().is_some_and(|auction| {
        !auction.has_bids
            && now
                > auction.planned_end_at.coerce::<()>() + policy.no_bid_grace
    })
}

/// Computes the value the executor earns when the auction closes.
///
/// A winning [`Bid`] earns exactly its offered value. Without bids the
/// current escalated value applies, falling back to the absolute ceiling
/// once the window has fully elapsed.
#[must_use]
pub fn earned_value(
    schedule: &Schedule,
    task: &Task,
    winning: Option<&Bid>,
    now: DateTime,
) -> Value {
    if let Some(bid) = winning {
        return bid.value;
    }
    let Some(auction) = &task.auction else {
        return task.base_value;
    };
    if now >= auction.planned_end_at.coerce() {
        schedule.ceiling(task.base_value)
    } else {
        schedule
            .current_value(Some(auction), task.base_value, now)
            .unwrap_or(task.base_value)
    }
}

/// Decides whether and to whom the provided auction closes at `now`.
///
/// `bids` must be the active bids of non-administrative bidders. The
/// function is pure and idempotent: a task no longer in
/// [`Status::Backlog`], or one with no auction window, always yields
/// [`Decision::Leave`].
#[expect(clippy::missing_panics_doc, reason = "non-empty checked")]
#[must_use]
pub fn decide(
    schedule: &Schedule,
    policy: &Policy,
    task: &Task,
    creator: &Employee,
    bids: &[Bid],
    now: DateTime,
) -> Decision {
    if task.status != Status::Backlog || !task.is_auctionable() {
        return Decision::Leave;
    }
    let Some(auction) = &task.auction else {
        return Decision::Leave;
    };

    if bids.is_empty() {
        if should_auto_assign_to_creator(policy, task, now)
            && !creator.is_admin()
        {
            Decision::AssignToCreator {
                value: earned_value(schedule, task, None, now),
            }
        } else {
            Decision::Leave
        }
    } else if now >= auction.planned_end_at.coerce() {
        let bid = ranking::select_winner(bids).expect("non-empty").clone();
        let value = bid.value;
        Decision::AssignToWinner { bid, value }
    } else {
        Decision::Leave
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{DateTime, Money};

    use crate::domain::{
        bid,
        employee::{self, Grade, Points, Role},
        org,
        task::{self, Auction, Kind, Mode, Status, Value},
        Bid, Employee, Task,
    };

    use super::{decide, should_auto_assign_to_creator, Decision, Policy};
    use crate::auction::price::Schedule;

    fn dt(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    fn money(s: &str) -> Value {
        Value::Money(Money::from_str(s).unwrap())
    }

    fn creator(role: Role) -> Employee {
        Employee {
            id: employee::Id::new(),
            name: "Mira Holt".parse().unwrap(),
            role,
            department_id: org::DepartmentId::new(),
            management_id: None,
            division_id: None,
            points: Points::from(200),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    /// Backlog auction opening at 10:00, planned to close at 20:00.
    fn auctioned_task(creator_id: employee::Id) -> Task {
        Task {
            id: task::Id::new(),
            title: "Wire transfer reconciliation".parse().unwrap(),
            description: "Reconcile pending transfers".parse().unwrap(),
            kind: Kind::Unit,
            mode: Mode::Money,
            status: Status::Backlog,
            department_id: org::DepartmentId::new(),
            management_id: None,
            division_id: None,
            creator_id,
            executor_id: None,
            minimum_grade: Grade::D,
            deadline: dt("2026-01-16T17:00:00Z").coerce(),
            base_value: money("100USD"),
            auction: Some(Auction {
                start_at: dt("2026-01-12T10:00:00Z").coerce(),
                planned_end_at: dt("2026-01-12T20:00:00Z").coerce(),
                end_at: None,
                has_bids: false,
                current_price: None,
            }),
            earned_value: None,
            review_deadline: None,
            done_at: None,
            assigned_points: None,
            created_at: dt("2026-01-12T10:00:00Z").coerce(),
        }
    }

    fn bid(value: &str, points: i64) -> Bid {
        Bid {
            id: bid::Id::new(),
            task_id: task::Id::default(),
            bidder_id: employee::Id::new(),
            bidder_name: "Jan Kowalski".parse().unwrap(),
            bidder_points: Points::from(points),
            bidder_grade: Grade::from_points(Points::from(points)),
            value: money(value),
            is_active: true,
            created_at: dt("2026-01-12T11:00:00Z").coerce(),
        }
    }

    #[test]
    fn leaves_open_auction_before_planned_end() {
        let creator = creator(Role::Employee);
        let task = auctioned_task(creator.id);
        let bids = [bid("85USD", 50)];

        let decision = decide(
            &Schedule::default(),
            &Policy::default(),
            &task,
            &creator,
            &bids,
            dt("2026-01-12T15:00:00Z"),
        );
        assert!(matches!(decision, Decision::Leave));
    }

    #[test]
    fn closes_promptly_at_planned_end_with_bids() {
        let creator = creator(Role::Employee);
        let task = auctioned_task(creator.id);
        let winner = bid("85USD", 95);
        let bids = [bid("90USD", 10), winner.clone()];

        let decision = decide(
            &Schedule::default(),
            &Policy::default(),
            &task,
            &creator,
            &bids,
            dt("2026-01-12T20:00:00Z"),
        );
        match decision {
            Decision::AssignToWinner { bid, value } => {
                assert_eq!(bid.id, winner.id);
                assert_eq!(value, money("85USD"));
            }
            Decision::Leave | Decision::AssignToCreator { .. } => {
                panic!("expected `AssignToWinner`")
            }
        }
    }

    #[test]
    fn no_bid_auction_waits_through_grace() {
        let creator = creator(Role::Employee);
        let task = auctioned_task(creator.id);

        assert!(!should_auto_assign_to_creator(
            &Policy::default(),
            &task,
            dt("2026-01-12T22:59:00Z"),
        ));
        let decision = decide(
            &Schedule::default(),
            &Policy::default(),
            &task,
            &creator,
            &[],
            dt("2026-01-12T22:59:00Z"),
        );
        assert!(matches!(decision, Decision::Leave));
    }

    #[test]
    fn no_bid_auction_falls_back_to_creator_past_grace() {
        let creator = creator(Role::Employee);
        let task = auctioned_task(creator.id);
        let now = dt("2026-01-12T23:01:00Z");

        assert!(should_auto_assign_to_creator(&Policy::default(), &task, now));
        let decision = decide(
            &Schedule::default(),
            &Policy::default(),
            &task,
            &creator,
            &[],
            now,
        );
        match decision {
            // The whole window elapsed, so the creator earns the ceiling.
            Decision::AssignToCreator { value } => {
                assert_eq!(value, money("150USD"));
            }
            Decision::Leave | Decision::AssignToWinner { .. } => {
                panic!("expected `AssignToCreator`")
            }
        }
    }

    #[test]
    fn administrator_creators_never_auto_assigned() {
        let creator = creator(Role::Admin);
        let task = auctioned_task(creator.id);

        let decision = decide(
            &Schedule::default(),
            &Policy::default(),
            &task,
            &creator,
            &[],
            dt("2026-01-13T09:00:00Z"),
        );
        assert!(matches!(decision, Decision::Leave));
    }

    #[test]
    fn already_closed_task_is_left_untouched() {
        let creator = creator(Role::Employee);
        let mut task = auctioned_task(creator.id);
        task.status = Status::InProgress;
        let bids = [bid("85USD", 50)];

        let decision = decide(
            &Schedule::default(),
            &Policy::default(),
            &task,
            &creator,
            &bids,
            dt("2026-01-13T09:00:00Z"),
        );
        assert!(matches!(decision, Decision::Leave));
    }
}
