//! Bid ranking and winner selection.

use std::cmp::Ordering;

use derive_more::{Display, Error};

use crate::domain::{task::Value, Bid};

/// Totally orders two competing [`Bid`]s, best first.
///
/// A bid ranks better when it:
/// 1. offers a lower value (costs the organization less);
/// 2. comes from a bidder with more snapshotted points;
/// 3. was placed earlier.
///
/// The final tiebreak on the bid ID keeps the order total even for
/// byte-identical competitors, so selection never depends on input order.
#[must_use]
pub fn compare(a: &Bid, b: &Bid) -> Ordering {
    a.value
        .cmp_amount(&b.value)
        .then_with(|| b.bidder_points.cmp(&a.bidder_points))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Selects the best [`Bid`] under [`compare()`], or [`None`] for an empty
/// set.
///
/// Callers pre-filter the set to active bids of non-administrative bidders.
#[must_use]
pub fn select_winner(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().min_by(|a, b| compare(a, b))
}

/// Validates a candidate [`Bid`] against the current auction value and the
/// best already placed [`Bid`].
///
/// # Errors
///
/// - [`Rejection::NotBelowCurrentValue`] unless the candidate offers
///   strictly less than the current auction value.
/// - [`Rejection::BetterBidExists`] unless the candidate strictly beats the
///   best active bid under [`compare()`].
pub fn validate(
    candidate: &Bid,
    current_value: Value,
    best: Option<&Bid>,
) -> Result<(), Rejection> {
    if candidate.value.cmp_amount(&current_value) != Ordering::Less {
        return Err(Rejection::NotBelowCurrentValue);
    }
    if let Some(best) = best {
        if compare(candidate, best) != Ordering::Less {
            return Err(Rejection::BetterBidExists);
        }
    }
    Ok(())
}

/// Rejection of a candidate [`Bid`].
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum Rejection {
    /// The candidate does not offer less than the current auction value.
    #[display("bid is not below the current auction value")]
    NotBelowCurrentValue,

    /// A better [`Bid`] is already placed.
    #[display("a better bid already exists")]
    BetterBidExists,
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{DateTime, Money};

    use crate::domain::{
        bid,
        employee::{self, Grade, Points},
        task::{self, Value},
        Bid,
    };

    use super::{compare, select_winner, validate, Rejection};

    fn money(s: &str) -> Value {
        Value::Money(Money::from_str(s).unwrap())
    }

    fn bid(value: &str, points: i64, placed_at: &str) -> Bid {
        Bid {
            id: bid::Id::new(),
            task_id: task::Id::default(),
            bidder_id: employee::Id::new(),
            bidder_name: "Jan Kowalski".parse().unwrap(),
            bidder_points: Points::from(points),
            bidder_grade: Grade::from_points(Points::from(points)),
            value: money(value),
            is_active: true,
            created_at: DateTime::from_rfc3339(placed_at).unwrap().coerce(),
        }
    }

    #[test]
    fn lower_value_wins() {
        let cheap = bid("85USD", 10, "2026-01-12T10:00:00Z");
        let pricey = bid("95USD", 500, "2026-01-12T09:00:00Z");

        let bids = vec![pricey, cheap.clone()];
        assert_eq!(select_winner(&bids).unwrap().id, cheap.id);
    }

    #[test]
    fn higher_points_break_value_ties() {
        let senior = bid("85USD", 95, "2026-01-12T11:00:00Z");
        let junior = bid("85USD", 80, "2026-01-12T10:00:00Z");

        let forward = vec![senior.clone(), junior.clone()];
        let backward = vec![junior, senior.clone()];

        assert_eq!(select_winner(&forward).unwrap().id, senior.id);
        assert_eq!(select_winner(&backward).unwrap().id, senior.id);
    }

    #[test]
    fn earlier_bid_breaks_full_ties() {
        let early = bid("85USD", 80, "2026-01-12T10:00:00Z");
        let late = bid("85USD", 80, "2026-01-12T10:05:00Z");

        let bids = vec![late, early.clone()];
        assert_eq!(select_winner(&bids).unwrap().id, early.id);
    }

    #[test]
    fn selection_is_deterministic_under_reordering() {
        let bids = vec![
            bid("90USD", 40, "2026-01-12T10:00:00Z"),
            bid("85USD", 95, "2026-01-12T11:00:00Z"),
            bid("85USD", 80, "2026-01-12T09:00:00Z"),
            bid("100USD", 600, "2026-01-12T08:00:00Z"),
        ];

        let winner = select_winner(&bids).unwrap().id;
        let mut reversed = bids.clone();
        reversed.reverse();

        assert_eq!(select_winner(&reversed).unwrap().id, winner);
        assert_eq!(select_winner(&bids).unwrap().id, winner);
    }

    #[test]
    fn no_winner_for_empty_set() {
        assert!(select_winner(&[]).is_none());
    }

    #[test]
    fn rejects_bid_not_below_current_value() {
        let candidate = bid("100USD", 50, "2026-01-12T10:00:00Z");

        assert_eq!(
            validate(&candidate, money("100USD"), None),
            Err(Rejection::NotBelowCurrentValue),
        );
        assert_eq!(
            validate(&candidate, money("99USD"), None),
            Err(Rejection::NotBelowCurrentValue),
        );
    }

    #[test]
    fn rejects_bid_not_beating_the_best() {
        let best = bid("85USD", 95, "2026-01-12T10:00:00Z");
        let equal_but_junior = bid("85USD", 40, "2026-01-12T11:00:00Z");

        assert_eq!(
            validate(&equal_but_junior, money("125USD"), Some(&best)),
            Err(Rejection::BetterBidExists),
        );
    }

    #[test]
    fn accepts_strictly_better_bid() {
        let best = bid("85USD", 95, "2026-01-12T10:00:00Z");
        let cheaper = bid("80USD", 10, "2026-01-12T11:00:00Z");

        assert_eq!(validate(&cheaper, money("125USD"), Some(&best)), Ok(()));
    }

    #[test]
    fn ranking_agrees_with_compare() {
        let a = bid("85USD", 95, "2026-01-12T10:00:00Z");
        let b = bid("85USD", 80, "2026-01-12T10:00:00Z");

        assert_eq!(compare(&a, &b), std::cmp::Ordering::Less);
        assert_eq!(compare(&b, &a), std::cmp::Ordering::Greater);
    }
}
