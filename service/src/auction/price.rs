//! Auction pricing function.

use std::time::Duration;

use common::{DateTime, Minutes, Money};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::task::{Auction, Value};
#[cfg(doc)]
use crate::domain::Bid;

/// Checkpoint schedule of auction price escalation.
///
/// The auction value climbs from the base value towards
/// `base × range_multiplier` in discrete steps: one step per checkpoint
/// reached beyond the grace window, a checkpoint being every
/// `checkpoint_interval` of wall-clock time counted from the auction
/// opening (the opening instant is the first checkpoint). Bidders thus see
/// a stable price within each window instead of a value ticking every
/// second.
///
/// One [`Schedule`] is picked at startup and shared by every caller.
#[derive(Clone, Copy, Debug)]
pub struct Schedule {
    /// Wall-clock distance between two checkpoints.
    pub checkpoint_interval: Duration,

    /// Number of leading checkpoints producing no markup.
    pub grace_checkpoints: u32,

    /// Ceiling multiplier the value escalates towards.
    pub range_multiplier: Decimal,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            checkpoint_interval: Duration::from_secs(3 * 3_600),
            grace_checkpoints: 2,
            range_multiplier: Decimal::new(15, 1),
        }
    }
}

impl Schedule {
    /// Computes the current auction value of a task at the provided instant.
    ///
    /// - [`None`] is returned when the task has no auction window at all.
    /// - Before (and at) the auction opening the value is the base value.
    /// - Once at least one active [`Bid`] exists, the value is frozen at the
    ///   last cached price (the base value if none was cached yet):
    ///   competition, not elapsed time, now determines the outcome.
    /// - Otherwise the value escalates by checkpoints, clamped at the
    ///   planned end, monotone non-decreasing and bounded in
    ///   `[base, base × range_multiplier]`.
    #[must_use]
    pub fn current_value(
        &self,
        auction: Option<&Auction>,
        base: Value,
        now: DateTime,
    ) -> Option<Value> {
        let auction = auction?;

        if auction.has_bids {
            return Some(auction.current_price.unwrap_or(base));
        }

        let start = auction.start_at.unix_timestamp();
        let end = auction.planned_end_at.unix_timestamp();
        let now = now.unix_timestamp();
        if now <= start {
            return Some(base);
        }

        let interval = i64::try_from(self.checkpoint_interval.as_secs())
            .unwrap_or(i64::MAX)
            .max(1);
        let steps = (end - start).max(0) / interval - 1;
        if steps <= 0 {
            // The window is too short to fit a single markup step.
            return Some(base);
        }

        let reached = (now.min(end) - start) / interval + 1;
        let past_grace =
            (reached - i64::from(self.grace_checkpoints)).max(0);
        if past_grace == 0 {
            return Some(base);
        }

        let growth = (self.range_multiplier - Decimal::ONE)
            * Decimal::from(past_grace)
            / Decimal::from(steps);
        let multiplier =
            (Decimal::ONE + growth).min(self.range_multiplier);
        Some(Self::scale(base, multiplier))
    }

    /// Returns the absolute ceiling of a task's auction value.
    #[must_use]
    pub fn ceiling(&self, base: Value) -> Value {
        Self::scale(base, self.range_multiplier)
    }

    /// Scales the base value by the provided multiplier.
    ///
    /// Money amounts are rounded to cents; minute amounts to the nearest
    /// whole minute, never below one.
    fn scale(base: Value, multiplier: Decimal) -> Value {
        match base {
            Value::Money(money) => Value::Money(Money {
                amount: (money.amount * multiplier).round_dp_with_strategy(
                    2,
                    RoundingStrategy::MidpointAwayFromZero,
                ),
                currency: money.currency,
            }),
            Value::Time(minutes) => Value::Time(
                Minutes::from_decimal_rounded(
                    Decimal::from(minutes.get()) * multiplier,
                )
                .expect("positive minute count"),
            ),
        }
    }
}
