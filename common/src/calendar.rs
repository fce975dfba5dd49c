//! Working-hours [`Calendar`] arithmetic.

use std::time::Duration;

use rust_decimal::Decimal;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset, Weekday};

use crate::DateTimeOf;

/// Calendar of an organization's working hours.
///
/// All arithmetic is performed in the organization's local timezone, given as
/// an explicit fixed [`UtcOffset`]. Daylight-saving transitions are out of the
/// picture: the offset never changes once the [`Calendar`] is constructed.
#[derive(Clone, Copy, Debug)]
pub struct Calendar {
    /// Fixed UTC offset of the organization's local timezone.
    offset: UtcOffset,

    /// Local time when a workday opens.
    workday_start: Time,

    /// Local time when a workday closes.
    workday_end: Time,
}

impl Calendar {
    /// Creates a new [`Calendar`] with the provided workday window.
    ///
    /// [`None`] is returned if `workday_start` is not before `workday_end`
    /// (the window must not cross midnight).
    #[must_use]
    pub fn new(
        offset: UtcOffset,
        workday_start: Time,
        workday_end: Time,
    ) -> Option<Self> {
        (workday_start < workday_end).then_some(Self {
            offset,
            workday_start,
            workday_end,
        })
    }

    /// Creates a new [`Calendar`] with the reference 09:00–17:00 workday
    /// window at the provided offset.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn with_offset(offset: UtcOffset) -> Self {
        Self {
            offset,
            workday_start: Time::from_hms(9, 0, 0).expect("valid time"),
            workday_end: Time::from_hms(17, 0, 0).expect("valid time"),
        }
    }

    /// Returns whether the provided instant falls on a weekend in this
    /// [`Calendar`]'s timezone.
    #[must_use]
    pub fn is_weekend<Of: ?Sized>(&self, dt: DateTimeOf<Of>) -> bool {
        Self::is_weekend_date(self.local(dt).date())
    }

    /// Returns the number of working hours between the two provided instants.
    ///
    /// Only time inside the workday window on non-weekend days is counted.
    /// Zero is returned if `end` is not after `start`.
    #[must_use]
    pub fn working_hours_between<A, B>(
        &self,
        start: DateTimeOf<A>,
        end: DateTimeOf<B>,
    ) -> Decimal
    where
        A: ?Sized,
        B: ?Sized,
    {
        let start = self.local(start);
        let end = self.local(end);
        if end <= start {
            return Decimal::ZERO;
        }

        let mut seconds = 0i64;
        let mut date = start.date();
        while date <= end.date() {
            if !Self::is_weekend_date(date) {
                let open = self.at(date, self.workday_start);
                let close = self.at(date, self.workday_end);
                let from = if start > open { start } else { open };
                let to = if end < close { end } else { close };
                if to > from {
                    seconds += (to - from).whole_seconds();
                }
            }
            let Some(next) = date.next_day() else {
                break;
            };
            date = next;
        }

        Decimal::from(seconds) / Decimal::from(3_600)
    }

    /// Adds the provided number of working hours to the instant, skipping
    /// weekends and everything outside the workday window.
    ///
    /// A day consumed only partially continues on the next workday's opening,
    /// so the result always lies `hours` working hours after `start`.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn add_working_hours<Of: ?Sized>(
        &self,
        start: DateTimeOf<Of>,
        hours: u32,
    ) -> DateTimeOf<Of> {
        let mut remaining = i64::from(hours) * 3_600;
        if remaining == 0 {
            return start;
        }

        let mut cursor = self.local(start);
        loop {
            let date = cursor.date();
            let open = self.at(date, self.workday_start);
            let close = self.at(date, self.workday_end);

            if Self::is_weekend_date(date) || cursor >= close {
                cursor = self.next_workday_open(date);
                continue;
            }
            if cursor < open {
                cursor = open;
            }

            let available = (close - cursor).whole_seconds();
            if available >= remaining {
                cursor += Duration::from_secs(
                    u64::try_from(remaining).expect("non-negative"),
                );
                break;
            }
            remaining -= available;
            cursor = self.next_workday_open(date);
        }

        DateTimeOf::try_from(cursor).expect("infallible")
    }

    /// Converts the provided instant into this [`Calendar`]'s timezone.
    fn local<Of: ?Sized>(&self, dt: DateTimeOf<Of>) -> OffsetDateTime {
        OffsetDateTime::from(dt).to_offset(self.offset)
    }

    /// Returns the instant of the provided local `time` on the `date`.
    fn at(&self, date: Date, time: Time) -> OffsetDateTime {
        PrimitiveDateTime::new(date, time).assume_offset(self.offset)
    }

    /// Returns the opening instant of the first workday after the `date`.
    fn next_workday_open(&self, date: Date) -> OffsetDateTime {
        let mut next = date.next_day().expect("date overflow");
        while Self::is_weekend_date(next) {
            next = next.next_day().expect("date overflow");
        }
        self.at(next, self.workday_start)
    }

    /// Returns whether the provided [`Date`] is a Saturday or a Sunday.
    fn is_weekend_date(date: Date) -> bool {
        matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
    }
}
