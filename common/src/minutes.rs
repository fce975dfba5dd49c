//! [`Minutes`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal, RoundingStrategy};

/// Whole number of worked minutes.
///
/// Always positive: a minute count of zero carries no meaning for a time
/// valued piece of work.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Minutes(u32);

impl Minutes {
    /// Creates a new [`Minutes`] amount if the provided value is positive.
    #[must_use]
    pub fn new(minutes: u32) -> Option<Self> {
        (minutes > 0).then_some(Self(minutes))
    }

    /// Returns this amount as a plain number of minutes.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Creates a new [`Minutes`] amount by rounding the provided [`Decimal`]
    /// to the nearest whole minute, never below one.
    ///
    /// [`None`] is returned if the value does not fit a minute count.
    #[must_use]
    pub fn from_decimal_rounded(value: Decimal) -> Option<Self> {
        let rounded = value
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Some(Self(rounded.to_u32()?.max(1)))
    }
}

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

impl FromStr for Minutes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_suffix('m').unwrap_or(s);
        digits
            .parse()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid minutes amount")
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Minutes;

    #[test]
    fn rejects_zero() {
        assert!(Minutes::new(0).is_none());
        assert!(Minutes::from_str("0").is_err());
    }

    #[test]
    fn from_str() {
        assert_eq!(Minutes::from_str("90").unwrap().get(), 90);
        assert_eq!(Minutes::from_str("90m").unwrap().get(), 90);
        assert!(Minutes::from_str("ninety").is_err());
    }

    #[test]
    fn rounds_to_nearest_minute() {
        let half_up = Minutes::from_decimal_rounded("90.5".parse().unwrap());
        assert_eq!(half_up.unwrap().get(), 91);

        let down = Minutes::from_decimal_rounded("90.4".parse().unwrap());
        assert_eq!(down.unwrap().get(), 90);
    }

    #[test]
    fn rounding_never_goes_below_one_minute() {
        assert_eq!(
            Minutes::from_decimal_rounded(Decimal::ZERO).unwrap().get(),
            1,
        );
    }

    #[test]
    fn to_string() {
        assert_eq!(Minutes::new(45).unwrap().to_string(), "45m");
    }
}
