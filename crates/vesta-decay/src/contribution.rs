//! Voting power contributed by a single lock.
//!
//! A lock of `amount` decays at `amount / MAXTIME` per second (floor division)
//! and reaches zero exactly at its `end`. Small locks may have slope 0; they
//! then carry no voting power at all.

use vesta_core::constants::MAXTIME;
use vesta_core::error::DecayError;
use vesta_core::types::Lock;

/// Decay rate of a lock holding `amount`.
pub fn slope_of(amount: u128) -> u128 {
    amount / MAXTIME as u128
}

/// Voting power of `lock` at time `t`: `slope * max(0, end - t)`.
///
/// Saturates instead of overflowing for times long before the lock's creation.
pub fn voting_power(lock: &Lock, t: u64) -> u128 {
    if lock.end <= t {
        return 0;
    }
    slope_of(lock.amount).saturating_mul(u128::from(lock.end - t))
}

/// A lock's signed `(bias, slope)` share of the aggregate curve at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contribution {
    pub bias: i128,
    pub slope: i128,
}

impl Contribution {
    pub const ZERO: Self = Self { bias: 0, slope: 0 };

    /// Contribution of `lock` evaluated at `now`. Expired or empty locks contribute nothing.
    pub fn of(lock: &Lock, now: u64) -> Result<Self, DecayError> {
        if !lock.is_live(now) {
            return Ok(Self::ZERO);
        }
        let slope =
            i128::try_from(slope_of(lock.amount)).map_err(|_| DecayError::ArithmeticOverflow)?;
        let bias = slope
            .checked_mul(i128::from(lock.end - now))
            .ok_or(DecayError::ArithmeticOverflow)?;
        Ok(Self { bias, slope })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesta_core::constants::WEEK;

    #[test]
    fn slope_floors() {
        assert_eq!(slope_of(MAXTIME as u128 - 1), 0);
        assert_eq!(slope_of(MAXTIME as u128), 1);
        assert_eq!(slope_of(3 * MAXTIME as u128 + 5), 3);
    }

    #[test]
    fn power_is_linear_to_end() {
        let lock = Lock::new(10 * MAXTIME as u128, 4 * WEEK);
        assert_eq!(voting_power(&lock, 0), 40 * WEEK as u128);
        assert_eq!(voting_power(&lock, 2 * WEEK), 20 * WEEK as u128);
        assert_eq!(voting_power(&lock, 4 * WEEK), 0);
        assert_eq!(voting_power(&lock, 9 * WEEK), 0);
    }

    #[test]
    fn contribution_matches_power() {
        let lock = Lock::new(220_000_000_000_000_000, 35 * WEEK);
        let now = 3 * WEEK + 100;
        let c = Contribution::of(&lock, now).unwrap();
        assert_eq!(c.slope as u128, slope_of(lock.amount));
        assert_eq!(c.bias as u128, voting_power(&lock, now));
    }

    #[test]
    fn expired_and_empty_contribute_nothing() {
        let expired = Lock::new(1_000 * MAXTIME as u128, WEEK);
        assert_eq!(Contribution::of(&expired, WEEK).unwrap(), Contribution::ZERO);
        let emptied = Lock::new(0, 10 * WEEK);
        assert_eq!(Contribution::of(&emptied, 0).unwrap(), Contribution::ZERO);
    }

    #[test]
    fn oversized_amount_reports_overflow() {
        let lock = Lock::new(u128::MAX, MAXTIME);
        assert_eq!(Contribution::of(&lock, 0), Err(DecayError::ArithmeticOverflow));
    }
}
