//! Protocol constants. Times are Unix seconds, heights are block numbers.

use alloy_primitives::U256;

/// One week in seconds. Lock ends are always multiples of `WEEK`.
pub const WEEK: u64 = 7 * 86_400;

/// Maximum lock duration in seconds (four years).
///
/// A lock's slope is `amount / MAXTIME`, so a maximum-length lock starts with
/// voting power roughly equal to its amount.
pub const MAXTIME: u64 = 4 * 365 * 86_400;

/// Fixed-point denominator of the reward accumulator (2^128).
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);

/// Default number of week steps a single checkpoint replay may take.
pub const MAX_CHECKPOINT_ITERATIONS: usize = 255;

/// First position id handed out by the ledger.
pub const FIRST_POSITION_ID: u64 = 1;

/// Round a timestamp down to the start of its week.
///
/// # Examples
///
/// ```
/// use vesta_core::constants::{floor_week, WEEK};
/// assert_eq!(floor_week(WEEK * 3 + 17), WEEK * 3);
/// assert_eq!(floor_week(WEEK * 3), WEEK * 3);
/// ```
pub const fn floor_week(timestamp: u64) -> u64 {
    timestamp / WEEK * WEEK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q128_is_two_pow_128() {
        assert_eq!(Q128, U256::from(1u8) << 128);
        assert_eq!(Q128 >> 128, U256::from(1u8));
    }

    #[test]
    fn maxtime_is_whole_weeks_plus_remainder() {
        // 4 * 365 days is not a whole number of weeks; ends are still floored.
        assert_eq!(MAXTIME / WEEK, 208);
        assert_ne!(MAXTIME % WEEK, 0);
    }

    #[test]
    fn floor_week_boundaries() {
        assert_eq!(floor_week(0), 0);
        assert_eq!(floor_week(WEEK - 1), 0);
        assert_eq!(floor_week(WEEK), WEEK);
        assert_eq!(floor_week(u64::MAX) % WEEK, 0);
    }
}
