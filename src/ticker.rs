use chrono::{NaiveDateTime, Timelike};
use std::time::Duration;

/// The clock face shows whole seconds
pub const CLOCK_TICK: Duration = Duration::from_secs(1);

/// Time left until the clock face next changes, so the event loop wakes on
/// the second boundary instead of up to a second late
pub fn until_next_second(now: NaiveDateTime) -> Duration {
    let into_second = Duration::from_nanos(u64::from(now.nanosecond() % 1_000_000_000));
    CLOCK_TICK.saturating_sub(into_second).max(Duration::from_millis(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TIME_FMT;

    #[test]
    fn test_until_next_second() {
        let whole = NaiveDateTime::parse_from_str("2024-03-01 09:00:00", TIME_FMT).unwrap();
        assert_eq!(until_next_second(whole), CLOCK_TICK);

        let later = whole + chrono::Duration::milliseconds(750);
        assert_eq!(until_next_second(later), Duration::from_millis(250));
    }

    #[test]
    fn test_until_next_second_never_zero() {
        let whole = NaiveDateTime::parse_from_str("2024-03-01 09:00:00", TIME_FMT).unwrap();
        let edge = whole + chrono::Duration::nanoseconds(999_999_999);
        assert_eq!(until_next_second(edge), Duration::from_millis(1));
    }
}
