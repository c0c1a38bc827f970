//! Per-question countdown as pure functions of `(deadline, now)`.
//!
//! The timer carries an absolute deadline rather than an accumulating
//! counter, so the remaining-time readout stays drift-free no matter how
//! often or irregularly it is sampled. The scheduling hint resynchronizes
//! to the next whole-second boundary instead of a fixed interval.

use chrono::{DateTime, Duration, Utc};

/// Default time allotted to a single question (20 seconds).
pub const QUESTION_DURATION_MS: i64 = 20_000;

/// Absolute deadline for the currently active question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionTimer {
    deadline: DateTime<Utc>,
}

impl QuestionTimer {
    /// Arm a timer expiring `duration` after `now`.
    #[must_use]
    pub fn starting_at(now: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            deadline: now + duration,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Time left before the deadline, clamped to zero.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.deadline - now).max(Duration::zero())
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) == Duration::zero()
    }
}

/// Delay until the next whole-second boundary, in `1..=1000` ms.
///
/// Driving a display refresh with this instead of a fixed 1000 ms interval
/// keeps the rendered seconds value from visibly jittering.
#[must_use]
pub fn next_tick_delay(now: DateTime<Utc>) -> Duration {
    let subsec = i64::from(now.timestamp_subsec_millis() % 1_000);
    Duration::milliseconds(1_000 - subsec)
}

/// Format a remaining duration as a zero-padded seconds readout, e.g. `07s`.
#[must_use]
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0) % 60;
    format!("{secs:02}s")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn remaining_counts_down_to_zero() {
        let now = fixed_now();
        let timer = QuestionTimer::starting_at(now, Duration::milliseconds(QUESTION_DURATION_MS));

        assert_eq!(timer.remaining(now), Duration::seconds(20));
        assert_eq!(
            timer.remaining(now + Duration::seconds(13)),
            Duration::seconds(7)
        );
        assert_eq!(
            timer.remaining(now + Duration::seconds(25)),
            Duration::zero()
        );
    }

    #[test]
    fn expiry_is_exact_at_the_deadline() {
        let now = fixed_now();
        let timer = QuestionTimer::starting_at(now, Duration::seconds(20));

        assert!(!timer.is_expired(now + Duration::milliseconds(19_999)));
        assert!(timer.is_expired(now + Duration::seconds(20)));
        assert!(timer.is_expired(now + Duration::minutes(5)));
    }

    #[test]
    fn tick_delay_resynchronizes_to_second_boundary() {
        let now = fixed_now();
        assert_eq!(next_tick_delay(now), Duration::milliseconds(1_000));
        assert_eq!(
            next_tick_delay(now + Duration::milliseconds(250)),
            Duration::milliseconds(750)
        );
        assert_eq!(
            next_tick_delay(now + Duration::milliseconds(999)),
            Duration::milliseconds(1)
        );
    }

    #[test]
    fn formats_seconds_readout() {
        assert_eq!(format_remaining(Duration::seconds(7)), "07s");
        assert_eq!(format_remaining(Duration::milliseconds(19_400)), "19s");
        assert_eq!(format_remaining(Duration::seconds(-3)), "00s");
    }
}
