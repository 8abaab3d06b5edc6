//! Trailing time windows for [`Rolling`](crate::Rolling).

use chrono::TimeDelta;
use polars::prelude::Duration;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TransformError};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const SECONDS_PER_MONTH: i64 = 30 * SECONDS_PER_DAY;
const SECONDS_PER_YEAR: i64 = 365 * SECONDS_PER_DAY;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A positive window length, kept together with the label used in names.
///
/// ```
/// use featurs_transform::TimeWindow;
///
/// let window = TimeWindow::parse("2d1h").unwrap();
/// assert_eq!(window.label(), "2d1h");
/// assert!(TimeWindow::parse("soon").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    label: String,
    duration: Duration,
}

impl TimeWindow {
    /// Parses a duration string such as `30m`, `2d` or `1y2mo`.
    ///
    /// # Errors
    ///
    /// Fails when the string is not a duration or is not positive.
    pub fn parse(window: &str) -> Result<Self> {
        let duration = Duration::try_parse(window).map_err(|e| TransformError::InvalidTimeWindow {
            window: window.to_string(),
            message: e.to_string(),
        })?;
        if duration.negative() || duration.is_zero() {
            return Err(TransformError::InvalidTimeWindow {
                window: window.to_string(),
                message: "window must be positive".to_string(),
            });
        }
        Ok(Self {
            label: window.to_string(),
            duration,
        })
    }

    /// Builds a window of exactly `delta`, labelled by [`format_timedelta`].
    ///
    /// The length is kept in days and nanoseconds, so 30 days stay 30 days
    /// instead of becoming a calendar month, and sub-second parts survive.
    ///
    /// # Errors
    ///
    /// Fails when the delta is shorter than one second.
    pub fn from_time_delta(delta: TimeDelta) -> Result<Self> {
        let label = format_timedelta(delta);
        if delta < TimeDelta::seconds(1) {
            return Err(TransformError::InvalidTimeWindow {
                window: label,
                message: "window must be at least one second".to_string(),
            });
        }

        let seconds = delta.num_seconds();
        let days = seconds / SECONDS_PER_DAY;
        let nanos =
            (seconds % SECONDS_PER_DAY) * NANOS_PER_SECOND + i64::from(delta.subsec_nanos());
        let exact = if nanos > 0 {
            format!("{days}d{nanos}ns")
        } else {
            format!("{days}d")
        };
        let duration = Duration::try_parse(&exact).map_err(|e| TransformError::InvalidTimeWindow {
            window: label.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { label, duration })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for TimeWindow {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for TimeWindow {
    type Error = TransformError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = TransformError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl TryFrom<TimeDelta> for TimeWindow {
    type Error = TransformError;

    fn try_from(value: TimeDelta) -> Result<Self> {
        Self::from_time_delta(value)
    }
}

/// Formats a delta as `<y>y<mo>mo<d>d<h>h<m>m<s>s`, omitting zero parts.
///
/// Years count 365 days and months 30 days. Sub-second precision is
/// dropped; an empty result is `0s`.
pub fn format_timedelta(delta: TimeDelta) -> String {
    let mut remaining = delta.num_seconds();
    let negative = remaining < 0;
    remaining = remaining.abs();

    let mut formatted = String::new();
    for (size, unit) in [
        (SECONDS_PER_YEAR, "y"),
        (SECONDS_PER_MONTH, "mo"),
        (SECONDS_PER_DAY, "d"),
        (SECONDS_PER_HOUR, "h"),
        (SECONDS_PER_MINUTE, "m"),
        (1, "s"),
    ] {
        let amount = remaining / size;
        remaining %= size;
        if amount > 0 {
            formatted.push_str(&format!("{amount}{unit}"));
        }
    }

    if formatted.is_empty() {
        return "0s".to_string();
    }
    if negative {
        formatted.insert(0, '-');
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timedelta() {
        assert_eq!(format_timedelta(TimeDelta::days(2) + TimeDelta::hours(1)), "2d1h");
        assert_eq!(format_timedelta(TimeDelta::days(400)), "1y1mo5d");
        assert_eq!(format_timedelta(TimeDelta::seconds(90)), "1m30s");
        assert_eq!(format_timedelta(TimeDelta::zero()), "0s");
        assert_eq!(format_timedelta(TimeDelta::milliseconds(500)), "0s");
    }

    #[test]
    fn test_parse_windows() {
        for window in ["2d", "2d1h", "30m", "1w", "3mo", "1y", "500ms"] {
            let parsed = TimeWindow::parse(window).unwrap();
            assert_eq!(parsed.label(), window);
        }
    }

    #[test]
    fn test_reject_invalid_windows() {
        for window in ["", "0s", "-2d", "2 days", "abc"] {
            let err = TimeWindow::parse(window).unwrap_err();
            assert!(
                matches!(err, TransformError::InvalidTimeWindow { .. }),
                "{window} was accepted"
            );
        }
    }

    #[test]
    fn test_from_time_delta() {
        let window = TimeWindow::try_from(TimeDelta::hours(49)).unwrap();
        assert_eq!(window.label(), "2d1h");
        assert_eq!(window, TimeWindow::parse("2d1h").unwrap());
        assert!(TimeWindow::from_time_delta(TimeDelta::zero()).is_err());
        assert!(TimeWindow::from_time_delta(TimeDelta::milliseconds(500)).is_err());
        assert!(TimeWindow::from_time_delta(TimeDelta::days(-2)).is_err());
    }

    #[test]
    fn test_time_delta_length_is_exact() {
        let thirty_days = TimeWindow::from_time_delta(TimeDelta::days(30)).unwrap();
        assert_eq!(thirty_days.label(), "1mo");
        assert_eq!(thirty_days.duration(), Duration::parse("30d"));
        assert_ne!(thirty_days.duration(), TimeWindow::parse("1mo").unwrap().duration());

        let year = TimeWindow::from_time_delta(TimeDelta::days(365)).unwrap();
        assert_eq!(year.duration(), Duration::parse("365d"));

        let fractional = TimeWindow::from_time_delta(TimeDelta::milliseconds(1500)).unwrap();
        assert_eq!(fractional.label(), "1s");
        assert_eq!(fractional.duration().duration_ns(), 1_500_000_000);
    }

    proptest::proptest! {
        #[test]
        fn formatted_deltas_parse_back(seconds in 1i64..1_000_000_000) {
            let label = format_timedelta(TimeDelta::seconds(seconds));
            let window = TimeWindow::parse(&label).unwrap();
            proptest::prop_assert_eq!(window.label(), label.as_str());
        }
    }
}
