use crate::models::{DateWindow, RawDayReading};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;

/// Time span used to place timestamped entries along a window.
///
/// The span starts at midnight of the first day. It ends at the latest entry
/// when that entry falls on the window's last day, otherwise at midnight of the
/// last day, so a partially elapsed final day is not padded with empty space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimelineSpan {
    pub fn refined(window: &DateWindow, timestamps: &[NaiveDateTime]) -> Self {
        let start = window.start().and_time(NaiveTime::MIN);
        let midnight = window.end().and_time(NaiveTime::MIN);
        let end = match timestamps.iter().max() {
            Some(last) if last.date() == window.end() => *last,
            _ => midnight,
        };
        Self { start, end }
    }

    /// Fraction of the span elapsed at `timestamp`; 0 when the span is empty.
    pub fn position(&self, timestamp: NaiveDateTime) -> f64 {
        let total = (self.end - self.start).num_milliseconds();
        if total <= 0 {
            return 0.0;
        }
        (timestamp - self.start).num_milliseconds() as f64 / total as f64
    }
}

/// Fraction of the plot width for every day of `window`, or `None` when no
/// reading carries a timestamp. A day without one sits at its midnight.
pub fn day_positions(
    window: &DateWindow,
    by_date: &BTreeMap<NaiveDate, &RawDayReading>,
) -> Option<Vec<f64>> {
    let stamps: Vec<Option<NaiveDateTime>> = window
        .days()
        .map(|date| {
            by_date
                .get(&date)
                .and_then(|reading| reading.recorded_at)
                .filter(|stamp| stamp.date() == date)
        })
        .collect();
    let recorded: Vec<NaiveDateTime> = stamps.iter().flatten().copied().collect();
    if recorded.is_empty() {
        return None;
    }

    let span = TimelineSpan::refined(window, &recorded);
    let positions = window
        .days()
        .zip(stamps)
        .map(|(date, stamp)| {
            let at = stamp.unwrap_or_else(|| date.and_time(NaiveTime::MIN));
            span.position(at).clamp(0.0, 1.0)
        })
        .collect();
    Some(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        date(day).and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn last_entry_on_end_date_closes_the_span() {
        let window = DateWindow::new(date(1), date(1)).unwrap();
        let entries = [at(1, 9), at(1, 17)];
        let span = TimelineSpan::refined(&window, &entries);

        assert_eq!(span.end, at(1, 17));
        assert!((span.position(at(1, 9)) - 9.0 / 17.0).abs() < 1e-9);
        assert_eq!(span.position(at(1, 17)), 1.0);
    }

    #[test]
    fn span_ends_at_midnight_when_last_entry_is_earlier() {
        let window = DateWindow::new(date(1), date(3)).unwrap();
        let entries = [at(1, 9), at(2, 17)];
        let span = TimelineSpan::refined(&window, &entries);

        assert_eq!(span.end, at(3, 0));
        assert!((span.position(at(1, 9)) - 9.0 / 48.0).abs() < 1e-9);
        assert!((span.position(at(2, 17)) - 41.0 / 48.0).abs() < 1e-9);
    }

    #[test]
    fn empty_span_positions_at_zero() {
        let window = DateWindow::new(date(1), date(1)).unwrap();
        let span = TimelineSpan::refined(&window, &[]);
        assert_eq!(span.start, span.end);
        assert_eq!(span.position(at(1, 12)), 0.0);
    }

    #[test]
    fn day_positions_follow_entry_times() {
        let window = DateWindow::new(date(1), date(3)).unwrap();
        let first = RawDayReading::new(date(1), Some(1.0), None).with_recorded_at(at(1, 9));
        let second = RawDayReading::new(date(2), Some(2.0), None).with_recorded_at(at(2, 17));
        let by_date = BTreeMap::from([(date(1), &first), (date(2), &second)]);

        let positions = day_positions(&window, &by_date).unwrap();
        assert_eq!(positions.len(), 3);
        assert!((positions[0] - 9.0 / 48.0).abs() < 1e-9);
        assert!((positions[1] - 41.0 / 48.0).abs() < 1e-9);
        assert_eq!(positions[2], 1.0);
    }

    #[test]
    fn readings_without_timestamps_keep_even_spacing() {
        let window = DateWindow::new(date(1), date(3)).unwrap();
        let plain = RawDayReading::new(date(1), Some(1.0), None);
        let misdated = RawDayReading::new(date(2), Some(1.0), None).with_recorded_at(at(3, 8));
        let by_date = BTreeMap::from([(date(1), &plain), (date(2), &misdated)]);
        assert_eq!(day_positions(&window, &by_date), None);
    }
}
