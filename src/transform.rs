use crate::color::Palette;
use crate::errors::Result;
use crate::models::{
    DailyPoint, DateWindow, DisplayMode, RawDayReading, Track, TrackRole, VisualizationSeries,
};
use crate::timeline::day_positions;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

pub const MIN_MAX_ABSOLUTE_VALUE: f64 = 1.0;

pub fn transform(
    readings: &[RawDayReading],
    mode: DisplayMode,
    window: DateWindow,
    palette: Palette,
) -> Result<VisualizationSeries> {
    let by_date = index_readings(readings, &window);

    let values: Vec<(TrackRole, Vec<Option<f64>>)> = match mode {
        DisplayMode::Impact => vec![(
            TrackRole::Primary,
            collect_values(&window, &by_date, impact),
        )],
        DisplayMode::Average => vec![(
            TrackRole::Primary,
            collect_values(&window, &by_date, average),
        )],
        DisplayMode::RawSeries => vec![
            (
                TrackRole::Morning,
                collect_values(&window, &by_date, |reading| finite(reading.morning)),
            ),
            (
                TrackRole::Evening,
                collect_values(&window, &by_date, |reading| finite(reading.evening)),
            ),
        ],
    };

    let max_absolute_value = values
        .iter()
        .flat_map(|(_, track)| track.iter().flatten())
        .fold(MIN_MAX_ABSOLUTE_VALUE, |acc, value| acc.max(value.abs()));

    let tracks = values
        .into_iter()
        .map(|(role, track)| Track {
            role,
            points: window
                .days()
                .zip(track)
                .map(|(date, value)| DailyPoint {
                    date,
                    value,
                    has_data: value.is_some(),
                    color: palette.color_for(value.unwrap_or(0.0), max_absolute_value),
                })
                .collect(),
        })
        .collect::<Vec<_>>();
    let positions = day_positions(&window, &by_date);

    debug!(
        mode = %mode,
        days = window.len(),
        max_absolute_value,
        timed = positions.is_some(),
        "built visualization series"
    );

    Ok(VisualizationSeries {
        mode,
        window,
        tracks,
        max_absolute_value,
        positions,
    })
}

fn index_readings<'a>(
    readings: &'a [RawDayReading],
    window: &DateWindow,
) -> BTreeMap<NaiveDate, &'a RawDayReading> {
    let mut by_date = BTreeMap::new();
    for reading in readings.iter().filter(|reading| window.contains(reading.date)) {
        if by_date.insert(reading.date, reading).is_some() {
            debug!("duplicate reading for {}, keeping the later one", reading.date);
        }
    }
    by_date
}

fn collect_values(
    window: &DateWindow,
    by_date: &BTreeMap<NaiveDate, &RawDayReading>,
    derive: impl Fn(&RawDayReading) -> Option<f64>,
) -> Vec<Option<f64>> {
    window
        .days()
        .map(|date| by_date.get(&date).and_then(|reading| derive(*reading)))
        .collect()
}

fn impact(reading: &RawDayReading) -> Option<f64> {
    match (finite(reading.morning), finite(reading.evening)) {
        (Some(morning), Some(evening)) => finite(Some(evening - morning)),
        _ => None,
    }
}

fn average(reading: &RawDayReading) -> Option<f64> {
    match (finite(reading.morning), finite(reading.evening)) {
        // halve first so two large readings cannot overflow
        (Some(morning), Some(evening)) => Some(morning / 2.0 + evening / 2.0),
        (Some(value), None) | (None, Some(value)) => Some(value),
        (None, None) => None,
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::NEUTRAL;
    use chrono::Duration;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn window(days: i64) -> DateWindow {
        DateWindow::new(start(), start() + Duration::days(days - 1)).unwrap()
    }

    fn reading(offset: i64, morning: Option<f64>, evening: Option<f64>) -> RawDayReading {
        RawDayReading::new(start() + Duration::days(offset), morning, evening)
    }

    fn values(series: &VisualizationSeries) -> Vec<Option<f64>> {
        series.points().iter().map(|point| point.value).collect()
    }

    #[test]
    fn series_covers_every_day_in_order() {
        let readings = vec![reading(3, Some(1.0), Some(2.0)), reading(0, Some(4.0), None)];
        let series =
            transform(&readings, DisplayMode::Average, window(10), Palette::Default).unwrap();

        assert_eq!(series.len(), 10);
        for (index, point) in series.points().iter().enumerate() {
            assert_eq!(point.date, start() + Duration::days(index as i64));
            assert_eq!(point.has_data, point.value.is_some());
        }
    }

    #[test]
    fn impact_requires_both_readings() {
        let readings = vec![
            reading(0, Some(2.0), Some(5.0)),
            reading(1, Some(2.0), None),
            reading(2, None, Some(3.0)),
            reading(3, Some(4.0), Some(1.0)),
        ];
        let series =
            transform(&readings, DisplayMode::Impact, window(4), Palette::Default).unwrap();

        assert_eq!(values(&series), vec![Some(3.0), None, None, Some(-3.0)]);
        assert_eq!(series.max_absolute_value, 3.0);
    }

    #[test]
    fn average_uses_single_reading_when_other_is_missing() {
        let readings = vec![
            reading(0, Some(2.0), Some(4.0)),
            reading(1, Some(-2.0), None),
            reading(2, None, Some(6.0)),
            reading(3, None, None),
        ];
        let series =
            transform(&readings, DisplayMode::Average, window(4), Palette::Default).unwrap();

        assert_eq!(values(&series), vec![Some(3.0), Some(-2.0), Some(6.0), None]);
        assert_eq!(series.max_absolute_value, 6.0);
    }

    #[test]
    fn raw_series_builds_two_tracks_with_a_shared_bound() {
        let readings = vec![reading(0, Some(1.0), Some(-8.0)), reading(1, Some(2.0), None)];
        let series =
            transform(&readings, DisplayMode::RawSeries, window(3), Palette::Default).unwrap();

        assert_eq!(series.tracks.len(), 2);
        let morning = series.track(TrackRole::Morning).unwrap();
        let evening = series.track(TrackRole::Evening).unwrap();
        assert_eq!(morning.points.len(), 3);
        assert_eq!(evening.points.len(), 3);
        assert_eq!(morning.valid_count(), 2);
        assert_eq!(evening.valid_count(), 1);
        assert_eq!(series.max_absolute_value, 8.0);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn empty_readings_yield_all_missing_with_floor_bound() {
        let series = transform(&[], DisplayMode::Average, window(14), Palette::Default).unwrap();

        assert_eq!(series.len(), 14);
        assert!(series.points().iter().all(|point| !point.has_data));
        assert_eq!(series.max_absolute_value, 1.0);
        assert!(series.points().iter().all(|point| point.color == NEUTRAL));
        assert!(!series.has_any_data());
    }

    #[test]
    fn small_values_keep_the_floor_bound() {
        let readings = vec![reading(0, Some(0.25), Some(0.5)), reading(1, Some(0.0), Some(0.0))];
        let series =
            transform(&readings, DisplayMode::Average, window(2), Palette::Default).unwrap();
        assert_eq!(series.max_absolute_value, 1.0);
    }

    #[test]
    fn colors_are_assigned_against_the_final_bound() {
        let readings = vec![reading(0, Some(1.0), None), reading(1, Some(4.0), None)];
        let series =
            transform(&readings, DisplayMode::Average, window(2), Palette::Default).unwrap();

        let first = series.points()[0].color;
        assert_eq!(first, crate::color::color_for(1.0, 4.0));
        assert_eq!(series.points()[1].color.r, 0.2);
    }

    #[test]
    fn readings_outside_window_and_non_finite_values_are_ignored() {
        let readings = vec![
            reading(-1, Some(50.0), Some(50.0)),
            reading(0, Some(f64::NAN), Some(2.0)),
            reading(5, Some(50.0), Some(50.0)),
        ];
        let series =
            transform(&readings, DisplayMode::Impact, window(2), Palette::Default).unwrap();
        assert_eq!(values(&series), vec![None, None]);
        assert_eq!(series.max_absolute_value, 1.0);
    }

    #[test]
    fn duplicate_dates_keep_the_later_reading() {
        let readings = vec![reading(0, Some(1.0), None), reading(0, Some(3.0), None)];
        let series =
            transform(&readings, DisplayMode::Average, window(1), Palette::Default).unwrap();
        assert_eq!(values(&series), vec![Some(3.0)]);
    }

    #[test]
    fn transform_is_idempotent() {
        let readings = vec![reading(0, Some(1.0), Some(3.0)), reading(4, Some(-2.0), Some(2.0))];
        let first =
            transform(&readings, DisplayMode::Impact, window(7), Palette::HighContrast).unwrap();
        let second =
            transform(&readings, DisplayMode::Impact, window(7), Palette::HighContrast).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn overflowing_derivations_stay_finite() {
        let huge = f64::MAX / 1.5;
        let readings = vec![
            reading(0, Some(huge), Some(huge)),
            reading(1, Some(-huge), Some(huge)),
        ];

        let average =
            transform(&readings, DisplayMode::Average, window(2), Palette::Default).unwrap();
        assert_eq!(values(&average), vec![Some(huge), Some(0.0)]);
        assert!(average.max_absolute_value.is_finite());

        let impact =
            transform(&readings, DisplayMode::Impact, window(2), Palette::Default).unwrap();
        assert_eq!(values(&impact), vec![Some(0.0), None]);
        assert!(!impact.points()[1].has_data);
        assert_eq!(impact.max_absolute_value, 1.0);
    }

    #[test]
    fn fourteen_day_window_with_first_week_present() {
        let readings: Vec<_> = (0..7).map(|offset| reading(offset, Some(5.0), None)).collect();
        let series =
            transform(&readings, DisplayMode::Average, window(14), Palette::Default).unwrap();

        assert_eq!(series.len(), 14);
        for point in &series.points()[..7] {
            assert!(point.has_data);
            assert_eq!(point.value, Some(5.0));
        }
        assert!(series.points()[7..].iter().all(|point| !point.has_data));
        assert_eq!(series.max_absolute_value, 5.0);
    }
}
