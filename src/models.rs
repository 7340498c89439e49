use crate::errors::{Result, VisualizationError};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDayReading {
    pub date: NaiveDate,
    #[serde(default)]
    pub morning: Option<f64>,
    #[serde(default)]
    pub evening: Option<f64>,
    /// When the day's last entry was logged; places the day along the time axis.
    #[serde(default)]
    pub recorded_at: Option<NaiveDateTime>,
}

impl RawDayReading {
    pub fn new(date: NaiveDate, morning: Option<f64>, evening: Option<f64>) -> Self {
        Self {
            date,
            morning,
            evening,
            recorded_at: None,
        }
    }

    pub fn with_recorded_at(mut self, recorded_at: NaiveDateTime) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DisplayMode {
    Impact,
    Average,
    RawSeries,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Impact => "impact",
            DisplayMode::Average => "average",
            DisplayMode::RawSeries => "raw_series",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = VisualizationError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "impact" => Ok(DisplayMode::Impact),
            "average" => Ok(DisplayMode::Average),
            "raw" | "raw_series" | "rawseries" => Ok(DisplayMode::RawSeries),
            other => Err(VisualizationError::invalid_argument(format!(
                "unsupported display mode `{other}`; expected impact|average|raw_series"
            ))),
        }
    }
}

impl TryFrom<u8> for DisplayMode {
    type Error = VisualizationError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(DisplayMode::Impact),
            1 => Ok(DisplayMode::Average),
            2 => Ok(DisplayMode::RawSeries),
            other => Err(VisualizationError::invalid_argument(format!(
                "unsupported display mode code {other}"
            ))),
        }
    }
}

impl TryFrom<String> for DisplayMode {
    type Error = VisualizationError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DisplayMode> for String {
    fn from(mode: DisplayMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Inclusive calendar range. `end` is never before `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct WindowBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<WindowBounds> for DateWindow {
    type Error = VisualizationError;

    fn try_from(bounds: WindowBounds) -> Result<Self> {
        DateWindow::new(bounds.start, bounds.end)
    }
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(VisualizationError::invalid_argument(format!(
                "date window ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window of `days` days whose last day is `end`.
    pub fn ending_on(end: NaiveDate, days: u32) -> Result<Self> {
        if days == 0 {
            return Err(VisualizationError::invalid_argument(
                "date window must span at least one day",
            ));
        }
        let start = end - Duration::days(i64::from(days) - 1);
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.len() as i64).map(move |offset| self.start + Duration::days(offset))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn to_u8(self) -> (u8, u8, u8) {
        (channel(self.r), channel(self.g), channel(self.b))
    }
}

fn channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub has_data: bool,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackRole {
    Primary,
    Morning,
    Evening,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub role: TrackRole,
    pub points: Vec<DailyPoint>,
}

impl Track {
    pub fn valid_count(&self) -> usize {
        self.points.iter().filter(|point| point.has_data).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationSeries {
    pub mode: DisplayMode,
    pub window: DateWindow,
    pub tracks: Vec<Track>,
    pub max_absolute_value: f64,
    /// Horizontal placement of each day as a fraction of the plot width. `None`
    /// spaces days evenly by index.
    pub positions: Option<Vec<f64>>,
}

impl VisualizationSeries {
    /// Day count of the window; every track has exactly this many points.
    pub fn len(&self) -> usize {
        self.tracks.first().map_or(0, |track| track.points.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> &[DailyPoint] {
        self.tracks
            .first()
            .map(|track| track.points.as_slice())
            .unwrap_or(&[])
    }

    pub fn track(&self, role: TrackRole) -> Option<&Track> {
        self.tracks.iter().find(|track| track.role == role)
    }

    pub fn has_any_data(&self) -> bool {
        self.tracks.iter().any(|track| track.valid_count() > 0)
    }
}
