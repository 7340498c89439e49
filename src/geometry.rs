//! Shared layout constants and the data-to-pixel transform.
//!
//! Every render component receives the same [`ChartStyle`] and builds its
//! [`Projection`] from it, so grid lines, the baseline, the connecting line
//! and both marker kinds land on identical coordinates.

use crate::models::{Rgb, TrackRole};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, f64::from(width), f64::from(height))
    }

    /// Removes `amount` pixels from the top edge.
    pub fn inset_top(self, amount: f64) -> Self {
        let amount = amount.clamp(0.0, self.height.max(0.0));
        Self::new(self.x, self.y + amount, self.width, self.height - amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
}

impl Stroke {
    pub const fn new(color: Rgb, width: f64) -> Self {
        Self { color, width }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub margin: f64,
    pub marker_radius: f64,
    pub missing_marker_radius: f64,
    pub background: Rgb,
    pub grid: Stroke,
    pub baseline: Stroke,
    pub line: Stroke,
    pub morning_line: Rgb,
    pub evening_line: Rgb,
    pub missing_fill: Rgb,
    pub missing_outline: Stroke,
    pub trend: Stroke,
    pub title_color: Rgb,
    pub title_size: f64,
    pub title_band: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            margin: 40.0,
            marker_radius: 5.0,
            missing_marker_radius: 4.0,
            background: Rgb::new(0.98, 0.98, 0.97),
            grid: Stroke::new(Rgb::new(0.88, 0.88, 0.88), 1.0),
            baseline: Stroke::new(Rgb::new(0.55, 0.55, 0.6), 2.0),
            line: Stroke::new(Rgb::new(0.25, 0.3, 0.4), 2.0),
            morning_line: Rgb::new(0.95, 0.65, 0.15),
            evening_line: Rgb::new(0.35, 0.3, 0.75),
            missing_fill: Rgb::new(0.93, 0.93, 0.93),
            missing_outline: Stroke::new(Rgb::new(0.6, 0.6, 0.6), 1.0),
            trend: Stroke::new(Rgb::new(0.45, 0.45, 0.45), 1.0),
            title_color: Rgb::new(0.15, 0.15, 0.2),
            title_size: 18.0,
            title_band: 32.0,
        }
    }
}

impl ChartStyle {
    pub fn line_for(&self, role: TrackRole) -> Stroke {
        match role {
            TrackRole::Primary => self.line,
            TrackRole::Morning => Stroke::new(self.morning_line, self.line.width),
            TrackRole::Evening => Stroke::new(self.evening_line, self.line.width),
        }
    }
}

/// Maps day indices and mood values into pixel space for one set of bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    count: usize,
    point_spacing: f64,
    center_y: f64,
    scale: f64,
}

impl Projection {
    pub fn new(bounds: Bounds, margin: f64, count: usize, max_absolute_value: f64) -> Self {
        let plot_width = (bounds.width - 2.0 * margin).max(0.0);
        let plot_height = (bounds.height - 2.0 * margin).max(0.0);
        let max_absolute_value = if max_absolute_value > 0.0 && max_absolute_value.is_finite() {
            max_absolute_value
        } else {
            1.0
        };
        let point_spacing = if count > 1 {
            plot_width / (count - 1) as f64
        } else {
            0.0
        };
        let left = bounds.x + margin;
        let top = bounds.y + margin;

        Self {
            left,
            right: left + plot_width,
            top,
            bottom: top + plot_height,
            count,
            point_spacing,
            center_y: top + plot_height / 2.0,
            scale: (plot_height / 2.0) / max_absolute_value,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn point_spacing(&self) -> f64 {
        self.point_spacing
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn x(&self, index: usize) -> f64 {
        if self.count == 1 {
            return (self.left + self.right) / 2.0;
        }
        self.left + index as f64 * self.point_spacing
    }

    /// Pixel x for a fraction of the plot width, clamped to the plot.
    pub fn x_at(&self, fraction: f64) -> f64 {
        self.left + fraction.clamp(0.0, 1.0) * (self.right - self.left)
    }

    pub fn y(&self, value: f64) -> f64 {
        self.center_y - value * self.scale
    }

    pub fn center_y(&self) -> f64 {
        self.center_y
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }
}
