use crate::errors::Result;
use crate::geometry::{Bounds, ChartStyle, Projection};
use crate::models::{Track, VisualizationSeries};
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Grid,
    Baseline,
    ConnectingLine,
    DataPointMarker,
    MissingDataMarker,
}

impl Component {
    /// Later entries paint over earlier ones.
    pub const DRAW_ORDER: [Component; 5] = [
        Component::Grid,
        Component::Baseline,
        Component::ConnectingLine,
        Component::DataPointMarker,
        Component::MissingDataMarker,
    ];

    pub fn draw(
        self,
        surface: &mut dyn Surface,
        bounds: Bounds,
        series: &VisualizationSeries,
        style: &ChartStyle,
    ) -> Result<()> {
        let projection = Projection::new(
            bounds,
            style.margin,
            series.len(),
            series.max_absolute_value,
        );
        match self {
            Component::Grid => draw_grid(surface, &projection, series, style),
            Component::Baseline => draw_baseline(surface, &projection, style),
            Component::ConnectingLine => {
                draw_connecting_lines(surface, &projection, series, style)
            }
            Component::DataPointMarker => draw_data_points(surface, &projection, series, style),
            Component::MissingDataMarker => {
                draw_missing_points(surface, &projection, series, style)
            }
        }
    }
}

/// Pixel x of day `index`, honouring timestamp positions when the series has them.
pub fn day_x(projection: &Projection, series: &VisualizationSeries, index: usize) -> f64 {
    match series.positions.as_ref().and_then(|positions| positions.get(index)) {
        Some(&fraction) => projection.x_at(fraction),
        None => projection.x(index),
    }
}

/// Spacing between horizontal grid lines for a given normalization bound.
pub fn grid_interval(max_absolute_value: f64) -> f64 {
    if max_absolute_value <= 3.0 {
        1.0
    } else {
        (max_absolute_value / 3.0).ceil()
    }
}

/// Values that get a horizontal grid line, ascending. Zero belongs to the
/// baseline and is never included; the bound itself is.
pub fn grid_levels(max_absolute_value: f64) -> Vec<f64> {
    if !max_absolute_value.is_finite() || max_absolute_value <= 0.0 {
        return Vec::new();
    }
    let interval = grid_interval(max_absolute_value);
    let mut positive = Vec::new();
    let mut step = 1.0;
    while step * interval <= max_absolute_value {
        positive.push(step * interval);
        step += 1.0;
    }

    let mut levels: Vec<f64> = positive.iter().rev().map(|level| -level).collect();
    levels.extend(positive);
    levels
}

fn draw_grid(
    surface: &mut dyn Surface,
    projection: &Projection,
    series: &VisualizationSeries,
    style: &ChartStyle,
) -> Result<()> {
    for index in 0..projection.count() {
        let x = day_x(projection, series, index);
        surface.line((x, projection.top()), (x, projection.bottom()), style.grid)?;
    }

    for level in grid_levels(series.max_absolute_value) {
        let y = projection.y(level);
        surface.line((projection.left(), y), (projection.right(), y), style.grid)?;
    }
    Ok(())
}

fn draw_baseline(
    surface: &mut dyn Surface,
    projection: &Projection,
    style: &ChartStyle,
) -> Result<()> {
    let y = projection.center_y();
    surface.line((projection.left(), y), (projection.right(), y), style.baseline)
}

/// Index runs of consecutive valid points; gaps end a run.
pub fn valid_runs(track: &Track) -> Vec<Vec<(usize, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (index, point) in track.points.iter().enumerate() {
        match point.value {
            Some(value) if point.has_data => current.push((index, value)),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn draw_connecting_lines(
    surface: &mut dyn Surface,
    projection: &Projection,
    series: &VisualizationSeries,
    style: &ChartStyle,
) -> Result<()> {
    for track in &series.tracks {
        let stroke = style.line_for(track.role);
        for run in valid_runs(track).into_iter().filter(|run| run.len() >= 2) {
            let points: Vec<(f64, f64)> = run
                .iter()
                .map(|&(index, value)| (day_x(projection, series, index), projection.y(value)))
                .collect();
            surface.polyline(&points, stroke)?;
        }
    }
    Ok(())
}

fn draw_data_points(
    surface: &mut dyn Surface,
    projection: &Projection,
    series: &VisualizationSeries,
    style: &ChartStyle,
) -> Result<()> {
    for track in &series.tracks {
        for (index, point) in track.points.iter().enumerate() {
            let Some(value) = point.value.filter(|_| point.has_data) else {
                continue;
            };
            let center = (day_x(projection, series, index), projection.y(value));
            surface.circle(center, style.marker_radius, Some(point.color), None)?;
        }
    }
    Ok(())
}

fn draw_missing_points(
    surface: &mut dyn Surface,
    projection: &Projection,
    series: &VisualizationSeries,
    style: &ChartStyle,
) -> Result<()> {
    for track in &series.tracks {
        for (index, point) in track.points.iter().enumerate() {
            if point.has_data {
                continue;
            }
            let center = (day_x(projection, series, index), projection.center_y());
            surface.circle(
                center,
                style.missing_marker_radius,
                Some(style.missing_fill),
                Some(style.missing_outline),
            )?;
        }
    }
    Ok(())
}
