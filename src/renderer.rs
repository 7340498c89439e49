use crate::components::{day_x, valid_runs, Component};
use crate::errors::Result;
use crate::geometry::{Bounds, ChartStyle, Projection};
use crate::models::{Track, VisualizationSeries};
use crate::surface::Surface;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layers {
    pub background: bool,
    pub grid: bool,
    pub points: bool,
    pub trend: bool,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            background: true,
            grid: true,
            points: true,
            trend: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    style: ChartStyle,
    layers: Layers,
    title: Option<String>,
}

impl ChartRenderer {
    pub fn new(style: ChartStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn with_layers(mut self, layers: Layers) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    /// Components that will run, in paint order.
    pub fn components(&self) -> Vec<Component> {
        Component::DRAW_ORDER
            .into_iter()
            .filter(|component| match component {
                Component::Grid => self.layers.grid,
                Component::DataPointMarker => self.layers.points,
                _ => true,
            })
            .collect()
    }

    /// Draws `series` into `bounds`. An absent series draws nothing at all.
    pub fn render(
        &self,
        surface: &mut dyn Surface,
        bounds: Bounds,
        series: Option<&VisualizationSeries>,
    ) -> Result<()> {
        let Some(series) = series else {
            return Ok(());
        };

        if self.layers.background {
            surface.fill_rect(bounds, self.style.background)?;
        }

        let plot_bounds = match self.title {
            Some(_) => bounds.inset_top(self.style.title_band),
            None => bounds,
        };

        for component in self.components() {
            component.draw(surface, plot_bounds, series, &self.style)?;
        }

        if self.layers.trend {
            self.draw_trend(surface, plot_bounds, series)?;
        }

        if let Some(title) = &self.title {
            let origin = (
                bounds.x + self.style.margin,
                bounds.y + (self.style.title_band - self.style.title_size).max(0.0) / 2.0,
            );
            if let Err(err) =
                surface.text(title, origin, self.style.title_size, self.style.title_color)
            {
                warn!("skipping chart title: {err}");
            }
        }

        Ok(())
    }

    fn draw_trend(
        &self,
        surface: &mut dyn Surface,
        bounds: Bounds,
        series: &VisualizationSeries,
    ) -> Result<()> {
        let projection = Projection::new(
            bounds,
            self.style.margin,
            series.len(),
            series.max_absolute_value,
        );
        for track in &series.tracks {
            let Some(fit) = TrendFit::for_track(track) else {
                continue;
            };
            let from = (
                day_x(&projection, series, fit.first),
                projection.y(fit.value_at(fit.first)),
            );
            let to = (
                day_x(&projection, series, fit.last),
                projection.y(fit.value_at(fit.last)),
            );
            surface.line(from, to, self.style.trend)?;
        }
        Ok(())
    }
}

/// Least-squares line through the valid points of one track, by day index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
    pub first: usize,
    pub last: usize,
}

impl TrendFit {
    pub fn for_track(track: &Track) -> Option<Self> {
        let samples: Vec<(f64, f64)> = valid_runs(track)
            .into_iter()
            .flatten()
            .map(|(index, value)| (index as f64, value))
            .collect();
        if samples.len() < 2 {
            return None;
        }

        let n = samples.len() as f64;
        let mean_x = samples.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = samples.iter().map(|(_, y)| y).sum::<f64>() / n;
        let spread: f64 = samples.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let covariance: f64 = samples
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();
        let slope = covariance / spread;

        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
            first: samples[0].0 as usize,
            last: samples[samples.len() - 1].0 as usize,
        })
    }

    pub fn value_at(&self, index: usize) -> f64 {
        self.intercept + self.slope * index as f64
    }
}
