use crate::color::Palette;
use crate::errors::{Result, VisualizationError};
use crate::models::Rgb;
use serde::{Deserialize, Serialize};
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub const EXPORT_DIR_ENV: &str = "MOOD_CHART_EXPORT_DIR";
pub const MAX_DIMENSION: u32 = 8192;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub show_points: bool,
    pub show_grid: bool,
    pub show_title: bool,
    pub title: Option<String>,
    pub show_trend: bool,
    pub background_image: Option<PathBuf>,
    pub line_color: Option<Rgb>,
    pub palette: Palette,
    pub width: u32,
    pub height: u32,
    pub title_font: Option<PathBuf>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            show_points: true,
            show_grid: true,
            show_title: false,
            title: None,
            show_trend: false,
            background_image: None,
            line_color: None,
            palette: Palette::Default,
            width: 800,
            height: 400,
            title_font: None,
        }
    }
}

impl ChartOptions {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value == 0 || value > MAX_DIMENSION {
                return Err(VisualizationError::invalid_argument(format!(
                    "{name} must be between 1 and {MAX_DIMENSION}, got {value}"
                )));
            }
        }
        if let Some(color) = self.line_color {
            let channels = [color.r, color.g, color.b];
            if channels.iter().any(|channel| !(0.0..=1.0).contains(channel)) {
                return Err(VisualizationError::invalid_argument(
                    "line color channels must be within 0..=1",
                ));
            }
        }
        Ok(())
    }
}

pub fn resolve_export_dir() -> PathBuf {
    if let Ok(path) = env::var(EXPORT_DIR_ENV) {
        return PathBuf::from(path);
    }

    PathBuf::from("exports")
}

pub async fn load_options(path: &Path) -> ChartOptions {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(options) => options,
            Err(err) => {
                error!("failed to parse chart options: {err}");
                ChartOptions::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => ChartOptions::default(),
        Err(err) => {
            error!("failed to read chart options: {err}");
            ChartOptions::default()
        }
    }
}
