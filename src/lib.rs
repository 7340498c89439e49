pub mod color;
pub mod components;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod logging;
pub mod models;
pub mod renderer;
pub mod service;
pub mod surface;
pub mod timeline;
pub mod transform;

pub use color::Palette;
pub use config::{load_options, resolve_export_dir, ChartOptions};
pub use errors::{Result, VisualizationError};
pub use models::{
    DailyPoint, DateWindow, DisplayMode, RawDayReading, Rgb, TrackRole, VisualizationSeries,
};
pub use renderer::ChartRenderer;
pub use service::{ChartRequest, VisualizationService};
pub use transform::transform;
