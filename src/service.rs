use crate::config::{load_options, resolve_export_dir, ChartOptions};
use crate::errors::{Result, VisualizationError};
use crate::geometry::{Bounds, ChartStyle};
use crate::models::{DateWindow, DisplayMode, RawDayReading, VisualizationSeries};
use crate::renderer::{ChartRenderer, Layers};
use crate::surface::BitmapSurface;
use crate::transform::transform;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, warn};

static TITLE_FONT: OnceCell<PathBuf> = OnceCell::new();

#[derive(Debug, Clone, Deserialize)]
pub struct ChartRequest {
    pub readings: Vec<RawDayReading>,
    pub mode: DisplayMode,
    pub window: DateWindow,
    #[serde(default)]
    pub options: ChartOptions,
}

impl ChartRequest {
    /// Replaces the options with those stored at `path`, falling back to defaults.
    pub async fn with_options_file(mut self, path: &Path) -> Self {
        self.options = load_options(path).await;
        self
    }
}

#[derive(Debug, Clone)]
pub struct VisualizationService {
    style: ChartStyle,
    export_dir: PathBuf,
}

impl Default for VisualizationService {
    fn default() -> Self {
        Self {
            style: ChartStyle::default(),
            export_dir: resolve_export_dir(),
        }
    }
}

impl VisualizationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: ChartStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    /// Directory that relative export paths are resolved against.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn render_to_bytes(
        &self,
        readings: &[RawDayReading],
        mode: DisplayMode,
        window: DateWindow,
        options: &ChartOptions,
    ) -> Result<Vec<u8>> {
        options.validate()?;
        let series = transform(readings, mode, window, options.palette)?;
        let pixels = self.rasterize(&series, options)?;
        let png = encode_png(&pixels, options.width, options.height)?;

        info!(
            mode = %mode,
            days = series.len(),
            width = options.width,
            height = options.height,
            bytes = png.len(),
            "rendered mood chart"
        );
        Ok(png)
    }

    pub fn render_request(&self, request: &ChartRequest) -> Result<Vec<u8>> {
        self.render_to_bytes(
            &request.readings,
            request.mode,
            request.window,
            &request.options,
        )
    }

    /// Renders on the blocking pool and writes the PNG to `path`.
    pub async fn render_to_file(
        &self,
        request: ChartRequest,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let path = path.as_ref();
        let service = self.clone();
        let png = tokio::task::spawn_blocking(move || service.render_request(&request)).await??;
        fs::write(path, png).await?;
        info!("wrote mood chart to {}", path.display());
        Ok(())
    }

    /// Renders every job concurrently. Relative paths land in the export
    /// directory, which is created on demand. Results keep the order of `jobs`.
    pub async fn export_batch(&self, jobs: Vec<(ChartRequest, PathBuf)>) -> Vec<Result<PathBuf>> {
        if jobs.iter().any(|(_, path)| path.is_relative()) {
            if let Err(err) = fs::create_dir_all(&self.export_dir).await {
                error!("failed to create export dir {}: {err}", self.export_dir.display());
            }
        }

        let handles: Vec<_> = jobs
            .into_iter()
            .map(|(request, path)| {
                // joining an absolute path keeps it unchanged
                let path = self.export_dir.join(path);
                let service = self.clone();
                tokio::spawn(async move {
                    let written = service.render_to_file(request, &path).await;
                    written.map(|()| path)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.map_err(VisualizationError::from).and_then(|result| result));
        }
        results
    }

    fn renderer_for(
        &self,
        series: &VisualizationSeries,
        options: &ChartOptions,
    ) -> Result<ChartRenderer> {
        let mut style = self.style.clone();
        if let Some(color) = options.line_color {
            style.line.color = color;
        }

        let mut renderer = ChartRenderer::new(style).with_layers(Layers {
            background: options.background_image.is_none(),
            grid: options.show_grid,
            points: options.show_points,
            trend: options.show_trend,
        });

        if options.show_title {
            if let Some(font) = &options.title_font {
                register_title_font(font)?;
            }
            let title = options
                .title
                .clone()
                .unwrap_or_else(|| default_title(series));
            renderer = renderer.with_title(title);
        }
        Ok(renderer)
    }

    fn rasterize(&self, series: &VisualizationSeries, options: &ChartOptions) -> Result<Vec<u8>> {
        let (width, height) = (options.width, options.height);
        let mut pixels = match &options.background_image {
            Some(path) => load_background(path, width, height)?,
            None => vec![0u8; width as usize * height as usize * 3],
        };

        let renderer = self.renderer_for(series, options)?;
        {
            let mut surface = BitmapSurface::new(&mut pixels, width, height)?;
            renderer.render(&mut surface, Bounds::from_size(width, height), Some(series))?;
            surface.present()?;
        }
        Ok(pixels)
    }
}

pub fn default_title(series: &VisualizationSeries) -> String {
    let label = match series.mode {
        DisplayMode::Impact => "Mood impact",
        DisplayMode::Average => "Average mood",
        DisplayMode::RawSeries => "Morning and evening mood",
    };
    format!(
        "{label}, {} to {}",
        series.window.start(),
        series.window.end()
    )
}

fn load_background(path: &Path, width: u32, height: u32) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    let mut image = image::load_from_memory(&bytes)?;
    if image.width() != width || image.height() != height {
        image = image.resize_exact(width, height, FilterType::Triangle);
    }
    Ok(image.to_rgb8().into_raw())
}

fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(pixels, width, height, ExtendedColorType::Rgb8)?;
    Ok(png)
}

fn register_title_font(path: &Path) -> Result<()> {
    let registered = TITLE_FONT.get_or_try_init(|| -> Result<PathBuf> {
        let bytes = std::fs::read(path)?;
        // plotters keeps registered fonts for the life of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        plotters::style::register_font("sans-serif", plotters::style::FontStyle::Normal, bytes)
            .map_err(|_| {
                VisualizationError::invalid_argument(format!(
                    "`{}` is not a usable font",
                    path.display()
                ))
            })?;
        Ok(path.to_path_buf())
    })?;

    if registered.as_path() != path {
        warn!(
            "title font already registered from {}, ignoring {}",
            registered.display(),
            path.display()
        );
    }
    Ok(())
}
