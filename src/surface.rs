use crate::errors::{Result, VisualizationError};
use crate::geometry::{Bounds, Stroke};
use crate::models::Rgb;
use plotters::coord::Shift;
use plotters::prelude::*;

/// Drawing target for render components. Coordinates are pixels.
pub trait Surface {
    fn fill_rect(&mut self, rect: Bounds, color: Rgb) -> Result<()>;

    fn polyline(&mut self, points: &[(f64, f64)], stroke: Stroke) -> Result<()>;

    fn circle(
        &mut self,
        center: (f64, f64),
        radius: f64,
        fill: Option<Rgb>,
        outline: Option<Stroke>,
    ) -> Result<()>;

    fn text(&mut self, text: &str, origin: (f64, f64), size: f64, color: Rgb) -> Result<()>;

    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke) -> Result<()> {
        self.polyline(&[from, to], stroke)
    }
}

pub struct BitmapSurface<'a> {
    area: DrawingArea<BitMapBackend<'a>, Shift>,
}

impl<'a> BitmapSurface<'a> {
    /// `buffer` holds packed RGB8 pixels, `width * height * 3` bytes.
    pub fn new(buffer: &'a mut [u8], width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if buffer.len() != expected {
            return Err(VisualizationError::invalid_argument(format!(
                "pixel buffer holds {} bytes, expected {expected} for {width}x{height}",
                buffer.len()
            )));
        }
        let area = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
        Ok(Self { area })
    }

    pub fn present(&self) -> Result<()> {
        self.area.present().map_err(VisualizationError::render)
    }
}

impl Surface for BitmapSurface<'_> {
    fn fill_rect(&mut self, rect: Bounds, color: Rgb) -> Result<()> {
        let corners = [
            pixel((rect.x, rect.y)),
            pixel((rect.x + rect.width, rect.y + rect.height)),
        ];
        self.area
            .draw(&Rectangle::new(corners, rgb(color).filled()))
            .map_err(VisualizationError::render)
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: Stroke) -> Result<()> {
        if points.len() < 2 {
            return Ok(());
        }
        let path: Vec<(i32, i32)> = points.iter().copied().map(pixel).collect();
        self.area
            .draw(&PathElement::new(path, stroke_style(stroke)))
            .map_err(VisualizationError::render)
    }

    fn circle(
        &mut self,
        center: (f64, f64),
        radius: f64,
        fill: Option<Rgb>,
        outline: Option<Stroke>,
    ) -> Result<()> {
        let center = pixel(center);
        let radius = radius.round().max(1.0) as i32;
        if let Some(color) = fill {
            self.area
                .draw(&Circle::new(center, radius, rgb(color).filled()))
                .map_err(VisualizationError::render)?;
        }
        if let Some(stroke) = outline {
            self.area
                .draw(&Circle::new(center, radius, stroke_style(stroke)))
                .map_err(VisualizationError::render)?;
        }
        Ok(())
    }

    fn text(&mut self, text: &str, origin: (f64, f64), size: f64, color: Rgb) -> Result<()> {
        let style = ("sans-serif", size).into_font().color(&rgb(color));
        self.area
            .draw(&Text::new(text.to_string(), pixel(origin), style))
            .map_err(VisualizationError::render)
    }
}

fn pixel((x, y): (f64, f64)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn rgb(color: Rgb) -> RGBColor {
    let (r, g, b) = color.to_u8();
    RGBColor(r, g, b)
}

fn stroke_style(stroke: Stroke) -> ShapeStyle {
    rgb(stroke.color).stroke_width(stroke.width.round().max(1.0) as u32)
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill {
        rect: Bounds,
        color: Rgb,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        stroke: Stroke,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        fill: Option<Rgb>,
        outline: Option<Stroke>,
    },
    Text {
        text: String,
        origin: (f64, f64),
    },
}

/// Keeps every draw call in order instead of rasterizing, for layout inspection.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polylines(&self) -> impl Iterator<Item = &Vec<(f64, f64)>> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Polyline { points, .. } => Some(points),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { .. }))
    }

    /// Segments across all polylines; a polyline through `k` points has `k - 1`.
    pub fn segment_count(&self) -> usize {
        self.polylines()
            .map(|points| points.len().saturating_sub(1))
            .sum()
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, rect: Bounds, color: Rgb) -> Result<()> {
        self.ops.push(DrawOp::Fill { rect, color });
        Ok(())
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: Stroke) -> Result<()> {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            stroke,
        });
        Ok(())
    }

    fn circle(
        &mut self,
        center: (f64, f64),
        radius: f64,
        fill: Option<Rgb>,
        outline: Option<Stroke>,
    ) -> Result<()> {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            fill,
            outline,
        });
        Ok(())
    }

    fn text(&mut self, text: &str, origin: (f64, f64), _size: f64, _color: Rgb) -> Result<()> {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            origin,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_surface_rejects_mismatched_buffer() {
        let mut buffer = vec![0u8; 10];
        assert!(BitmapSurface::new(&mut buffer, 4, 4).is_err());
    }

    #[test]
    fn bitmap_surface_paints_pixels() {
        let (width, height) = (20u32, 10u32);
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let mut surface = BitmapSurface::new(&mut buffer, width, height).unwrap();
            surface
                .fill_rect(Bounds::from_size(width, height), Rgb::new(1.0, 1.0, 1.0))
                .unwrap();
            surface
                .circle((10.0, 5.0), 3.0, Some(Rgb::new(1.0, 0.0, 0.0)), None)
                .unwrap();
            surface.present().unwrap();
        }
        let center = ((5 * width + 10) * 3) as usize;
        assert_eq!(&buffer[center..center + 3], &[255, 0, 0]);
        assert_eq!(&buffer[0..3], &[255, 255, 255]);
    }

    #[test]
    fn recording_surface_counts_segments() {
        let mut surface = RecordingSurface::new();
        let stroke = Stroke::new(Rgb::new(0.0, 0.0, 0.0), 1.0);
        surface
            .polyline(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], stroke)
            .unwrap();
        surface.line((0.0, 0.0), (5.0, 0.0), stroke).unwrap();
        assert_eq!(surface.segment_count(), 3);
        assert_eq!(surface.polylines().count(), 2);
    }
}
