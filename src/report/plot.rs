use std::path::PathBuf;

use image::{ImageFormat, Rgb, RgbImage};

use super::{PresentationSink, ReportError, check_lengths, ensure_parent};
use crate::geometry::{Line, Point};
use crate::labeling::{Label, Side, label};
use crate::training::SelfTrainOutcome;

/// Colours and sizes for [`ScatterPlot`].
#[derive(Debug, Clone)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    pub band: Rgb<u8>,
    pub upper: Rgb<u8>,
    pub lower: Rgb<u8>,
    /// Points inside the band; only the preview shows these.
    pub unlabeled: Rgb<u8>,
    pub line: Rgb<u8>,
    pub edge: Rgb<u8>,
    /// Side length of each point marker in pixels.
    pub marker: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 700,
            background: Rgb([255, 255, 255]),
            band: Rgb([200, 200, 200]),
            upper: Rgb([31, 119, 180]),
            lower: Rgb([255, 127, 14]),
            unlabeled: Rgb([148, 103, 189]),
            line: Rgb([44, 160, 44]),
            edge: Rgb([90, 90, 90]),
            marker: 2,
        }
    }
}

/// Renders points coloured by final label with the fitted line and its margin band to PNG.
#[derive(Debug, Clone)]
pub struct ScatterPlot {
    path: PathBuf,
    style: PlotStyle,
}

impl ScatterPlot {
    pub fn new(path: impl Into<PathBuf>, style: PlotStyle) -> Self {
        Self {
            path: path.into(),
            style,
        }
    }

    pub fn render(&self, points: &[Point], outcome: &SelfTrainOutcome) -> RgbImage {
        let colours = outcome.labels.iter().map(|side| match side {
            Side::Upper => self.style.upper,
            Side::Lower => self.style.lower,
        });
        self.paint(points, colours, outcome.line, outcome.gap)
    }

    /// Raw scatter coloured by margin label against `line`, with the `±gap` band.
    ///
    /// Nothing is fitted; this is for choosing a starting line before a run.
    pub fn render_preview(&self, points: &[Point], line: Line, gap: f64) -> RgbImage {
        let colours = label(points, line, gap).into_iter().map(|label| match label {
            Label::Upper => self.style.upper,
            Label::Lower => self.style.lower,
            Label::Unlabeled => self.style.unlabeled,
        });
        self.paint(points, colours, line, gap)
    }

    /// Render a preview and save it to this plot's path.
    pub fn write_preview(&self, points: &[Point], line: Line, gap: f64) -> Result<(), ReportError> {
        let image = self.render_preview(points, line, gap);
        self.save(&image)
    }

    fn paint(
        &self,
        points: &[Point],
        colours: impl Iterator<Item = Rgb<u8>>,
        line: Line,
        gap: f64,
    ) -> RgbImage {
        let style = &self.style;
        let width = style.width.max(2);
        let height = style.height.max(2);
        let mut image = RgbImage::from_pixel(width, height, style.background);
        let view = Viewport::fit(points, width, height);
        let gap = gap.abs();

        for px in 0..width {
            let x = view.data_x(px);
            let top = view.pixel_y(line.at(x, gap));
            let bottom = view.pixel_y(line.at(x, -gap));
            let (from, to) = (top.min(bottom), top.max(bottom));
            for py in clamp_span(from, to, height) {
                image.put_pixel(px, py, style.band);
            }
        }

        for (point, colour) in points.iter().zip(colours) {
            draw_marker(&mut image, view.pixel_x(point.x), view.pixel_y(point.y), style.marker, colour);
        }

        draw_line(&mut image, &view, line, gap, style.edge);
        draw_line(&mut image, &view, line, -gap, style.edge);
        draw_line(&mut image, &view, line, 0.0, style.line);
        image
    }

    fn save(&self, image: &RgbImage) -> Result<(), ReportError> {
        ensure_parent(&self.path)?;
        image
            .save_with_format(&self.path, ImageFormat::Png)
            .map_err(|source| ReportError::Image {
                path: self.path.clone(),
                source,
            })
    }
}

impl PresentationSink for ScatterPlot {
    fn describe(&self) -> String {
        format!("plot {}", self.path.display())
    }

    fn present(&mut self, points: &[Point], outcome: &SelfTrainOutcome) -> Result<(), ReportError> {
        check_lengths(points, outcome)?;
        let image = self.render(points, outcome);
        self.save(&image)
    }
}

/// Maps the padded bounding box of the points onto the image.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: u32,
    height: u32,
}

impl Viewport {
    fn fit(points: &[Point], width: u32, height: u32) -> Self {
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points.iter().filter(|p| p.x.is_finite() && p.y.is_finite()) {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
        let (x_min, x_max) = padded(x_min, x_max);
        let (y_min, y_max) = padded(y_min, y_max);
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            width,
            height,
        }
    }

    fn data_x(&self, px: u32) -> f64 {
        self.x_min + (px as f64 / (self.width - 1) as f64) * (self.x_max - self.x_min)
    }

    fn pixel_x(&self, x: f64) -> f64 {
        (x - self.x_min) / (self.x_max - self.x_min) * (self.width - 1) as f64
    }

    /// Row for a data `y`; larger values sit higher in the image.
    fn pixel_y(&self, y: f64) -> f64 {
        (self.y_max - y) / (self.y_max - self.y_min) * (self.height - 1) as f64
    }
}

fn padded(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    (min - span * 0.05, max + span * 0.05)
}

fn clamp_span(from: f64, to: f64, height: u32) -> std::ops::Range<u32> {
    let limit = height as f64;
    let start = from.round().clamp(0.0, limit) as u32;
    let end = (to.round() + 1.0).clamp(0.0, limit) as u32;
    start..end.max(start)
}

fn draw_marker(image: &mut RgbImage, cx: f64, cy: f64, size: u32, colour: Rgb<u8>) {
    let half = (size / 2) as i64;
    let (cx, cy) = (cx.round() as i64, cy.round() as i64);
    for dy in -half..=half {
        for dx in -half..=half {
            put(image, cx + dx, cy + dy, colour);
        }
    }
}

/// Draws `y = kx + b + offset`, filling vertical runs so steep lines stay connected.
fn draw_line(image: &mut RgbImage, view: &Viewport, line: Line, offset: f64, colour: Rgb<u8>) {
    let mut previous: Option<f64> = None;
    for px in 0..image.width() {
        let py = view.pixel_y(line.at(view.data_x(px), offset));
        let (from, to) = match previous {
            Some(prev) => (prev.min(py), prev.max(py)),
            None => (py, py),
        };
        for row in clamp_span(from, to, image.height()) {
            image.put_pixel(px, row, colour);
        }
        previous = Some(py);
    }
}

fn put(image: &mut RgbImage, x: i64, y: i64, colour: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, colour);
    }
}
