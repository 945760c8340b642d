//! Canvas Chart Renderer
//! Draws a fixed-size 600x300 line chart onto an RGBA buffer, one invocation
//! per chart surface.
//!
//! Layout:
//! 1. Legend: colored boxes + dataset labels, centered on top
//! 2. Plot area: grid, y-axis tick labels, filled line series with point
//!    markers, timestamp labels along the x-axis
//!
//! Gaps (missing values) break lines, fills and points; nothing is
//! interpolated across them when `span_gaps` is off.

use crate::charts::font;
use crate::charts::style::{Dataset, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::data::SeriesError;
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;

// Colors (RGBA)
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GRAY: Rgba<u8> = Rgba([200, 200, 200, 255]); // Grid lines
const DARK_GRAY: Rgba<u8> = Rgba([90, 90, 90, 255]); // Tick labels

// Plot area margins
const MARGIN_LEFT: u32 = 44;
const MARGIN_RIGHT: u32 = 10;
const MARGIN_TOP: u32 = 26;
const MARGIN_BOTTOM: u32 = 24;

pub struct CanvasChart {
    width: u32,
    height: u32,
}

impl Default for CanvasChart {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasChart {
    pub fn new() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }

    /// Render the labeled datasets as one chart image.
    ///
    /// Every dataset must carry exactly one value slot per label; a `None`
    /// slot leaves a visible break in that series.
    pub fn render(
        &self,
        labels: &[String],
        datasets: &[Dataset],
    ) -> Result<RgbaImage, SeriesError> {
        if labels.is_empty() {
            return Err(SeriesError::Empty);
        }
        for dataset in datasets {
            if dataset.values.len() != labels.len() {
                return Err(SeriesError::LengthMismatch {
                    name: dataset.style.label,
                    expected: labels.len(),
                    actual: dataset.values.len(),
                });
            }
        }

        let mut img = ImageBuffer::from_pixel(self.width, self.height, WHITE);

        let plot_x = MARGIN_LEFT;
        let plot_y = MARGIN_TOP;
        let plot_w = self.width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = self.height - MARGIN_TOP - MARGIN_BOTTOM;

        let (y_min, y_max) = Self::value_range(datasets);

        Self::draw_legend(&mut img, datasets, self.width);
        Self::draw_grid(&mut img, plot_x, plot_y, plot_w, plot_h, y_min, y_max);
        Self::draw_x_labels(&mut img, labels, plot_x, plot_y, plot_w, plot_h);

        // Axes
        draw_line_segment_mut(
            &mut img,
            (plot_x as f32, (plot_y + plot_h) as f32),
            ((plot_x + plot_w) as f32, (plot_y + plot_h) as f32),
            BLACK,
        );
        draw_line_segment_mut(
            &mut img,
            (plot_x as f32, plot_y as f32),
            (plot_x as f32, (plot_y + plot_h) as f32),
            BLACK,
        );

        for dataset in datasets {
            Self::draw_dataset(&mut img, dataset, plot_x, plot_y, plot_w, plot_h, y_min, y_max);
        }

        Ok(img)
    }

    /// Data range across all datasets, padded and clamped to zero for
    /// non-negative data. Returns (0, 1) when no values are present.
    fn value_range(datasets: &[Dataset]) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for dataset in datasets {
            for value in dataset.values.iter().flatten() {
                if !value.is_nan() {
                    min = min.min(*value);
                    max = max.max(*value);
                }
            }
        }
        if min.is_infinite() {
            return (0.0, 1.0);
        }
        let pad = ((max - min) * 0.1).max(1.0);
        let low = if min >= 0.0 {
            (min - pad).max(0.0)
        } else {
            min - pad
        };
        (low.floor(), (max + pad).ceil())
    }

    fn draw_legend(img: &mut RgbaImage, datasets: &[Dataset], width: u32) {
        let box_size = 8i32;
        let spacing = 14i32;

        let item_width = |dataset: &Dataset| -> i32 {
            box_size + 4 + font::measure_text(dataset.style.label) as i32
        };
        let total: i32 =
            datasets.iter().map(|d| item_width(d) + spacing).sum::<i32>() - spacing;
        let mut x = (width as i32 - total) / 2;

        for dataset in datasets {
            draw_filled_rect_mut(
                img,
                Rect::at(x, 7).of_size(box_size as u32, box_size as u32),
                dataset.style.color.rgba(),
            );
            font::draw_text(img, dataset.style.label, x + box_size + 4, 8, BLACK);
            x += item_width(dataset) + spacing;
        }
    }

    fn draw_grid(
        img: &mut RgbaImage,
        plot_x: u32,
        plot_y: u32,
        plot_w: u32,
        plot_h: u32,
        y_min: f64,
        y_max: f64,
    ) {
        let y_step = Self::nice_step(y_max - y_min, 6);
        let mut y_val = (y_min / y_step).ceil() * y_step;

        while y_val <= y_max {
            let py = Self::map_y(y_val, y_min, y_max, plot_y, plot_h);
            draw_line_segment_mut(
                img,
                (plot_x as f32, py as f32),
                ((plot_x + plot_w) as f32, py as f32),
                GRAY,
            );
            let label = if y_step >= 1.0 {
                format!("{:.0}", y_val)
            } else {
                format!("{:.1}", y_val)
            };
            let label_x = plot_x as i32 - 6 - font::measure_text(&label) as i32;
            let label_y = py as i32 - font::FONT_HEIGHT as i32 / 2;
            font::draw_text(img, &label, label_x, label_y, DARK_GRAY);
            y_val += y_step;
        }
    }

    fn draw_x_labels(
        img: &mut RgbaImage,
        labels: &[String],
        plot_x: u32,
        plot_y: u32,
        plot_w: u32,
        plot_h: u32,
    ) {
        let n = labels.len();
        let widest = labels
            .iter()
            .map(|label| font::measure_text(label))
            .max()
            .unwrap_or(0);
        let max_labels = (plot_w / (widest + 12).max(1)).max(1) as usize;
        let stride = n.div_ceil(max_labels).max(1);
        let bottom = plot_y + plot_h;

        for i in (0..n).step_by(stride) {
            let x = Self::x_position(i, n, plot_x, plot_w);
            draw_line_segment_mut(
                img,
                (x as f32, bottom as f32),
                (x as f32, (bottom + 3) as f32),
                BLACK,
            );
            let label = &labels[i];
            let label_x = x as i32 - font::measure_text(label) as i32 / 2;
            font::draw_text(img, label, label_x, (bottom + 7) as i32, DARK_GRAY);
        }
    }

    fn draw_dataset(
        img: &mut RgbaImage,
        dataset: &Dataset,
        plot_x: u32,
        plot_y: u32,
        plot_w: u32,
        plot_h: u32,
        y_min: f64,
        y_max: f64,
    ) {
        let n = dataset.values.len();
        let line_color = dataset.style.color.rgba();
        let baseline = plot_y + plot_h;

        // Area fill and line segments; a gap resets the run
        let mut prev: Option<(f64, f64)> = None;
        for (i, value) in dataset.values.iter().enumerate() {
            let Some(v) = value else {
                if !dataset.style.span_gaps {
                    prev = None;
                }
                continue;
            };
            let px = Self::x_position(i, n, plot_x, plot_w);
            let py = Self::map_y(*v, y_min, y_max, plot_y, plot_h) as f64;
            if let Some((prev_x, prev_y)) = prev {
                Self::fill_area(
                    img,
                    prev_x,
                    prev_y,
                    px,
                    py,
                    baseline,
                    line_color,
                    dataset.style.fill_alpha,
                );
                draw_line_segment_mut(
                    img,
                    (prev_x as f32, prev_y as f32),
                    (px as f32, py as f32),
                    line_color,
                );
            }
            prev = Some((px, py));
        }

        // Point markers: white fill with a colored rim
        for (i, value) in dataset.values.iter().enumerate() {
            if let Some(v) = value {
                let px = Self::x_position(i, n, plot_x, plot_w) as i32;
                let py = Self::map_y(*v, y_min, y_max, plot_y, plot_h) as i32;
                draw_filled_circle_mut(img, (px, py), dataset.style.point_radius, WHITE);
                draw_hollow_circle_mut(img, (px, py), dataset.style.point_radius, line_color);
            }
        }
    }

    /// Blend a vertical span per column from the segment down to the baseline.
    fn fill_area(
        img: &mut RgbaImage,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        baseline: u32,
        color: Rgba<u8>,
        alpha: f64,
    ) {
        let start = x0.round() as i32;
        let end = x1.round() as i32;
        for px in start..end {
            let t = if end == start {
                0.0
            } else {
                (px - start) as f64 / (end - start) as f64
            };
            let top = (y0 + (y1 - y0) * t).round() as i32;
            for py in top..=(baseline as i32) {
                Self::blend_pixel(img, px, py, color, alpha);
            }
        }
    }

    fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, alpha: f64) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= img.width() || y >= img.height() {
            return;
        }
        let a = (alpha.clamp(0.0, 1.0) * 255.0) as u16;
        let pixel = img.get_pixel_mut(x, y);
        let bg = *pixel;
        pixel[0] = ((color[0] as u16 * a + bg[0] as u16 * (255 - a)) / 255) as u8;
        pixel[1] = ((color[1] as u16 * a + bg[1] as u16 * (255 - a)) / 255) as u8;
        pixel[2] = ((color[2] as u16 * a + bg[2] as u16 * (255 - a)) / 255) as u8;
    }

    /// Sample index to pixel x; a single sample sits in the middle.
    fn x_position(i: usize, n: usize, plot_x: u32, plot_w: u32) -> f64 {
        if n <= 1 {
            return (plot_x + plot_w / 2) as f64;
        }
        plot_x as f64 + (i as f64 / (n - 1) as f64) * plot_w as f64
    }

    fn map_y(val: f64, y_min: f64, y_max: f64, plot_y: u32, plot_h: u32) -> u32 {
        let ratio = (val - y_min) / (y_max - y_min);
        plot_y + plot_h - (ratio * plot_h as f64) as u32
    }

    fn nice_step(range: f64, target_steps: usize) -> f64 {
        let raw_step = range / target_steps as f64;
        let magnitude = 10f64.powf(raw_step.log10().floor());
        let normalized = raw_step / magnitude;

        let nice = if normalized <= 1.0 {
            1.0
        } else if normalized <= 2.0 {
            2.0
        } else if normalized <= 5.0 {
            5.0
        } else {
            10.0
        };

        nice * magnitude
    }
}
