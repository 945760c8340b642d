//! Chart Style Module
//! One fixed descriptor per counter dataset, shared by both renderers.

use crate::data::StatsSeries;
use image::Rgba;

/// Canvas chart surface size (pixels).
pub const CANVAS_WIDTH: u32 = 600;
pub const CANVAS_HEIGHT: u32 = 300;

/// RGB color as the style table stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS `rgba(...)` literal at the given alpha, as the SVG output uses.
    pub fn css(&self, alpha: f64) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, alpha)
    }

    /// Opaque pixel for canvas drawing.
    pub fn rgba(&self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

/// The counter datasets the charts know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    PendingTotal,
    PendingFavs,
    UniqueCrashes,
    UniqueHangs,
}

/// Fixed visual styling for one dataset.
#[derive(Debug, Clone, Copy)]
pub struct DatasetStyle {
    pub label: &'static str,
    pub color: Color,
    /// Alpha of the area fill under the line.
    pub fill_alpha: f64,
    /// Kept from the original config; segments are drawn straight.
    pub line_tension: f64,
    /// Point markers are white-filled circles of this radius.
    pub point_radius: i32,
    /// When false, a missing value breaks the line instead of being bridged.
    pub span_gaps: bool,
}

impl DatasetStyle {
    const fn counter(label: &'static str, color: Color) -> Self {
        Self {
            label,
            color,
            fill_alpha: 0.4,
            line_tension: 0.1,
            point_radius: 1,
            span_gaps: false,
        }
    }
}

static PENDING_TOTAL: DatasetStyle =
    DatasetStyle::counter("Pending total", Color::new(183, 191, 74));
static PENDING_FAVS: DatasetStyle =
    DatasetStyle::counter("Pending favs", Color::new(191, 171, 74));
static UNIQUE_CRASHES: DatasetStyle =
    DatasetStyle::counter("Unique Crashes", Color::new(191, 95, 74));
static UNIQUE_HANGS: DatasetStyle =
    DatasetStyle::counter("Unique Hangs", Color::new(191, 74, 111));

impl DatasetKind {
    pub fn style(self) -> &'static DatasetStyle {
        match self {
            DatasetKind::PendingTotal => &PENDING_TOTAL,
            DatasetKind::PendingFavs => &PENDING_FAVS,
            DatasetKind::UniqueCrashes => &UNIQUE_CRASHES,
            DatasetKind::UniqueHangs => &UNIQUE_HANGS,
        }
    }
}

/// A styled value sequence as the chart renderers consume it.
#[derive(Clone, Copy)]
pub struct Dataset<'a> {
    pub style: &'static DatasetStyle,
    pub values: &'a [Option<f64>],
}

impl<'a> Dataset<'a> {
    pub fn new(kind: DatasetKind, values: &'a [Option<f64>]) -> Self {
        Self {
            style: kind.style(),
            values,
        }
    }
}

/// Datasets of the pending-paths chart (`graph_paths`).
pub fn paths_datasets(series: &StatsSeries) -> [Dataset<'_>; 2] {
    [
        Dataset::new(DatasetKind::PendingTotal, &series.pending_total),
        Dataset::new(DatasetKind::PendingFavs, &series.pending_favs),
    ]
}

/// Datasets of the crash/hang chart (`graph_crashes`).
pub fn crashes_datasets(series: &StatsSeries) -> [Dataset<'_>; 2] {
    [
        Dataset::new(DatasetKind::UniqueCrashes, &series.unique_crashes),
        Dataset::new(DatasetKind::UniqueHangs, &series.unique_hangs),
    ]
}
