//! Dual-Axis SVG Chart Module
//! Builds one scalable `<svg>` chart element: a shared time x-axis, two
//! independently scaled y-axes (pending totals left, pending favorites
//! right), and the two line paths drawn after the axes.

use crate::charts::style::DatasetKind;
use crate::data::{timestamp_label, SeriesError, StatsSeries};

// Surface and plot geometry (pixels)
const SVG_WIDTH: u32 = 600;
const SVG_HEIGHT: u32 = 300;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_RIGHT: f64 = 52.0;
const MARGIN_BOTTOM: f64 = 56.0;
const MARGIN_LEFT: f64 = 52.0;

const X_TICKS: usize = 7;
const Y_TICKS: usize = 5;
const TICK_LEN: f64 = 6.0;

/// Rotation of the time tick labels, degrees.
const LABEL_ROTATION: f64 = -55.0;

/// Fraction each y domain is widened by (min * 0.95 .. max * 1.05).
const DOMAIN_PAD: f64 = 0.05;

/// Maps a value domain linearly onto a pixel range.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Domain stretched to `min * 0.95 .. max * 1.05` over the present
    /// values; gaps are skipped.
    pub fn padded(values: &[Option<f64>], range: (f64, f64)) -> Self {
        let (min, max) = min_max(values);
        Self::new(
            (min * (1.0 - DOMAIN_PAD), max * (1.0 + DOMAIN_PAD)),
            range,
        )
    }

    /// Scale one value. A collapsed domain (constant input, e.g. an
    /// all-zero series) maps everything to the middle of the range rather
    /// than dividing by zero.
    pub fn scale(&self, value: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 {
            return (self.range.0 + self.range.1) / 2.0;
        }
        self.range.0 + (value - self.domain.0) / span * (self.range.1 - self.range.0)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Evenly spaced tick values covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 || count < 2 {
            return vec![self.domain.0];
        }
        (0..count)
            .map(|i| self.domain.0 + span * i as f64 / (count - 1) as f64)
            .collect()
    }
}

fn min_max(values: &[Option<f64>]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in values.iter().flatten() {
        if !value.is_nan() {
            min = min.min(*value);
            max = max.max(*value);
        }
    }
    if min.is_infinite() {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}

fn time_extent(timestamps: &[i64]) -> (f64, f64) {
    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for &ts in timestamps {
        min = min.min(ts);
        max = max.max(ts);
    }
    (min as f64, max as f64)
}

fn format_tick(value: f64, domain_span: f64) -> String {
    if domain_span >= 5.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Append-only target the rendered chart elements land in, standing in for
/// the page container the charts get injected into.
///
/// Every render call appends a further element; earlier ones are never
/// replaced. Call the renderer at most once per container unless stacked
/// output is wanted.
#[derive(Debug, Clone, Default)]
pub struct SvgContainer {
    elements: Vec<String>,
}

impl SvgContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn append(&mut self, element: String) {
        self.elements.push(element);
    }

    /// All appended elements in insertion order.
    pub fn contents(&self) -> String {
        self.elements.join("\n")
    }
}

pub struct DualAxisChart {
    width: u32,
    height: u32,
}

impl Default for DualAxisChart {
    fn default() -> Self {
        Self::new()
    }
}

impl DualAxisChart {
    pub fn new() -> Self {
        Self {
            width: SVG_WIDTH,
            height: SVG_HEIGHT,
        }
    }

    /// Render the chart and append it to `container`.
    ///
    /// Appends on every call; call at most once per container unless a
    /// stack of charts is intended.
    pub fn render_into(
        &self,
        container: &mut SvgContainer,
        series: &StatsSeries,
    ) -> Result<(), SeriesError> {
        container.append(self.render(series)?);
        Ok(())
    }

    /// Build the `<svg>` element: time axis, left y-axis over
    /// `pending_total`, right y-axis over `pending_favs`, then the two
    /// line paths on top.
    pub fn render(&self, series: &StatsSeries) -> Result<String, SeriesError> {
        series.validate()?;
        if series.is_empty() {
            return Err(SeriesError::Empty);
        }

        let plot_left = MARGIN_LEFT;
        let plot_right = self.width as f64 - MARGIN_RIGHT;
        let plot_top = MARGIN_TOP;
        let plot_bottom = self.height as f64 - MARGIN_BOTTOM;

        let (t_min, t_max) = time_extent(&series.last_update);
        let x = LinearScale::new((t_min, t_max), (plot_left, plot_right));
        let left = LinearScale::padded(&series.pending_total, (plot_bottom, plot_top));
        let right = LinearScale::padded(&series.pending_favs, (plot_bottom, plot_top));

        let total_style = DatasetKind::PendingTotal.style();
        let favs_style = DatasetKind::PendingFavs.style();

        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
            self.width, self.height, self.width, self.height
        );

        // Time axis with rotated tick labels
        svg.push_str("<g class=\"axis axis-x\">");
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#000\"/>",
            plot_left, plot_bottom, plot_right, plot_bottom
        ));
        for tick in x.ticks(X_TICKS) {
            let px = x.scale(tick);
            svg.push_str(&format!(
                "<line x1=\"{px:.1}\" y1=\"{:.1}\" x2=\"{px:.1}\" y2=\"{:.1}\" stroke=\"#000\"/>",
                plot_bottom,
                plot_bottom + TICK_LEN
            ));
            let ty = plot_bottom + TICK_LEN + 4.0;
            svg.push_str(&format!(
                "<text x=\"{px:.1}\" y=\"{ty:.1}\" font-size=\"10\" text-anchor=\"end\" transform=\"rotate({LABEL_ROTATION} {px:.1} {ty:.1})\">{}</text>",
                timestamp_label(tick.round() as i64)
            ));
        }
        svg.push_str("</g>");

        svg.push_str(&Self::y_axis(
            &left,
            "axis-y-left",
            plot_left,
            &total_style.color.css(1.0),
            false,
        ));
        svg.push_str(&Self::y_axis(
            &right,
            "axis-y-right",
            plot_right,
            &favs_style.color.css(1.0),
            true,
        ));

        // Lines go in after the axes so they render on top
        svg.push_str(&Self::line_path(
            &series.last_update,
            &series.pending_total,
            &x,
            &left,
            "line-pending-total",
            &total_style.color.css(1.0),
        ));
        svg.push_str(&Self::line_path(
            &series.last_update,
            &series.pending_favs,
            &x,
            &right,
            "line-pending-favs",
            &favs_style.color.css(1.0),
        ));

        svg.push_str("</svg>");
        Ok(svg)
    }

    fn y_axis(
        scale: &LinearScale,
        class: &str,
        axis_x: f64,
        label_color: &str,
        right_side: bool,
    ) -> String {
        let mut group = format!("<g class=\"axis {}\">", class);
        group.push_str(&format!(
            "<line x1=\"{axis_x:.1}\" y1=\"{:.1}\" x2=\"{axis_x:.1}\" y2=\"{:.1}\" stroke=\"#000\"/>",
            scale.range.0, scale.range.1
        ));

        let (d0, d1) = scale.domain();
        let span = (d1 - d0).abs();
        for tick in scale.ticks(Y_TICKS) {
            let py = scale.scale(tick);
            let (tick_x, text_x, anchor) = if right_side {
                (axis_x + TICK_LEN, axis_x + TICK_LEN + 3.0, "start")
            } else {
                (axis_x - TICK_LEN, axis_x - TICK_LEN - 3.0, "end")
            };
            group.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{py:.1}\" x2=\"{:.1}\" y2=\"{py:.1}\" stroke=\"#000\"/>",
                axis_x, tick_x
            ));
            group.push_str(&format!(
                "<text x=\"{text_x:.1}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"{anchor}\" fill=\"{label_color}\">{}</text>",
                py + 3.0,
                format_tick(tick, span)
            ));
        }
        group.push_str("</g>");
        group
    }

    /// `M .. L ..` path data; a missing value starts a new subpath so the
    /// gap stays open instead of being bridged.
    fn line_path(
        timestamps: &[i64],
        values: &[Option<f64>],
        x: &LinearScale,
        y: &LinearScale,
        class: &str,
        stroke: &str,
    ) -> String {
        let mut d = String::new();
        let mut pen_down = false;
        for (ts, value) in timestamps.iter().zip(values) {
            match value {
                Some(v) => {
                    let cmd = if pen_down { 'L' } else { 'M' };
                    d.push_str(&format!(
                        "{}{:.1},{:.1}",
                        cmd,
                        x.scale(*ts as f64),
                        y.scale(*v)
                    ));
                    pen_down = true;
                }
                None => pen_down = false,
            }
        }
        format!(
            "<path class=\"line {}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"/>",
            class, d, stroke
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_series() -> StatsSeries {
        let mut series = StatsSeries::default();
        series.push_sample(1_700_000_000, Some(100.0), Some(10.0), Some(1.0), Some(0.0));
        series.push_sample(1_700_000_060, Some(110.0), Some(12.0), Some(1.0), Some(0.0));
        series.push_sample(1_700_000_120, Some(95.0), Some(9.0), Some(2.0), Some(1.0));
        series
    }

    #[test]
    fn test_padded_domain() {
        let scale = LinearScale::padded(&[Some(100.0), Some(200.0)], (0.0, 100.0));
        assert_eq!(scale.domain(), (95.0, 210.0));
    }

    #[test]
    fn test_scale_is_linear() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 100.0));
        assert_eq!(scale.scale(0.0), 0.0);
        assert_eq!(scale.scale(5.0), 50.0);
        assert_eq!(scale.scale(10.0), 100.0);
    }

    #[test]
    fn test_zero_span_domain_maps_to_range_midpoint() {
        // Constant-zero series: 0 * 0.95 == 0 * 1.05, so the domain collapses
        let scale = LinearScale::padded(&[Some(0.0), Some(0.0), Some(0.0)], (250.0, 16.0));
        let px = scale.scale(0.0);
        assert!(px.is_finite());
        assert_eq!(px, 133.0);
    }

    #[test]
    fn test_ticks_cover_domain() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 1.0));
        assert_eq!(scale.ticks(5), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
    }

    #[test]
    fn test_render_axes_come_before_paths() {
        let svg = DualAxisChart::new().render(&sample_series()).unwrap();
        let first_path = svg.find("<path ").unwrap();
        let last_axis_close = svg.rfind("</g>").unwrap();
        assert!(last_axis_close < first_path);
        assert!(svg.contains("axis-x"));
        assert!(svg.contains("axis-y-left"));
        assert!(svg.contains("axis-y-right"));
    }

    #[test]
    fn test_render_has_two_line_paths() {
        let svg = DualAxisChart::new().render(&sample_series()).unwrap();
        assert_eq!(svg.matches("<path ").count(), 2);
        assert!(svg.contains("line-pending-total"));
        assert!(svg.contains("line-pending-favs"));
    }

    #[test]
    fn test_render_rotates_time_labels() {
        let svg = DualAxisChart::new().render(&sample_series()).unwrap();
        assert_eq!(svg.matches("rotate(-55 ").count(), X_TICKS);
    }

    #[test]
    fn test_gap_opens_new_subpath() {
        let mut series = sample_series();
        series.pending_total[1] = None;
        let svg = DualAxisChart::new().render(&series).unwrap();
        // Moves per path data attribute: the broken series restarts once,
        // the intact one has a single move
        let moves: Vec<usize> = svg
            .match_indices(" d=\"")
            .map(|(start, _)| {
                let data = &svg[start + 4..];
                let end = data.find('"').unwrap();
                data[..end].matches('M').count()
            })
            .collect();
        assert_eq!(moves, vec![2, 1]);
    }

    #[test]
    fn test_container_stacks_repeated_renders() {
        let chart = DualAxisChart::new();
        let series = sample_series();
        let mut container = SvgContainer::new();
        chart.render_into(&mut container, &series).unwrap();
        chart.render_into(&mut container, &series).unwrap();
        assert_eq!(container.element_count(), 2);
        assert_eq!(container.contents().matches("<svg ").count(), 2);
    }

    #[test]
    fn test_render_empty_series_errors() {
        let err = DualAxisChart::new().render(&StatsSeries::default()).unwrap_err();
        assert_eq!(err, SeriesError::Empty);
    }
}
