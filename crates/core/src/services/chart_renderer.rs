use crate::models::chart::{
    ChartConfig, LineCap, Path, PlotPoint, Point, Stroke, TextAlign, TextStyle, Viewport,
};
use crate::surface::traits::Surface;

/// Draws a price series as a smoothed line chart onto a [`Surface`].
///
/// The renderer holds no per-frame state: every call fits the surface, clears
/// it and redraws from scratch, so identical inputs give identical frames.
/// Degenerate input never fails. Fewer than two points draws the grid only,
/// and a flat series draws a flat line at mid-height.
pub struct ChartRenderer {
    config: ChartConfig,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Render `series` for a container of the viewport's CSS size.
    ///
    /// Steps: fit the backing buffer, clear, grid, smoothed line, then the
    /// first/last value labels.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, series: &[f64], viewport: Viewport) {
        Self::fit(surface, viewport);
        surface.clear();

        let backing = surface.backing_size();
        if backing.width == 0 || backing.height == 0 {
            return;
        }
        let (w, h) = (f64::from(backing.width), f64::from(backing.height));

        self.draw_grid(surface, w, h);

        let values: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
        if values.len() < 2 {
            return;
        }

        let padding = self.padding(w);
        let points = Self::plot_points(&values, w, h, padding);

        let stroke = Stroke {
            color: self.config.line_color,
            width: (w.min(h) * 0.008).round().max(2.0),
            cap: LineCap::Round,
        };
        surface.stroke_path(&Self::smooth_path(&points), &stroke);

        if self.config.show_labels {
            self.draw_labels(surface, &points, w, viewport.scale());
        }
    }

    /// Size the backing buffer to `css × scale` and keep the layout at the
    /// container's CSS size. Leaves the surface alone when nothing changed.
    pub fn fit<S: Surface + ?Sized>(surface: &mut S, viewport: Viewport) {
        let backing = viewport.backing_size();
        let layout = viewport.layout_size();
        if surface.backing_size() != backing || surface.layout_size() != layout {
            surface.resize(backing, layout);
        }
    }

    /// Symmetric plot padding in backing pixels: `max(min_padding, w × ratio)`, rounded.
    pub fn padding(&self, width: f64) -> f64 {
        (width * self.config.padding_ratio)
            .max(self.config.min_padding)
            .round()
    }

    fn draw_grid<S: Surface + ?Sized>(&self, surface: &mut S, w: f64, h: f64) {
        let lines = self.config.grid_lines;
        if lines == 0 {
            return;
        }
        let stroke = Stroke {
            color: self.config.grid_color,
            width: 1.0,
            cap: LineCap::Butt,
        };
        for i in 0..=lines {
            // Half-pixel offset keeps 1px lines on a single pixel row
            let y = h / f64::from(lines) * f64::from(i) + 0.5;
            let mut path = Path::new();
            path.move_to(Point::new(0.0, y)).line_to(Point::new(w, y));
            surface.stroke_path(&path, &stroke);
        }
    }

    fn draw_labels<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        points: &[PlotPoint],
        w: f64,
        scale: f64,
    ) {
        let style = TextStyle {
            color: self.config.label_color,
            size_px: self.config.label_font_px * scale,
            align: TextAlign::Right,
        };
        let x = w - self.config.label_inset_px * scale;
        let lift = self.config.label_lift_px * scale;

        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            for p in [first, last] {
                surface.fill_text(&format!("{:.2}", p.value), Point::new(x, p.at.y - lift), &style);
            }
        }
    }

    /// Map values onto the plot area with min–max normalisation.
    ///
    /// x spreads the points evenly across `[padding, w − padding]`; y maps the
    /// minimum to the bottom and the maximum to the top of
    /// `[padding, h − padding]`. A flat series (zero span) sits at mid-height.
    pub fn plot_points(values: &[f64], w: f64, h: f64, padding: f64) -> Vec<PlotPoint> {
        if values.is_empty() {
            return Vec::new();
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;

        let inner_w = w - padding * 2.0;
        let inner_h = h - padding * 2.0;
        let steps = (values.len().max(2) - 1) as f64;

        values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let x = padding + (i as f64 / steps) * inner_w;
                let norm = if span == 0.0 { 0.5 } else { (value - min) / span };
                let y = padding + inner_h - norm * inner_h;
                PlotPoint {
                    at: Point::new(x, y),
                    value,
                }
            })
            .collect()
    }

    /// Smoothed line: a quadratic curve through each interior point, ending
    /// at the midpoint to the next one, then a straight segment to the last.
    pub fn smooth_path(points: &[PlotPoint]) -> Path {
        let mut path = Path::new();
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return path;
        };
        path.move_to(first.at);
        for pair in points.windows(2).skip(1) {
            let (p, next) = (pair[0].at, pair[1].at);
            path.quad_to(p, p.midpoint(&next));
        }
        path.line_to(last.at);
        path
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}
