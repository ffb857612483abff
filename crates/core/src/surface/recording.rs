use crate::models::chart::{DrawCommand, LayoutSize, Path, PixelSize, Point, Stroke, TextStyle};

use super::svg;
use super::traits::Surface;

/// A surface that records drawing operations instead of rasterising them.
///
/// Two frames are pixel-identical exactly when their sizes and command lists
/// are equal, which makes this the reference surface for tests and for SVG
/// export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    backing: PixelSize,
    layout: LayoutSize,
    commands: Vec<DrawCommand>,
    resizes: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations drawn since the last clear, in order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// How many times the backing buffer has been resized.
    pub fn resize_count(&self) -> usize {
        self.resizes
    }

    /// Number of stroked paths in the current frame.
    pub fn stroke_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokePath { .. }))
            .count()
    }

    /// Texts drawn in the current frame.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                DrawCommand::StrokePath { .. } => None,
            })
            .collect()
    }

    /// Export the current frame as an SVG document.
    pub fn to_svg(&self) -> String {
        svg::render(self.backing, self.layout, &self.commands)
    }
}

impl Surface for RecordingSurface {
    fn backing_size(&self) -> PixelSize {
        self.backing
    }

    fn layout_size(&self) -> LayoutSize {
        self.layout
    }

    fn resize(&mut self, backing: PixelSize, layout: LayoutSize) {
        if backing != self.backing {
            self.commands.clear();
            self.resizes += 1;
        }
        self.backing = backing;
        self.layout = layout;
    }

    fn clear(&mut self) {
        self.commands.clear();
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            stroke: *stroke,
        });
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            at,
            style: *style,
        });
    }
}
