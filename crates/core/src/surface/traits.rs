use crate::models::chart::{LayoutSize, Path, PixelSize, Point, Stroke, TextStyle};

/// A caller-supplied drawing target, modelled on a 2D canvas.
///
/// The surface has two independent sizes: the backing buffer (physical
/// pixels, what drawing coordinates address) and the layout size (CSS pixels,
/// the footprint in the page). Keeping them separate is what lets a chart be
/// crisp on high-density displays without being stretched.
///
/// All drawing coordinates are backing-buffer pixels.
pub trait Surface {
    /// Current backing buffer size.
    fn backing_size(&self) -> PixelSize;

    /// Current layout (CSS) size.
    fn layout_size(&self) -> LayoutSize;

    /// Set both sizes. Resizing the backing buffer discards its content.
    fn resize(&mut self, backing: PixelSize, layout: LayoutSize);

    /// Erase everything drawn so far.
    fn clear(&mut self);

    /// Stroke an open path.
    fn stroke_path(&mut self, path: &Path, stroke: &Stroke);

    /// Draw a single line of text anchored at `at` (baseline).
    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle);
}
