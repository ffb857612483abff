use log::debug;

use crate::models::chart::Viewport;
use crate::models::range::RangeKey;

/// What the open chart overlay is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartTarget {
    pub instrument_id: String,
    pub range: RangeKey,
}

impl ChartTarget {
    pub fn new(instrument_id: impl Into<String>, range: RangeKey) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            range,
        }
    }
}

/// A coalesced redraw the caller should perform with the cached series.
#[derive(Debug, Clone, PartialEq)]
pub struct RedrawRequest {
    pub target: ChartTarget,
    pub viewport: Viewport,
}

/// Turns bursts of container-size notifications into at most one redraw per
/// animation frame.
///
/// Notifications only record the latest size; [`ResizeCoordinator::on_frame`]
/// decides whether a redraw is due. Nothing is scheduled while the chart is
/// closed, and empty (zero-size) viewports are never drawn.
#[derive(Debug, Default)]
pub struct ResizeCoordinator {
    /// `Some` while the chart overlay is open
    target: Option<ChartTarget>,

    /// Latest size reported since the last frame
    pending: Option<Viewport>,

    /// Size of the last frame actually drawn
    last_drawn: Option<Viewport>,
}

impl ResizeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chart became visible for `target`.
    pub fn open(&mut self, target: ChartTarget) {
        self.target = Some(target);
        self.pending = None;
        self.last_drawn = None;
    }

    /// Switch the visible chart to another range. No-op while closed.
    pub fn set_range(&mut self, range: RangeKey) {
        if let Some(target) = &mut self.target {
            target.range = range;
        }
    }

    /// The chart was hidden; pending work is dropped.
    pub fn close(&mut self) {
        self.target = None;
        self.pending = None;
        self.last_drawn = None;
    }

    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&ChartTarget> {
        self.target.as_ref()
    }

    /// Size of the last drawn frame, if any.
    pub fn last_viewport(&self) -> Option<Viewport> {
        self.last_drawn
    }

    /// Record a size-change notification. Returns `false` when ignored
    /// because the chart is not visible.
    pub fn notify_resize(&mut self, viewport: Viewport) -> bool {
        if self.target.is_none() {
            return false;
        }
        self.pending = Some(viewport);
        true
    }

    /// Record that the caller drew a frame directly (open, range change).
    pub fn mark_drawn(&mut self, viewport: Viewport) {
        self.pending = None;
        self.last_drawn = Some(viewport);
    }

    /// Called once per animation frame. Yields a redraw when the chart is
    /// visible and the latest reported size is drawable and differs from the
    /// last drawn one.
    pub fn on_frame(&mut self) -> Option<RedrawRequest> {
        let viewport = self.pending.take()?;
        let target = self.target.clone()?;

        if viewport.is_empty() {
            debug!("Skipping redraw of {}: empty viewport", target.instrument_id);
            return None;
        }
        if self.last_drawn == Some(viewport) {
            return None;
        }

        self.last_drawn = Some(viewport);
        Some(RedrawRequest { target, viewport })
    }
}
