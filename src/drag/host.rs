//! Contracts with the rendering layer, the frame clock and input

use serde::{Deserialize, Serialize};

use crate::layout::{Entry, ItemId, Point, Rect, Span, TrackSizes, Translation};

/// Token for one scheduled display frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FrameHandle(pub u64);

/// Read-only geometry of the rendered grid
pub trait Geometry {
    /// Column width/gap and row height/gap for a grid of `row_count` rows
    fn track_sizes(&self, row_count: usize) -> TrackSizes;

    /// Top-left of the grid's content box, viewport-relative (moves with scrolling)
    fn content_origin(&self) -> Point;

    /// Visible part of the scrollable container, viewport-relative
    fn scroll_viewport(&self) -> Rect;
}

/// Display refresh clock
///
/// The host calls back [`crate::Grid::on_frame`] with the handle once the
/// frame fires, unless it was cancelled first.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Visual requests issued by a drag session
pub trait Renderer {
    /// Offset an in-flow entry from its static position
    fn set_translation(&mut self, entry: Entry, translation: Translation);

    /// Offset the free-floating dragged element from where it was pinned
    fn set_drag_translation(&mut self, translation: Translation);

    /// Take an item out of the flow and pin it at `pinned` (viewport-relative)
    fn detach(&mut self, item: ItemId, pinned: Rect);

    /// Put the placeholder into the flow at `index`
    fn insert_placeholder(&mut self, index: usize, span: Span);

    fn remove_placeholder(&mut self);

    /// Put a detached item back into the flow at `index`
    fn reparent(&mut self, item: ItemId, index: usize);

    /// Drop every translation set during the drag
    fn clear_translations(&mut self);

    /// Scroll the container; returns the amount actually scrolled
    fn scroll_by(&mut self, dx: f64, dy: f64) -> (f64, f64);

    /// An external drag landed at `index`
    fn drop_accepted(&mut self, index: usize);

    /// An external drag ended without ever entering the grid
    fn drop_cancelled(&mut self);
}

/// Everything a grid needs from its environment
pub trait GridHost: Geometry + FrameScheduler + Renderer {}

impl<T: Geometry + FrameScheduler + Renderer> GridHost for T {}

/// Normalized pointer input, viewport-relative
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Press on an item's drag handle
    Start { item: ItemId, position: Point },
    Move(Point),
    End(Point),
}
