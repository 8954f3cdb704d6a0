//! Edge auto-scroll while dragging
//!
//! The pointer inside a margin at any edge of the scroll viewport scrolls the
//! container every frame. Speed grows linearly with how deep the pointer is
//! in the margin.

use tracing::{debug, trace};

use super::host::{FrameHandle, FrameScheduler, Renderer};
use crate::layout::{Point, Rect};

/// Per-frame scroll step on each axis; `None` means no scrolling on that axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollIncrement {
    pub dx: Option<f64>,
    pub dy: Option<f64>,
}

impl ScrollIncrement {
    pub fn is_idle(&self) -> bool {
        self.dx.is_none() && self.dy.is_none()
    }
}

/// Scroll step for a pointer at `pointer` inside `viewport`
pub fn increments(pointer: Point, viewport: Rect, margin: f64, speed: f64) -> ScrollIncrement {
    ScrollIncrement {
        dx: axis_increment(pointer.x, viewport.x, viewport.width, margin, speed),
        dy: axis_increment(pointer.y, viewport.y, viewport.height, margin, speed),
    }
}

fn axis_increment(pointer: f64, start: f64, length: f64, margin: f64, speed: f64) -> Option<f64> {
    let zone = length * margin;
    if zone <= 0.0 {
        return None;
    }
    let end = start + length;
    if pointer > end - zone {
        Some(speed * ((pointer - (end - zone)) / zone).min(1.0))
    } else if pointer < start + zone {
        Some(-speed * ((start + zone - pointer) / zone).min(1.0))
    } else {
        None
    }
}

/// The scroll loop of one drag session
#[derive(Debug, Default)]
pub struct AutoScroller {
    increment: ScrollIncrement,
    frame: Option<FrameHandle>,
}

impl AutoScroller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.frame.is_some()
    }

    pub fn owns(&self, handle: FrameHandle) -> bool {
        self.frame == Some(handle)
    }

    /// Start, retarget or stop the loop for a new increment
    pub fn update<S: FrameScheduler>(&mut self, increment: ScrollIncrement, host: &mut S) {
        self.increment = increment;
        if increment.is_idle() {
            self.cancel(host);
        } else if self.frame.is_none() {
            debug!(?increment, "auto-scroll started");
            self.frame = Some(host.request_frame());
        }
    }

    /// Scroll one step and schedule the next; returns the applied scroll
    pub fn on_frame<H>(&mut self, host: &mut H) -> (f64, f64)
    where
        H: FrameScheduler + Renderer,
    {
        self.frame = None;
        if self.increment.is_idle() {
            return (0.0, 0.0);
        }
        let applied = host.scroll_by(
            self.increment.dx.unwrap_or(0.0),
            self.increment.dy.unwrap_or(0.0),
        );
        trace!(?applied, "auto-scroll step");
        self.frame = Some(host.request_frame());
        applied
    }

    pub fn cancel<S: FrameScheduler>(&mut self, host: &mut S) {
        if let Some(handle) = self.frame.take() {
            debug!("auto-scroll cancelled");
            host.cancel_frame(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::SimulatedHost;

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 500.0)
    }

    #[test]
    fn test_center_is_idle() {
        assert!(increments(Point::new(500.0, 250.0), viewport(), 0.1, 20.0).is_idle());
    }

    #[test]
    fn test_right_zone_scales_with_depth() {
        let inc = increments(Point::new(950.0, 250.0), viewport(), 0.1, 20.0);
        assert_eq!(inc.dx, Some(10.0));
        assert_eq!(inc.dy, None);
        let edge = increments(Point::new(1200.0, 250.0), viewport(), 0.1, 20.0);
        assert_eq!(edge.dx, Some(20.0));
    }

    #[test]
    fn test_top_zone_scrolls_up() {
        let inc = increments(Point::new(500.0, 0.0), viewport(), 0.1, 20.0);
        assert_eq!(inc.dy, Some(-20.0));
    }

    #[test]
    fn test_zero_margin_disables() {
        assert!(increments(Point::new(999.0, 499.0), viewport(), 0.0, 20.0).is_idle());
    }

    #[test]
    fn test_enter_then_leave_cancels_once() {
        let mut host = SimulatedHost::default();
        let mut scroller = AutoScroller::new();

        scroller.update(increments(Point::new(990.0, 250.0), viewport(), 0.1, 20.0), &mut host);
        assert!(scroller.is_active());
        scroller.update(increments(Point::new(995.0, 250.0), viewport(), 0.1, 20.0), &mut host);
        assert_eq!(host.requested_frames(), 1);

        scroller.update(increments(Point::new(500.0, 250.0), viewport(), 0.1, 20.0), &mut host);
        scroller.update(increments(Point::new(510.0, 250.0), viewport(), 0.1, 20.0), &mut host);
        assert!(!scroller.is_active());
        assert_eq!(host.cancelled_frames().len(), 1);
        assert!(host.pending_frames().is_empty());
    }
}
