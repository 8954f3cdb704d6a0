//! Drag sessions
//!
//! Everything that happens between a press on a drag handle and the final
//! drop: pointer handling, the reorder loop, transitions and auto-scroll.

pub mod animator;
pub mod autoscroll;
pub mod host;
pub mod session;

pub use animator::{Animator, Target};
pub use autoscroll::{increments, AutoScroller, ScrollIncrement};
pub use host::{FrameHandle, FrameScheduler, Geometry, GridHost, PointerEvent, Renderer};
pub use session::{DragController, DropResult, FrameOutcome, MoveOutcome, ReleaseOutcome};
