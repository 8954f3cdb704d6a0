//! Drag session controller
//!
//! State machine for one grid: `Idle -> PendingClick -> Dragging ->
//! Releasing -> Idle`. Every pointer move is handled to completion before
//! returning. The current [`GridView`] is replaced wholesale on each reorder,
//! never patched.
//!
//! While a layout transition is running, moves only carry the dragged
//! element; the placeholder cannot move again until the transition ends.

use std::collections::HashMap;

use tracing::{debug, error, info, trace};

use super::animator::{Animator, Target};
use super::autoscroll::{increments, AutoScroller};
use super::host::{FrameHandle, GridHost};
use crate::error::GridError;
use crate::layout::{
    diff, rebase, resolve, trigger_at, AnimationInstruction, Entry, GridConfig, GridView, ItemId,
    Point, Rect, Resolution, Span, Translation,
};
use crate::registry::ItemRegistry;

/// What a pointer move did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No drag, or the session is releasing
    Ignored,
    /// A pressed item was lifted out of the flow
    Started,
    /// Only the dragged element moved (transition in flight)
    Floating,
    /// The pointer rests on the forbidden trigger
    Suppressed,
    /// The placeholder keeps its index
    Unchanged,
    /// The placeholder moved to this index
    Reordered(usize),
    /// An external drag entered the grid; the placeholder is at this index
    Entered(usize),
}

/// What a pointer release did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Ignored,
    /// Press and release without a drag
    Clicked(ItemId),
    /// The dragged element is animating to its slot
    Releasing,
    /// The drop completed without animation
    Dropped(DropResult),
    /// An external drag never entered the grid
    Cancelled,
}

/// What a display frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame does not belong to this session
    Ignored,
    Animated,
    Scrolled,
    Dropped(DropResult),
}

/// Final result of a completed drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropResult {
    /// An item moved from one index to another
    Moved { item: ItemId, from: usize, to: usize },
    /// An external drag was accepted at this index
    Accepted { index: usize },
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Internal { item: ItemId, home: usize },
    External { span: Span },
}

#[derive(Debug)]
struct ActiveDrag {
    source: Source,
    view: GridView,
    /// Whether the placeholder is in the flow
    entered: bool,
    pointer_start: Point,
    pointer: Point,
    /// Where the dragged element is pinned, viewport-relative
    pinned: Rect,
    free: Translation,
    animator: Animator,
    scroller: AutoScroller,
    stale_tracks: bool,
}

#[derive(Debug, Default)]
enum DragState {
    #[default]
    Idle,
    PendingClick {
        item: ItemId,
        start: Point,
    },
    Dragging(Box<ActiveDrag>),
    Releasing(Box<ActiveDrag>),
}

/// Owns the single drag session of a grid
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag is pending, running or releasing
    pub fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Whether a layout transition is in flight
    pub fn is_animating(&self) -> bool {
        match &self.state {
            DragState::Dragging(drag) | DragState::Releasing(drag) => drag.animator.is_animating(),
            _ => false,
        }
    }

    pub fn is_autoscrolling(&self) -> bool {
        match &self.state {
            DragState::Dragging(drag) => drag.scroller.is_active(),
            _ => false,
        }
    }

    pub fn view(&self) -> Option<&GridView> {
        match &self.state {
            DragState::Dragging(drag) | DragState::Releasing(drag) => Some(&drag.view),
            _ => None,
        }
    }

    /// The item being dragged, if the drag came from this grid
    pub fn dragged_item(&self) -> Option<ItemId> {
        match &self.state {
            DragState::PendingClick { item, .. } => Some(*item),
            DragState::Dragging(drag) | DragState::Releasing(drag) => match drag.source {
                Source::Internal { item, .. } => Some(item),
                Source::External { .. } => None,
            },
            DragState::Idle => None,
        }
    }

    /// Force a re-measure of track sizes on the next reorder
    pub fn mark_tracks_stale(&mut self) {
        if let DragState::Dragging(drag) = &mut self.state {
            drag.stale_tracks = true;
        }
    }

    /// Press on an item's drag handle; ignored while another drag is active
    pub fn pointer_down(&mut self, item: ItemId, position: Point) -> bool {
        if self.is_active() {
            debug!(%item, "pointer down ignored, drag already active");
            return false;
        }
        self.state = DragState::PendingClick { item, start: position };
        true
    }

    /// Start a drag of something that is not in the grid yet
    pub fn begin_external<H: GridHost>(
        &mut self,
        span: Span,
        ghost: Rect,
        pointer: Point,
        registry: &ItemRegistry,
        config: &GridConfig,
        host: &mut H,
    ) -> Result<bool, GridError> {
        if self.is_active() {
            debug!("external drag ignored, drag already active");
            return Ok(false);
        }
        let (entries, spans) = registry.entries(None);
        let view = GridView::initial(
            entries,
            spans,
            config.column_count,
            config.pack_attempt_limit,
            |rows| host.track_sizes(rows),
        )?;
        info!(?span, "external drag started");
        let mut drag = Box::new(ActiveDrag {
            source: Source::External { span },
            view,
            entered: false,
            pointer_start: pointer,
            pointer,
            pinned: ghost,
            free: Translation::zero(),
            animator: Animator::new(),
            scroller: AutoScroller::new(),
            stale_tracks: false,
        });
        let result = drag.reorder_step(config, host);
        self.settle(drag, result, host)?;
        Ok(true)
    }

    pub fn pointer_move<H: GridHost>(
        &mut self,
        position: Point,
        registry: &ItemRegistry,
        config: &GridConfig,
        host: &mut H,
    ) -> Result<MoveOutcome, GridError> {
        match std::mem::take(&mut self.state) {
            DragState::PendingClick { item, start } => {
                if position.distance(start) <= config.click_threshold {
                    self.state = DragState::PendingClick { item, start };
                    return Ok(MoveOutcome::Ignored);
                }
                let drag = start_internal(item, start, position, registry, config, host)
                    .map_err(GridError::aborted)?;
                self.state = DragState::Dragging(drag);
                Ok(MoveOutcome::Started)
            }
            DragState::Dragging(mut drag) => {
                let result = drag.on_move(position, config, host);
                self.settle(drag, result, host)
            }
            other => {
                self.state = other;
                Ok(MoveOutcome::Ignored)
            }
        }
    }

    pub fn pointer_up<H: GridHost>(
        &mut self,
        position: Point,
        config: &GridConfig,
        host: &mut H,
    ) -> Result<ReleaseOutcome, GridError> {
        match std::mem::take(&mut self.state) {
            DragState::PendingClick { item, .. } => {
                debug!(%item, "click without drag");
                Ok(ReleaseOutcome::Clicked(item))
            }
            DragState::Dragging(mut drag) => {
                drag.pointer = position;
                drag.scroller.cancel(host);
                if !drag.entered {
                    drag.animator.cancel(host);
                    host.clear_translations();
                    host.drop_cancelled();
                    info!("external drag cancelled outside the grid");
                    return Ok(ReleaseOutcome::Cancelled);
                }
                let from = drag.free;
                let target = drag.release_target(host);
                drag.animator
                    .start(Target::Dragged, from, target, config.animation_duration(), host);
                if drag.animator.is_running(Target::Dragged) {
                    self.state = DragState::Releasing(drag);
                    Ok(ReleaseOutcome::Releasing)
                } else {
                    Ok(ReleaseOutcome::Dropped(drag.finish(host)))
                }
            }
            other => {
                self.state = other;
                Ok(ReleaseOutcome::Ignored)
            }
        }
    }

    /// Run the loop that owns `handle`
    pub fn on_frame<H: GridHost>(
        &mut self,
        handle: FrameHandle,
        dt: std::time::Duration,
        config: &GridConfig,
        host: &mut H,
    ) -> Result<FrameOutcome, GridError> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(mut drag) => {
                if drag.scroller.owns(handle) {
                    drag.scroller.on_frame(host);
                    let result = drag.reorder_step(config, host);
                    self.settle(drag, result, host)?;
                    return Ok(FrameOutcome::Scrolled);
                }
                let outcome = if drag.animator.owns(handle) {
                    drag.animator.on_frame(dt, host);
                    FrameOutcome::Animated
                } else {
                    FrameOutcome::Ignored
                };
                self.state = DragState::Dragging(drag);
                Ok(outcome)
            }
            DragState::Releasing(mut drag) => {
                if !drag.animator.owns(handle) {
                    self.state = DragState::Releasing(drag);
                    return Ok(FrameOutcome::Ignored);
                }
                drag.animator.on_frame(dt, host);
                if drag.animator.is_running(Target::Dragged) {
                    self.state = DragState::Releasing(drag);
                    return Ok(FrameOutcome::Animated);
                }
                Ok(FrameOutcome::Dropped(drag.finish(host)))
            }
            other => {
                self.state = other;
                Ok(FrameOutcome::Ignored)
            }
        }
    }

    /// Abort any drag and restore the grid to its state before the drag
    pub fn abort<H: GridHost>(&mut self, host: &mut H) {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(mut drag) | DragState::Releasing(mut drag) => drag.abort(host),
            DragState::PendingClick { .. } | DragState::Idle => {}
        }
    }

    /// Keep the drag on success, abort and report it on failure
    fn settle<H: GridHost, T>(
        &mut self,
        mut drag: Box<ActiveDrag>,
        result: Result<T, GridError>,
        host: &mut H,
    ) -> Result<T, GridError> {
        match result {
            Ok(value) => {
                self.state = DragState::Dragging(drag);
                Ok(value)
            }
            Err(err) => {
                error!(error = %err, "drag aborted");
                drag.abort(host);
                Err(GridError::aborted(err))
            }
        }
    }
}

/// Lift `item` out of the flow and put the placeholder in its slot
fn start_internal<H: GridHost>(
    item: ItemId,
    start: Point,
    position: Point,
    registry: &ItemRegistry,
    config: &GridConfig,
    host: &mut H,
) -> Result<Box<ActiveDrag>, GridError> {
    let home = registry
        .index_of(item)
        .ok_or(GridError::UnknownItem { item })?;
    let (entries, spans) = registry.entries(Some(item));
    let span = spans
        .get(&Entry::Placeholder)
        .copied()
        .ok_or(GridError::UnknownItem { item })?;
    let view = GridView::initial(
        entries,
        spans,
        config.column_count,
        config.pack_attempt_limit,
        |rows| host.track_sizes(rows),
    )?;
    let origin = host.content_origin();
    let pinned = view
        .visual_rect(Entry::Placeholder)
        .map(|rect| Rect::new(rect.x + origin.x, rect.y + origin.y, rect.width, rect.height))
        .unwrap_or_default();

    host.detach(item, pinned);
    host.insert_placeholder(home, span);
    let free = position.minus(start);
    host.set_drag_translation(free);
    info!(%item, home, "drag started");

    Ok(Box::new(ActiveDrag {
        source: Source::Internal { item, home },
        view,
        entered: true,
        pointer_start: start,
        pointer: position,
        pinned,
        free,
        animator: Animator::new(),
        scroller: AutoScroller::new(),
        stale_tracks: false,
    }))
}

impl ActiveDrag {
    fn on_move<H: GridHost>(
        &mut self,
        position: Point,
        config: &GridConfig,
        host: &mut H,
    ) -> Result<MoveOutcome, GridError> {
        self.pointer = position;
        self.free = position.minus(self.pointer_start);
        host.set_drag_translation(self.free);

        let increment = increments(
            position,
            host.scroll_viewport(),
            config.autoscroll_margin,
            config.autoscroll_speed,
        );
        self.scroller.update(increment, host);

        self.reorder_step(config, host)
    }

    /// Ask the resolver about the last pointer position and commit a reorder
    fn reorder_step<H: GridHost>(
        &mut self,
        config: &GridConfig,
        host: &mut H,
    ) -> Result<MoveOutcome, GridError> {
        if self.animator.is_animating() {
            trace!("reorder suppressed during transition");
            return Ok(MoveOutcome::Floating);
        }
        let origin = host.content_origin();
        let local = Point::new(self.pointer.x - origin.x, self.pointer.y - origin.y);

        if !self.entered {
            return self.try_enter(local, origin, config, host);
        }

        let cell = self.view.cell_at(local);
        match resolve(&self.view, cell, local.x) {
            Resolution::Stay => Ok(MoveOutcome::Unchanged),
            Resolution::Suppressed(trigger) => {
                debug!(?trigger, "forbidden trigger suppressed a move");
                Ok(MoveOutcome::Suppressed)
            }
            Resolution::Move(index) => {
                let entries = self.view.entries_with_placeholder_at(index);
                let stale = std::mem::take(&mut self.stale_tracks);
                let next = diff(&self.view, entries, config.pack_attempt_limit, stale, |rows| {
                    host.track_sizes(rows)
                })?;
                debug!(index, moved = next.instructions.len(), "placeholder moved");
                self.commit(next.view, local, &next.instructions, config, host);
                Ok(MoveOutcome::Reordered(index))
            }
        }
    }

    /// Insert the placeholder the first time an external drag is over the grid
    fn try_enter<H: GridHost>(
        &mut self,
        local: Point,
        origin: Point,
        config: &GridConfig,
        host: &mut H,
    ) -> Result<MoveOutcome, GridError> {
        let Source::External { span } = self.source else {
            return Ok(MoveOutcome::Unchanged);
        };
        let (width, height) = self.view.dimensions().content_size();
        let bounds = Rect::new(origin.x, origin.y, width, height);
        if !bounds.contains(self.pointer) {
            return Ok(MoveOutcome::Unchanged);
        }

        let index = self.entry_index(local, span, config)?;
        let mut spans: HashMap<Entry, Span> = self.view.spans.clone();
        spans.insert(Entry::Placeholder, span);
        let entries = self.view.entries_with_placeholder_at(index);
        let next = rebase(&self.view, entries, spans, config.pack_attempt_limit, |rows| {
            host.track_sizes(rows)
        })?;

        host.insert_placeholder(index, span);
        self.entered = true;
        info!(index, "external drag entered the grid");
        self.commit(next.view, local, &next.instructions, config, host);
        Ok(MoveOutcome::Entered(index))
    }

    /// Where the placeholder would enter: resolve against the list with the
    /// placeholder appended
    fn entry_index(
        &self,
        local: Point,
        span: Span,
        config: &GridConfig,
    ) -> Result<usize, GridError> {
        let mut entries = self.view.entries.clone();
        entries.push(Entry::Placeholder);
        let end = entries.len() - 1;
        let mut spans = self.view.spans.clone();
        spans.insert(Entry::Placeholder, span);
        let dims = self.view.dimensions();
        let tracks = dims.tracks();
        let tentative = GridView::initial(
            entries,
            spans,
            dims.column_count,
            config.pack_attempt_limit,
            |_| tracks,
        )?;
        Ok(match resolve(&tentative, tentative.cell_at(local), local.x) {
            Resolution::Move(index) => index,
            Resolution::Stay | Resolution::Suppressed(_) => end,
        })
    }

    /// Make `view` current, remember the trigger under the pointer and animate
    fn commit<H: GridHost>(
        &mut self,
        view: GridView,
        local: Point,
        instructions: &[AnimationInstruction],
        config: &GridConfig,
        host: &mut H,
    ) {
        let forbidden = trigger_at(&view, view.cell_at(local), local.x);
        self.view = view.with_forbidden(forbidden);
        self.animator
            .start_all(instructions, config.animation_duration(), host);
    }

    /// Translation that puts the dragged element exactly over the placeholder
    fn release_target<H: GridHost>(&self, host: &H) -> Translation {
        let origin = host.content_origin();
        match self.view.visual_rect(Entry::Placeholder) {
            Some(slot) => {
                Point::new(slot.x + origin.x, slot.y + origin.y).minus(self.pinned.origin())
            }
            None => self.free,
        }
    }

    /// Put everything back into the flow at the placeholder's index
    fn finish<H: GridHost>(mut self: Box<Self>, host: &mut H) -> DropResult {
        self.scroller.cancel(host);
        self.animator.cancel(host);
        let index = self.view.placeholder_index().unwrap_or(0);
        host.remove_placeholder();
        let result = match self.source {
            Source::Internal { item, home } => {
                host.reparent(item, index);
                DropResult::Moved {
                    item,
                    from: home,
                    to: index,
                }
            }
            Source::External { .. } => DropResult::Accepted { index },
        };
        host.clear_translations();
        if let DropResult::Accepted { index } = result {
            host.drop_accepted(index);
        }
        info!(?result, "drag finished");
        result
    }

    /// Undo the drag: the item goes back to its original slot
    fn abort<H: GridHost>(&mut self, host: &mut H) {
        self.scroller.cancel(host);
        self.animator.cancel(host);
        if self.entered {
            host.remove_placeholder();
        }
        match self.source {
            Source::Internal { item, home } => host.reparent(item, home),
            Source::External { .. } => host.drop_cancelled(),
        }
        host.clear_translations();
        info!("drag restored to its starting layout");
    }
}
