//! Grid component
//!
//! Ties the item registry, the drag controller and an optional resize
//! subscription together. One grid owns at most one drag session.

use std::time::Duration;

use tracing::debug;

use crate::drag::{
    DragController, DropResult, FrameHandle, FrameOutcome, Geometry, GridHost, MoveOutcome,
    PointerEvent, ReleaseOutcome,
};
use crate::error::GridError;
use crate::layout::{
    build, ConfigError, GridConfig, GridDimensions, GridView, ItemId, PackResult, Point, Rect, Span,
    TrackSizes,
};
use crate::registry::{ItemMeta, ItemRegistry, ItemSpec};
use crate::resize::{ResizeSubscription, ResizeWatcher};

/// Static packing of the grid outside a drag
#[derive(Debug, Clone)]
pub struct Layout {
    pub order: Vec<ItemId>,
    pub pack: PackResult,
    pub dims: GridDimensions,
}

impl Layout {
    /// Content-box rectangle of an item
    pub fn rect_of(&self, item: ItemId) -> Option<Rect> {
        let ordinal = self.order.iter().position(|id| *id == item)?;
        Some(self.dims.rect_of(&self.pack.placements[ordinal]))
    }
}

/// Any pointer-driven change reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Pressed(bool),
    Moved(MoveOutcome),
    Released(ReleaseOutcome),
}

#[derive(Debug)]
pub struct Grid {
    config: GridConfig,
    registry: ItemRegistry,
    drag: DragController,
    resize: Option<ResizeSubscription>,
    /// Re-measure track sizes on the next pack
    stale_tracks: bool,
    /// Row count and track sizes of the last measurement
    measured: Option<(usize, TrackSizes)>,
}

impl Grid {
    /// Create a grid, optionally subscribed to a resize watcher
    pub fn new(config: GridConfig, watcher: Option<&ResizeWatcher>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry: ItemRegistry::new(config.column_count),
            config,
            drag: DragController::new(),
            resize: watcher.map(ResizeWatcher::subscribe),
            stale_tracks: false,
            measured: None,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn order(&self) -> &[ItemId] {
        self.registry.order()
    }

    pub fn register(&mut self, spec: ItemSpec) -> Result<ItemId, GridError> {
        self.registry.register(spec)
    }

    /// Register an item at `index`, e.g. after an external drop was accepted
    pub fn insert(&mut self, spec: ItemSpec, index: usize) -> Result<ItemId, GridError> {
        self.registry.insert(spec, index)
    }

    /// Remove an item; a running drag is aborted first
    pub fn remove<H: GridHost>(
        &mut self,
        item: ItemId,
        host: &mut H,
    ) -> Result<ItemMeta, GridError> {
        if !self.registry.contains(item) {
            return Err(GridError::UnknownItem { item });
        }
        if self.drag.is_active() {
            debug!(%item, "item removed during a drag");
            self.drag.abort(host);
        }
        self.registry.remove(item)
    }

    /// Change an item's span; takes effect on the next pack
    pub fn set_span(&mut self, item: ItemId, span: Span) -> Result<Span, GridError> {
        let span = self.registry.set_span(item, span)?;
        self.stale_tracks = true;
        self.drag.mark_tracks_stale();
        Ok(span)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Whether a reorder transition is in flight
    pub fn is_animating(&self) -> bool {
        self.drag.is_animating()
    }

    pub fn is_autoscrolling(&self) -> bool {
        self.drag.is_autoscrolling()
    }

    /// The view of the running drag
    pub fn current_view(&self) -> Option<&GridView> {
        self.drag.view()
    }

    pub fn dragged_item(&self) -> Option<ItemId> {
        self.drag.dragged_item()
    }

    /// Pack the current order; tracks are measured again only when stale
    /// or when the row count changed
    pub fn layout<G: Geometry>(&mut self, geometry: &G) -> Result<Layout, GridError> {
        self.poll_resize();
        let pack = build(
            &self.registry.spans(),
            self.config.column_count,
            self.config.pack_attempt_limit,
        )?;
        let rows = pack.map.row_count();
        let tracks = match self.measured {
            Some((measured_rows, tracks)) if !self.stale_tracks && measured_rows == rows => tracks,
            _ => {
                let tracks = geometry.track_sizes(rows);
                debug!(rows, "tracks measured");
                self.measured = Some((rows, tracks));
                tracks
            }
        };
        self.stale_tracks = false;
        Ok(Layout {
            order: self.registry.order().to_vec(),
            dims: GridDimensions::new(self.config.column_count, rows, tracks),
            pack,
        })
    }

    /// Whether track sizes must be measured again before the next pack
    pub fn needs_measure(&mut self) -> bool {
        self.poll_resize();
        self.stale_tracks || self.measured.is_none()
    }

    pub fn pointer_down(&mut self, item: ItemId, position: Point) -> Result<bool, GridError> {
        if !self.registry.contains(item) {
            return Err(GridError::UnknownItem { item });
        }
        Ok(self.drag.pointer_down(item, position))
    }

    pub fn pointer_move<H: GridHost>(
        &mut self,
        position: Point,
        host: &mut H,
    ) -> Result<MoveOutcome, GridError> {
        self.poll_resize();
        self.drag
            .pointer_move(position, &self.registry, &self.config, host)
    }

    pub fn pointer_up<H: GridHost>(
        &mut self,
        position: Point,
        host: &mut H,
    ) -> Result<ReleaseOutcome, GridError> {
        let outcome = self.drag.pointer_up(position, &self.config, host)?;
        if let ReleaseOutcome::Dropped(result) = outcome {
            self.apply_drop(result)?;
        }
        Ok(outcome)
    }

    /// Dispatch a normalized pointer event
    pub fn handle<H: GridHost>(
        &mut self,
        event: PointerEvent,
        host: &mut H,
    ) -> Result<PointerOutcome, GridError> {
        match event {
            PointerEvent::Start { item, position } => {
                self.pointer_down(item, position).map(PointerOutcome::Pressed)
            }
            PointerEvent::Move(position) => {
                self.pointer_move(position, host).map(PointerOutcome::Moved)
            }
            PointerEvent::End(position) => {
                self.pointer_up(position, host).map(PointerOutcome::Released)
            }
        }
    }

    /// Start dragging something from outside the grid, e.g. a toolbox entry;
    /// its span is checked like a registered item's
    pub fn begin_external_drag<H: GridHost>(
        &mut self,
        span: Span,
        ghost: Rect,
        pointer: Point,
        host: &mut H,
    ) -> Result<bool, GridError> {
        let span = self.registry.check_span(span)?;
        self.drag
            .begin_external(span, ghost, pointer, &self.registry, &self.config, host)
    }

    /// Run the frame callback for `handle`
    pub fn on_frame<H: GridHost>(
        &mut self,
        handle: FrameHandle,
        dt: Duration,
        host: &mut H,
    ) -> Result<FrameOutcome, GridError> {
        let outcome = self.drag.on_frame(handle, dt, &self.config, host)?;
        if let FrameOutcome::Dropped(result) = outcome {
            self.apply_drop(result)?;
        }
        Ok(outcome)
    }

    /// Abort any drag, snapping back to the pre-drag layout
    pub fn cancel_drag<H: GridHost>(&mut self, host: &mut H) {
        self.drag.abort(host);
    }

    fn apply_drop(&mut self, result: DropResult) -> Result<(), GridError> {
        match result {
            DropResult::Moved { item, to, .. } => self.registry.move_to(item, to),
            DropResult::Accepted { .. } => Ok(()),
        }
    }

    fn poll_resize(&mut self) {
        if self.resize.as_ref().is_some_and(ResizeSubscription::take) {
            debug!("resize notified, tracks will be re-measured");
            self.stale_tracks = true;
            self.drag.mark_tracks_stale();
        }
    }
}
