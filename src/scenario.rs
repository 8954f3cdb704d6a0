//! Scenario runner and simulated host
//!
//! A scenario is a TOML file describing a grid, its items and a script of
//! pointer events. [`SimulatedHost`] stands in for the rendering layer: fixed
//! track sizes, a scrollable viewport, a manual frame queue and a record of
//! every visual request.

use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::drag::{FrameHandle, FrameOutcome, FrameScheduler, Geometry, PointerEvent, Renderer};
use crate::error::GridError;
use crate::grid::{Grid, PointerOutcome};
use crate::layout::{Entry, GridConfig, ItemId, Point, Rect, Span, TrackSizes, Translation};
use crate::registry::ItemSpec;

/// Errors that can occur when loading or running a scenario
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scenario TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid grid config: {0}")]
    Config(#[from] crate::layout::ConfigError),
    #[error("Scenario refers to unknown item '{0}'")]
    UnknownItem(String),
    #[error("Duplicate item name '{0}'")]
    DuplicateItem(String),
}

/// Frames run after the last event so transitions can finish
const SETTLE_FRAME_LIMIT: usize = 1_000;

const DEFAULT_FRAME_MS: u64 = 16;

fn default_frame_ms() -> u64 {
    DEFAULT_FRAME_MS
}

fn default_span() -> usize {
    1
}

fn default_handle() -> String {
    "handle".to_string()
}

/// A parsed scenario file
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub geometry: ScenarioGeometry,
    #[serde(default)]
    pub items: Vec<ScenarioItem>,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScenarioGeometry {
    pub column_width: f64,
    pub column_gap: f64,
    pub row_height: f64,
    pub row_gap: f64,
    /// Content box origin before any scrolling, viewport-relative
    pub content_origin: Point,
    pub viewport: Rect,
    pub max_scroll: Point,
}

impl Default for ScenarioGeometry {
    fn default() -> Self {
        Self {
            column_width: 100.0,
            column_gap: 10.0,
            row_height: 100.0,
            row_gap: 10.0,
            content_origin: Point::default(),
            viewport: Rect::new(0.0, 0.0, 1000.0, 800.0),
            max_scroll: Point::new(0.0, 2000.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioItem {
    pub name: String,
    #[serde(default = "default_span")]
    pub rowspan: usize,
    #[serde(default = "default_span")]
    pub colspan: usize,
    #[serde(default = "default_handle")]
    pub handle: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScenarioEvent {
    Down { item: String, x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    /// Fire pending frames `count` times
    Frames {
        count: usize,
        #[serde(default = "default_frame_ms")]
        dt_ms: u64,
    },
    /// Start dragging a new item in from outside the grid
    External {
        name: String,
        #[serde(default = "default_span")]
        rowspan: usize,
        #[serde(default = "default_span")]
        colspan: usize,
        x: f64,
        y: f64,
    },
    /// Change an item's span
    Span {
        item: String,
        rowspan: usize,
        colspan: usize,
    },
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.grid.validate()?;
        Ok(scenario)
    }
}

/// Final state of a scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub order: Vec<String>,
    pub map: Vec<Vec<i64>>,
    #[serde(skip)]
    pub ascii: String,
    pub outcomes: Vec<String>,
    pub scroll: Point,
}

/// Run every event of `scenario` against a fresh grid and simulated host
pub fn run(scenario: &Scenario) -> Result<ScenarioReport, GridError> {
    let mut grid = Grid::new(scenario.grid.clone(), None).map_err(ScenarioError::from)?;
    let mut host = SimulatedHost::from_geometry(&scenario.geometry);
    let mut names: HashMap<String, ItemId> = HashMap::new();
    for item in &scenario.items {
        if names.contains_key(&item.name) {
            return Err(ScenarioError::DuplicateItem(item.name.clone()).into());
        }
        let spec = ItemSpec::new(item.rowspan, item.colspan).with_handle(item.handle.clone());
        let id = grid.register(spec)?;
        names.insert(item.name.clone(), id);
    }

    let lookup = |names: &HashMap<String, ItemId>, name: &str| {
        names
            .get(name)
            .copied()
            .ok_or_else(|| ScenarioError::UnknownItem(name.to_string()))
    };

    let mut outcomes = Vec::new();
    let mut pending_external: Option<(String, Span)> = None;
    for event in &scenario.events {
        match event {
            ScenarioEvent::Down { item, x, y } => {
                let id = lookup(&names, item)?;
                let outcome = grid.handle(
                    PointerEvent::Start {
                        item: id,
                        position: Point::new(*x, *y),
                    },
                    &mut host,
                )?;
                outcomes.push(describe(&outcome));
            }
            ScenarioEvent::Move { x, y } => {
                let outcome = grid.handle(PointerEvent::Move(Point::new(*x, *y)), &mut host)?;
                outcomes.push(describe(&outcome));
            }
            ScenarioEvent::Up { x, y } => {
                let outcome = grid.handle(PointerEvent::End(Point::new(*x, *y)), &mut host)?;
                outcomes.push(describe(&outcome));
            }
            ScenarioEvent::Frames { count, dt_ms } => {
                host.run_frames(&mut grid, Duration::from_millis(*dt_ms), *count)?;
            }
            ScenarioEvent::External {
                name,
                rowspan,
                colspan,
                x,
                y,
            } => {
                let span = Span::new(*rowspan, *colspan);
                let geometry = &scenario.geometry;
                let ghost = Rect::new(*x, *y, geometry.column_width, geometry.row_height);
                let pointer = Point::new(*x, *y);
                let started = grid.begin_external_drag(span, ghost, pointer, &mut host)?;
                if started {
                    pending_external = Some((name.clone(), span));
                }
                outcomes.push(format!("external {}", started));
            }
            ScenarioEvent::Span {
                item,
                rowspan,
                colspan,
            } => {
                let id = lookup(&names, item)?;
                grid.set_span(id, Span::new(*rowspan, *colspan))?;
            }
        }
        register_dropped(&mut grid, &mut host, &mut names, &mut pending_external)?;
    }

    host.run_frames(&mut grid, Duration::from_millis(DEFAULT_FRAME_MS), SETTLE_FRAME_LIMIT)?;
    register_dropped(&mut grid, &mut host, &mut names, &mut pending_external)?;

    let by_id: HashMap<ItemId, &str> =
        names.iter().map(|(name, id)| (*id, name.as_str())).collect();
    let layout = grid.layout(&host)?;
    Ok(ScenarioReport {
        order: layout
            .order
            .iter()
            .map(|id| by_id.get(id).map_or_else(|| id.to_string(), |name| name.to_string()))
            .collect(),
        map: layout.pack.map.to_marked_rows(-1),
        ascii: layout.pack.map.render_ascii(),
        outcomes,
        scroll: host.scroll(),
    })
}

/// Register the item of an accepted external drop where it landed
fn register_dropped(
    grid: &mut Grid,
    host: &mut SimulatedHost,
    names: &mut HashMap<String, ItemId>,
    pending: &mut Option<(String, Span)>,
) -> Result<(), GridError> {
    let Some(index) = host.take_accepted() else {
        return Ok(());
    };
    if let Some((name, span)) = pending.take() {
        let spec = ItemSpec::new(span.rowspan, span.colspan).with_handle(default_handle());
        let id = grid.insert(spec, index)?;
        names.insert(name, id);
    }
    Ok(())
}

fn describe(outcome: &PointerOutcome) -> String {
    match outcome {
        PointerOutcome::Pressed(accepted) => format!("pressed {}", accepted),
        PointerOutcome::Moved(moved) => format!("{:?}", moved),
        PointerOutcome::Released(released) => format!("{:?}", released),
    }
}

/// In-memory host with a manual frame clock
#[derive(Debug)]
pub struct SimulatedHost {
    tracks: TrackSizes,
    content_offset: Point,
    viewport: Rect,
    scroll: Point,
    max_scroll: Point,
    measurements: Cell<usize>,
    next_frame: u64,
    pending: BTreeSet<FrameHandle>,
    requested: usize,
    cancelled: Vec<FrameHandle>,
    translations: HashMap<Entry, Translation>,
    drag_translation: Translation,
    cleared_drag_translation: Option<Translation>,
    detached: Vec<(ItemId, Rect)>,
    placeholder: Option<(usize, Span)>,
    reparented: Vec<(ItemId, usize)>,
    accepted: Option<usize>,
    drops_cancelled: usize,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::from_geometry(&ScenarioGeometry::default())
    }
}

impl SimulatedHost {
    pub fn from_geometry(geometry: &ScenarioGeometry) -> Self {
        Self {
            tracks: TrackSizes::new(
                geometry.column_width,
                geometry.column_gap,
                geometry.row_height,
                geometry.row_gap,
            ),
            content_offset: geometry.content_origin,
            viewport: geometry.viewport,
            scroll: Point::default(),
            max_scroll: geometry.max_scroll,
            measurements: Cell::new(0),
            next_frame: 0,
            pending: BTreeSet::new(),
            requested: 0,
            cancelled: Vec::new(),
            translations: HashMap::new(),
            drag_translation: Translation::zero(),
            cleared_drag_translation: None,
            detached: Vec::new(),
            placeholder: None,
            reparented: Vec::new(),
            accepted: None,
            drops_cancelled: 0,
        }
    }

    /// Change the measured track sizes, e.g. to mimic a scrollbar appearing
    pub fn set_tracks(&mut self, tracks: TrackSizes) {
        self.tracks = tracks;
    }

    /// Fire pending frames in request order, `limit` frames at most
    pub fn run_frames(
        &mut self,
        grid: &mut Grid,
        dt: Duration,
        limit: usize,
    ) -> Result<Vec<FrameOutcome>, GridError> {
        let mut outcomes = Vec::new();
        for _ in 0..limit {
            let Some(handle) = self.pending.pop_first() else {
                break;
            };
            outcomes.push(grid.on_frame(handle, dt, self)?);
        }
        Ok(outcomes)
    }

    pub fn pending_frames(&self) -> Vec<FrameHandle> {
        self.pending.iter().copied().collect()
    }

    pub fn requested_frames(&self) -> usize {
        self.requested
    }

    pub fn cancelled_frames(&self) -> &[FrameHandle] {
        &self.cancelled
    }

    /// How many times track sizes were measured
    pub fn measurements(&self) -> usize {
        self.measurements.get()
    }

    pub fn translation(&self, entry: Entry) -> Translation {
        self.translations.get(&entry).copied().unwrap_or_default()
    }

    pub fn drag_translation(&self) -> Translation {
        self.drag_translation
    }

    /// Drag translation in force when translations were last cleared
    pub fn cleared_drag_translation(&self) -> Option<Translation> {
        self.cleared_drag_translation
    }

    pub fn detached(&self) -> &[(ItemId, Rect)] {
        &self.detached
    }

    pub fn placeholder(&self) -> Option<(usize, Span)> {
        self.placeholder
    }

    pub fn reparented(&self) -> &[(ItemId, usize)] {
        &self.reparented
    }

    pub fn drops_cancelled(&self) -> usize {
        self.drops_cancelled
    }

    pub fn take_accepted(&mut self) -> Option<usize> {
        self.accepted.take()
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }
}

impl Geometry for SimulatedHost {
    fn track_sizes(&self, _row_count: usize) -> TrackSizes {
        self.measurements.set(self.measurements.get() + 1);
        self.tracks
    }

    fn content_origin(&self) -> Point {
        Point::new(
            self.content_offset.x - self.scroll.x,
            self.content_offset.y - self.scroll.y,
        )
    }

    fn scroll_viewport(&self) -> Rect {
        self.viewport
    }
}

impl FrameScheduler for SimulatedHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_frame += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_frame);
        self.pending.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending.remove(&handle) {
            self.cancelled.push(handle);
        }
    }
}

impl Renderer for SimulatedHost {
    fn set_translation(&mut self, entry: Entry, translation: Translation) {
        self.translations.insert(entry, translation);
    }

    fn set_drag_translation(&mut self, translation: Translation) {
        self.drag_translation = translation;
    }

    fn detach(&mut self, item: ItemId, pinned: Rect) {
        self.detached.push((item, pinned));
    }

    fn insert_placeholder(&mut self, index: usize, span: Span) {
        self.placeholder = Some((index, span));
    }

    fn remove_placeholder(&mut self) {
        self.placeholder = None;
    }

    fn reparent(&mut self, item: ItemId, index: usize) {
        self.reparented.push((item, index));
    }

    fn clear_translations(&mut self) {
        self.translations.clear();
        self.cleared_drag_translation = Some(self.drag_translation);
        self.drag_translation = Translation::zero();
    }

    fn scroll_by(&mut self, dx: f64, dy: f64) -> (f64, f64) {
        let x = (self.scroll.x + dx).clamp(0.0, self.max_scroll.x);
        let y = (self.scroll.y + dy).clamp(0.0, self.max_scroll.y);
        let applied = (x - self.scroll.x, y - self.scroll.y);
        self.scroll = Point::new(x, y);
        applied
    }

    fn drop_accepted(&mut self, index: usize) {
        self.accepted = Some(index);
    }

    fn drop_cancelled(&mut self) {
        self.drops_cancelled += 1;
    }
}
