//! Sortable Grid - drag-to-reorder engine for dense item grids
//!
//! Items with row and column spans are packed row-major into a fixed number
//! of columns. While an item is dragged, a placeholder takes its place and
//! the remaining items glide to their new cells. Rendering, measurement and
//! frame timing are delegated to a host through the traits in [`drag`].
//!
//! # Example
//!
//! ```rust
//! use sortable_grid::run_scenario;
//!
//! let report = run_scenario(r#"
//!     [grid]
//!     column_count = 3
//!
//!     [[items]]
//!     name = "a"
//!
//!     [[items]]
//!     name = "b"
//!     colspan = 2
//! "#).unwrap();
//!
//! assert_eq!(report.order, vec!["a", "b"]);
//! assert_eq!(report.ascii, "0 1 1");
//! ```

pub mod drag;
pub mod error;
pub mod grid;
pub mod layout;
pub mod registry;
pub mod resize;
pub mod scenario;

use std::path::Path;

pub use drag::{DragController, DropResult, FrameHandle, GridHost, PointerEvent};
pub use error::GridError;
pub use grid::{Grid, Layout, PointerOutcome};
pub use layout::{ConfigError, GridConfig, ItemId, OccupancyMap, Point, Rect, Span};
pub use registry::{ItemRegistry, ItemSpec};
pub use resize::ResizeWatcher;
pub use scenario::{Scenario, ScenarioError, ScenarioReport, SimulatedHost};

/// Parse and run a scenario given as TOML source
///
/// The scenario is played against a [`SimulatedHost`]; pending transitions
/// are settled before the final layout is reported.
pub fn run_scenario(source: &str) -> Result<ScenarioReport, GridError> {
    let scenario = Scenario::from_toml_str(source)?;
    scenario::run(&scenario)
}

/// Load a scenario file and run it
pub fn run_scenario_file(path: &Path) -> Result<ScenarioReport, GridError> {
    let scenario = Scenario::from_file(path)?;
    scenario::run(&scenario)
}
