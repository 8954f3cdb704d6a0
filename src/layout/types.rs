//! Core types for the packing and reorder engine

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable handle of a registered grid item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry of an item list: a real item or the drag placeholder
///
/// Entries keep their identity across reorders, which is what the
/// animation diff keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Entry {
    Item(ItemId),
    Placeholder,
}

impl Entry {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Entry::Placeholder)
    }

    pub fn item(&self) -> Option<ItemId> {
        match self {
            Entry::Item(id) => Some(*id),
            Entry::Placeholder => None,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Item(id) => write!(f, "{}", id),
            Entry::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Number of rows and columns an item occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub rowspan: usize,
    pub colspan: usize,
}

impl Span {
    pub fn new(rowspan: usize, colspan: usize) -> Self {
        Self { rowspan, colspan }
    }

    /// A 1x1 span
    pub fn unit() -> Self {
        Self::new(1, 1)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::unit()
    }
}

/// A (column, row) cell index inside the occupancy map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

impl Cell {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Top-left cell and extents of a packed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Placement {
    /// Column of the top-left cell
    pub x: usize,
    /// Row of the top-left cell
    pub y: usize,
    pub rowspan: usize,
    pub colspan: usize,
}

impl Placement {
    /// Whether this footprint covers the given cell
    pub fn covers(&self, cell: Cell) -> bool {
        cell.col >= self.x
            && cell.col < self.x + self.colspan
            && cell.row >= self.y
            && cell.row < self.y + self.rowspan
    }

    /// Whether two footprints share at least one cell
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.x + other.colspan
            && other.x < self.x + self.colspan
            && self.y < other.y + other.rowspan
            && other.y < self.y + self.rowspan
    }
}

/// A 2D point in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`
    pub fn minus(&self, origin: Point) -> Translation {
        Translation::new(self.x - origin.x, self.y - origin.y)
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if this rectangle contains a point (edges inclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }
}

/// Pixel offset applied on top of an item's static grid position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Translation {
    pub x: f64,
    pub y: f64,
}

impl Translation {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn plus(&self, other: Translation) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Linear interpolation towards `to` at progress `t`
    pub fn lerp(&self, to: Translation, t: f64) -> Self {
        Self::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

/// Rendered track geometry as measured by the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSizes {
    pub column_width: f64,
    pub column_gap: f64,
    pub row_height: f64,
    pub row_gap: f64,
}

impl TrackSizes {
    pub fn new(column_width: f64, column_gap: f64, row_height: f64, row_gap: f64) -> Self {
        Self {
            column_width,
            column_gap,
            row_height,
            row_gap,
        }
    }
}

/// Full grid dimensions used by the pointer mapper and the diff engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridDimensions {
    pub column_count: usize,
    pub row_count: usize,
    pub column_width: f64,
    pub column_gap: f64,
    pub row_height: f64,
    pub row_gap: f64,
}

impl GridDimensions {
    pub fn new(column_count: usize, row_count: usize, tracks: TrackSizes) -> Self {
        Self {
            column_count,
            row_count,
            column_width: tracks.column_width,
            column_gap: tracks.column_gap,
            row_height: tracks.row_height,
            row_gap: tracks.row_gap,
        }
    }

    /// The measured track sizes these dimensions were built from
    pub fn tracks(&self) -> TrackSizes {
        TrackSizes::new(self.column_width, self.column_gap, self.row_height, self.row_gap)
    }

    /// Width of one column track including its gap
    pub fn column_track(&self) -> f64 {
        self.column_width + self.column_gap
    }

    /// Height of one row track including its gap
    pub fn row_track(&self) -> f64 {
        self.row_height + self.row_gap
    }

    /// Pixel position of a placement's top-left corner inside the content box
    pub fn origin_of(&self, placement: &Placement) -> Point {
        Point::new(
            placement.x as f64 * self.column_track(),
            placement.y as f64 * self.row_track(),
        )
    }

    /// Pixel box of a placement inside the content box
    pub fn rect_of(&self, placement: &Placement) -> Rect {
        let origin = self.origin_of(placement);
        Rect::new(
            origin.x,
            origin.y,
            spanned_length(placement.colspan, self.column_width, self.column_gap),
            spanned_length(placement.rowspan, self.row_height, self.row_gap),
        )
    }

    /// Size of the whole content box; an empty grid still reports one row
    pub fn content_size(&self) -> (f64, f64) {
        (
            spanned_length(self.column_count, self.column_width, self.column_gap),
            spanned_length(self.row_count.max(1), self.row_height, self.row_gap),
        )
    }
}

fn spanned_length(tracks: usize, size: f64, gap: f64) -> f64 {
    if tracks == 0 {
        return 0.0;
    }
    tracks as f64 * size + (tracks - 1) as f64 * gap
}
