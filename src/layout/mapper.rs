//! Pointer-to-cell mapping

use super::types::{Cell, GridDimensions, Point};

/// Map a pixel position inside the grid's content box to a cell.
///
/// Boundaries sit in the middle of each gap, so a pointer over a gap resolves
/// to the nearer track. Positions past the last track clamp to it.
pub fn cell_of(position: Point, dims: &GridDimensions) -> Cell {
    Cell::new(
        track_index(
            position.x,
            dims.column_count,
            dims.column_width,
            dims.column_gap,
        ),
        track_index(position.y, dims.row_count, dims.row_height, dims.row_gap),
    )
}

fn track_index(pixel: f64, count: usize, size: f64, gap: f64) -> usize {
    let last = count.saturating_sub(1);
    let mut index = 0;
    let mut boundary = size + gap / 2.0;
    while index < last && boundary < pixel {
        index += 1;
        boundary += size + gap;
    }
    index
}
