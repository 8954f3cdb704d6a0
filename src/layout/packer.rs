//! Occupancy map builder
//!
//! Greedy row-major flow packing: a cursor walks left to right, top to
//! bottom, and every item takes the first run of free cells at or after the
//! cursor. The cursor never moves backwards, so an item never fills a hole
//! left behind an earlier item. Given the same spans the result is always
//! identical.

use serde::Serialize;

use super::types::{Cell, Placement, Span};
use crate::error::GridError;

/// Row-major grid of cell markers
///
/// Each cell holds the ordinal (index into the packed list) of the item
/// covering it, or `None` when the cell is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupancyMap {
    column_count: usize,
    rows: Vec<Vec<Option<usize>>>,
}

impl OccupancyMap {
    pub fn new(column_count: usize) -> Self {
        Self {
            column_count,
            rows: Vec::new(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Option<usize>>] {
        &self.rows
    }

    /// Ordinal of the item covering `cell`; cells outside the map are empty
    pub fn get(&self, cell: Cell) -> Option<usize> {
        self.rows
            .get(cell.row)
            .and_then(|row| row.get(cell.col))
            .copied()
            .flatten()
    }

    /// Rows with empty cells written as `marker`
    pub fn to_marked_rows(&self, marker: i64) -> Vec<Vec<i64>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or(marker, |ordinal| ordinal as i64))
                    .collect()
            })
            .collect()
    }

    /// One line per row, ordinals right-aligned, `.` for empty cells
    pub fn render_ascii(&self) -> String {
        let widest = self
            .rows
            .iter()
            .flatten()
            .flatten()
            .max()
            .map_or(1, |max| max.to_string().len());
        let mut out = String::new();
        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            let line = row
                .iter()
                .map(|cell| match cell {
                    Some(ordinal) => format!("{:>widest$}", ordinal),
                    None => format!("{:>widest$}", "."),
                })
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&line);
        }
        out
    }

    fn is_free(&self, row: usize, col: usize) -> bool {
        self.rows
            .get(row)
            .map_or(true, |cells| cells[col].is_none())
    }

    /// First column at or after `start_col` where `span` fits with its top edge on `row`
    fn find_run(&self, row: usize, start_col: usize, span: Span) -> Option<usize> {
        if span.colspan > self.column_count {
            return None;
        }
        (start_col..=self.column_count - span.colspan).find(|&x| {
            (row..row + span.rowspan)
                .all(|r| (x..x + span.colspan).all(|c| self.is_free(r, c)))
        })
    }

    fn mark(&mut self, placement: &Placement, ordinal: usize) {
        let needed = placement.y + placement.rowspan;
        while self.rows.len() < needed {
            self.rows.push(vec![None; self.column_count]);
        }
        for row in &mut self.rows[placement.y..needed] {
            for cell in &mut row[placement.x..placement.x + placement.colspan] {
                *cell = Some(ordinal);
            }
        }
    }
}

/// Occupancy map plus one placement per packed item, indexed by ordinal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackResult {
    pub map: OccupancyMap,
    pub placements: Vec<Placement>,
}

/// Pack `spans` in order into a grid of `column_count` columns.
///
/// Fails with [`GridError::PackingExhausted`] when one item needs more than
/// `attempt_limit` row retries, which only happens for spans wider than the
/// grid.
pub fn build(
    spans: &[Span],
    column_count: usize,
    attempt_limit: usize,
) -> Result<PackResult, GridError> {
    let mut map = OccupancyMap::new(column_count);
    let mut placements = Vec::with_capacity(spans.len());
    let mut row = 0;
    let mut col = 0;

    for (ordinal, span) in spans.iter().enumerate() {
        let mut attempts = 0;
        let x = loop {
            if let Some(x) = map.find_run(row, col, *span) {
                break x;
            }
            attempts += 1;
            if attempts > attempt_limit {
                return Err(GridError::exhausted(ordinal, attempts));
            }
            row += 1;
            col = 0;
        };

        let placement = Placement {
            x,
            y: row,
            rowspan: span.rowspan,
            colspan: span.colspan,
        };
        map.mark(&placement, ordinal);
        placements.push(placement);

        col = x + span.colspan;
        if col >= column_count {
            row += 1;
            col = 0;
        }
    }

    Ok(PackResult { map, placements })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(list: &[(usize, usize)]) -> Vec<Span> {
        list.iter().map(|&(r, c)| Span::new(r, c)).collect()
    }

    #[test]
    fn test_three_column_pack() {
        let result = build(&spans(&[(1, 1), (1, 2), (1, 1), (1, 1)]), 3, 100).unwrap();
        assert_eq!(
            result.map.to_marked_rows(-1),
            vec![vec![0, 1, 1], vec![2, 3, -1]]
        );
        assert_eq!(
            result.placements[1],
            Placement {
                x: 1,
                y: 0,
                rowspan: 1,
                colspan: 2
            }
        );
    }

    #[test]
    fn test_cursor_does_not_backfill() {
        // The 1x1 after the wide item must not go back to the hole at (2, 0)
        let result = build(&spans(&[(1, 2), (1, 2), (1, 1)]), 3, 100).unwrap();
        assert_eq!(
            result.map.to_marked_rows(-1),
            vec![vec![0, 0, -1], vec![1, 1, 2]]
        );
    }

    #[test]
    fn test_full_width_item_starts_fresh_row() {
        let result = build(&spans(&[(1, 1), (1, 3)]), 3, 100).unwrap();
        assert_eq!(result.placements[1].y, 1);
        assert_eq!(result.placements[1].x, 0);
    }

    #[test]
    fn test_rowspan_blocks_cells_below() {
        let result = build(&spans(&[(2, 1), (1, 1), (1, 1), (1, 1), (1, 1)]), 3, 100).unwrap();
        assert_eq!(
            result.map.to_marked_rows(-1),
            vec![vec![0, 1, 2], vec![0, 3, 4]]
        );
    }

    #[test]
    fn test_empty_list() {
        let result = build(&[], 3, 100).unwrap();
        assert_eq!(result.map.row_count(), 0);
        assert!(result.placements.is_empty());
        assert_eq!(result.map.get(Cell::new(0, 0)), None);
    }

    #[test]
    fn test_too_wide_item_exhausts() {
        let err = build(&spans(&[(1, 4)]), 3, 5).unwrap_err();
        assert!(matches!(
            err,
            GridError::PackingExhausted {
                ordinal: 0,
                attempts: 6
            }
        ));
    }

    #[test]
    fn test_attempt_limit_counts_row_retries() {
        let list = spans(&[(1, 2), (1, 2)]);
        assert!(build(&list, 3, 1).is_ok());
        assert!(matches!(
            build(&list, 3, 0),
            Err(GridError::PackingExhausted { ordinal: 1, .. })
        ));
    }

    #[test]
    fn test_render_ascii() {
        let result = build(&spans(&[(1, 1), (1, 2), (1, 1)]), 3, 100).unwrap();
        assert_eq!(result.map.render_ascii(), "0 1 1\n2 . .");
    }
}
