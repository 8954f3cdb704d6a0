//! Placeholder resolver
//!
//! Decides where the placeholder goes next given the cell under the pointer.
//! The answer is an index into the entry list, never a pixel position.

use serde::Serialize;

use super::types::{Cell, Entry};
use super::view::GridView;

/// Which half of an item the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Left,
    Right,
}

/// An (item, side) boundary that can move the placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Trigger {
    pub entry: Entry,
    pub side: Side,
}

/// Outcome of one resolver call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The placeholder keeps its index
    Stay,
    /// The pointer sits on the forbidden trigger
    Suppressed(Trigger),
    /// The placeholder should move to this index
    Move(usize),
}

/// Compute the next placeholder index for a pointer at `cell`.
///
/// `pointer_x` is in content-box pixels and is compared against the visual
/// center of the hovered item, translation included.
pub fn resolve(view: &GridView, cell: Cell, pointer_x: f64) -> Resolution {
    let Some(current) = view.placeholder_index() else {
        return Resolution::Stay;
    };

    let target = match view.map().get(cell) {
        None => match scan_left(view, cell) {
            Some(ordinal) => index_after(ordinal, current),
            None => 0,
        },
        Some(ordinal) if ordinal == current => return Resolution::Stay,
        Some(ordinal) => {
            let entry = view.entries()[ordinal];
            let side = side_of(view, entry, pointer_x);
            let trigger = Trigger { entry, side };
            if view.forbidden_trigger() == Some(trigger) {
                return Resolution::Suppressed(trigger);
            }
            match side {
                Side::Left => index_before(ordinal, current),
                Side::Right => index_after(ordinal, current),
            }
        }
    };

    if target == current {
        Resolution::Stay
    } else {
        Resolution::Move(target)
    }
}

/// The trigger the pointer currently rests on, if any
pub fn trigger_at(view: &GridView, cell: Cell, pointer_x: f64) -> Option<Trigger> {
    let ordinal = view.map().get(cell)?;
    let entry = view.entries()[ordinal];
    if entry.is_placeholder() {
        return None;
    }
    Some(Trigger {
        entry,
        side: side_of(view, entry, pointer_x),
    })
}

/// Left or right half, by the item's visual center; the exact center counts as right
fn side_of(view: &GridView, entry: Entry, pointer_x: f64) -> Side {
    let center = view
        .visual_rect(entry)
        .map_or(pointer_x, |rect| rect.x + rect.width / 2.0);
    if pointer_x < center {
        Side::Left
    } else {
        Side::Right
    }
}

/// Walk cells leftwards from `cell`, wrapping to the end of the previous row,
/// and return the first occupied ordinal
fn scan_left(view: &GridView, cell: Cell) -> Option<usize> {
    let columns = view.map().column_count();
    let start = cell.row * columns + cell.col;
    (0..start)
        .rev()
        .find_map(|linear| view.map().get(Cell::new(linear % columns, linear / columns)))
}

/// Target index for "right after `ordinal`" once the placeholder at `current` is lifted out
fn index_after(ordinal: usize, current: usize) -> usize {
    if ordinal >= current {
        ordinal
    } else {
        ordinal + 1
    }
}

/// Target index for "right before `ordinal`" once the placeholder at `current` is lifted out
fn index_before(ordinal: usize, current: usize) -> usize {
    if ordinal > current {
        ordinal - 1
    } else {
        ordinal
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::layout::types::{ItemId, Span, TrackSizes};

    const A: Entry = Entry::Item(ItemId(0));
    const C: Entry = Entry::Item(ItemId(2));

    fn view_of(entries: Vec<Entry>, spans: &[Span]) -> GridView {
        let spans: HashMap<Entry, Span> =
            entries.iter().copied().zip(spans.iter().copied()).collect();
        let tracks = TrackSizes::new(100.0, 0.0, 100.0, 0.0);
        GridView::initial(entries, spans, 3, 100, |_| tracks).unwrap()
    }

    fn unit_view() -> GridView {
        view_of(vec![A, Entry::Placeholder, C], &[Span::unit(); 3])
    }

    #[test]
    fn test_left_half_of_first_item_moves_to_front() {
        let view = unit_view();
        assert_eq!(resolve(&view, Cell::new(0, 0), 20.0), Resolution::Move(0));
    }

    #[test]
    fn test_right_half_of_next_item_moves_after_it() {
        let view = unit_view();
        assert_eq!(resolve(&view, Cell::new(2, 0), 280.0), Resolution::Move(2));
    }

    #[test]
    fn test_adjacent_halves_do_not_creep() {
        let view = unit_view();
        // Right of A and left of C both describe the current slot
        assert_eq!(resolve(&view, Cell::new(0, 0), 80.0), Resolution::Stay);
        assert_eq!(resolve(&view, Cell::new(2, 0), 220.0), Resolution::Stay);
    }

    #[test]
    fn test_hovering_placeholder_is_noop() {
        let view = unit_view();
        assert_eq!(resolve(&view, Cell::new(1, 0), 150.0), Resolution::Stay);
    }

    #[test]
    fn test_exact_center_counts_as_right() {
        let view = unit_view();
        assert_eq!(trigger_at(&view, Cell::new(0, 0), 50.0).map(|t| t.side), Some(Side::Right));
        assert_eq!(trigger_at(&view, Cell::new(0, 0), 49.9).map(|t| t.side), Some(Side::Left));
    }

    #[test]
    fn test_empty_cell_lands_after_left_neighbor() {
        // Row 0: A P C, row 1: D . .
        let d = Entry::Item(ItemId(3));
        let view = view_of(vec![A, Entry::Placeholder, C, d], &[Span::unit(); 4]);
        assert_eq!(resolve(&view, Cell::new(2, 1), 250.0), Resolution::Move(3));
    }

    #[test]
    fn test_empty_cell_wraps_to_previous_row() {
        // Row 0: P A A, row 1: C C .  pointer over (2, 1) scans back to C
        let view = view_of(
            vec![Entry::Placeholder, A, C],
            &[Span::unit(), Span::new(1, 2), Span::new(1, 2)],
        );
        assert_eq!(view.map().get(Cell::new(2, 1)), None);
        assert_eq!(resolve(&view, Cell::new(2, 1), 250.0), Resolution::Move(2));
    }

    #[test]
    fn test_forbidden_trigger_suppresses() {
        let view = unit_view().with_forbidden(Some(Trigger {
            entry: A,
            side: Side::Left,
        }));
        assert_eq!(
            resolve(&view, Cell::new(0, 0), 20.0),
            Resolution::Suppressed(Trigger {
                entry: A,
                side: Side::Left
            })
        );
        // The other half of the same item is still live
        assert_eq!(resolve(&view, Cell::new(0, 0), 80.0), Resolution::Stay);
    }

    #[test]
    fn test_trigger_at_ignores_placeholder() {
        assert_eq!(trigger_at(&unit_view(), Cell::new(1, 0), 150.0), None);
    }
}
