//! Packing properties of the occupancy map builder

use pretty_assertions::assert_eq;
use sortable_grid::layout::{build, Cell, Span};
use sortable_grid::GridError;

fn spans(list: &[(usize, usize)]) -> Vec<Span> {
    list.iter().map(|&(r, c)| Span::new(r, c)).collect()
}

/// A few mixed-span lists that exercise wrapping, holes and tall items
fn samples() -> Vec<(Vec<Span>, usize)> {
    vec![
        (spans(&[(1, 1), (1, 2), (1, 1), (1, 1)]), 3),
        (spans(&[(2, 2), (1, 1), (1, 1), (1, 3), (2, 1), (1, 1)]), 4),
        (spans(&[(1, 2), (1, 2), (1, 1), (3, 1), (1, 1), (1, 1)]), 3),
        (spans(&[(1, 1); 9]), 2),
        (spans(&[(2, 1), (2, 1), (1, 1), (1, 2), (1, 1)]), 2),
    ]
}

#[test]
fn test_packing_is_deterministic() {
    for (list, columns) in samples() {
        let first = build(&list, columns, 100).unwrap();
        let second = build(&list, columns, 100).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_every_item_covers_exactly_its_area() {
    for (list, columns) in samples() {
        let result = build(&list, columns, 100).unwrap();
        for (ordinal, span) in list.iter().enumerate() {
            let covered = result
                .map
                .rows()
                .iter()
                .flatten()
                .filter(|cell| **cell == Some(ordinal))
                .count();
            assert_eq!(covered, span.rowspan * span.colspan, "ordinal {}", ordinal);
        }
    }
}

#[test]
fn test_placements_match_map() {
    for (list, columns) in samples() {
        let result = build(&list, columns, 100).unwrap();
        for (ordinal, placement) in result.placements.iter().enumerate() {
            assert!(placement.x + placement.colspan <= columns);
            for row in placement.y..placement.y + placement.rowspan {
                for col in placement.x..placement.x + placement.colspan {
                    assert_eq!(result.map.get(Cell::new(col, row)), Some(ordinal));
                }
            }
        }
    }
}

#[test]
fn test_placements_never_overlap() {
    for (list, columns) in samples() {
        let result = build(&list, columns, 100).unwrap();
        for (i, a) in result.placements.iter().enumerate() {
            for b in &result.placements[i + 1..] {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }
}

#[test]
fn test_row_major_order_is_kept() {
    for (list, columns) in samples() {
        let result = build(&list, columns, 100).unwrap();
        for pair in result.placements.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!((b.y, b.x) > (a.y, a.x), "{:?} placed before {:?}", b, a);
        }
    }
}

#[test]
fn test_three_column_mixed_spans() {
    let result = build(&spans(&[(1, 1), (1, 2), (1, 1), (1, 1)]), 3, 100).unwrap();
    insta::assert_snapshot!(result.map.render_ascii(), @r"
    0 1 1
    2 3 .
    ");
}

#[test]
fn test_tall_items_leave_gaps_behind_cursor() {
    let result = build(&spans(&[(2, 1), (2, 1), (1, 1), (1, 2), (1, 1)]), 2, 100).unwrap();
    insta::assert_snapshot!(result.map.render_ascii(), @r"
    0 1
    0 1
    2 .
    3 3
    4 .
    ");
}

#[test]
fn test_wide_ordinals_are_aligned() {
    let result = build(&spans(&[(1, 1); 11]), 4, 100).unwrap();
    assert_eq!(result.map.render_ascii(), " 0  1  2  3\n 4  5  6  7\n 8  9 10  .");
}

#[test]
fn test_wider_than_grid_is_exhausted() {
    let err = build(&spans(&[(1, 1), (1, 5)]), 4, 10).unwrap_err();
    assert!(matches!(err, GridError::PackingExhausted { ordinal: 1, .. }));
}
