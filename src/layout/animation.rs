//! Animation diff engine
//!
//! Compares the placements of two consecutive packings and turns every moved
//! entry into a translation instruction. Translations accumulate: a moved
//! entry starts from wherever its previous instruction was taking it, so a
//! transition that is still running is continued rather than restarted.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use super::types::{Entry, GridDimensions, Span, TrackSizes, Translation};
use super::view::{pack_entries, GridView};
use crate::error::GridError;

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Move `entry` from one translation to another
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimationInstruction {
    pub entry: Entry,
    pub from: Translation,
    pub to: Translation,
}

/// Time-based interpolation between two translations
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: Translation,
    to: Translation,
    elapsed: Duration,
    duration: Duration,
}

impl Tween {
    pub fn new(from: Translation, to: Translation, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn target(&self) -> Translation {
        self.to
    }

    /// Current eased value
    pub fn value(&self) -> Translation {
        if self.is_complete() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from.lerp(self.to, ease_in_out(t))
    }
}

/// Result of one reorder: the new view and the transitions it implies
#[derive(Debug, Clone)]
pub struct Diff {
    pub view: GridView,
    pub instructions: Vec<AnimationInstruction>,
}

/// Re-pack `entries` and compute translations relative to `previous`.
///
/// Track sizes are re-measured only when the row count changes or
/// `force_measure` is set; otherwise the previous dimensions are reused
/// as-is. Static origins are carried over, so the rendering layer never has
/// to re-flow during a drag.
pub fn diff(
    previous: &GridView,
    entries: Vec<Entry>,
    attempt_limit: usize,
    force_measure: bool,
    measure: impl FnOnce(usize) -> TrackSizes,
) -> Result<Diff, GridError> {
    let column_count = previous.dims.column_count;
    let pack = pack_entries(&entries, &previous.spans, column_count, attempt_limit)?;
    let dims = dimensions_for(previous, pack.map.row_count(), force_measure, measure);

    let mut origins = HashMap::with_capacity(entries.len());
    let mut translations = HashMap::with_capacity(entries.len());
    let mut instructions = Vec::new();

    for (entry, placement) in entries.iter().zip(&pack.placements) {
        let Some(old) = previous.placement_of(*entry) else {
            origins.insert(*entry, dims.origin_of(placement));
            continue;
        };
        if let Some(origin) = previous.origin_of(*entry) {
            origins.insert(*entry, origin);
        }

        let carried = previous.translation_of(*entry);
        if (old.x, old.y) == (placement.x, placement.y) {
            translations.insert(*entry, carried);
            continue;
        }

        let to = carried.plus(Translation::new(
            track_delta(old.x, placement.x, dims.column_track()),
            track_delta(old.y, placement.y, dims.row_track()),
        ));
        translations.insert(*entry, to);
        instructions.push(AnimationInstruction {
            entry: *entry,
            from: carried,
            to,
        });
    }

    let placeholder = entries.iter().position(Entry::is_placeholder);
    Ok(Diff {
        view: GridView {
            entries,
            spans: previous.spans.clone(),
            pack,
            dims,
            origins,
            translations,
            placeholder,
            forbidden: None,
        },
        instructions,
    })
}

/// Re-pack `entries` assuming the rendering layer re-flows them into their
/// new static slots.
///
/// Used when the placeholder is first inserted into the flow. Every entry
/// that was already visible is translated back to where it was drawn and
/// animated to zero.
pub fn rebase(
    previous: &GridView,
    entries: Vec<Entry>,
    spans: HashMap<Entry, Span>,
    attempt_limit: usize,
    measure: impl FnOnce(usize) -> TrackSizes,
) -> Result<Diff, GridError> {
    let column_count = previous.dims.column_count;
    let pack = pack_entries(&entries, &spans, column_count, attempt_limit)?;
    let dims = dimensions_for(previous, pack.map.row_count(), false, measure);

    let mut origins = HashMap::with_capacity(entries.len());
    let mut translations = HashMap::with_capacity(entries.len());
    let mut instructions = Vec::new();

    for (entry, placement) in entries.iter().zip(&pack.placements) {
        let origin = dims.origin_of(placement);
        origins.insert(*entry, origin);
        let Some(drawn) = previous.visual_rect(*entry) else {
            continue;
        };
        let from = drawn.origin().minus(origin);
        if from == Translation::zero() {
            continue;
        }
        translations.insert(*entry, Translation::zero());
        instructions.push(AnimationInstruction {
            entry: *entry,
            from,
            to: Translation::zero(),
        });
    }

    let placeholder = entries.iter().position(Entry::is_placeholder);
    Ok(Diff {
        view: GridView {
            entries,
            spans,
            pack,
            dims,
            origins,
            translations,
            placeholder,
            forbidden: None,
        },
        instructions,
    })
}

fn dimensions_for(
    previous: &GridView,
    row_count: usize,
    force_measure: bool,
    measure: impl FnOnce(usize) -> TrackSizes,
) -> GridDimensions {
    if row_count == previous.dims.row_count && !force_measure {
        return previous.dims;
    }
    GridDimensions::new(previous.dims.column_count, row_count, measure(row_count))
}

/// Signed pixel distance covered by moving from track `from` to track `to`
fn track_delta(from: usize, to: usize, track: f64) -> f64 {
    if to >= from {
        (from..to).map(|_| track).sum()
    } else {
        -(to..from).map(|_| track).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::ItemId;

    const A: Entry = Entry::Item(ItemId(0));
    const B: Entry = Entry::Item(ItemId(1));

    fn tracks() -> TrackSizes {
        TrackSizes::new(100.0, 10.0, 50.0, 10.0)
    }

    fn start(entries: Vec<Entry>) -> GridView {
        let spans = entries.iter().map(|e| (*e, Span::unit())).collect();
        GridView::initial(entries, spans, 3, 100, |_| tracks()).unwrap()
    }

    #[test]
    fn test_ease_in_out_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!(ease_in_out(0.25) < 0.25);
    }

    #[test]
    fn test_tween_reaches_target() {
        let to = Translation::new(100.0, 0.0);
        let mut tween = Tween::new(Translation::zero(), to, Duration::from_millis(200));
        tween.tick(Duration::from_millis(100));
        assert_eq!(tween.value(), Translation::new(50.0, 0.0));
        tween.tick(Duration::from_millis(150));
        assert!(tween.is_complete());
        assert_eq!(tween.value(), Translation::new(100.0, 0.0));
    }

    #[test]
    fn test_swap_emits_instructions_for_moved_entries() {
        let previous = start(vec![A, Entry::Placeholder, B]);
        let entries = vec![Entry::Placeholder, A, B];
        let result = diff(&previous, entries, 100, false, |_| unreachable!()).unwrap();
        assert_eq!(
            result.instructions,
            vec![
                AnimationInstruction {
                    entry: Entry::Placeholder,
                    from: Translation::zero(),
                    to: Translation::new(-110.0, 0.0),
                },
                AnimationInstruction {
                    entry: A,
                    from: Translation::zero(),
                    to: Translation::new(110.0, 0.0),
                },
            ]
        );
        assert_eq!(result.view.translation_of(B), Translation::zero());
    }

    #[test]
    fn test_translation_accumulates() {
        let previous = start(vec![A, Entry::Placeholder, B]);
        let entries = vec![Entry::Placeholder, A, B];
        let first = diff(&previous, entries, 100, false, |_| tracks()).unwrap();
        let entries = vec![Entry::Placeholder, B, A];
        let second = diff(&first.view, entries, 100, false, |_| tracks()).unwrap();
        let a_move = second
            .instructions
            .iter()
            .find(|i| i.entry == A)
            .copied()
            .unwrap();
        assert_eq!(a_move.from, Translation::new(110.0, 0.0));
        assert_eq!(a_move.to, Translation::new(220.0, 0.0));
    }

    #[test]
    fn test_row_change_remeasures_tracks() {
        let c = Entry::Item(ItemId(2));
        let previous = start(vec![A, B, c]);
        let widened = TrackSizes::new(90.0, 10.0, 50.0, 10.0);
        let result = diff(&previous, vec![A, B, c, Entry::Placeholder], 100, false, |rows| {
            assert_eq!(rows, 2);
            widened
        })
        .unwrap();
        assert_eq!(result.view.dimensions().column_width, 90.0);
        assert_eq!(result.view.dimensions().row_count, 2);
        assert!(result.instructions.is_empty());
    }

    #[test]
    fn test_wrap_to_next_row_moves_diagonally() {
        let c = Entry::Item(ItemId(2));
        let previous = start(vec![A, B, c, Entry::Placeholder]);
        let entries = vec![Entry::Placeholder, A, B, c];
        let result = diff(&previous, entries, 100, false, |_| tracks()).unwrap();
        let c_move = result.instructions.iter().find(|i| i.entry == c).unwrap();
        // (2, 0) -> (0, 1)
        assert_eq!(c_move.to, Translation::new(-220.0, 60.0));
        assert_eq!(result.view.dimensions().row_count, 2);
    }

    #[test]
    fn test_rebase_keeps_visual_positions() {
        let previous = start(vec![A, B]);
        let mut spans: HashMap<Entry, Span> = previous.spans.clone();
        spans.insert(Entry::Placeholder, Span::unit());
        let entries = vec![Entry::Placeholder, A, B];
        let result = rebase(&previous, entries, spans, 100, |_| tracks()).unwrap();
        let a_move = result.instructions.iter().find(|i| i.entry == A).unwrap();
        assert_eq!(a_move.from, Translation::new(-110.0, 0.0));
        assert_eq!(a_move.to, Translation::zero());
        assert_eq!(result.view.origin_of(A).map(|o| o.x), Some(110.0));
        assert_eq!(result.view.placeholder_index(), Some(0));
    }
}
