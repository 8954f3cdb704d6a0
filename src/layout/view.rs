//! Immutable snapshot of a grid during a drag

use std::collections::HashMap;

use super::mapper::cell_of;
use super::packer::{build, OccupancyMap, PackResult};
use super::resolver::Trigger;
use super::types::{
    Cell, Entry, GridDimensions, Placement, Point, Rect, Span, TrackSizes, Translation,
};
use crate::error::GridError;

/// Everything the resolver and the diff engine need about one packing
///
/// A view is never mutated after construction. Reorders build a new view from
/// the previous one (see [`crate::layout::animation::diff`]).
#[derive(Debug, Clone)]
pub struct GridView {
    pub(crate) entries: Vec<Entry>,
    pub(crate) spans: HashMap<Entry, Span>,
    pub(crate) pack: PackResult,
    pub(crate) dims: GridDimensions,
    /// Static top-left corner of each entry inside the content box, as laid
    /// out by the rendering layer when the entry was last placed in flow
    pub(crate) origins: HashMap<Entry, Point>,
    pub(crate) translations: HashMap<Entry, Translation>,
    pub(crate) placeholder: Option<usize>,
    pub(crate) forbidden: Option<Trigger>,
}

impl GridView {
    /// Pack `entries` and take their packed positions as static origins
    pub fn initial(
        entries: Vec<Entry>,
        spans: HashMap<Entry, Span>,
        column_count: usize,
        attempt_limit: usize,
        measure: impl FnOnce(usize) -> TrackSizes,
    ) -> Result<Self, GridError> {
        let pack = pack_entries(&entries, &spans, column_count, attempt_limit)?;
        let rows = pack.map.row_count();
        let dims = GridDimensions::new(column_count, rows, measure(rows));
        let origins = entries
            .iter()
            .zip(&pack.placements)
            .map(|(entry, placement)| (*entry, dims.origin_of(placement)))
            .collect();
        let placeholder = entries.iter().position(Entry::is_placeholder);
        Ok(Self {
            entries,
            spans,
            pack,
            dims,
            origins,
            translations: HashMap::new(),
            placeholder,
            forbidden: None,
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn map(&self) -> &OccupancyMap {
        &self.pack.map
    }

    pub fn placements(&self) -> &[Placement] {
        &self.pack.placements
    }

    pub fn dimensions(&self) -> &GridDimensions {
        &self.dims
    }

    /// Current ordinal of the placeholder, if it is in the list
    pub fn placeholder_index(&self) -> Option<usize> {
        self.placeholder
    }

    pub fn forbidden_trigger(&self) -> Option<Trigger> {
        self.forbidden
    }

    pub fn span_of(&self, entry: Entry) -> Option<Span> {
        self.spans.get(&entry).copied()
    }

    pub fn ordinal_of(&self, entry: Entry) -> Option<usize> {
        self.entries.iter().position(|e| *e == entry)
    }

    pub fn placement_of(&self, entry: Entry) -> Option<Placement> {
        self.ordinal_of(entry).map(|ordinal| self.pack.placements[ordinal])
    }

    /// Accumulated translation of an entry (zero if it never moved)
    pub fn translation_of(&self, entry: Entry) -> Translation {
        self.translations.get(&entry).copied().unwrap_or_default()
    }

    pub fn origin_of(&self, entry: Entry) -> Option<Point> {
        self.origins.get(&entry).copied()
    }

    /// Where an entry is drawn: static origin plus accumulated translation,
    /// sized by its current placement
    pub fn visual_rect(&self, entry: Entry) -> Option<Rect> {
        let placement = self.placement_of(entry)?;
        let origin = self.origin_of(entry)?;
        let offset = self.translation_of(entry);
        let rect = self.dims.rect_of(&placement);
        Some(Rect::new(
            origin.x + offset.x,
            origin.y + offset.y,
            rect.width,
            rect.height,
        ))
    }

    /// Cell under a content-box position
    pub fn cell_at(&self, position: Point) -> Cell {
        cell_of(position, &self.dims)
    }

    /// Entry list with the placeholder moved (or inserted) at `index`
    pub fn entries_with_placeholder_at(&self, index: usize) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .entries
            .iter()
            .copied()
            .filter(|entry| !entry.is_placeholder())
            .collect();
        entries.insert(index.min(entries.len()), Entry::Placeholder);
        entries
    }

    /// Same view with a different forbidden trigger memo
    pub(crate) fn with_forbidden(mut self, trigger: Option<Trigger>) -> Self {
        self.forbidden = trigger;
        self
    }
}

/// Pack entries using their recorded spans
pub(crate) fn pack_entries(
    entries: &[Entry],
    spans: &HashMap<Entry, Span>,
    column_count: usize,
    attempt_limit: usize,
) -> Result<PackResult, GridError> {
    let list: Vec<Span> = entries
        .iter()
        .map(|entry| spans.get(entry).copied().unwrap_or_default())
        .collect();
    build(&list, column_count, attempt_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ItemId;

    fn view() -> GridView {
        let entries = vec![
            Entry::Item(ItemId(0)),
            Entry::Placeholder,
            Entry::Item(ItemId(2)),
        ];
        let spans = entries.iter().map(|e| (*e, Span::unit())).collect();
        let tracks = TrackSizes::new(100.0, 10.0, 80.0, 10.0);
        GridView::initial(entries, spans, 3, 100, |_| tracks).unwrap()
    }

    #[test]
    fn test_initial_view_origins_match_packing() {
        let view = view();
        assert_eq!(view.placeholder_index(), Some(1));
        assert_eq!(view.origin_of(Entry::Item(ItemId(2))), Some(Point::new(220.0, 0.0)));
        assert_eq!(view.translation_of(Entry::Placeholder), Translation::zero());
    }

    #[test]
    fn test_entries_with_placeholder_at() {
        let view = view();
        assert_eq!(
            view.entries_with_placeholder_at(0),
            vec![Entry::Placeholder, Entry::Item(ItemId(0)), Entry::Item(ItemId(2))]
        );
        assert_eq!(
            view.entries_with_placeholder_at(5),
            vec![Entry::Item(ItemId(0)), Entry::Item(ItemId(2)), Entry::Placeholder]
        );
    }

    #[test]
    fn test_visual_rect() {
        let rect = view().visual_rect(Entry::Item(ItemId(0))).unwrap();
        assert_eq!(rect, Rect::new(0.0, 0.0, 100.0, 80.0));
    }
}
