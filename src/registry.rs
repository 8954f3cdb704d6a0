//! Item registry
//!
//! Side table of per-item metadata keyed by a stable [`ItemId`], plus the
//! authoritative item order. Entries are removed explicitly when an item
//! leaves the grid.

use std::collections::HashMap;

use tracing::warn;

use crate::error::GridError;
use crate::layout::{Entry, ItemId, Span};

/// What a caller supplies to register an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub span: Span,
    /// Marker of the element that starts a drag
    pub handle: Option<String>,
}

impl ItemSpec {
    pub fn new(rowspan: usize, colspan: usize) -> Self {
        Self {
            span: Span::new(rowspan, colspan),
            handle: None,
        }
    }

    /// Set the drag handle marker
    pub fn with_handle(mut self, marker: impl Into<String>) -> Self {
        self.handle = Some(marker.into());
        self
    }
}

/// Metadata of a registered item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMeta {
    pub span: Span,
    pub handle: String,
}

#[derive(Debug, Clone)]
pub struct ItemRegistry {
    column_count: usize,
    next_id: u32,
    items: HashMap<ItemId, ItemMeta>,
    order: Vec<ItemId>,
}

impl ItemRegistry {
    pub fn new(column_count: usize) -> Self {
        Self {
            column_count,
            next_id: 0,
            items: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register an item at the end of the order
    pub fn register(&mut self, spec: ItemSpec) -> Result<ItemId, GridError> {
        let index = self.order.len();
        self.insert(spec, index)
    }

    /// Register an item at `index` (clamped to the end)
    pub fn insert(&mut self, spec: ItemSpec, index: usize) -> Result<ItemId, GridError> {
        let id = ItemId(self.next_id);
        let handle = match spec.handle {
            Some(marker) if !marker.is_empty() => marker,
            _ => return Err(GridError::MissingDragHandle { item: id }),
        };
        let span = self.checked_span(id, spec.span)?;

        self.next_id += 1;
        self.items.insert(id, ItemMeta { span, handle });
        self.order.insert(index.min(self.order.len()), id);
        Ok(id)
    }

    /// Remove an item and its metadata
    pub fn remove(&mut self, id: ItemId) -> Result<ItemMeta, GridError> {
        let meta = self
            .items
            .remove(&id)
            .ok_or(GridError::UnknownItem { item: id })?;
        self.order.retain(|other| *other != id);
        Ok(meta)
    }

    /// Change an item's span, e.g. after a responsive class toggle
    pub fn set_span(&mut self, id: ItemId, span: Span) -> Result<Span, GridError> {
        let span = self.checked_span(id, span)?;
        let meta = self
            .items
            .get_mut(&id)
            .ok_or(GridError::UnknownItem { item: id })?;
        meta.span = span;
        Ok(span)
    }

    /// Move an item to `index` in the order
    pub fn move_to(&mut self, id: ItemId, index: usize) -> Result<(), GridError> {
        let from = self.index_of(id).ok_or(GridError::UnknownItem { item: id })?;
        self.order.remove(from);
        self.order.insert(index.min(self.order.len()), id);
        Ok(())
    }

    pub fn order(&self) -> &[ItemId] {
        &self.order
    }

    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.order.iter().position(|other| *other == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn get(&self, id: ItemId) -> Option<&ItemMeta> {
        self.items.get(&id)
    }

    pub fn span_of(&self, id: ItemId) -> Option<Span> {
        self.items.get(&id).map(|meta| meta.span)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn spans(&self) -> Vec<Span> {
        self.order
            .iter()
            .map(|id| self.items[id].span)
            .collect()
    }

    /// Entries in order, with `dragged` standing in as the placeholder
    pub(crate) fn entries(&self, dragged: Option<ItemId>) -> (Vec<Entry>, HashMap<Entry, Span>) {
        let mut spans = HashMap::with_capacity(self.order.len());
        let entries = self
            .order
            .iter()
            .map(|id| {
                let entry = if Some(*id) == dragged {
                    Entry::Placeholder
                } else {
                    Entry::Item(*id)
                };
                spans.insert(entry, self.items[id].span);
                entry
            })
            .collect();
        (entries, spans)
    }

    /// Check the span of an item that is not registered yet, e.g. one being
    /// dragged in; errors and logs name the id it would be registered under
    pub fn check_span(&self, span: Span) -> Result<Span, GridError> {
        self.checked_span(ItemId(self.next_id), span)
    }

    fn checked_span(&self, id: ItemId, span: Span) -> Result<Span, GridError> {
        if span.rowspan == 0 || span.colspan == 0 {
            return Err(GridError::invalid_span(
                id,
                span.rowspan,
                span.colspan,
                "spans must be at least 1",
            ));
        }
        if span.colspan > self.column_count {
            warn!(
                item = %id,
                colspan = span.colspan,
                columns = self.column_count,
                "colspan clamped to column count"
            );
            return Ok(Span::new(span.rowspan, self.column_count));
        }
        Ok(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(rowspan: usize, colspan: usize) -> ItemSpec {
        ItemSpec::new(rowspan, colspan).with_handle("grip")
    }

    #[test]
    fn test_register_assigns_ids_in_order() {
        let mut registry = ItemRegistry::new(3);
        let a = registry.register(spec(1, 1)).unwrap();
        let b = registry.register(spec(1, 2)).unwrap();
        assert_eq!(registry.order(), &[a, b]);
        assert_eq!(registry.span_of(b), Some(Span::new(1, 2)));
    }

    #[test]
    fn test_missing_handle_is_rejected() {
        let mut registry = ItemRegistry::new(3);
        let err = registry.register(ItemSpec::new(1, 1)).unwrap_err();
        assert!(matches!(err, GridError::MissingDragHandle { .. }));
        let err = registry.register(ItemSpec::new(1, 1).with_handle("")).unwrap_err();
        assert!(matches!(err, GridError::MissingDragHandle { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_zero_span_is_rejected() {
        let mut registry = ItemRegistry::new(3);
        assert!(matches!(
            registry.register(spec(0, 1)),
            Err(GridError::InvalidSpan { .. })
        ));
    }

    #[test]
    fn test_wide_span_is_clamped() {
        let mut registry = ItemRegistry::new(3);
        let id = registry.register(spec(2, 5)).unwrap();
        assert_eq!(registry.span_of(id), Some(Span::new(2, 3)));
    }

    #[test]
    fn test_unregistered_span_names_next_id() {
        let mut registry = ItemRegistry::new(3);
        registry.register(spec(1, 1)).unwrap();
        assert_eq!(registry.check_span(Span::new(1, 4)).unwrap(), Span::new(1, 3));
        assert!(matches!(
            registry.check_span(Span::new(0, 1)),
            Err(GridError::InvalidSpan { item: ItemId(1), .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_and_move() {
        let mut registry = ItemRegistry::new(3);
        let a = registry.register(spec(1, 1)).unwrap();
        let b = registry.register(spec(1, 1)).unwrap();
        let c = registry.register(spec(1, 1)).unwrap();
        registry.move_to(c, 0).unwrap();
        assert_eq!(registry.order(), &[c, a, b]);
        registry.remove(a).unwrap();
        assert_eq!(registry.order(), &[c, b]);
        assert!(registry.get(a).is_none());
        assert!(matches!(registry.remove(a), Err(GridError::UnknownItem { .. })));
    }

    #[test]
    fn test_entries_replace_dragged_item() {
        let mut registry = ItemRegistry::new(3);
        let a = registry.register(spec(1, 1)).unwrap();
        let b = registry.register(spec(1, 2)).unwrap();
        let (entries, spans) = registry.entries(Some(b));
        assert_eq!(entries, vec![Entry::Item(a), Entry::Placeholder]);
        assert_eq!(spans[&Entry::Placeholder], Span::new(1, 2));
    }
}
