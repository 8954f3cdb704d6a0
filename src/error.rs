//! Error types for the grid engine and drag sessions

use thiserror::Error;

use crate::layout::ItemId;
use crate::scenario::ScenarioError;

/// Errors that can occur while registering items, packing or dragging
#[derive(Debug, Error)]
pub enum GridError {
    /// Item registered without a drag handle marker
    #[error("item {item} has no drag handle marker")]
    MissingDragHandle { item: ItemId },

    /// Span that cannot be packed
    #[error("invalid span {rowspan}x{colspan} for item {item}: {reason}")]
    InvalidSpan {
        item: ItemId,
        rowspan: usize,
        colspan: usize,
        reason: String,
    },

    /// The packing retry loop hit its bound
    #[error("packing gave up on item at ordinal {ordinal} after {attempts} row retries")]
    PackingExhausted { ordinal: usize, attempts: usize },

    /// Reference to an item that is not registered
    #[error("unknown item {item}")]
    UnknownItem { item: ItemId },

    /// A drag was aborted and the grid restored to its last consistent state
    #[error("drag aborted: {0}")]
    DragAborted(Box<GridError>),

    /// Scenario input could not be loaded
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

impl GridError {
    /// Create an invalid span error
    pub fn invalid_span(
        item: ItemId,
        rowspan: usize,
        colspan: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSpan {
            item,
            rowspan,
            colspan,
            reason: reason.into(),
        }
    }

    /// Create a packing exhaustion error
    pub fn exhausted(ordinal: usize, attempts: usize) -> Self {
        Self::PackingExhausted { ordinal, attempts }
    }

    /// Wrap an algorithmic failure that ended a drag
    pub fn aborted(cause: GridError) -> Self {
        Self::DragAborted(Box::new(cause))
    }

    /// The underlying cause when this error wraps another one
    pub fn cause(&self) -> Option<&GridError> {
        match self {
            Self::DragAborted(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_handle_display() {
        let err = GridError::MissingDragHandle { item: ItemId(3) };
        assert_eq!(err.to_string(), "item #3 has no drag handle marker");
    }

    #[test]
    fn test_invalid_span_display() {
        let err = GridError::invalid_span(ItemId(1), 0, 2, "spans must be at least 1");
        assert!(err.to_string().contains("0x2"));
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_aborted_keeps_cause() {
        let err = GridError::aborted(GridError::exhausted(2, 11));
        assert!(err.to_string().starts_with("drag aborted: packing gave up"));
        assert!(matches!(
            err.cause(),
            Some(GridError::PackingExhausted { ordinal: 2, attempts: 11 })
        ));
    }
}
