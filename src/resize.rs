//! Resize notifications
//!
//! A [`ResizeWatcher`] is created by the embedder and handed to every grid
//! that should re-measure when the window or its container changes size.
//! Dropping the returned [`ResizeSubscription`] unsubscribes.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

#[derive(Debug, Default)]
pub struct ResizeWatcher {
    subscribers: RefCell<Vec<Weak<Cell<bool>>>>,
}

impl ResizeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> ResizeSubscription {
        let dirty = Rc::new(Cell::new(false));
        self.subscribers.borrow_mut().push(Rc::downgrade(&dirty));
        ResizeSubscription { dirty }
    }

    /// Flag every live subscription; returns how many were notified
    pub fn notify(&self) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|weak| weak.strong_count() > 0);
        for dirty in subscribers.iter().filter_map(Weak::upgrade) {
            dirty.set(true);
        }
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// A grid's handle on a [`ResizeWatcher`]
#[derive(Debug)]
pub struct ResizeSubscription {
    dirty: Rc<Cell<bool>>,
}

impl ResizeSubscription {
    /// Whether a resize happened since the last call; clears the flag
    pub fn take(&self) -> bool {
        self.dirty.replace(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_flags_subscribers_once() {
        let watcher = ResizeWatcher::new();
        let sub = watcher.subscribe();
        assert!(!sub.take());
        assert_eq!(watcher.notify(), 1);
        assert!(sub.take());
        assert!(!sub.take());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let watcher = ResizeWatcher::new();
        let first = watcher.subscribe();
        let second = watcher.subscribe();
        assert_eq!(watcher.subscriber_count(), 2);
        drop(first);
        assert_eq!(watcher.subscriber_count(), 1);
        assert_eq!(watcher.notify(), 1);
        assert!(second.take());
    }
}
