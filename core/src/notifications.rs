use std::collections::VecDeque;
use std::time::Duration;

use crate::protocol::Notification;
use crate::protocol::NotificationKind;

/// Result of [`NotificationSurface::push`].
#[derive(Debug, Clone, PartialEq)]
pub struct Pushed {
    pub notification: Notification,
    /// True only for the first card ever pushed.
    pub created_container: bool,
    /// Oldest cards removed to stay within the cap, oldest first.
    pub evicted: Vec<Notification>,
}

/// Stack of transient notification cards in creation order.
///
/// The container is created lazily on the first push and then reused. Holds
/// no timers: the owner schedules expiry and calls [`Self::remove`], which is
/// a no-op for cards that are already gone.
#[derive(Debug)]
pub struct NotificationSurface {
    cards: VecDeque<Notification>,
    next_id: u64,
    max_visible: usize,
    container_created: bool,
}

impl NotificationSurface {
    pub fn new(max_visible: usize) -> Self {
        Self {
            cards: VecDeque::new(),
            next_id: 1,
            max_visible: max_visible.max(1),
            container_created: false,
        }
    }

    pub fn push(&mut self, kind: NotificationKind, message: String, ttl: Duration) -> Pushed {
        let created_container = !self.container_created;
        self.container_created = true;

        let mut evicted = Vec::new();
        while self.cards.len() >= self.max_visible {
            match self.cards.pop_front() {
                Some(oldest) => evicted.push(oldest),
                None => break,
            }
        }

        let notification = Notification {
            id: self.next_id,
            kind,
            message,
            ttl,
        };
        self.next_id += 1;
        self.cards.push_back(notification.clone());

        Pushed {
            notification,
            created_container,
            evicted,
        }
    }

    /// Remove a card by id. Returns `None` if it was already removed.
    pub fn remove(&mut self, id: u64) -> Option<Notification> {
        let index = self.cards.iter().position(|n| n.id == id)?;
        self.cards.remove(index)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Notification> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn has_container(&self) -> bool {
        self.container_created
    }
}
