use crate::protocol::OverlayTicket;

pub const DEFAULT_OVERLAY_MESSAGE: &str = "Loading...";

/// What a front-end must do after an overlay call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayChange {
    /// The overlay appeared or now shows a different message.
    Shown(String),
    Hidden,
    Unchanged,
}

/// Singleton loading overlay with ticket-paired show/hide.
///
/// Every show holds a ticket. The overlay stays up while any ticket is
/// outstanding and shows the message of the most recent one, so nested
/// callers never stack a second overlay or hide one another's.
#[derive(Debug, Default)]
pub struct LoadingOverlay {
    holders: Vec<(OverlayTicket, String)>,
}

impl LoadingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        !self.holders.is_empty()
    }

    pub fn message(&self) -> Option<&str> {
        self.holders.last().map(|(_, m)| m.as_str())
    }

    pub fn outstanding(&self) -> usize {
        self.holders.len()
    }

    /// Showing an already-held ticket only updates its message.
    pub fn show(&mut self, ticket: OverlayTicket, message: Option<String>) -> OverlayChange {
        let message = message.unwrap_or_else(|| DEFAULT_OVERLAY_MESSAGE.to_string());
        let before = self.message().map(str::to_string);
        match self.holders.iter_mut().find(|(t, _)| *t == ticket) {
            Some((_, m)) => *m = message,
            None => self.holders.push((ticket, message)),
        }
        self.diff(before)
    }

    /// Retiring an unknown or already-retired ticket is a no-op.
    pub fn hide(&mut self, ticket: OverlayTicket) -> OverlayChange {
        let before = self.message().map(str::to_string);
        self.holders.retain(|(t, _)| *t != ticket);
        self.diff(before)
    }

    pub fn hide_all(&mut self) -> OverlayChange {
        let before = self.message().map(str::to_string);
        self.holders.clear();
        self.diff(before)
    }

    fn diff(&self, before: Option<String>) -> OverlayChange {
        match (before, self.message()) {
            (None, None) => OverlayChange::Unchanged,
            (Some(_), None) => OverlayChange::Hidden,
            (Some(old), Some(new)) if old == new => OverlayChange::Unchanged,
            (_, Some(new)) => OverlayChange::Shown(new.to_string()),
        }
    }
}
