//! Types used to define the fields of [`crate::config::ConfigToml`].

// Note this file should generally be restricted to simple struct/enum
// definitions that do not contain business logic.

use serde::Deserialize;

/// `[search]` table.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchToml {
    /// Quiet window, in milliseconds, before a search is dispatched.
    pub debounce_ms: Option<u64>,

    /// Shortest query (in characters) that is sent to the endpoint.
    pub min_query_chars: Option<usize>,

    /// Raise a danger notification when a search request fails instead of
    /// only logging it.
    pub notify_on_error: Option<bool>,
}

/// `[notifications]` table.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NotificationsToml {
    pub ttl_ms: Option<u64>,

    /// Cards kept on screen before the oldest is evicted.
    pub max_visible: Option<usize>,
}

/// `[forms]` table.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FormsToml {
    pub redirect_delay_ms: Option<u64>,
    pub processing_label: Option<String>,
}

/// `[inactivity]` table.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct InactivityToml {
    pub timeout_secs: Option<u64>,
    pub activity_throttle_ms: Option<u64>,
    pub logout_path: Option<String>,
}

/// `[http]` table.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct HttpToml {
    /// Per-request timeout. `0` disables the timeout.
    pub timeout_secs: Option<u64>,
}
