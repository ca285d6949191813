//! Defines the protocol between a front-end and the UI controller.
//!
//! Uses a SQ (Submission Queue) / EQ (Event Queue) pattern: the front-end
//! reports what the user did as [`Op`]s and draws whatever the [`EventMsg`]s
//! tell it to.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use strum_macros::AsRefStr;
use strum_macros::Display;
use strum_macros::EnumString;

/// Identifies a search input on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputId(pub String);

impl InputId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies an AJAX form on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub String);

impl FormId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle returned when the loading overlay is shown; hiding retires it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayTicket(pub u64);

/// One row of a search endpoint's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

/// Contents of the dropdown anchored below a search input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "results", rename_all = "snake_case")]
pub enum ResultsPanel {
    Results(Vec<SearchResult>),
    /// Rendered as a single "No results found" row.
    NoResults,
}

impl ResultsPanel {
    pub fn from_results(results: Vec<SearchResult>) -> Self {
        if results.is_empty() {
            ResultsPanel::NoResults
        } else {
            ResultsPanel::Results(results)
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Danger,
    Warning,
    Info,
}

impl NotificationKind {
    /// Icon shown at the start of the card.
    pub fn icon(self) -> &'static str {
        match self {
            NotificationKind::Success => "check-circle",
            NotificationKind::Danger | NotificationKind::Warning => "exclamation-triangle",
            NotificationKind::Info => "info-circle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    #[serde(rename = "ttl_ms", serialize_with = "serialize_millis")]
    pub ttl: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    Expired,
    Dismissed,
    /// Pushed out by a newer card once the stack was full.
    Evicted,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon the theme toggle shows: the theme you would switch to.
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Light => "moon",
            Theme::Dark => "sun",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

/// A form as the page submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormRequest {
    /// `None` posts back to the page the controller is mounted on.
    pub action: Option<String>,
    pub method: HttpMethod,
    pub fields: Vec<(String, String)>,
    /// Current label of the submit control, restored when the request ends.
    pub submit_label: String,
}

/// JSON body returned by AJAX form endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Submission Queue Entry - requests from the front-end.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Unique id for this Submission to correlate with Events
    pub id: String,
    /// Payload
    pub op: Op,
}

/// Submission operation
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Op {
    /// Register a search input and the endpoint it queries. An empty endpoint
    /// keeps the input inert.
    AttachSearch { input: InputId, endpoint: String },

    /// Forget a search input and cancel its pending dispatch.
    DetachSearch { input: InputId },

    /// The text of a search input changed.
    SearchInputChanged { input: InputId, text: String },

    /// Show a notification card. `ttl` defaults to the configured lifetime.
    Notify {
        kind: NotificationKind,
        message: String,
        ttl: Option<Duration>,
    },

    /// The user closed a notification card.
    DismissNotification { id: u64 },

    ShowOverlay {
        ticket: OverlayTicket,
        message: Option<String>,
    },

    HideOverlay { ticket: OverlayTicket },

    /// Hide the overlay regardless of outstanding tickets.
    HideAllOverlays,

    /// An AJAX form was submitted.
    SubmitForm { form: FormId, request: FormRequest },

    ToggleTheme,

    /// Any user input (pointer, key, scroll, touch).
    UserActivity,

    /// Answer to [`EventMsg::InactivityWarning`].
    InactivityResponse { stay: bool },

    /// Record who is signed in. The token is sent as a bearer credential.
    SetSession {
        user: String,
        access_token: Option<String>,
    },

    Logout,

    /// Cancel every timer and stop the controller.
    Shutdown,
}

/// Event Queue Entry - events from the controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Submission `id` that this event is correlated with.
    pub id: String,
    /// Payload
    pub msg: EventMsg,
}

/// Response event from the controller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventMsg {
    /// First event after spawn.
    SessionConfigured(SessionConfiguredEvent),

    /// A search request left for the endpoint.
    SearchDispatched(SearchDispatchedEvent),

    /// Replace the dropdown below `input` with `panel`.
    SearchResults(SearchResultsEvent),

    /// The fixed-position notification container was created. Emitted once.
    NotificationContainerCreated,

    NotificationShown(Notification),

    NotificationRemoved { id: u64, reason: RemovalReason },

    /// The overlay appeared or its message changed.
    OverlayShown { message: String },

    OverlayHidden,

    SubmitControlChanged(SubmitControlEvent),

    /// Leave the page for `url`.
    Navigate { url: String },

    ThemeChanged { theme: Theme },

    /// The user has been idle for the configured timeout; ask whether to stay.
    InactivityWarning,

    SessionCleared,

    ShutdownComplete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionConfiguredEvent {
    pub base_url: String,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchDispatchedEvent {
    pub input: InputId,
    pub seq: u64,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultsEvent {
    pub input: InputId,
    pub seq: u64,
    pub query: String,
    pub panel: ResultsPanel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitControlEvent {
    pub form: FormId,
    pub label: String,
    pub disabled: bool,
}
