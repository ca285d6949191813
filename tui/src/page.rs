use std::collections::BTreeMap;

use edu_core::protocol::EventMsg;
use edu_core::protocol::FormId;
use edu_core::protocol::InputId;
use edu_core::protocol::Notification;
use edu_core::protocol::ResultsPanel;
use edu_core::protocol::SubmitControlEvent;
use edu_core::protocol::Theme;
use tracing::debug;

/// Everything the terminal draws, rebuilt only from controller events.
#[derive(Debug, Default)]
pub struct Page {
    pub base_url: Option<String>,
    pub theme: Theme,
    pub cards: Vec<Notification>,
    pub container_created: bool,
    pub overlay: Option<String>,
    pub searching: Option<(InputId, String)>,
    pub panels: BTreeMap<InputId, ResultsPanel>,
    pub controls: BTreeMap<FormId, SubmitControlEvent>,
    /// Last URL the controller navigated to.
    pub location: Option<String>,
    pub inactivity_prompt: bool,
    pub signed_in: bool,
    pub shut_down: bool,
    /// Session cleared, logout redirect not seen yet.
    logging_out: bool,
    /// Logout redirect seen, not yet handled by the app.
    logged_out: bool,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, msg: EventMsg) {
        match msg {
            EventMsg::SessionConfigured(configured) => {
                self.base_url = Some(configured.base_url);
                self.theme = configured.theme;
            }
            EventMsg::SearchDispatched(dispatched) => {
                self.searching = Some((dispatched.input, dispatched.query));
            }
            EventMsg::SearchResults(rendered) => {
                if self
                    .searching
                    .as_ref()
                    .is_some_and(|(input, _)| *input == rendered.input)
                {
                    self.searching = None;
                }
                self.panels.insert(rendered.input, rendered.panel);
            }
            EventMsg::NotificationContainerCreated => self.container_created = true,
            EventMsg::NotificationShown(card) => self.cards.push(card),
            EventMsg::NotificationRemoved { id, reason } => {
                debug!("card {id} removed ({reason:?})");
                self.cards.retain(|card| card.id != id);
            }
            EventMsg::OverlayShown { message } => self.overlay = Some(message),
            EventMsg::OverlayHidden => self.overlay = None,
            EventMsg::SubmitControlChanged(control) => {
                self.controls.insert(control.form.clone(), control);
            }
            EventMsg::Navigate { url } => {
                if self.logging_out {
                    self.logging_out = false;
                    self.logged_out = true;
                }
                self.location = Some(url);
            }
            EventMsg::ThemeChanged { theme } => self.theme = theme,
            EventMsg::InactivityWarning => self.inactivity_prompt = true,
            EventMsg::SessionCleared => {
                self.signed_in = false;
                self.inactivity_prompt = false;
                self.logging_out = true;
            }
            EventMsg::ShutdownComplete => self.shut_down = true,
        }
    }

    pub fn panel(&self, input: &InputId) -> Option<&ResultsPanel> {
        self.panels.get(input)
    }

    /// Newest card, the one Esc dismisses.
    pub fn newest_card(&self) -> Option<&Notification> {
        self.cards.last()
    }

    /// True once after the redirect that ends a logout. The terminal has no
    /// page to leave, so the caller finishes the logout itself.
    pub fn take_finished_logout(&mut self) -> bool {
        std::mem::take(&mut self.logged_out)
    }

    /// Whether any submit control is currently disabled.
    pub fn busy_form(&self) -> Option<&SubmitControlEvent> {
        self.controls.values().find(|control| control.disabled)
    }
}
