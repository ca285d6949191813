//! One-shot commands that drive a [`UiController`] without a terminal UI.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::bail;
use edu_core::HttpTransport;
use edu_core::UiController;
use edu_core::config::Config;
use edu_core::protocol::EventMsg;
use edu_core::protocol::FormId;
use edu_core::protocol::FormRequest;
use edu_core::protocol::InputId;
use edu_core::protocol::NotificationKind;
use edu_core::protocol::Op;
use edu_core::protocol::ResultsPanel;
use edu_core::protocol::Theme;
use edu_core::search::is_dispatchable;
use edu_core::theme::load_theme;
use edu_store::FileStorage;
use tracing::debug;

const CLI_INPUT: &str = "cli";
const CLI_FORM: &str = "cli";

/// How long to wait for a redirect once the form control is restored.
const REDIRECT_GRACE: Duration = Duration::from_millis(250);

/// A controller session that ends after one command.
pub struct OneShot {
    controller: UiController,
    echo_json: bool,
}

impl OneShot {
    pub fn start(config: Config, echo_json: bool) -> anyhow::Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        let store = Arc::new(FileStorage::new(&config.edu_home));
        Ok(Self {
            controller: UiController::spawn(config, transport, store),
            echo_json,
        })
    }

    /// Next event; echoed to stdout as a JSON line when requested.
    async fn next(&self) -> anyhow::Result<EventMsg> {
        let event = self.controller.next_event().await?;
        if self.echo_json {
            println!("{}", serde_json::to_string(&event)?);
        }
        Ok(event.msg)
    }

    async fn wait_for<T>(&self, mut pick: impl FnMut(EventMsg) -> Option<T>) -> anyhow::Result<T> {
        loop {
            if let Some(found) = pick(self.next().await?) {
                return Ok(found);
            }
        }
    }

    async fn shutdown(self) -> anyhow::Result<()> {
        self.controller.submit(Op::Shutdown).await?;
        self.wait_for(|msg| matches!(msg, EventMsg::ShutdownComplete).then_some(()))
            .await
    }
}

/// Query `endpoint` once and return the panel the page would render.
pub async fn run_search(
    mut config: Config,
    endpoint: &str,
    query: &str,
    echo_json: bool,
) -> anyhow::Result<ResultsPanel> {
    let min_chars = config.search.min_query_chars;
    if !is_dispatchable(query, min_chars) {
        bail!("search query must be at least {min_chars} characters");
    }
    if endpoint.trim().is_empty() {
        bail!("search endpoint must not be empty");
    }
    // Nothing is typed here, so there is no quiet window to wait out.
    config.search.debounce = Duration::ZERO;
    config.search.notify_on_error = true;

    let session = OneShot::start(config, echo_json)?;
    let input = InputId::new(CLI_INPUT);
    session
        .controller
        .submit(Op::AttachSearch {
            input: input.clone(),
            endpoint: endpoint.to_string(),
        })
        .await?;
    session
        .controller
        .submit(Op::SearchInputChanged {
            input,
            text: query.to_string(),
        })
        .await?;

    let outcome = session
        .wait_for(|msg| match msg {
            EventMsg::SearchResults(rendered) => Some(Ok(rendered.panel)),
            EventMsg::NotificationShown(card) if card.kind == NotificationKind::Danger => {
                Some(Err(card.message))
            }
            _ => None,
        })
        .await?;
    session.shutdown().await?;
    outcome.map_err(|message| anyhow!(message))
}

/// What a form submission ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub kind: NotificationKind,
    pub message: String,
    pub redirect: Option<String>,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }
}

pub async fn run_submit(
    mut config: Config,
    request: FormRequest,
    echo_json: bool,
) -> anyhow::Result<SubmitOutcome> {
    config.forms.redirect_delay = Duration::ZERO;
    let session = OneShot::start(config, echo_json)?;
    session
        .controller
        .submit(Op::SubmitForm {
            form: FormId::new(CLI_FORM),
            request,
        })
        .await?;

    let (kind, message) = session
        .wait_for(|msg| match msg {
            EventMsg::NotificationShown(card) => Some((card.kind, card.message)),
            _ => None,
        })
        .await?;
    session
        .wait_for(|msg| match msg {
            EventMsg::SubmitControlChanged(control) if !control.disabled => Some(()),
            _ => None,
        })
        .await?;

    let mut redirect = None;
    if kind == NotificationKind::Success {
        let navigate = session.wait_for(|msg| match msg {
            EventMsg::Navigate { url } => Some(url),
            _ => None,
        });
        match tokio::time::timeout(REDIRECT_GRACE, navigate).await {
            Ok(url) => redirect = Some(url?),
            Err(_) => debug!("no redirect"),
        }
    }
    session.shutdown().await?;

    Ok(SubmitOutcome {
        kind,
        message,
        redirect,
    })
}

/// Show the stored theme, or toggle it and return the new one.
pub async fn run_theme(config: Config, toggle: bool, echo_json: bool) -> anyhow::Result<Theme> {
    if !toggle {
        return Ok(load_theme(&FileStorage::new(&config.edu_home)));
    }
    let session = OneShot::start(config, echo_json)?;
    session.controller.submit(Op::ToggleTheme).await?;
    let theme = session
        .wait_for(|msg| match msg {
            EventMsg::ThemeChanged { theme } => Some(theme),
            _ => None,
        })
        .await?;
    session.shutdown().await?;
    Ok(theme)
}
