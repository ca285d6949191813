use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_channel::Receiver;
use async_channel::Sender;
use edu_store::KeyValueStore;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::Config;
use crate::error::Result;
use crate::error::UiErr;
use crate::forms::FormOutcome;
use crate::forms::InFlightForms;
use crate::inactivity::InactivityWatch;
use crate::notifications::NotificationSurface;
use crate::overlay::LoadingOverlay;
use crate::overlay::OverlayChange;
use crate::protocol::Event;
use crate::protocol::EventMsg;
use crate::protocol::FormId;
use crate::protocol::FormRequest;
use crate::protocol::FormResponse;
use crate::protocol::InputId;
use crate::protocol::NotificationKind;
use crate::protocol::Op;
use crate::protocol::OverlayTicket;
use crate::protocol::RemovalReason;
use crate::protocol::SearchDispatchedEvent;
use crate::protocol::SearchResult;
use crate::protocol::SearchResultsEvent;
use crate::protocol::SessionConfiguredEvent;
use crate::protocol::SubmitControlEvent;
use crate::protocol::Submission;
use crate::protocol::Theme;
use crate::search::SearchCompletion;
use crate::search::SearchDispatch;
use crate::search::SearchDispatcher;
use crate::theme::load_theme;
use crate::theme::save_theme;
use crate::transport::FormSubmission;
use crate::transport::SearchRequest;
use crate::transport::Transport;
use crate::transport::form_url;
use crate::transport::search_url;

/// Submission id of events that no submission caused.
pub const INITIAL_SUBMIT_ID: &str = "";

pub const SEARCH_FAILED_MESSAGE: &str = "Search failed";
pub const LOGGING_OUT_MESSAGE: &str = "Logging out...";

/// Ticket the controller holds on the overlay while logging out. Front-end
/// tickets are allocated from zero upwards and never reach it.
const LOGOUT_TICKET: OverlayTicket = OverlayTicket(u64::MAX);

/// Handle to the UI controller task.
///
/// It operates as a queue pair: the front-end submits [`Op`]s describing what
/// the user did and drains [`Event`]s describing what to draw. All UI state
/// lives in the task; dropping the handle stops it.
pub struct UiController {
    next_id: AtomicU64,
    next_ticket: AtomicU64,
    tx_sub: Sender<Submission>,
    rx_event: Receiver<Event>,
}

impl UiController {
    /// Start the controller on the current tokio runtime. The first event is
    /// always [`EventMsg::SessionConfigured`].
    pub fn spawn(
        config: Config,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let (tx_sub, rx_sub) = async_channel::bounded(64);
        let (tx_event, rx_event) = async_channel::unbounded();
        let (tx_internal, rx_internal) = async_channel::unbounded();

        let state = State::new(Arc::new(config), transport, store, tx_event, tx_internal);
        tokio::spawn(submission_loop(state, rx_sub, rx_internal));

        Self {
            next_id: AtomicU64::new(0),
            next_ticket: AtomicU64::new(0),
            tx_sub,
            rx_event,
        }
    }

    /// Submit the `op` wrapped in a `Submission` with a unique ID.
    pub async fn submit(&self, op: Op) -> Result<String> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let sub = Submission { id: id.clone(), op };
        self.submit_with_id(sub).await?;
        Ok(id)
    }

    /// Use sparingly: prefer `submit()` so the controller is responsible for
    /// generating unique IDs for each submission.
    pub async fn submit_with_id(&self, sub: Submission) -> Result<()> {
        self.tx_sub
            .send(sub)
            .await
            .map_err(|_| UiErr::ControllerStopped)?;
        Ok(())
    }

    pub async fn next_event(&self) -> Result<Event> {
        let event = self
            .rx_event
            .recv()
            .await
            .map_err(|_| UiErr::ControllerStopped)?;
        Ok(event)
    }

    /// Show the loading overlay and return the ticket that hides it again.
    pub async fn show_overlay(&self, message: Option<String>) -> Result<OverlayTicket> {
        let ticket = OverlayTicket(self.next_ticket.fetch_add(1, Ordering::SeqCst));
        self.submit(Op::ShowOverlay { ticket, message }).await?;
        Ok(ticket)
    }

    pub async fn hide_overlay(&self, ticket: OverlayTicket) -> Result<String> {
        self.submit(Op::HideOverlay { ticket }).await
    }

    pub async fn notify(&self, kind: NotificationKind, message: impl Into<String>) -> Result<String> {
        self.submit(Op::Notify {
            kind,
            message: message.into(),
            ttl: None,
        })
        .await
    }
}

/// Completions reported back to the loop by timers and requests.
enum Internal {
    SearchWindowClosed {
        sub_id: String,
        input: InputId,
        generation: u64,
    },
    SearchFinished {
        sub_id: String,
        input: InputId,
        seq: u64,
        query: String,
        outcome: Result<Vec<SearchResult>>,
    },
    NotificationExpired {
        sub_id: String,
        id: u64,
    },
    FormFinished {
        sub_id: String,
        form: FormId,
        result: Result<FormResponse>,
    },
    RedirectDue {
        sub_id: String,
        url: String,
    },
    Idle,
}

/// Replaces the page's global `currentUser`/`accessToken`.
#[derive(Debug, Default)]
struct Session {
    current_user: Option<String>,
    access_token: Option<String>,
}

/// Everything the controller owns. Only the loop task touches it.
struct State {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    store: Arc<dyn KeyValueStore>,
    tx_event: Sender<Event>,
    tx_internal: Sender<Internal>,

    search: SearchDispatcher,
    notifications: NotificationSurface,
    overlay: LoadingOverlay,
    forms: InFlightForms,
    inactivity: InactivityWatch,
    theme: Theme,
    /// Latest theme write; each one waits for the previous.
    theme_save: Option<JoinHandle<()>>,
    session: Session,

    /// Notification lifetimes, redirect delays and in-flight requests.
    tasks: Vec<JoinHandle<()>>,
}

impl State {
    fn new(
        config: Arc<Config>,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
        tx_event: Sender<Event>,
        tx_internal: Sender<Internal>,
    ) -> Self {
        let search = SearchDispatcher::new(config.search.debounce, config.search.min_query_chars);
        let notifications = NotificationSurface::new(config.notifications.max_visible);
        let inactivity = InactivityWatch::new(
            config.inactivity.timeout,
            config.inactivity.activity_throttle,
        );
        Self {
            config,
            transport,
            store,
            tx_event,
            tx_internal,
            search,
            notifications,
            overlay: LoadingOverlay::new(),
            forms: InFlightForms::new(),
            inactivity,
            theme: Theme::default(),
            theme_save: None,
            session: Session::default(),
            tasks: Vec::new(),
        }
    }

    async fn send_event(&self, sub_id: &str, msg: EventMsg) {
        let event = Event {
            id: sub_id.to_string(),
            msg,
        };
        if let Err(e) = self.tx_event.send(event).await {
            debug!("dropping event, front-end gone: {e}");
        }
    }

    fn track(&mut self, handle: JoinHandle<()>) {
        self.tasks.retain(|h| !h.is_finished());
        self.tasks.push(handle);
    }

    /// Spawn `delay` then deliver `msg` to the loop.
    fn schedule(&mut self, delay: Duration, msg: Internal) {
        let tx = self.tx_internal.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(msg).await;
        });
        self.track(handle);
    }

    fn idle_callback(&self) -> impl FnOnce() + Send + 'static {
        let tx = self.tx_internal.clone();
        move || {
            let _ = tx.try_send(Internal::Idle);
        }
    }

    /// Returns false when the loop should stop.
    async fn handle_submission(&mut self, sub: Submission) -> bool {
        let Submission { id: sub_id, op } = sub;
        match op {
            Op::AttachSearch { input, endpoint } => {
                debug!("attaching search input {input} to {endpoint:?}");
                self.search.attach(input, endpoint);
            }
            Op::DetachSearch { input } => {
                if !self.search.detach(&input) {
                    debug!("detach of unknown search input {input}");
                }
            }
            Op::SearchInputChanged { input, text } => {
                let tx = self.tx_internal.clone();
                let closed_input = input.clone();
                let closed_sub_id = sub_id.clone();
                let known = self.search.input_changed(&input, text, move |generation| {
                    let _ = tx.try_send(Internal::SearchWindowClosed {
                        sub_id: closed_sub_id,
                        input: closed_input,
                        generation,
                    });
                });
                if !known {
                    warn!("search input {input} is not attached; ignoring");
                }
            }
            Op::Notify { kind, message, ttl } => {
                self.notify(&sub_id, kind, message, ttl).await;
            }
            Op::DismissNotification { id } => {
                self.remove_notification(&sub_id, id, RemovalReason::Dismissed)
                    .await;
            }
            Op::ShowOverlay { ticket, message } => {
                let change = self.overlay.show(ticket, message);
                self.overlay_changed(&sub_id, change).await;
            }
            Op::HideOverlay { ticket } => {
                let change = self.overlay.hide(ticket);
                self.overlay_changed(&sub_id, change).await;
            }
            Op::HideAllOverlays => {
                let change = self.overlay.hide_all();
                self.overlay_changed(&sub_id, change).await;
            }
            Op::SubmitForm { form, request } => {
                self.submit_form(&sub_id, form, request).await;
            }
            Op::ToggleTheme => {
                self.toggle_theme(&sub_id);
            }
            Op::UserActivity => {
                let on_idle = self.idle_callback();
                self.inactivity.activity(on_idle);
            }
            Op::InactivityResponse { stay } => {
                if stay {
                    let on_idle = self.idle_callback();
                    self.inactivity.restart(on_idle);
                } else {
                    self.logout(&sub_id).await;
                }
            }
            Op::SetSession { user, access_token } => {
                info!("session started for {user}");
                self.session = Session {
                    current_user: Some(user),
                    access_token,
                };
            }
            Op::Logout => {
                self.logout(&sub_id).await;
            }
            Op::Shutdown => {
                self.flush_theme().await;
                self.teardown();
                self.send_event(&sub_id, EventMsg::ShutdownComplete).await;
                return false;
            }
        }
        true
    }

    async fn handle_internal(&mut self, msg: Internal) {
        match msg {
            Internal::SearchWindowClosed {
                sub_id,
                input,
                generation,
            } => {
                self.dispatch_search(&sub_id, &input, generation).await;
            }
            Internal::SearchFinished {
                sub_id,
                input,
                seq,
                query,
                outcome,
            } => {
                self.finish_search(&sub_id, input, seq, query, outcome)
                    .await;
            }
            Internal::NotificationExpired { sub_id, id } => {
                self.remove_notification(&sub_id, id, RemovalReason::Expired)
                    .await;
            }
            Internal::FormFinished {
                sub_id,
                form,
                result,
            } => {
                self.finish_form(&sub_id, &form, result).await;
            }
            Internal::RedirectDue { sub_id, url } => {
                self.send_event(&sub_id, EventMsg::Navigate { url }).await;
            }
            Internal::Idle => {
                self.send_event(INITIAL_SUBMIT_ID, EventMsg::InactivityWarning)
                    .await;
            }
        }
    }

    async fn dispatch_search(&mut self, sub_id: &str, input: &InputId, generation: u64) {
        let Some(dispatch) = self.search.take_dispatch(input, generation) else {
            return;
        };
        let url = match search_url(&self.config.base_url, &dispatch.endpoint, &dispatch.query) {
            Ok(url) => url,
            Err(e) => {
                warn!("bad search endpoint {:?} for {input}: {e}", dispatch.endpoint);
                let SearchDispatch {
                    input, seq, query, ..
                } = dispatch;
                self.finish_search(sub_id, input, seq, query, Err(e)).await;
                return;
            }
        };
        self.send_event(
            sub_id,
            EventMsg::SearchDispatched(SearchDispatchedEvent {
                input: dispatch.input.clone(),
                seq: dispatch.seq,
                query: dispatch.query.clone(),
            }),
        )
        .await;

        let request = SearchRequest {
            url,
            query: dispatch.query.clone(),
            access_token: self.session.access_token.clone(),
        };
        let fut = self.transport.search(request);
        let tx = self.tx_internal.clone();
        let sub_id = sub_id.to_string();
        let handle = tokio::spawn(async move {
            let outcome = fut.await;
            let _ = tx
                .send(Internal::SearchFinished {
                    sub_id,
                    input: dispatch.input,
                    seq: dispatch.seq,
                    query: dispatch.query,
                    outcome,
                })
                .await;
        });
        self.track(handle);
    }

    async fn finish_search(
        &mut self,
        sub_id: &str,
        input: InputId,
        seq: u64,
        query: String,
        outcome: Result<Vec<SearchResult>>,
    ) {
        let outcome = outcome.map_err(|e| {
            warn!("search {seq} for {input} failed: {e}");
            e.to_string()
        });
        match self.search.complete(&input, seq, outcome) {
            SearchCompletion::Render(panel) => {
                let msg = EventMsg::SearchResults(SearchResultsEvent {
                    input,
                    seq,
                    query,
                    panel,
                });
                self.send_event(sub_id, msg).await;
            }
            SearchCompletion::Stale { latest } => {
                debug!("discarding search {seq} for {input}; {latest} is newer");
            }
            SearchCompletion::Failed => {
                if self.config.search.notify_on_error {
                    self.notify(
                        sub_id,
                        NotificationKind::Danger,
                        SEARCH_FAILED_MESSAGE.to_string(),
                        None,
                    )
                    .await;
                }
            }
            SearchCompletion::Detached => {
                debug!("search {seq} finished after {input} was detached");
            }
        }
    }

    async fn notify(
        &mut self,
        sub_id: &str,
        kind: NotificationKind,
        message: String,
        ttl: Option<Duration>,
    ) {
        let ttl = ttl.unwrap_or(self.config.notifications.ttl);
        let pushed = self.notifications.push(kind, message, ttl);
        if pushed.created_container {
            self.send_event(sub_id, EventMsg::NotificationContainerCreated)
                .await;
        }
        for evicted in pushed.evicted {
            self.send_event(
                sub_id,
                EventMsg::NotificationRemoved {
                    id: evicted.id,
                    reason: RemovalReason::Evicted,
                },
            )
            .await;
        }
        let id = pushed.notification.id;
        self.send_event(sub_id, EventMsg::NotificationShown(pushed.notification))
            .await;
        self.schedule(
            ttl,
            Internal::NotificationExpired {
                sub_id: sub_id.to_string(),
                id,
            },
        );
    }

    async fn remove_notification(&mut self, sub_id: &str, id: u64, reason: RemovalReason) {
        match self.notifications.remove(id) {
            Some(_) => {
                self.send_event(sub_id, EventMsg::NotificationRemoved { id, reason })
                    .await;
            }
            None => debug!("notification {id} already removed"),
        }
    }

    async fn overlay_changed(&self, sub_id: &str, change: OverlayChange) {
        match change {
            OverlayChange::Shown(message) => {
                self.send_event(sub_id, EventMsg::OverlayShown { message })
                    .await;
            }
            OverlayChange::Hidden => self.send_event(sub_id, EventMsg::OverlayHidden).await,
            OverlayChange::Unchanged => {}
        }
    }

    async fn submit_form(&mut self, sub_id: &str, form: FormId, request: FormRequest) {
        let Some(control) = self.forms.begin(
            &form,
            &request.submit_label,
            &self.config.forms.processing_label,
        ) else {
            debug!("form {form} is already submitting; ignoring");
            return;
        };
        self.send_event(
            sub_id,
            EventMsg::SubmitControlChanged(SubmitControlEvent {
                form: form.clone(),
                label: control.label,
                disabled: control.disabled,
            }),
        )
        .await;

        let url = match form_url(&self.config.base_url, request.action.as_deref()) {
            Ok(url) => url,
            Err(e) => {
                self.finish_form(sub_id, &form, Err(e)).await;
                return;
            }
        };
        let submission = FormSubmission {
            url,
            method: request.method,
            fields: request.fields,
            access_token: self.session.access_token.clone(),
        };
        let fut = self.transport.submit_form(submission);
        let tx = self.tx_internal.clone();
        let sub_id = sub_id.to_string();
        let handle = tokio::spawn(async move {
            let result = fut.await;
            let _ = tx
                .send(Internal::FormFinished {
                    sub_id,
                    form,
                    result,
                })
                .await;
        });
        self.track(handle);
    }

    async fn finish_form(&mut self, sub_id: &str, form: &FormId, result: Result<FormResponse>) {
        let outcome = match result {
            Ok(response) => FormOutcome::from_response(response),
            Err(e) => {
                error!("form {form} submission failed: {e}");
                FormOutcome::TransportFailed
            }
        };

        let (kind, message) = outcome.notification();
        self.notify(sub_id, kind, message, None).await;
        if let Some(url) = outcome.redirect() {
            self.schedule(
                self.config.forms.redirect_delay,
                Internal::RedirectDue {
                    sub_id: sub_id.to_string(),
                    url: url.to_string(),
                },
            );
        }

        if let Some(control) = self.forms.finish(form) {
            self.send_event(
                sub_id,
                EventMsg::SubmitControlChanged(SubmitControlEvent {
                    form: form.clone(),
                    label: control.label,
                    disabled: control.disabled,
                }),
            )
            .await;
        }
    }

    /// The store does file IO and locking, so reads and writes run on the
    /// blocking pool.
    async fn restore_theme(&mut self) {
        let store = Arc::clone(&self.store);
        self.theme = match tokio::task::spawn_blocking(move || load_theme(store.as_ref())).await {
            Ok(theme) => theme,
            Err(e) => {
                warn!("theme lookup task failed: {e}");
                Theme::default()
            }
        };
    }

    /// Flip the theme now; `ThemeChanged` follows once the new value is
    /// written.
    fn toggle_theme(&mut self, sub_id: &str) {
        self.theme = self.theme.toggled();
        let theme = self.theme;
        let store = Arc::clone(&self.store);
        let tx_event = self.tx_event.clone();
        let sub_id = sub_id.to_string();
        let previous = self.theme_save.take();
        self.theme_save = Some(tokio::spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            match tokio::task::spawn_blocking(move || save_theme(store.as_ref(), theme)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("failed to persist theme: {e}"),
                Err(e) => warn!("theme save task failed: {e}"),
            }
            let event = Event {
                id: sub_id,
                msg: EventMsg::ThemeChanged { theme },
            };
            if let Err(e) = tx_event.send(event).await {
                debug!("dropping event, front-end gone: {e}");
            }
        }));
    }

    async fn flush_theme(&mut self) {
        let Some(save) = self.theme_save.take() else {
            return;
        };
        if let Err(e) = save.await {
            warn!("theme save task failed: {e}");
        }
    }

    async fn logout(&mut self, sub_id: &str) {
        if let Some(user) = self.session.current_user.take() {
            info!("logging out {user}");
        }
        self.session = Session::default();
        self.inactivity.stop();
        self.send_event(sub_id, EventMsg::SessionCleared).await;

        let change = self
            .overlay
            .show(LOGOUT_TICKET, Some(LOGGING_OUT_MESSAGE.to_string()));
        self.overlay_changed(sub_id, change).await;
        let url = self.config.inactivity.logout_path.clone();
        self.send_event(sub_id, EventMsg::Navigate { url }).await;
    }

    fn teardown(&mut self) {
        self.search.cancel_all();
        self.inactivity.stop();
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
    }
}

async fn submission_loop(
    mut state: State,
    rx_sub: Receiver<Submission>,
    rx_internal: Receiver<Internal>,
) {
    state.restore_theme().await;
    let configured = SessionConfiguredEvent {
        base_url: state.config.base_url.to_string(),
        theme: state.theme,
    };
    state
        .send_event(INITIAL_SUBMIT_ID, EventMsg::SessionConfigured(configured))
        .await;
    let on_idle = state.idle_callback();
    state.inactivity.restart(on_idle);

    loop {
        tokio::select! {
            sub = rx_sub.recv() => match sub {
                Ok(sub) => {
                    if !state.handle_submission(sub).await {
                        break;
                    }
                }
                Err(_) => {
                    debug!("front-end dropped the controller; stopping");
                    state.flush_theme().await;
                    state.teardown();
                    break;
                }
            },
            Ok(msg) = rx_internal.recv() => state.handle_internal(msg).await,
        }
    }
    debug!("controller loop exited");
}
