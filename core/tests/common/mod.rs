#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use edu_core::UiController;
use edu_core::config::Config;
use edu_core::error::Result;
use edu_core::error::UiErr;
use edu_core::protocol::Event;
use edu_core::protocol::EventMsg;
use edu_core::protocol::FormResponse;
use edu_core::protocol::SearchResult;
use edu_core::transport::FormSubmission;
use edu_core::transport::SearchRequest;
use edu_core::transport::Transport;
use edu_store::KeyValueStore;
use edu_store::MemoryStorage;
use futures::future::BoxFuture;
use tempfile::TempDir;

/// Defaults rooted in a temporary home.
pub fn load_default_config_for_test(edu_home: &TempDir) -> Config {
    Config::for_home(edu_home.path().to_path_buf()).unwrap()
}

/// Reads events until one matches `predicate` and returns it.
pub async fn wait_for_event<F>(controller: &UiController, mut predicate: F) -> EventMsg
where
    F: FnMut(&EventMsg) -> bool,
{
    loop {
        let ev = tokio::time::timeout(Duration::from_secs(120), controller.next_event())
            .await
            .expect("timeout waiting for event")
            .expect("controller stopped");
        if predicate(&ev.msg) {
            return ev.msg;
        }
    }
}

/// Every event emitted during the next `window`.
pub async fn drain_events(controller: &UiController, window: Duration) -> Vec<Event> {
    let deadline = tokio::time::Instant::now() + window;
    let mut events = Vec::new();
    while let Ok(next) = tokio::time::timeout_at(deadline, controller.next_event()).await {
        match next {
            Ok(ev) => events.push(ev),
            Err(_) => break,
        }
    }
    events
}

/// Canned answer for one search query.
#[derive(Clone)]
pub struct CannedSearch {
    pub delay: Duration,
    pub outcome: std::result::Result<Vec<SearchResult>, String>,
}

/// [`Transport`] that answers from canned responses after a delay and
/// records every request it sees.
#[derive(Default)]
pub struct FakeTransport {
    searches: Mutex<HashMap<String, CannedSearch>>,
    form: Mutex<Option<(Duration, std::result::Result<FormResponse, String>)>>,
    pub search_requests: Mutex<Vec<SearchRequest>>,
    pub form_submissions: Mutex<Vec<FormSubmission>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_search(&self, query: &str, delay: Duration, results: Vec<SearchResult>) {
        self.searches.lock().unwrap().insert(
            query.to_string(),
            CannedSearch {
                delay,
                outcome: Ok(results),
            },
        );
    }

    pub fn fail_search(&self, query: &str, message: &str) {
        self.searches.lock().unwrap().insert(
            query.to_string(),
            CannedSearch {
                delay: Duration::ZERO,
                outcome: Err(message.to_string()),
            },
        );
    }

    pub fn on_form(&self, delay: Duration, outcome: std::result::Result<FormResponse, String>) {
        *self.form.lock().unwrap() = Some((delay, outcome));
    }

    pub fn queries(&self) -> Vec<String> {
        self.search_requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.query.clone())
            .collect()
    }

    pub fn form_count(&self) -> usize {
        self.form_submissions.lock().unwrap().len()
    }
}

fn transport_error(message: String) -> UiErr {
    UiErr::Io(std::io::Error::other(message))
}

impl Transport for FakeTransport {
    fn search(&self, request: SearchRequest) -> BoxFuture<'static, Result<Vec<SearchResult>>> {
        let canned = self
            .searches
            .lock()
            .unwrap()
            .get(&request.query)
            .cloned()
            .unwrap_or(CannedSearch {
                delay: Duration::ZERO,
                outcome: Ok(Vec::new()),
            });
        self.search_requests.lock().unwrap().push(request);
        Box::pin(async move {
            tokio::time::sleep(canned.delay).await;
            canned.outcome.map_err(transport_error)
        })
    }

    fn submit_form(&self, submission: FormSubmission) -> BoxFuture<'static, Result<FormResponse>> {
        let (delay, outcome) = self
            .form
            .lock()
            .unwrap()
            .clone()
            .unwrap_or((Duration::ZERO, Ok(FormResponse::default())));
        self.form_submissions.lock().unwrap().push(submission);
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            outcome.map_err(transport_error)
        })
    }
}

pub fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStorage::new())
}

/// Spawns a controller and consumes its `SessionConfigured` event.
pub async fn spawn_controller(
    config: Config,
    transport: Arc<FakeTransport>,
    store: Arc<dyn KeyValueStore>,
) -> UiController {
    let controller = UiController::spawn(config, transport, store);
    wait_for_event(&controller, |ev| matches!(ev, EventMsg::SessionConfigured(_))).await;
    controller
}

/// Store whose writes block until the test releases them, standing in for a
/// storage file locked by another process.
pub struct GatedStore {
    inner: MemoryStorage,
    release: Mutex<std::sync::mpsc::Receiver<()>>,
}

impl GatedStore {
    pub fn new() -> (Arc<Self>, std::sync::mpsc::Sender<()>) {
        let (tx, rx) = std::sync::mpsc::channel();
        let store = Arc::new(Self {
            inner: MemoryStorage::new(),
            release: Mutex::new(rx),
        });
        (store, tx)
    }
}

impl KeyValueStore for GatedStore {
    fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        let _ = self
            .release
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(10));
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        self.inner.remove(key)
    }
}
