use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::protocol::InputId;
use crate::protocol::ResultsPanel;
use crate::protocol::SearchResult;
use crate::timing::Debounce;

/// A request that should go out now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDispatch {
    pub input: InputId,
    pub seq: u64,
    pub endpoint: String,
    pub query: String,
}

/// What to do with a finished request.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchCompletion {
    Render(ResultsPanel),
    /// A newer request for the same input has been dispatched since.
    Stale { latest: u64 },
    /// Transport failure; the previous panel stays on screen.
    Failed,
    /// The input was detached while the request was in flight.
    Detached,
}

struct SearchInput {
    endpoint: String,
    text: String,
    generation: u64,
    debounce: Debounce,
    latest_seq: Option<u64>,
    /// First sequence number this attachment may render; earlier requests
    /// belong to a previous attachment of the same id.
    min_seq: u64,
    panel: Option<ResultsPanel>,
}

/// Debounce state and request sequencing for every attached search input.
///
/// Each input has its own quiet window. When a window elapses the owner calls
/// [`SearchDispatcher::take_dispatch`] with the generation it was started
/// for; stale generations and short queries yield nothing. Sequence numbers
/// increase across all inputs, and only the latest one dispatched for an
/// input may render.
pub struct SearchDispatcher {
    inputs: HashMap<InputId, SearchInput>,
    debounce: Duration,
    min_query_chars: usize,
    next_seq: u64,
}

impl SearchDispatcher {
    pub fn new(debounce: Duration, min_query_chars: usize) -> Self {
        Self {
            inputs: HashMap::new(),
            debounce,
            min_query_chars,
            next_seq: 1,
        }
    }

    /// Re-attaching keeps the current text and panel but switches endpoint.
    pub fn attach(&mut self, input: InputId, endpoint: String) {
        match self.inputs.get_mut(&input) {
            Some(state) => state.endpoint = endpoint,
            None => {
                let state = SearchInput {
                    endpoint,
                    text: String::new(),
                    generation: 0,
                    debounce: Debounce::new(self.debounce),
                    latest_seq: None,
                    min_seq: self.next_seq,
                    panel: None,
                };
                self.inputs.insert(input, state);
            }
        }
    }

    pub fn detach(&mut self, input: &InputId) -> bool {
        self.inputs.remove(input).is_some()
    }

    /// Record new text and restart the input's quiet window. `elapsed` is
    /// called with the window's generation when it closes. Returns false for
    /// unknown inputs.
    pub fn input_changed<F>(&mut self, input: &InputId, text: String, elapsed: F) -> bool
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let Some(state) = self.inputs.get_mut(input) else {
            return false;
        };
        state.text = text;
        state.generation += 1;
        let generation = state.generation;
        state.debounce.call(move || elapsed(generation));
        true
    }

    /// Called when a quiet window closes.
    pub fn take_dispatch(&mut self, input: &InputId, generation: u64) -> Option<SearchDispatch> {
        let state = self.inputs.get_mut(input)?;
        if state.generation != generation {
            debug!("search window for {input} superseded ({generation} < {})", state.generation);
            return None;
        }
        if !is_dispatchable(&state.text, self.min_query_chars) {
            debug!("search query for {input} too short, not dispatching");
            return None;
        }
        if state.endpoint.is_empty() {
            debug!("search input {input} has no endpoint");
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        state.latest_seq = Some(seq);
        Some(SearchDispatch {
            input: input.clone(),
            seq,
            endpoint: state.endpoint.clone(),
            query: state.text.clone(),
        })
    }

    pub fn complete(
        &mut self,
        input: &InputId,
        seq: u64,
        outcome: Result<Vec<SearchResult>, String>,
    ) -> SearchCompletion {
        let Some(state) = self.inputs.get_mut(input) else {
            return SearchCompletion::Detached;
        };
        if seq < state.min_seq {
            return SearchCompletion::Detached;
        }
        match state.latest_seq {
            Some(latest) if latest != seq => return SearchCompletion::Stale { latest },
            _ => {}
        }
        match outcome {
            Ok(results) => {
                let panel = ResultsPanel::from_results(results);
                state.panel = Some(panel.clone());
                SearchCompletion::Render(panel)
            }
            Err(_) => SearchCompletion::Failed,
        }
    }

    /// Panel currently shown below `input`, if any.
    pub fn panel(&self, input: &InputId) -> Option<&ResultsPanel> {
        self.inputs.get(input).and_then(|s| s.panel.as_ref())
    }

    pub fn cancel_all(&mut self) {
        for state in self.inputs.values_mut() {
            state.debounce.cancel();
        }
    }
}

/// Queries shorter than `min_chars` characters are never sent.
pub fn is_dispatchable(text: &str, min_chars: usize) -> bool {
    text.chars().count() >= min_chars
}
