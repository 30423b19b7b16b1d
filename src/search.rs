use crate::tmdb::{Movie, TmdbApi};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// State published to the presentation layer after every transition.
///
/// `query` holds the last non-empty search text so an observer can tell
/// "searched, nothing matched" apart from "never searched".
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub movies: Vec<Movie>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Collapses a stream of text-change events into at most one in-flight
/// search. Each event supersedes the previous lineage: its debounce timer
/// is aborted and its generation token is invalidated, so a slow fetch
/// that resolves late can never overwrite fresher results.
pub struct SearchController {
    api: Arc<dyn TmdbApi>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    state: watch::Sender<SearchState>,
    task: Option<JoinHandle<()>>,
}

impl SearchController {
    pub fn new(api: Arc<dyn TmdbApi>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            api,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            state,
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Text-change event, fire-and-forget. Must be called from the single
    /// context that owns this controller; ordering of published state
    /// follows call order.
    pub fn set_query(&mut self, text: &str) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        // Bump even for an empty query so an in-flight fetch that dodged
        // the abort still fails its generation check.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let query = text.trim().to_string();
        if query.is_empty() {
            self.state.send_replace(SearchState::default());
            return;
        }
        self.state.send_modify(|s| s.query = query.clone());

        let api = Arc::clone(&self.api);
        let current = Arc::clone(&self.generation);
        let state = self.state.clone();
        let debounce = self.debounce;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // The generation re-check inside each closure matters: abort
            // cannot stop a poll that is already running, and only the
            // watch lock serializes this task against the send_replace in
            // set_query. A bare load before send_modify leaves a window
            // where a superseded lineage publishes onto the cleared state.
            let still_current = state.send_if_modified(|s| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                s.loading = true;
                s.error = None;
                true
            });
            if !still_current {
                return;
            }

            let outcome = api.search_movies(&query).await;
            state.send_if_modified(move |s| {
                if current.load(Ordering::SeqCst) != generation {
                    debug!(%query, "discarding superseded search result");
                    return false;
                }
                s.loading = false;
                match outcome {
                    Ok(movies) => s.movies = movies,
                    // Deliberate abandonment, not a failure to display.
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => {
                        s.movies.clear();
                        s.error = Some(e.to_string());
                    }
                }
                true
            });
        }));
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
