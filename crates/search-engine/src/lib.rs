//! Debounced free-text search over the opportunity catalog.
//!
//! Queries are evaluated after a quiet period; rapid typing only ever
//! evaluates the latest text. Committed queries feed a bounded recent-query
//! history.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scholar_core::Opportunity;
use tokio::sync::watch;

/// Quiet period before a query is evaluated.
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Maximum number of remembered queries.
const RECENT_CAP: usize = 5;

/// Seed suggestions shown before the user has any history.
const POPULAR_QUERIES: &[&str] = &[
    "computer science",
    "nursing",
    "engineering",
    "first generation",
    "community service",
];

/// Debounced search over the catalog snapshot.
///
/// `submit_query` is cheap and non-blocking; evaluation happens on a spawned
/// task after the quiet period, and only if no newer query arrived meanwhile.
pub struct SearchEngine {
    inner: Arc<Inner>,
    debounce: Duration,
}

struct Inner {
    catalog_rx: watch::Receiver<Arc<Vec<Opportunity>>>,
    state: Mutex<SearchState>,
    results_tx: watch::Sender<Arc<Vec<Opportunity>>>,
    searching_tx: watch::Sender<bool>,
    recent_tx: watch::Sender<Vec<String>>,
}

#[derive(Default)]
struct SearchState {
    /// Bumped on every submitted query; a pending evaluation only commits
    /// if its generation is still current.
    generation: u64,
    /// Text of the last evaluation that committed results.
    last_committed: Option<String>,
    /// Newest-first history, capped at `RECENT_CAP`, no duplicates.
    recent: VecDeque<String>,
}

impl SearchEngine {
    pub fn new(catalog_rx: watch::Receiver<Arc<Vec<Opportunity>>>) -> Self {
        let (results_tx, _) = watch::channel(Arc::new(Vec::new()));
        let (searching_tx, _) = watch::channel(false);
        let (recent_tx, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                catalog_rx,
                state: Mutex::new(SearchState::default()),
                results_tx,
                searching_tx,
                recent_tx,
            }),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Override the quiet period (tests use a shorter one).
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Submit query text. Leading/trailing whitespace is ignored. An empty
    /// query cancels any pending evaluation and clears the results right
    /// away; history is untouched. Re-submitting the text that produced the
    /// current results schedules nothing, but still invalidates any pending
    /// evaluation for an older query.
    pub fn submit_query(&self, text: &str) {
        let query = text.trim().to_string();

        let (generation, repeat) = {
            let mut state = self.inner.state.lock().unwrap();
            // Every submit invalidates whatever evaluation is still pending,
            // even when this text will not schedule a new one.
            state.generation += 1;
            let repeat =
                !query.is_empty() && state.last_committed.as_deref() == Some(query.as_str());
            if query.is_empty() {
                state.last_committed = None;
            }
            (state.generation, repeat)
        };

        if repeat {
            // The committed results already answer this text.
            self.inner.searching_tx.send_replace(false);
            return;
        }

        if query.is_empty() {
            self.inner.results_tx.send_replace(Arc::new(Vec::new()));
            self.inner.searching_tx.send_replace(false);
            return;
        }

        self.inner.searching_tx.send_replace(true);
        let inner = self.inner.clone();
        let debounce = self.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            inner.evaluate(generation, query);
        });
    }

    /// Receiver for the current result snapshot.
    pub fn results(&self) -> watch::Receiver<Arc<Vec<Opportunity>>> {
        self.inner.results_tx.subscribe()
    }

    /// Receiver for the newest-first recent query list.
    pub fn recent_queries(&self) -> watch::Receiver<Vec<String>> {
        self.inner.recent_tx.subscribe()
    }

    /// True only while an evaluation is pending or in flight.
    pub fn is_searching(&self) -> watch::Receiver<bool> {
        self.inner.searching_tx.subscribe()
    }

    /// Static seed suggestions.
    pub fn popular_queries(&self) -> &'static [&'static str] {
        POPULAR_QUERIES
    }
}

impl Inner {
    /// Run the catalog scan for a debounced query and commit the outcome,
    /// unless a newer query superseded this one while it waited.
    fn evaluate(&self, generation: u64, query: String) {
        let catalog = self.catalog_rx.borrow().clone();
        let needle = query.to_lowercase();
        let hits: Vec<Opportunity> = catalog
            .iter()
            .filter(|o| matches_query(o, &needle))
            .cloned()
            .collect();

        let recent = {
            let mut state = self.state.lock().unwrap();
            if state.generation != generation {
                return;
            }
            if !state.recent.iter().any(|q| q == &query) {
                state.recent.push_front(query.clone());
                state.recent.truncate(RECENT_CAP);
            }
            state.last_committed = Some(query);
            state.recent.iter().cloned().collect::<Vec<String>>()
        };

        tracing::debug!(hits = hits.len(), "search evaluated");
        self.results_tx.send_replace(Arc::new(hits));
        self.recent_tx.send_replace(recent);
        self.searching_tx.send_replace(false);
    }
}

/// Case-insensitive substring match across title, description, category,
/// and each requirement. Tags are deliberately not searched.
fn matches_query(opportunity: &Opportunity, needle: &str) -> bool {
    opportunity.title.to_lowercase().contains(needle)
        || opportunity.description.to_lowercase().contains(needle)
        || opportunity.category.as_str().to_lowercase().contains(needle)
        || opportunity
            .requirements
            .iter()
            .any(|r| r.to_lowercase().contains(needle))
}
