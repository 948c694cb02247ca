//! SearchSession - query pipeline and selection handling for Swift interop
//!
//! The UI feeds keystrokes and selections in serially; the session answers
//! with a single current `ResultList` published through a watch channel.
//!
//! Stale Result Architecture:
//! Every event claims the next generation under the state lock and cancels
//! the previous lookup's CancellationToken. Lookups run on tokio's blocking
//! pool and, when done, re-take the same lock and publish only if their
//! generation is still the latest. A slow lookup for "a" therefore can never
//! overwrite the answer for "ab", whatever order the lookups finish in.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::database::Database;
use crate::interface::{PasteError, ResultList, ResultSource, SymbolRecord};
use crate::models::Corpus;
use crate::recency::{RecencyConfig, RecencyStore};
use crate::search::{CorpusIndex, SearchConfig, SymbolSearcher};

/// Global fallback Tokio runtime for when events arrive outside any runtime context.
/// This is shared across all SearchSession instances and never dropped.
/// Used by UniFFI which doesn't provide a tokio runtime.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create fallback tokio runtime")
});

static RAYON_INIT: Once = Once::new();

/// Initialize global Rayon thread pool with core reservation and lower priority
fn init_rayon() {
    RAYON_INIT.call_once(|| {
        let num_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        // Keep a core free for the UI thread and one for Tokio.
        let rayon_threads = num_threads.saturating_sub(2).max(1);

        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(rayon_threads)
            .thread_name(|i| format!("paste-rayon-{}", i))
            .start_handler(|_| {
                use thread_priority::*;
                let _ = set_current_thread_priority(ThreadPriority::Min);
            })
            .build_global();
    });
}

/// Current runtime if there is one, otherwise the global fallback
fn runtime_handle() -> tokio::runtime::Handle {
    tokio::runtime::Handle::try_current().unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
}

/// Component configuration for [`SearchSession::with_config`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub search: SearchConfig,
    pub recency: RecencyConfig,
}

struct QueryState {
    raw_text: String,
    generation: u64,
    /// Token of the lookup for `generation`, if one is in flight
    token: Option<CancellationToken>,
}

impl QueryState {
    /// Supersede whatever is in flight and claim the next generation.
    fn advance(&mut self, raw_text: String) -> u64 {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        self.generation += 1;
        self.raw_text = raw_text;
        self.generation
    }
}

/// Query pipeline for one search view.
///
/// Concurrency Model:
/// - Events are expected from a single UI-facing context
/// - Lookups run on `spawn_blocking` threads and may overlap
/// - Only the latest generation may publish; the state lock orders
///   generation assignment against publication
#[derive(uniffi::Object)]
pub struct SearchSession {
    searcher: Arc<dyn SymbolSearcher>,
    recents: Arc<RecencyStore>,
    state: Arc<Mutex<QueryState>>,
    results: Arc<watch::Sender<ResultList>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

// Internal implementation (not exported via FFI)
impl SearchSession {
    /// Assemble a session from explicit components. Starts Idle, showing
    /// the recency store's contents.
    pub fn new(searcher: Arc<dyn SymbolSearcher>, recents: Arc<RecencyStore>) -> Self {
        init_rayon();
        let initial = ResultList::recents(0, String::new(), recents.get());
        let (sender, _) = watch::channel(initial);

        Self {
            searcher,
            recents,
            state: Arc::new(Mutex::new(QueryState {
                raw_text: String::new(),
                generation: 0,
                token: None,
            })),
            results: Arc::new(sender),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Open a session over the bundled catalogue with recents stored in the
    /// SQLite database at `db_path`.
    pub fn with_config<P: AsRef<Path>>(db_path: P, config: SessionConfig) -> Result<Self, PasteError> {
        let corpus = Arc::new(Corpus::bundled()?);
        let db = Database::open(db_path)?;
        let recents = RecencyStore::with_config(Arc::new(db), Arc::clone(&corpus), config.recency);
        let index = CorpusIndex::with_config(corpus, config.search);
        Ok(Self::new(Arc::new(index), Arc::new(recents)))
    }

    /// Receiver that observes every published result list
    pub fn subscribe(&self) -> watch::Receiver<ResultList> {
        self.results.subscribe()
    }

    /// Wait for every lookup dispatched so far to finish (published or discarded).
    pub async fn settle(&self) {
        loop {
            let handles = std::mem::take(&mut *self.pending.lock());
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "lookup task failed");
                }
            }
        }
    }

    /// Idle transition: publish recents immediately, bypassing the index.
    fn enter_idle(&self, raw_text: String) {
        let mut state = self.state.lock();
        let generation = state.advance(raw_text);
        tracing::debug!(generation, "idle");
        let list = ResultList::recents(generation, state.raw_text.clone(), self.recents.get());
        self.results.send_replace(list);
    }

    fn dispatch_lookup(&self, raw_text: String) {
        let query = raw_text.trim().to_string();
        let token = CancellationToken::new();
        let generation = {
            let mut state = self.state.lock();
            let generation = state.advance(raw_text);
            state.token = Some(token.clone());
            generation
        };
        tracing::debug!(generation, query = %query, "searching");

        let searcher = Arc::clone(&self.searcher);
        let state = Arc::clone(&self.state);
        let results = Arc::clone(&self.results);

        let handle = runtime_handle().spawn_blocking(move || {
            let records = searcher.lookup(&query, &token);

            let current = state.lock();
            if current.generation != generation {
                tracing::debug!(generation, latest = current.generation, "discarding stale lookup");
                return;
            }
            results.send_replace(ResultList {
                generation,
                query: current.raw_text.clone(),
                source: ResultSource::Search,
                records,
            });
        });

        let mut pending = self.pending.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }
}

// FFI-exported constructor (must be in standalone impl block)
#[uniffi::export]
impl SearchSession {
    /// Open a session with recents stored in the database at the given path
    #[uniffi::constructor]
    pub fn open(db_path: String) -> Result<Self, PasteError> {
        if db_path.trim().is_empty() {
            return Err(PasteError::InvalidInput("database path is empty".into()));
        }
        Self::with_config(PathBuf::from(db_path), SessionConfig::default())
    }
}

#[uniffi::export]
impl SearchSession {
    // ─────────────────────────────────────────────────────────────────────────────
    // Inbound events
    // ─────────────────────────────────────────────────────────────────────────────

    /// Query text changed. Blank text shows recents; anything else starts a
    /// lookup that supersedes every earlier one.
    pub fn text_changed(&self, text: String) {
        if text.trim().is_empty() {
            self.enter_idle(text);
        } else {
            self.dispatch_lookup(text);
        }
    }

    /// Explicit clear action, same as an empty text change
    pub fn text_cleared(&self) {
        self.enter_idle(String::new());
    }

    /// Remember `record` as most recent, then reset to the recents view.
    /// A failed write is logged; the session keeps the new order regardless.
    pub fn select(&self, record: SymbolRecord) {
        if let Err(e) = self.recents.record_selection(&record) {
            tracing::warn!(error = %e, symbol = %record.name, "failed to persist recent symbols");
        }
        self.enter_idle(String::new());
    }

    /// Select the record at `index` of the visible list and return it.
    /// An index outside the list is a caller bug: it asserts in debug builds
    /// and is ignored in release builds.
    pub fn select_at(&self, index: u64) -> Option<SymbolRecord> {
        let record = usize::try_from(index)
            .ok()
            .and_then(|i| self.results.borrow().records.get(i).cloned());
        let Some(record) = record else {
            debug_assert!(false, "selection index {index} outside the visible result list");
            return None;
        };
        self.select(record.clone());
        Some(record)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Outbound state
    // ─────────────────────────────────────────────────────────────────────────────

    /// The list currently visible to the UI
    pub fn results(&self) -> ResultList {
        self.results.borrow().clone()
    }

    /// Wait for the next list published after this call.
    pub async fn changed(&self) -> ResultList {
        let mut receiver = self.results.subscribe();
        if receiver.changed().await.is_err() {
            return self.results();
        }
        let list = receiver.borrow_and_update().clone();
        list
    }

    /// Wait for the first published list newer than `generation`.
    pub async fn results_after(&self, generation: u64) -> ResultList {
        let mut receiver = self.results.subscribe();
        let list = match receiver.wait_for(|list| list.generation > generation).await {
            Ok(list) => list.clone(),
            Err(_) => self.results(),
        };
        list
    }

    /// Raw text of the latest query event
    pub fn query(&self) -> String {
        self.state.lock().raw_text.clone()
    }

    pub fn recents(&self) -> Vec<SymbolRecord> {
        self.recents.get()
    }

    /// Forget all recent symbols. Refreshes the visible list when Idle.
    pub fn clear_recents(&self) -> Result<(), PasteError> {
        let outcome = self.recents.clear();
        let idle = self.state.lock().raw_text.trim().is_empty();
        if idle {
            self.enter_idle(String::new());
        }
        outcome.map_err(PasteError::from)
    }
}
