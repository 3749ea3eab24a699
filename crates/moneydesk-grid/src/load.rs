//! Load lifecycle - columns then rows, last-request-wins fetches and a
//! debouncer for option search

use crate::column_state::{ColumnLayout, ColumnState};
use crate::engine::TableEngine;
use crate::error::{GridError, GridResult};
use crate::filter::{FilterField, FilterOverride};
use crate::value::Record;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Where a table is in its load cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    LoadingColumns,
    LoadingRows,
    Ready,
    /// A fetch failed; the last rows stay on screen
    Error(String),
}

impl LoadPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadPhase::LoadingColumns | LoadPhase::LoadingRows)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadPhase::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Remote source of a table's layout and rows
#[async_trait]
pub trait RowSource: Send + Sync + 'static {
    type Row: Record + Send + Sync + 'static;

    /// Saved column layout; may be empty
    async fn fetch_columns(&self) -> GridResult<Vec<ColumnState>>;

    /// Rows for a table state
    async fn fetch_rows(&self, state: crate::token::TableState) -> GridResult<Vec<Self::Row>>;
}

/// Slot holding at most one in-flight task.
///
/// Starting a new task aborts the previous one, so its result channel closes
/// without a value. Dropping the slot aborts as well.
#[derive(Debug, Default)]
pub struct LatestRequest {
    handle: Option<JoinHandle<()>>,
    issued: u64,
}

impl LatestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<F, T>(&mut self, future: F) -> oneshot::Receiver<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.cancel();
        let (tx, rx) = oneshot::channel();
        self.handle = Some(tokio::spawn(async move {
            let _ = tx.send(future.await);
        }));
        self.issued += 1;
        rx
    }

    /// Abort the in-flight task; returns whether one was running
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                log::debug!("aborted in-flight request #{}", self.issued);
                true
            }
            _ => false,
        }
    }

    /// Number of requests started so far
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

impl Drop for LatestRequest {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Runs a callback once input has been quiet for `delay`
pub struct Debouncer<T> {
    delay: Duration,
    callback: Arc<dyn Fn(T) + Send + Sync>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            callback: Arc::new(callback),
            pending: None,
        }
    }

    pub fn from_millis<F>(millis: u64, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self::new(Duration::from_millis(millis), callback)
    }

    /// Restart the timer with a new value
    pub fn call(&mut self, value: T) {
        self.cancel();
        let delay = self.delay;
        let callback = self.callback.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback(value);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

type RowsReceiver<R> = oneshot::Receiver<GridResult<Vec<R>>>;

/// A table bound to a row source, driving the load state machine.
///
/// `idle -> loading-columns -> loading-rows -> ready`, with `error`
/// reachable from either loading phase. Columns load once; every later
/// change to search, sort, filters or page goes back to `loading-rows`.
pub struct HistoryTable<S: RowSource> {
    source: Arc<S>,
    engine: TableEngine,
    phase: LoadPhase,
    rows: Vec<S::Row>,
    columns_loaded: bool,
    request: LatestRequest,
    pending: Option<RowsReceiver<S::Row>>,
}

impl<S: RowSource> HistoryTable<S> {
    pub fn new(source: Arc<S>, engine: TableEngine) -> Self {
        Self {
            source,
            engine,
            phase: LoadPhase::Idle,
            rows: Vec::new(),
            columns_loaded: false,
            request: LatestRequest::new(),
            pending: None,
        }
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn rows(&self) -> &[S::Row] {
        &self.rows
    }

    pub fn engine(&self) -> &TableEngine {
        &self.engine
    }

    /// Load columns, then the first page of rows
    pub async fn mount(&mut self) -> &LoadPhase {
        if !self.columns_loaded {
            self.phase = LoadPhase::LoadingColumns;
            match self.source.fetch_columns().await {
                Ok(saved) => {
                    if !saved.is_empty() {
                        let layout = ColumnLayout::reconcile(self.engine.registry(), saved);
                        *self.engine.layout_mut() = layout;
                    }
                    self.columns_loaded = true;
                }
                Err(e) => {
                    log::warn!("column fetch failed: {}", e);
                    self.phase = LoadPhase::Error(e.to_string());
                    return &self.phase;
                }
            }
        }
        self.request_rows();
        self.settle().await
    }

    /// Issue a row fetch for the current state, cancelling any older one
    pub fn request_rows(&mut self) {
        if !self.columns_loaded {
            return;
        }
        let source = self.source.clone();
        let state = self.engine.state();
        self.pending = Some(self.request.start(async move { source.fetch_rows(state).await }));
        self.phase = LoadPhase::LoadingRows;
    }

    /// Wait for the latest row fetch and apply its result
    pub async fn settle(&mut self) -> &LoadPhase {
        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => return &self.phase,
        };
        match pending.await {
            Ok(Ok(rows)) => {
                let cleared = self.engine.sync_rows(&rows);
                if !cleared.is_empty() {
                    log::debug!("cleared stale filters: {:?}", cleared);
                }
                self.rows = rows;
                self.phase = LoadPhase::Ready;
            }
            Ok(Err(e)) => {
                log::warn!("row fetch failed: {}", e);
                self.phase = LoadPhase::Error(e.to_string());
            }
            Err(_) => {
                let e = GridError::fetch("request cancelled");
                self.phase = LoadPhase::Error(e.to_string());
            }
        }
        &self.phase
    }

    /// Re-run whichever step failed
    pub async fn retry(&mut self) -> &LoadPhase {
        if self.phase.error().is_none() {
            return &self.phase;
        }
        self.mount().await
    }

    pub fn set_search(&mut self, term: &str) {
        self.engine.set_search(term);
        self.request_rows();
    }

    pub fn toggle_sort(&mut self, column_id: &str, multi: bool) -> GridResult<()> {
        self.engine.toggle_sort(column_id, multi)?;
        self.request_rows();
        Ok(())
    }

    pub fn set_filter(&mut self, update: FilterOverride) {
        self.engine.set_filter(update);
        self.request_rows();
    }

    pub fn clear_filter(&mut self, field: FilterField) {
        self.engine.clear_filter(field);
        self.request_rows();
    }

    pub fn set_page(&mut self, page: usize) {
        self.engine.set_page(page);
        self.request_rows();
    }

    /// Stop any in-flight fetch
    pub fn unmount(&mut self) {
        self.request.cancel();
        self.pending = None;
        self.phase = LoadPhase::Idle;
    }
}
