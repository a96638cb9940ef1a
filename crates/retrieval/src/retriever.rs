use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use stockdesk_api::{ClassifiedError, RemoteCall};
use stockdesk_core::{Envelope, FETCH_FAILED_MESSAGE, RetrievalPayload};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::{RetrievalError, RetrievalState, RetrieverOptions};

type Fetched<T> = (u64, Result<Envelope<Vec<T>>, ClassifiedError>);

enum Command {
    SetPayload(RetrievalPayload),
    SetEnabled(bool),
    Refetch,
}

#[derive(Debug, Clone, Copy)]
struct Progress {
    applied: u64,
    idle: bool,
}

/// Handle to a running list retrieval task.
///
/// Dropping the handle stops the task: a pending search debounce is
/// cancelled and responses still in flight are ignored.
pub struct ListRetriever<T> {
    commands: mpsc::UnboundedSender<Command>,
    sent: AtomicU64,
    state: watch::Receiver<RetrievalState<T>>,
    progress: watch::Receiver<Progress>,
    task: JoinHandle<()>,
}

impl<T> std::fmt::Debug for ListRetriever<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListRetriever")
            .field("sent", &self.sent.load(Ordering::SeqCst))
            .field("progress", &*self.progress.borrow())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> ListRetriever<T> {
    /// Starts the engine on the current tokio runtime. When enabled, the
    /// first fetch is issued immediately with the initial payload.
    #[must_use]
    pub fn spawn(
        remote: Arc<dyn RemoteCall<T>>,
        payload: RetrievalPayload,
        options: RetrieverOptions,
    ) -> Self {
        let initial = RetrievalState { is_loading: options.enabled, ..RetrievalState::default() };
        let (state_tx, state_rx) = watch::channel(initial);
        let (progress_tx, progress_rx) =
            watch::channel(Progress { applied: 0, idle: !options.enabled });
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let worker = Worker {
            remote,
            debounced_search: payload.search.clone(),
            payload,
            search_deadline: None,
            options,
            latest_seq: 0,
            state: state_tx,
            progress: progress_tx,
        };
        let task = tokio::spawn(worker.run(command_rx));

        Self {
            commands: command_tx,
            sent: AtomicU64::new(0),
            state: state_rx,
            progress: progress_rx,
            task,
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> RetrievalState<T> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RetrievalState<T>> {
        self.state.clone()
    }

    /// Replaces the payload. A changed `search` is debounced; any other
    /// change fetches right away.
    pub fn set_payload(&self, payload: RetrievalPayload) {
        self.send(Command::SetPayload(payload));
    }

    /// Disabling suppresses new fetches but does not cancel one in flight.
    pub fn set_enabled(&self, enabled: bool) {
        self.send(Command::SetEnabled(enabled));
    }

    /// Fetches again with the current payload, even if nothing changed.
    pub fn refetch(&self) {
        self.send(Command::Refetch);
    }

    /// Waits until every command sent so far has been applied, no search
    /// debounce is pending and the current fetch has resolved.
    pub async fn wait_until_settled(&self) -> RetrievalState<T> {
        let target = self.sent.load(Ordering::SeqCst);
        let mut progress = self.progress.clone();
        if progress.wait_for(|p| p.applied >= target && p.idle).await.is_err() {
            tracing::debug!("list retriever stopped before settling");
        }
        self.state()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_ok() {
            self.sent.fetch_add(1, Ordering::SeqCst);
        } else {
            tracing::debug!("list retriever task has stopped, dropping command");
        }
    }
}

impl<T> Drop for ListRetriever<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Worker<T> {
    remote: Arc<dyn RemoteCall<T>>,
    payload: RetrievalPayload,
    debounced_search: String,
    search_deadline: Option<Instant>,
    options: RetrieverOptions,
    latest_seq: u64,
    state: watch::Sender<RetrievalState<T>>,
    progress: watch::Sender<Progress>,
}

impl<T: Clone + Send + Sync + 'static> Worker<T> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut in_flight: FuturesUnordered<BoxFuture<'static, Fetched<T>>> =
            FuturesUnordered::new();
        let mut applied: u64 = 0;

        if self.options.enabled {
            in_flight.push(self.dispatch());
        }

        loop {
            let deadline = self.search_deadline.unwrap_or_else(Instant::now);
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    applied = applied.saturating_add(1);
                    if let Some(fetch) = self.apply(command) {
                        in_flight.push(fetch);
                    }
                },
                () = sleep_until(deadline), if self.search_deadline.is_some() => {
                    if let Some(fetch) = self.debounce_elapsed() {
                        in_flight.push(fetch);
                    }
                },
                Some((seq, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    self.settle(seq, result);
                },
            }
            self.publish_progress(applied);
        }
        tracing::debug!("list retriever handle dropped, stopping");
    }

    fn apply(&mut self, command: Command) -> Option<BoxFuture<'static, Fetched<T>>> {
        match command {
            Command::SetPayload(next) => {
                if next.search != self.payload.search {
                    self.search_deadline = Some(Instant::now() + self.options.debounce);
                }
                let query_changed = !next.same_query_as(&self.payload);
                self.payload = next;
                (query_changed && self.options.enabled).then(|| self.dispatch())
            },
            Command::SetEnabled(enabled) => {
                let was_enabled = std::mem::replace(&mut self.options.enabled, enabled);
                (enabled && !was_enabled).then(|| self.dispatch())
            },
            Command::Refetch => self.options.enabled.then(|| self.dispatch()),
        }
    }

    fn debounce_elapsed(&mut self) -> Option<BoxFuture<'static, Fetched<T>>> {
        self.search_deadline = None;
        if self.payload.search == self.debounced_search {
            return None;
        }
        self.debounced_search.clone_from(&self.payload.search);
        tracing::debug!(search = %self.debounced_search, "search term settled");
        self.options.enabled.then(|| self.dispatch())
    }

    fn dispatch(&mut self) -> BoxFuture<'static, Fetched<T>> {
        self.latest_seq = self.latest_seq.wrapping_add(1);
        let seq = self.latest_seq;
        let payload = self.payload.with_search_override(&self.debounced_search);
        let remote = Arc::clone(&self.remote);

        tracing::debug!(
            seq,
            limit = payload.limit,
            offset = payload.offset,
            search = %payload.search,
            "dispatching list fetch"
        );
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        async move {
            let result = remote.call(&payload).await;
            (seq, result)
        }
        .boxed()
    }

    fn settle(&mut self, seq: u64, result: Result<Envelope<Vec<T>>, ClassifiedError>) {
        if seq != self.latest_seq {
            tracing::debug!(seq, latest = self.latest_seq, "discarding stale list response");
            return;
        }

        let outcome = result.map_err(RetrievalError::from).and_then(|envelope| {
            if envelope.is_success() {
                Ok(envelope)
            } else {
                let message = if envelope.message.trim().is_empty() {
                    FETCH_FAILED_MESSAGE.to_owned()
                } else {
                    envelope.message
                };
                Err(RetrievalError::Rejected { code: envelope.code, status: envelope.status, message })
            }
        });

        self.state.send_modify(|state| {
            state.is_loading = false;
            match outcome {
                Ok(envelope) => {
                    state.items = envelope.data.unwrap_or_default();
                    state.pagination = envelope.pagination;
                    state.error = None;
                },
                Err(e) => {
                    tracing::debug!(seq, error = %e, "list fetch failed, clearing rows");
                    state.items.clear();
                    state.pagination = None;
                    state.error = Some(e);
                },
            }
        });
    }

    fn publish_progress(&self, applied: u64) {
        let idle = self.search_deadline.is_none() && !self.state.borrow().is_loading;
        self.progress.send_replace(Progress { applied, idle });
    }
}
