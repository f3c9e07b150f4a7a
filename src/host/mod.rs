//! Runs team searches off the caller's task.
//!
//! Each build gets a blocking worker and its own channel. Starting a build cancels
//! the previous one: its worker stops at the next evaluated team and its handle
//! never yields another message.

pub mod message;

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

pub use message::{BuildOutcome, BuildRequest, HostError, HostMessage};

use crate::host::message::Envelope;
use crate::optimizer::{find_best_team_until, Candidate, SearchConfig, SearchResult, Stopped};

/// Upper bound on progress messages per build; the worker coalesces ticks in between.
pub const PROGRESS_MESSAGE_COUNT: u64 = 100;

/// Progress sink handed to a search: `(current, total)` per evaluated team.
pub type ProgressSink<'a> = &'a mut dyn FnMut(u64, u64) -> ControlFlow<()>;

/// Search run by the worker.
pub type SearchFn = fn(&[Candidate], &SearchConfig, ProgressSink<'_>) -> Result<SearchResult, Stopped>;

fn exhaustive_search(
    candidates: &[Candidate],
    config: &SearchConfig,
    on_progress: ProgressSink<'_>,
) -> Result<SearchResult, Stopped> {
    find_best_team_until(candidates, config, on_progress)
}

struct ActiveBuild {
    generation: u64,
    cancelled: Arc<AtomicBool>,
    supervisor: JoinHandle<()>,
}

/// Owner of the (at most one) running search.
pub struct SearchHost {
    generation: u64,
    active: Option<ActiveBuild>,
    search: SearchFn,
}

impl Default for SearchHost {
    fn default() -> Self {
        Self::with_search(exhaustive_search)
    }
}

impl SearchHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose workers run `search` instead of the exhaustive search.
    pub fn with_search(search: SearchFn) -> Self {
        Self {
            generation: 0,
            active: None,
            search,
        }
    }

    /// Generation of the most recently started build (0 before the first one).
    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    /// Start a search for `request`, cancelling any build still in flight.
    /// Must be called from within a tokio runtime.
    pub fn build(&mut self, request: BuildRequest) -> Result<BuildHandle, HostError> {
        let runtime = Handle::try_current().map_err(|_| HostError::NoRuntime)?;
        self.cancel();

        self.generation += 1;
        let generation = self.generation;
        let cancelled = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = unbounded_channel();

        tracing::info!(
            generation,
            mode = %request.mode,
            candidates = request.candidates.len(),
            team_size = request.config.team_size,
            "starting team build"
        );

        let worker_cancelled = Arc::clone(&cancelled);
        let worker_sender = sender.clone();
        let supervisor_cancelled = Arc::clone(&cancelled);
        let search = self.search;
        let supervisor = runtime.spawn(async move {
            let worker = tokio::task::spawn_blocking(move || {
                run_search(search, generation, request, &worker_cancelled, &worker_sender)
            });
            let message = match worker.await {
                Ok(Some(outcome)) => HostMessage::Result(outcome),
                Ok(None) => return,
                Err(err) if err.is_panic() => {
                    tracing::error!(generation, "search worker panicked");
                    HostMessage::Failed(HostError::WorkerPanicked(panic_message(err.into_panic())))
                }
                Err(_) => HostMessage::Failed(HostError::Disconnected),
            };
            if supervisor_cancelled.load(Ordering::Acquire) {
                return;
            }
            let _ = sender.send(Envelope {
                generation,
                message,
            });
        });

        self.active = Some(ActiveBuild {
            generation,
            cancelled: Arc::clone(&cancelled),
            supervisor,
        });

        Ok(BuildHandle {
            generation,
            cancelled,
            receiver,
        })
    }

    /// Cancel the running build, if any. Its handle yields nothing afterwards.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            if !active.supervisor.is_finished() {
                tracing::info!(generation = active.generation, "superseding team build");
            }
            active.cancelled.store(true, Ordering::Release);
        }
    }
}

impl Drop for SearchHost {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Receiving side of one build.
pub struct BuildHandle {
    generation: u64,
    cancelled: Arc<AtomicBool>,
    receiver: UnboundedReceiver<Envelope>,
}

impl BuildHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Next message of this build; `None` once the build has finished or was cancelled.
    pub async fn next(&mut self) -> Option<HostMessage> {
        loop {
            if self.is_cancelled() {
                self.receiver.close();
                return None;
            }
            let envelope = self.receiver.recv().await?;
            if envelope.generation == self.generation && !self.is_cancelled() {
                return Some(envelope.message);
            }
        }
    }

    /// Drive the build to its end, forwarding progress. `Ok(None)` means the build
    /// was superseded before producing a result.
    pub async fn wait<F>(mut self, mut on_progress: F) -> Result<Option<BuildOutcome>, HostError>
    where
        F: FnMut(u64, u64),
    {
        while let Some(message) = self.next().await {
            match message {
                HostMessage::Progress { current, max } => on_progress(current, max),
                HostMessage::Result(outcome) => return Ok(Some(outcome)),
                HostMessage::Failed(err) => return Err(err),
            }
        }
        if self.is_cancelled() {
            Ok(None)
        } else {
            Err(HostError::Disconnected)
        }
    }
}

fn run_search(
    search: SearchFn,
    generation: u64,
    request: BuildRequest,
    cancelled: &AtomicBool,
    sender: &UnboundedSender<Envelope>,
) -> Option<BuildOutcome> {
    let mut step = 1;
    let mut on_progress = |current: u64, max: u64| {
        if cancelled.load(Ordering::Acquire) {
            return ControlFlow::Break(());
        }
        if current == 1 {
            step = max.div_ceil(PROGRESS_MESSAGE_COUNT).max(1);
        }
        if current % step == 0 || current == max {
            let envelope = Envelope {
                generation,
                message: HostMessage::Progress { current, max },
            };
            if sender.send(envelope).is_err() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    };

    match search(&request.candidates, &request.config, &mut on_progress) {
        Ok(best) => {
            tracing::info!(
                generation,
                found = best.is_some(),
                value = best.as_ref().map_or(0.0, |team| team.value),
                "team build finished"
            );
            Some(match best {
                Some(team) => BuildOutcome {
                    teams: vec![team.ids],
                    extras: Vec::new(),
                    value: team.value,
                },
                None => BuildOutcome::default(),
            })
        }
        Err(Stopped) => {
            tracing::debug!(generation, "team build stopped");
            None
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
