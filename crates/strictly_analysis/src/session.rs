//! Analysis sessions: one external engine bound to one tree node.
//!
//! A session launches the engine on its node's serialized position and
//! spawns a background task that reads the engine's diagnostic stream,
//! writing depth, best move and smoothed evaluation into state shared with
//! the node. Evaluation updates are announced to whoever is subscribed,
//! which is the controller while the node is displayed and nobody
//! otherwise.
//!
//! ```text
//! Spawning ──> Streaming <──> Paused
//!    │             │            │
//!    └─────────────┴────────────┴──> Terminated
//! ```

use crate::config::StreamLimits;
use crate::engine::{EngineControl, EngineLauncher};
use crate::event::MatchEvent;
use crate::report::{EngineReport, EvalSmoother};
use crate::tree::NodeId;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strictly_ultimate::Mark;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Lifecycle of a session's engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum SessionState {
    /// Engine is being launched.
    Spawning,
    /// Engine is running and its stream is being read.
    Streaming,
    /// Engine is suspended; accumulated state is kept.
    Paused,
    /// Engine is stopped for good, or never started.
    Terminated,
}

/// Latest analysis results for a node.
#[derive(Debug, Clone, Default, PartialEq, Getters)]
pub struct Analysis {
    /// Smoothed evaluation, from the point of view set by the side to move.
    evaluation: f64,
    /// Deepest search depth reported so far.
    depth: u32,
    /// Best move at that depth, if any report arrived.
    best_move: Option<String>,
}

/// Everything the session needs to launch engines.
#[derive(Debug, Clone)]
pub struct Analyzer {
    launcher: Arc<dyn EngineLauncher>,
    limits: StreamLimits,
    runtime: Handle,
}

impl Analyzer {
    /// Creates an analyzer spawning consumer tasks on `runtime`.
    #[instrument(skip(launcher, runtime))]
    pub fn new(launcher: Arc<dyn EngineLauncher>, limits: StreamLimits, runtime: Handle) -> Self {
        Self {
            launcher,
            limits,
            runtime,
        }
    }

    /// Stream limits applied to every session.
    pub fn limits(&self) -> StreamLimits {
        self.limits
    }
}

#[derive(Debug, Default)]
struct Shared {
    analysis: Analysis,
    subscriber: Option<UnboundedSender<MatchEvent>>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The engine bound to one node.
#[derive(Debug)]
pub struct AnalysisSession {
    node: NodeId,
    state: SessionState,
    control: Option<Box<dyn EngineControl>>,
    shared: Arc<Mutex<Shared>>,
    consumer: Option<JoinHandle<()>>,
}

impl AnalysisSession {
    /// Launches the engine on `position` and starts reading its stream.
    ///
    /// A launch failure is logged and leaves the session terminated with
    /// default analysis; the node stays usable.
    #[instrument(skip(analyzer), fields(node = %node))]
    pub fn start(node: NodeId, position: &str, to_move: Mark, analyzer: &Analyzer) -> Self {
        let mut session = Self {
            node,
            state: SessionState::Spawning,
            control: None,
            shared: Arc::new(Mutex::new(Shared::default())),
            consumer: None,
        };

        let _guard = analyzer.runtime.enter();
        match analyzer.launcher.launch(position) {
            Ok(handle) => {
                let (control, diagnostics) = handle.into_parts();
                let task = consume(
                    node,
                    diagnostics,
                    EvalSmoother::new(analyzer.limits.eval_clamp, to_move.sign()),
                    analyzer.limits,
                    Arc::clone(&session.shared),
                );
                session.consumer = Some(analyzer.runtime.spawn(task));
                session.control = Some(control);
                session.state = SessionState::Streaming;
                info!("Analysis session started");
            }
            Err(e) => {
                error!(error = %e, "Failed to launch engine");
                session.state = SessionState::Terminated;
            }
        }

        session
    }

    /// Node this session analyses.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Snapshot of the latest results.
    pub fn analysis(&self) -> Analysis {
        lock(&self.shared).analysis.clone()
    }

    /// Routes evaluation updates to `subscriber`, replacing any previous one.
    #[instrument(skip(self, subscriber), fields(node = %self.node))]
    pub fn subscribe(&self, subscriber: UnboundedSender<MatchEvent>) {
        lock(&self.shared).subscriber = Some(subscriber);
    }

    /// Stops routing evaluation updates.
    #[instrument(skip(self), fields(node = %self.node))]
    pub fn unsubscribe(&self) {
        lock(&self.shared).subscriber = None;
    }

    /// Suspends the engine. No-op unless streaming.
    #[instrument(skip(self), fields(node = %self.node, state = %self.state))]
    pub fn pause(&mut self) {
        if self.state != SessionState::Streaming {
            return;
        }
        if let Some(control) = self.control.as_mut()
            && let Err(e) = control.pause()
        {
            warn!(error = %e, "Failed to pause engine");
        }
        self.state = SessionState::Paused;
        debug!("Analysis paused");
    }

    /// Continues a paused engine. No-op unless paused.
    #[instrument(skip(self), fields(node = %self.node, state = %self.state))]
    pub fn resume(&mut self) {
        if self.state != SessionState::Paused {
            return;
        }
        if let Some(control) = self.control.as_mut()
            && let Err(e) = control.resume()
        {
            warn!(error = %e, "Failed to resume engine");
        }
        self.state = SessionState::Streaming;
        debug!("Analysis resumed");
    }

    /// Stops the engine for good. Safe to call repeatedly.
    ///
    /// Does not wait for the consumer task; it exits on its own once the
    /// diagnostic stream closes.
    #[instrument(skip(self), fields(node = %self.node, state = %self.state))]
    pub fn terminate(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }
        self.resume();
        if let Some(mut control) = self.control.take()
            && let Err(e) = control.terminate()
        {
            warn!(error = %e, "Failed to terminate engine");
        }
        self.unsubscribe();
        self.state = SessionState::Terminated;
        info!("Analysis session terminated");
    }

    /// Waits until the consumer task has exited.
    pub async fn finished(&mut self) {
        if let Some(consumer) = self.consumer.take()
            && let Err(e) = consumer.await
        {
            warn!(node = %self.node, error = %e, "Consumer task failed");
        }
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Reads the diagnostic stream until it closes or `max_depth` is reached.
///
/// When the stream closes early, the last clamped value is kept as the
/// evaluation whatever its depth, without a notification. Past
/// `max_depth` the remaining lines are read and discarded until the
/// engine exits, so it never writes into a closed pipe.
#[instrument(skip_all, fields(node = %node))]
async fn consume(
    node: NodeId,
    diagnostics: Box<dyn AsyncRead + Send + Unpin>,
    mut smoother: EvalSmoother,
    limits: StreamLimits,
    shared: Arc<Mutex<Shared>>,
) {
    let mut lines = BufReader::new(diagnostics).lines();
    let mut reported = false;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Diagnostic stream closed");
                if reported {
                    lock(&shared).analysis.evaluation = smoother.settled();
                }
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read diagnostic stream");
                return;
            }
        };

        let report = match EngineReport::parse(&line) {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, line = %line, "Skipping malformed engine line");
                continue;
            }
        };
        reported = true;

        let depth = *report.depth();
        let evaluation = smoother.push(*report.value());
        let subscriber = {
            let mut shared = lock(&shared);
            shared.analysis.depth = depth;
            shared.analysis.best_move = Some(report.best_move().clone());
            if depth > limits.publish_depth {
                shared.analysis.evaluation = evaluation;
                shared.subscriber.clone()
            } else {
                None
            }
        };
        debug!(depth, evaluation, best_move = %report.best_move(), "Engine report");

        if let Some(subscriber) = subscriber
            && subscriber.send(MatchEvent::EvaluationChanged { node }).is_err()
        {
            debug!("Subscriber dropped");
        }

        if depth >= limits.max_depth {
            info!(depth, "Reached maximum depth, stopping stream consumption");
            let mut discarded = 0usize;
            while let Ok(Some(_)) = lines.next_line().await {
                discarded += 1;
            }
            debug!(discarded, "Diagnostic stream closed");
            return;
        }
    }
}
