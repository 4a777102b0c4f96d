//! Scripted engine shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strictly_analysis::{
    Analyzer, EngineControl, EngineError, EngineHandle, EngineLauncher, MatchController,
    MatchEvent, StreamLimits,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// A control call received by a scripted engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Pause,
    Resume,
    Terminate,
}

/// Control calls, tagged with the position the engine was launched on.
pub type CallLog = Arc<Mutex<Vec<(String, Call)>>>;

#[derive(Debug)]
struct RecordingControl {
    position: String,
    calls: CallLog,
}

impl RecordingControl {
    fn record(&self, call: Call) -> Result<(), EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push((self.position.clone(), call));
        Ok(())
    }
}

impl EngineControl for RecordingControl {
    fn pause(&mut self) -> Result<(), EngineError> {
        self.record(Call::Pause)
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.record(Call::Resume)
    }

    fn terminate(&mut self) -> Result<(), EngineError> {
        self.record(Call::Terminate)
    }
}

/// Launcher replaying canned diagnostic output per position.
#[derive(Debug, Default)]
pub struct ScriptedLauncher {
    default_output: String,
    outputs: HashMap<String, String>,
    failing: HashSet<String>,
    fail_all: bool,
    calls: CallLog,
    launched: Arc<Mutex<Vec<String>>>,
}

fn join(lines: &[&str]) -> String {
    lines.iter().map(|line| format!("{}\n", line)).collect()
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output for every position without its own.
    pub fn with_default_output(mut self, lines: &[&str]) -> Self {
        self.default_output = join(lines);
        self
    }

    /// Output for one serialized position.
    pub fn with_output(mut self, position: &str, lines: &[&str]) -> Self {
        self.outputs.insert(position.to_string(), join(lines));
        self
    }

    /// Fails to launch on one serialized position.
    pub fn failing_on(mut self, position: &str) -> Self {
        self.failing.insert(position.to_string());
        self
    }

    /// Fails every launch.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }

    pub fn launched(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.launched)
    }
}

impl EngineLauncher for ScriptedLauncher {
    fn launch(&self, position: &str) -> Result<EngineHandle, EngineError> {
        self.launched.lock().unwrap().push(position.to_string());
        if self.fail_all || self.failing.contains(position) {
            return Err(EngineError::new("scripted launch failure"));
        }
        let output = self
            .outputs
            .get(position)
            .unwrap_or(&self.default_output)
            .clone();
        Ok(EngineHandle::new(
            Box::new(RecordingControl {
                position: position.to_string(),
                calls: Arc::clone(&self.calls),
            }),
            Box::new(std::io::Cursor::new(output.into_bytes())),
        ))
    }
}

/// Controller over a scripted launcher, with its event stream.
pub fn controller(launcher: ScriptedLauncher) -> (MatchController, UnboundedReceiver<MatchEvent>) {
    let analyzer = Analyzer::new(
        Arc::new(launcher),
        StreamLimits::default(),
        tokio::runtime::Handle::current(),
    );
    let (tx, rx) = mpsc::unbounded_channel();
    (MatchController::new(analyzer, tx), rx)
}

/// Yields to background tasks until `done` holds.
pub async fn settle(done: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Everything currently queued on the event stream.
pub fn drain(rx: &mut UnboundedReceiver<MatchEvent>) -> Vec<MatchEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
