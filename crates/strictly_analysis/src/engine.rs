//! Launching and controlling the external analysis engine.
//!
//! Sessions never touch processes directly: they ask an [`EngineLauncher`]
//! for an [`EngineHandle`], read its diagnostic stream and steer it through
//! [`EngineControl`]. [`ProcessLauncher`] is the real implementation;
//! tests substitute scripted launchers.

use crate::config::EngineConfig;
use crate::error::EngineError;
use derive_new::new;
use std::process::Stdio;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tracing::{debug, info, instrument, warn};

/// Suspend, continue or stop a running engine.
///
/// Implementations must not block waiting for the engine to exit.
pub trait EngineControl: Send + std::fmt::Debug {
    /// Suspends the computation, keeping its internal state.
    fn pause(&mut self) -> Result<(), EngineError>;

    /// Continues a suspended computation.
    fn resume(&mut self) -> Result<(), EngineError>;

    /// Requests a permanent stop.
    fn terminate(&mut self) -> Result<(), EngineError>;
}

/// Starts an engine analysing one serialized position.
pub trait EngineLauncher: Send + Sync + std::fmt::Debug {
    /// Launches the engine on `position`.
    fn launch(&self, position: &str) -> Result<EngineHandle, EngineError>;
}

/// A running engine: its control surface and its diagnostic stream.
#[derive(new)]
pub struct EngineHandle {
    control: Box<dyn EngineControl>,
    diagnostics: Box<dyn AsyncRead + Send + Unpin>,
}

impl EngineHandle {
    /// Splits the handle into control and diagnostic stream.
    pub fn into_parts(self) -> (Box<dyn EngineControl>, Box<dyn AsyncRead + Send + Unpin>) {
        (self.control, self.diagnostics)
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("control", &self.control)
            .finish_non_exhaustive()
    }
}

/// Launches the engine as a child process.
///
/// The command line is the configured command followed by
/// `analyze <position> --limit <time> --table-mem <size>`. Standard output
/// is discarded and the diagnostic stream (stderr) is piped back.
#[derive(Debug, Clone, new)]
pub struct ProcessLauncher {
    config: EngineConfig,
}

impl EngineLauncher for ProcessLauncher {
    #[instrument(skip(self), fields(command = ?self.config.command()))]
    fn launch(&self, position: &str) -> Result<EngineHandle, EngineError> {
        let (program, leading) = self
            .config
            .command()
            .split_first()
            .ok_or_else(|| EngineError::new("Engine command is empty"))?;

        debug!(program = %program, "Spawning engine process");
        let mut child = Command::new(program)
            .args(leading)
            .arg("analyze")
            .arg(position)
            .arg("--limit")
            .arg(self.config.time_limit())
            .arg("--table-mem")
            .arg(self.config.table_mem())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::new(format!("Failed to spawn {}: {}", program, e)))?;

        let stderr = child.stderr.take().ok_or_else(|| {
            tracing::error!("Failed to capture engine stderr");
            EngineError::new("Failed to capture engine stderr")
        })?;

        info!(pid = ?child.id(), "Engine process started");
        Ok(EngineHandle::new(
            Box::new(ProcessControl::new(child)),
            Box::new(stderr),
        ))
    }
}

/// Signal-based control of an engine child process.
///
/// On unix, pause and resume deliver `SIGSTOP` / `SIGCONT` and terminate
/// sends `SIGCONT` followed by `SIGTERM` (a stopped process does not act on
/// `SIGTERM`). Elsewhere pause and resume are unsupported no-ops and
/// terminate kills the process.
#[derive(Debug, new)]
pub struct ProcessControl {
    child: Child,
}

#[cfg(unix)]
impl ProcessControl {
    fn signal(&self, signal: nix::sys::signal::Signal) -> Result<(), EngineError> {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        let pid = self
            .child
            .id()
            .ok_or_else(|| EngineError::new("Engine process has already been reaped"))?;
        let pid = i32::try_from(pid)
            .map_err(|_| EngineError::new(format!("Process id {} out of range", pid)))?;
        kill(Pid::from_raw(pid), signal)
            .map_err(|e| EngineError::new(format!("Failed to send {}: {}", signal, e)))
    }
}

impl EngineControl for ProcessControl {
    #[instrument(skip(self), fields(pid = ?self.child.id()))]
    fn pause(&mut self) -> Result<(), EngineError> {
        #[cfg(unix)]
        {
            self.signal(nix::sys::signal::Signal::SIGSTOP)
        }
        #[cfg(not(unix))]
        {
            warn!("Pausing the engine is not supported on this platform");
            Ok(())
        }
    }

    #[instrument(skip(self), fields(pid = ?self.child.id()))]
    fn resume(&mut self) -> Result<(), EngineError> {
        #[cfg(unix)]
        {
            self.signal(nix::sys::signal::Signal::SIGCONT)
        }
        #[cfg(not(unix))]
        {
            Ok(())
        }
    }

    #[instrument(skip(self), fields(pid = ?self.child.id()))]
    fn terminate(&mut self) -> Result<(), EngineError> {
        #[cfg(unix)]
        {
            if let Err(e) = self.signal(nix::sys::signal::Signal::SIGCONT) {
                warn!(error = %e, "Failed to resume engine before terminating");
            }
            self.signal(nix::sys::signal::Signal::SIGTERM)
        }
        #[cfg(not(unix))]
        {
            self.child.start_kill().map_err(EngineError::from)
        }
    }
}
