//! Ultimate tic-tac-toe move tree with live engine analysis.
//!
//! A [`MatchController`] owns a [`GameTree`] of positions and a cursor
//! into it. Every position runs its own external engine through an
//! [`AnalysisSession`]; only the position under the cursor runs at full
//! speed, the others are paused and keep what they have computed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_analysis::{Analyzer, EngineConfig, MatchController, ProcessLauncher};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = EngineConfig::default();
//! let launcher = Arc::new(ProcessLauncher::new(config.clone()));
//! let analyzer = Analyzer::new(launcher, config.limits(), tokio::runtime::Handle::current());
//! let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! let mut controller = MatchController::new(analyzer, tx);
//! controller.load_hero("NW/C C/SE")?;
//! controller.forward();
//! println!("{}", controller.render_tree());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod controller;
mod engine;
mod error;
mod event;
mod render;
mod report;
mod script;
mod session;
mod tree;

// Crate-level exports - Configuration
pub use config::{ENGINE_PATH_VAR, EngineConfig, StreamLimits};

// Crate-level exports - Errors
pub use error::{ConfigError, EngineError};

// Crate-level exports - Engine plumbing
pub use engine::{EngineControl, EngineHandle, EngineLauncher, ProcessControl, ProcessLauncher};
pub use report::{EngineReport, EvalSmoother, ReportError};
pub use session::{Analysis, AnalysisSession, Analyzer, SessionState};

// Crate-level exports - Tree and controller
pub use controller::{MatchController, MatchError};
pub use event::MatchEvent;
pub use render::{MoveText, Span};
pub use script::{ScriptError, parse_move, parse_script};
pub use tree::{GameTree, NodeId, Position, TreeError};
