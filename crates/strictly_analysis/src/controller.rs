//! The match controller: a cursor over the move tree.
//!
//! Every cursor change goes through [`MatchController::navigate_to`], which
//! pauses the engine of the position being left and resumes the one being
//! entered, so at most one engine runs at full speed under normal use.

use crate::event::MatchEvent;
use crate::render::{self, MoveText};
use crate::script::{ScriptError, parse_script};
use crate::session::{Analysis, Analyzer};
use crate::tree::{GameTree, NodeId, Position, TreeError};
use derive_more::{Display, Error};
use std::collections::HashMap;
use strictly_ultimate::Move;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

/// Errors raised by controller operations.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MatchError {
    /// The id does not name a live node.
    #[display("Unknown node {}", node)]
    UnknownNode {
        /// The offending id.
        node: NodeId,
    },

    /// The key was not produced by the latest render, or its node is gone.
    #[display("No position linked as {:?}", key)]
    LinkNotFound {
        /// The unresolved key.
        #[error(not(source))]
        key: String,
    },

    /// A tree mutation failed.
    #[display("{}", source)]
    Tree {
        /// Underlying tree error.
        source: TreeError,
    },

    /// A script could not be parsed.
    #[display("{}", source)]
    Script {
        /// Underlying script error.
        source: ScriptError,
    },
}

impl From<TreeError> for MatchError {
    fn from(source: TreeError) -> Self {
        match source {
            TreeError::UnknownNode { node } => Self::UnknownNode { node },
            source => Self::Tree { source },
        }
    }
}

impl From<ScriptError> for MatchError {
    fn from(source: ScriptError) -> Self {
        Self::Script { source }
    }
}

/// Owns the move tree and the cursor into it.
#[derive(Debug)]
pub struct MatchController {
    tree: GameTree,
    current: NodeId,
    links: HashMap<String, NodeId>,
    events: UnboundedSender<MatchEvent>,
}

impl MatchController {
    /// Creates a match at the empty board and starts analysing it.
    ///
    /// Events for the front end are sent on `events`.
    #[instrument(skip_all)]
    pub fn new(analyzer: Analyzer, events: UnboundedSender<MatchEvent>) -> Self {
        let tree = GameTree::new(analyzer);
        let current = tree.root();
        tree.subscribe(current, events.clone());
        info!(node = %current, "Match started");
        Self {
            tree,
            current,
            links: HashMap::new(),
            events,
        }
    }

    /// Moves the cursor to `target`.
    ///
    /// The outgoing position's engine is paused and stops reporting; the
    /// incoming one is resumed and reports to the front end.
    #[instrument(skip(self), fields(from = %self.current))]
    pub fn navigate_to(&mut self, target: NodeId) -> Result<(), MatchError> {
        if !self.tree.contains(target) {
            return Err(MatchError::UnknownNode { node: target });
        }

        let previous = self.current;
        if previous != target {
            self.tree.pause_evaluation(previous);
            self.tree.unsubscribe(previous);
        }
        self.current = target;
        self.tree.subscribe(target, self.events.clone());
        self.tree.resume_evaluation(target);

        debug!(to = %target, "Cursor moved");
        self.emit(MatchEvent::PositionChanged);
        self.emit(MatchEvent::EvaluationChanged { node: target });
        Ok(())
    }

    /// Plays `mv` from the current position.
    ///
    /// An existing line for the move is reused; otherwise a new line is
    /// appended. Either way the cursor moves onto it. Only occupied cells
    /// are refused; the forced sub-board is not enforced.
    #[instrument(skip(self), fields(from = %self.current, mv = %mv))]
    pub fn add_move(&mut self, mv: Move) -> Result<NodeId, MatchError> {
        let target = match self.tree.find_line(self.current, mv) {
            Some(existing) => {
                debug!(node = %existing, "Reusing existing line");
                existing
            }
            None => self.tree.add_line(self.current, mv)?,
        };
        self.navigate_to(target)?;
        Ok(target)
    }

    /// Steps to the parent. Returns whether the cursor moved.
    pub fn back(&mut self) -> bool {
        let parent = *self.current_position().parent();
        self.step(parent)
    }

    /// Steps into the main line. Returns whether the cursor moved.
    pub fn forward(&mut self) -> bool {
        let next = self.current_position().main_line();
        self.step(next)
    }

    /// Steps to the previous sibling line. Returns whether the cursor moved.
    pub fn previous_line(&mut self) -> bool {
        let sibling = self.sibling(-1);
        self.step(sibling)
    }

    /// Steps to the next sibling line. Returns whether the cursor moved.
    pub fn next_line(&mut self) -> bool {
        let sibling = self.sibling(1);
        self.step(sibling)
    }

    /// Discards the current position and its subtree, moving to the parent.
    ///
    /// Returns `false` at the root, which cannot be deleted.
    #[instrument(skip(self), fields(node = %self.current))]
    pub fn delete_current(&mut self) -> bool {
        let doomed = self.current;
        let Some(parent) = *self.current_position().parent() else {
            debug!("Root cannot be deleted");
            return false;
        };
        if let Err(e) = self.navigate_to(parent) {
            warn!(error = %e, "Failed to move to parent before delete");
            return false;
        }
        if let Err(e) = self.tree.remove_line(doomed) {
            warn!(error = %e, "Failed to remove line");
            return false;
        }
        info!(parent = %parent, "Deleted line");
        self.emit(MatchEvent::PositionChanged);
        true
    }

    /// Renders the whole tree and refreshes the link map.
    #[instrument(skip(self))]
    pub fn render_tree(&mut self) -> MoveText {
        render::render_tree(&self.tree, self.current, &mut self.links)
    }

    /// Finds the node a rendered link points at.
    ///
    /// Only keys from the most recent [`render_tree`](Self::render_tree)
    /// resolve, and only while their node still exists.
    pub fn resolve_link(&self, key: &str) -> Result<NodeId, MatchError> {
        self.links
            .get(key)
            .copied()
            .filter(|&node| self.tree.contains(node))
            .ok_or_else(|| MatchError::LinkNotFound {
                key: key.to_string(),
            })
    }

    /// Moves the cursor to the node a rendered link points at.
    #[instrument(skip(self))]
    pub fn follow_link(&mut self, key: &str) -> Result<NodeId, MatchError> {
        let target = self.resolve_link(key)?;
        self.navigate_to(target)?;
        Ok(target)
    }

    /// Replays `moves` from the root, then returns the cursor to the root.
    ///
    /// Stops at the first refused move; the cursor still ends at the root.
    #[instrument(skip(self, moves), fields(count = moves.len()))]
    pub fn load_script(&mut self, moves: &[Move]) -> Result<(), MatchError> {
        let root = self.tree.root();
        self.navigate_to(root)?;
        let replayed = moves.iter().try_for_each(|&mv| self.add_move(mv).map(|_| ()));
        self.navigate_to(root)?;
        replayed?;
        info!(count = moves.len(), "Loaded script");
        Ok(())
    }

    /// Parses a compass-notation script and loads it.
    pub fn load_hero(&mut self, script: &str) -> Result<(), MatchError> {
        let moves = parse_script(script)?;
        self.load_script(&moves)
    }

    /// The node under the cursor.
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// The move tree.
    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    /// Serialized current position.
    pub fn position_key(&self) -> String {
        self.current_position().serialize()
    }

    /// Whether the next mark may go on any open sub-board.
    pub fn all_boards_open(&self) -> bool {
        self.current_position().next_active_subboard().is_none()
    }

    /// Latest analysis of the current position.
    pub fn analysis(&self) -> Analysis {
        self.current_position().analysis()
    }

    /// Smoothed evaluation of the current position.
    pub fn evaluation(&self) -> f64 {
        *self.analysis().evaluation()
    }

    /// Deepest search depth reported for the current position.
    pub fn depth(&self) -> u32 {
        *self.analysis().depth()
    }

    /// Best move reported for the current position.
    pub fn best_move(&self) -> Option<String> {
        self.analysis().best_move().clone()
    }

    /// Stops every engine in the tree.
    #[instrument(skip(self))]
    pub fn shutdown(&mut self) {
        let root = self.tree.root();
        self.tree.stop_evaluation(root);
        info!("Match shut down");
    }

    fn current_position(&self) -> &Position {
        self.tree
            .get(self.current)
            .unwrap_or_else(|| unreachable!("cursor {} is always live", self.current))
    }

    fn sibling(&self, offset: isize) -> Option<NodeId> {
        let parent = (*self.current_position().parent())?;
        let lines = self.tree.get(parent)?.lines();
        let index = lines.iter().position(|&id| id == self.current)?;
        lines.get(index.checked_add_signed(offset)?).copied()
    }

    fn step(&mut self, target: Option<NodeId>) -> bool {
        match target {
            Some(target) => self.navigate_to(target).is_ok(),
            None => false,
        }
    }

    fn emit(&self, event: MatchEvent) {
        if self.events.send(event).is_err() {
            debug!(?event, "Event receiver dropped");
        }
    }
}
