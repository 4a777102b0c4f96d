//! The move tree: an arena of positions linked parent to children.
//!
//! Nodes are addressed by [`NodeId`]. Children are owned through the
//! parent's ordered `lines`; the parent link is a plain id. Removing a
//! subtree vacates its slots, which are never handed out again, so a stale
//! id resolves to nothing rather than to an unrelated node.

use crate::event::MatchEvent;
use crate::session::{Analysis, AnalysisSession, Analyzer, SessionState};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use strictly_ultimate::{BoardState, Mark, Move, MoveError, Notation};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument};

/// Stable identifier of a node in a [`GameTree`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[display("#{}", _0)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Errors raised by tree mutations.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TreeError {
    /// The id does not name a live node.
    #[display("Unknown node {}", node)]
    UnknownNode {
        /// The offending id.
        node: NodeId,
    },

    /// The parent already has a line starting with this move.
    #[display("Line {} already exists", mv)]
    DuplicateLine {
        /// The repeated move.
        mv: Move,
    },

    /// The move cannot be placed on the parent's board.
    #[display("Invalid move: {}", source)]
    Move {
        /// Underlying move error.
        source: MoveError,
    },

    /// The root cannot be removed.
    #[display("The root position cannot be removed")]
    RootRemoval,
}

impl From<MoveError> for TreeError {
    fn from(source: MoveError) -> Self {
        Self::Move { source }
    }
}

/// A node of the move tree.
#[derive(Debug, Getters)]
pub struct Position {
    /// Side to move.
    turn: Mark,
    /// Board after the move that produced this node.
    cells: BoardState,
    /// Move that produced this node; `None` only at the root.
    last_move: Option<Move>,
    /// Distance from the root.
    move_number: u32,
    /// Parent node; `None` only at the root.
    parent: Option<NodeId>,
    /// Child lines in discovery order; the first is the main line.
    lines: Vec<NodeId>,
    #[getter(skip)]
    session: AnalysisSession,
}

impl Position {
    /// Canonical notation of this position.
    pub fn notation(&self) -> Notation {
        Notation::new(self.turn, self.cells, self.last_move)
    }

    /// Serialized position: engine input and link identity.
    pub fn serialize(&self) -> String {
        self.notation().to_string()
    }

    /// Sub-board the next mark is forced into, if any.
    pub fn next_active_subboard(&self) -> Option<usize> {
        self.cells.active_subboard(self.last_move)
    }

    /// First child, continuing the main line.
    pub fn main_line(&self) -> Option<NodeId> {
        self.lines.first().copied()
    }

    /// Latest analysis results.
    pub fn analysis(&self) -> Analysis {
        self.session.analysis()
    }

    /// Lifecycle state of this node's engine.
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// The node's analysis session.
    pub fn session_mut(&mut self) -> &mut AnalysisSession {
        &mut self.session
    }
}

/// Arena of positions rooted at the empty board.
#[derive(Debug)]
pub struct GameTree {
    nodes: Vec<Option<Position>>,
    root: NodeId,
    analyzer: Analyzer,
}

impl GameTree {
    /// Creates a tree holding only the empty board, with analysis started.
    #[instrument(skip(analyzer))]
    pub fn new(analyzer: Analyzer) -> Self {
        let root = NodeId(0);
        let cells = BoardState::new();
        let position = Notation::new(Mark::X, cells, None).to_string();
        let session = AnalysisSession::start(root, &position, Mark::X, &analyzer);
        info!(node = %root, "Created game tree");
        Self {
            nodes: vec![Some(Position {
                turn: Mark::X,
                cells,
                last_move: None,
                move_number: 0,
                parent: None,
                lines: Vec::new(),
                session,
            })],
            root,
            analyzer,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Looks up a live node.
    pub fn get(&self, node: NodeId) -> Option<&Position> {
        self.nodes.get(node.0).and_then(Option::as_ref)
    }

    /// Looks up a live node mutably.
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Position> {
        self.nodes.get_mut(node.0).and_then(Option::as_mut)
    }

    /// Looks up a live node, failing for stale or unknown ids.
    pub fn position(&self, node: NodeId) -> Result<&Position, TreeError> {
        self.get(node).ok_or(TreeError::UnknownNode { node })
    }

    fn position_mut(&mut self, node: NodeId) -> Result<&mut Position, TreeError> {
        self.get_mut(node).ok_or(TreeError::UnknownNode { node })
    }

    /// Whether `node` names a live node.
    pub fn contains(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Whether nothing has been played from the root.
    pub fn has_only_root(&self) -> bool {
        self.node_count() == 1
    }

    /// Child of `node` reached by `mv`, if that line exists.
    pub fn find_line(&self, node: NodeId, mv: Move) -> Option<NodeId> {
        self.get(node)?
            .lines
            .iter()
            .copied()
            .find(|&child| self.get(child).and_then(|p| p.last_move) == Some(mv))
    }

    /// Appends a new line to `parent` and starts its analysis.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateLine`] if the move already has a line (look it
    /// up with [`GameTree::find_line`] first), [`TreeError::Move`] if the
    /// target cell is occupied.
    #[instrument(skip(self), fields(parent = %parent, mv = %mv))]
    pub fn add_line(&mut self, parent: NodeId, mv: Move) -> Result<NodeId, TreeError> {
        if self.find_line(parent, mv).is_some() {
            return Err(TreeError::DuplicateLine { mv });
        }
        let origin = self.position(parent)?;
        let turn = origin.turn;
        let cells = origin.cells.with_mark(mv, turn)?;
        let move_number = origin.move_number + 1;

        let id = NodeId(self.nodes.len());
        let next = turn.opponent();
        let position = Notation::new(next, cells, Some(mv)).to_string();
        let session = AnalysisSession::start(id, &position, next, &self.analyzer);
        self.nodes.push(Some(Position {
            turn: next,
            cells,
            last_move: Some(mv),
            move_number,
            parent: Some(parent),
            lines: Vec::new(),
            session,
        }));
        self.position_mut(parent)?.lines.push(id);

        info!(node = %id, move_number, "Added line");
        Ok(id)
    }

    /// Suspends the analysis of `node` only.
    #[instrument(skip(self))]
    pub fn pause_evaluation(&mut self, node: NodeId) {
        if let Some(position) = self.get_mut(node) {
            position.session.pause();
        }
    }

    /// Continues the analysis of `node` only.
    #[instrument(skip(self))]
    pub fn resume_evaluation(&mut self, node: NodeId) {
        if let Some(position) = self.get_mut(node) {
            position.session.resume();
        }
    }

    /// Terminates the analysis of `node` and all its descendants.
    #[instrument(skip(self))]
    pub fn stop_evaluation(&mut self, node: NodeId) {
        for id in self.subtree(node) {
            if let Some(position) = self.get_mut(id) {
                position.session.terminate();
            }
        }
    }

    /// Routes evaluation updates of `node` to `subscriber`.
    pub fn subscribe(&self, node: NodeId, subscriber: UnboundedSender<MatchEvent>) {
        if let Some(position) = self.get(node) {
            position.session.subscribe(subscriber);
        }
    }

    /// Stops routing evaluation updates of `node`.
    pub fn unsubscribe(&self, node: NodeId) {
        if let Some(position) = self.get(node) {
            position.session.unsubscribe();
        }
    }

    /// Detaches `node` from its parent and discards it with its subtree.
    #[instrument(skip(self))]
    pub fn remove_line(&mut self, node: NodeId) -> Result<(), TreeError> {
        let parent = self
            .position(node)?
            .parent
            .ok_or(TreeError::RootRemoval)?;
        self.position_mut(parent)?.lines.retain(|&child| child != node);

        self.stop_evaluation(node);
        let removed = self.subtree(node);
        for id in &removed {
            self.nodes[id.0] = None;
        }
        info!(node = %node, removed = removed.len(), "Removed line");
        Ok(())
    }

    /// `node` and all its live descendants, parents before children.
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(position) = self.get(id) {
                out.push(id);
                stack.extend(position.lines.iter().rev());
            }
        }
        debug!(node = %node, size = out.len(), "Collected subtree");
        out
    }
}
