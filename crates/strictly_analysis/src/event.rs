//! Notifications from the match to its front end.

use crate::tree::NodeId;
use serde::{Deserialize, Serialize};

/// Messages sent from the controller and sessions to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// The cursor moved or the tree changed shape.
    PositionChanged,
    /// New analysis is available for `node`.
    ///
    /// Front ends should ignore events for nodes other than the current
    /// one; a session may report once more between navigation and
    /// unsubscription.
    EvaluationChanged {
        /// Node whose analysis changed.
        node: NodeId,
    },
}
