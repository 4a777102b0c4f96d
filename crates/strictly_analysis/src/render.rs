//! Move-text rendering of the whole tree.
//!
//! The main line is written inline; every alternative line is nested as a
//! variation just before the main-line move it replaces. A move number
//! precedes each of X's main-line moves; a variation's first move has none.
//! Each move carries the serialized position it leads to, which serves as
//! its link identity.

use crate::tree::{GameTree, NodeId, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strictly_ultimate::Mark;
use tracing::instrument;

/// One styled piece of move text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Span {
    /// Move-pair number, shown before X's move.
    MoveNumber {
        /// 1-based move-pair number.
        number: u32,
    },
    /// A move linking to the position it produces.
    Move {
        /// Two-letter move notation.
        notation: String,
        /// Serialized position reached by the move.
        key: String,
        /// Whether this is the displayed position.
        current: bool,
    },
    /// An alternative line.
    Variation {
        /// The line's own spans.
        spans: Vec<Span>,
    },
}

/// Rendered move text of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveText {
    spans: Vec<Span>,
}

impl MoveText {
    /// Top-level spans.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Whether nothing has been played.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Rich-text markup: bold current move, anchors keyed by position,
    /// superscript move numbers, small parenthesised variations.
    pub fn to_markup(&self) -> String {
        markup(&self.spans).trim().to_string()
    }
}

fn markup(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::MoveNumber { number } => {
                out.push_str(&format!("<sup><i>{}</i></sup>", number));
            }
            Span::Move {
                notation,
                key,
                current,
            } => {
                let text = if *current {
                    format!("<b>{}</b>", notation)
                } else {
                    notation.clone()
                };
                out.push_str(&format!(
                    "<a href='{}' style='text-decoration:none;color:black'>{}</a> ",
                    key, text
                ));
            }
            Span::Variation { spans } => {
                out.push_str(&format!(" <small>({})</small> ", markup(spans).trim()));
            }
        }
    }
    out
}

fn plain(spans: &[Span]) -> String {
    let words: Vec<String> = spans
        .iter()
        .map(|span| match span {
            Span::MoveNumber { number } => format!("{}.", number),
            Span::Move {
                notation, current, ..
            } if *current => format!("[{}]", notation),
            Span::Move { notation, .. } => notation.clone(),
            Span::Variation { spans } => format!("({})", plain(spans)),
        })
        .collect();
    words.join(" ")
}

impl std::fmt::Display for MoveText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", plain(&self.spans))
    }
}

/// Renders the tree from its root, refilling `links` with every rendered
/// position.
#[instrument(skip(tree, links))]
pub(crate) fn render_tree(
    tree: &GameTree,
    current: NodeId,
    links: &mut HashMap<String, NodeId>,
) -> MoveText {
    links.clear();
    let mut spans = Vec::new();
    let mut renderer = Renderer {
        tree,
        current,
        links,
    };
    renderer.line(tree.root(), &mut spans);
    MoveText { spans }
}

struct Renderer<'a> {
    tree: &'a GameTree,
    current: NodeId,
    links: &'a mut HashMap<String, NodeId>,
}

impl Renderer<'_> {
    /// Writes the line starting at `start`: `start` itself (unless it is
    /// the root), then its main line. At each branch the move number comes
    /// first, then the alternatives, then the main-line move.
    fn line(&mut self, start: NodeId, spans: &mut Vec<Span>) {
        let tree = self.tree;
        let Some(first) = tree.get(start) else {
            return;
        };
        if first.last_move().is_some() {
            self.play(start, first, spans);
        }

        let mut node = start;
        while let Some(position) = tree.get(node)
            && let Some((&main, alternatives)) = position.lines().split_first()
        {
            let Some(child) = tree.get(main) else {
                break;
            };
            // O to move after the child means X just played.
            if *child.turn() == Mark::O {
                spans.push(Span::MoveNumber {
                    number: child.move_number().div_ceil(2),
                });
            }
            for &alternative in alternatives {
                let mut nested = Vec::new();
                self.line(alternative, &mut nested);
                spans.push(Span::Variation { spans: nested });
            }
            self.play(main, child, spans);
            node = main;
        }
    }

    /// Writes one move and records its link.
    fn play(&mut self, id: NodeId, position: &Position, spans: &mut Vec<Span>) {
        let Some(mv) = *position.last_move() else {
            return;
        };
        let key = position.serialize();
        self.links.insert(key.clone(), id);
        spans.push(Span::Move {
            notation: mv.notation(),
            key,
            current: id == self.current,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MoveText {
        MoveText {
            spans: vec![
                Span::MoveNumber { number: 1 },
                Span::Move {
                    notation: "ae".to_string(),
                    key: "k1".to_string(),
                    current: false,
                },
                Span::Variation {
                    spans: vec![Span::Move {
                        notation: "ei".to_string(),
                        key: "k3".to_string(),
                        current: false,
                    }],
                },
                Span::Move {
                    notation: "ea".to_string(),
                    key: "k2".to_string(),
                    current: true,
                },
            ],
        }
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(sample().to_string(), "1. ae (ei) [ea]");
    }

    #[test]
    fn test_markup() {
        assert_eq!(
            sample().to_markup(),
            "<sup><i>1</i></sup>\
             <a href='k1' style='text-decoration:none;color:black'>ae</a>  \
             <small>(<a href='k3' style='text-decoration:none;color:black'>ei</a>)</small> \
             <a href='k2' style='text-decoration:none;color:black'><b>ea</b></a>"
        );
    }

    #[test]
    fn test_spans_serialize_with_kind_tag() {
        let json = serde_json::to_value(&sample()).unwrap();
        assert_eq!(json["spans"][0]["kind"], "move_number");
        assert_eq!(json["spans"][2]["spans"][0]["notation"], "ei");
        assert_eq!(json["spans"][3]["current"], true);
    }
}
