//! Interactive prompt driving a [`MatchController`] from stdin.

use anyhow::Result;
use derive_more::{Display, Error};
use strictly_analysis::{MatchController, MatchEvent, parse_move};
use strictly_ultimate::Move;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, instrument, warn};

const HELP: &str = "\
Commands:
  move <DIR>/<DIR>   play a move (DIR is one of NW N NE W C E SW S SE)
  back | forward     step to the parent or into the main line
  prev | next        step to the previous or next sibling line
  delete             discard the current line
  tree               show the move tree
  markup             show the move tree as markup
  json               show the move tree as JSON spans
  link <key>         jump to a position shown by the last tree
  eval               show the current analysis
  help               show this help
  quit               stop every engine and exit";

/// A parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play a move from the current position.
    Move(Move),
    /// Step to the parent.
    Back,
    /// Step into the main line.
    Forward,
    /// Step to the previous sibling line.
    Previous,
    /// Step to the next sibling line.
    Next,
    /// Discard the current line.
    Delete,
    /// Print the tree as plain text.
    Tree,
    /// Print the tree as markup.
    Markup,
    /// Print the tree's spans as JSON.
    Json,
    /// Follow a rendered link.
    Link(String),
    /// Print the current analysis.
    Eval,
    /// Print the command list.
    Help,
    /// Leave the prompt.
    Quit,
}

/// A prompt line that is not a command.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum CommandError {
    /// Blank line.
    #[display("Empty command")]
    Empty,
    /// Command word not recognised.
    #[display("Unknown command {:?}, try \"help\"", word)]
    Unknown {
        /// The unrecognised word.
        #[error(not(source))]
        word: String,
    },
    /// Command given without its argument.
    #[display("{} needs an argument", command)]
    MissingArgument {
        /// The incomplete command.
        #[error(not(source))]
        command: String,
    },
    /// Move argument that does not parse.
    #[display("{}", message)]
    BadMove {
        /// Parse failure description.
        #[error(not(source))]
        message: String,
    },
}

impl std::str::FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let word = words.next().ok_or(CommandError::Empty)?;
        let argument = |command: &str, arg: Option<&str>| {
            arg.map(str::to_string)
                .ok_or_else(|| CommandError::MissingArgument {
                    command: command.to_string(),
                })
        };

        match word.to_ascii_lowercase().as_str() {
            "move" | "m" => {
                let token = argument("move", words.next())?;
                parse_move(&token)
                    .map(Command::Move)
                    .map_err(|e| CommandError::BadMove {
                        message: e.to_string(),
                    })
            }
            "back" | "b" => Ok(Command::Back),
            "forward" | "f" => Ok(Command::Forward),
            "prev" | "p" => Ok(Command::Previous),
            "next" | "n" => Ok(Command::Next),
            "delete" | "d" => Ok(Command::Delete),
            "tree" | "t" => Ok(Command::Tree),
            "markup" => Ok(Command::Markup),
            "json" => Ok(Command::Json),
            "link" | "l" => Ok(Command::Link(argument("link", words.next())?)),
            "eval" | "e" => Ok(Command::Eval),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown {
                word: other.to_string(),
            }),
        }
    }
}

/// Runs the prompt until `quit` or end of input, then stops every engine.
#[instrument(skip_all)]
pub async fn run(
    mut controller: MatchController,
    mut events: UnboundedReceiver<MatchEvent>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);
    show_position(&controller);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("End of input");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => apply(&mut controller, command),
                    Err(e) => println!("{}", e),
                }
            }
            Some(event) = events.recv() => {
                if let MatchEvent::EvaluationChanged { node } = event
                    && node == controller.current()
                {
                    show_analysis(&controller);
                }
            }
        }
    }

    controller.shutdown();
    info!("Prompt closed");
    Ok(())
}

fn apply(controller: &mut MatchController, command: Command) {
    debug!(?command, "Applying command");
    let moved = match command {
        Command::Move(mv) => match controller.add_move(mv) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Move refused");
                println!("{}", e);
                false
            }
        },
        Command::Back => controller.back(),
        Command::Forward => controller.forward(),
        Command::Previous => controller.previous_line(),
        Command::Next => controller.next_line(),
        Command::Delete => controller.delete_current(),
        Command::Tree => {
            println!("{}", controller.render_tree());
            false
        }
        Command::Markup => {
            println!("{}", controller.render_tree().to_markup());
            false
        }
        Command::Json => {
            match serde_json::to_string_pretty(&controller.render_tree()) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!(error = %e, "Failed to serialize move text"),
            }
            false
        }
        Command::Link(key) => match controller.follow_link(&key) {
            Ok(_) => true,
            Err(e) => {
                println!("{}", e);
                false
            }
        },
        Command::Eval => {
            show_analysis(controller);
            false
        }
        Command::Help => {
            println!("{}", HELP);
            false
        }
        Command::Quit => false,
    };
    if moved {
        show_position(controller);
    }
}

fn show_position(controller: &MatchController) {
    let scope = if controller.all_boards_open() {
        "any board"
    } else {
        "forced board"
    };
    println!("{} {} ({})", controller.current(), controller.position_key(), scope);
}

fn show_analysis(controller: &MatchController) {
    let best = controller.best_move().unwrap_or_else(|| "-".to_string());
    println!(
        "eval {:+.1}  depth {}  best {}",
        controller.evaluation(),
        controller.depth(),
        best
    );
}
