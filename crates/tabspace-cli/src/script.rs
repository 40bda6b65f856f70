//! Line-oriented session scripts
//!
//! One command per line; blank lines and `#` comments are skipped.

use std::str::FromStr;
use tabspace_core::PaneId;

/// Script parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ScriptError {
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: `{command}` needs an argument")]
    MissingArgument { line: usize, command: &'static str },

    #[error("line {line}: {reason}")]
    InvalidArgument { line: usize, reason: String },
}

/// One script step
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Open { route: String, force_new: bool },
    Close,
    Split,
    Unsplit,
    Move(PaneId),
    Pin,
    Back,
    Forward,
    Url(String),
    Switch(String),
    Show,
}

pub(crate) fn parse_script(source: &str) -> Result<Vec<Command>, ScriptError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let line = raw.trim();
            (!line.is_empty() && !line.starts_with('#')).then(|| parse_line(idx + 1, line))
        })
        .collect()
}

fn parse_line(line: usize, text: &str) -> Result<Command, ScriptError> {
    let (word, rest) = text
        .split_once(char::is_whitespace)
        .map_or((text, ""), |(w, r)| (w, r.trim()));
    let arg = |command: &'static str| {
        if rest.is_empty() {
            Err(ScriptError::MissingArgument { line, command })
        } else {
            Ok(rest.to_string())
        }
    };

    Ok(match word {
        "open" => Command::Open {
            route: arg("open")?,
            force_new: false,
        },
        "open!" => Command::Open {
            route: arg("open!")?,
            force_new: true,
        },
        "close" => Command::Close,
        "split" => Command::Split,
        "unsplit" => Command::Unsplit,
        "move" => {
            let pane = PaneId::from_str(&arg("move")?)
                .map_err(|reason| ScriptError::InvalidArgument { line, reason })?;
            Command::Move(pane)
        }
        "pin" => Command::Pin,
        "back" => Command::Back,
        "forward" => Command::Forward,
        "url" => Command::Url(arg("url")?),
        "switch" => Command::Switch(arg("switch")?),
        "show" => Command::Show,
        other => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: other.to_string(),
            })
        }
    })
}

/// Space ids a script switches to
pub(crate) fn referenced_spaces(commands: &[Command]) -> Vec<String> {
    let mut ids: Vec<String> = commands
        .iter()
        .filter_map(|c| match c {
            Command::Switch(id) => Some(id.clone()),
            _ => None,
        })
        .collect();
    ids.sort();
    ids.dedup();
    ids
}
