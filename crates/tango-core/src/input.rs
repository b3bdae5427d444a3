//! Grammar for one line typed at the prompt.
//!
//! Besides plain answers, a line may carry a retroactive command aimed at
//! the previous question: `-f <text>` forbids an answer, `-a <text>` adds an
//! accepted answer, `-b` burns and `-u` unburns.

use crate::error::InputError;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Forbid(String),
    AddAnswer(String),
    Burn,
    Unburn,
    Empty,
    Answer(String),
}

impl Input {
    /// Parse one line. Surrounding whitespace (including the newline) is
    /// ignored.
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Input::Empty);
        }

        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default();
        let text = words.collect::<Vec<_>>().join(" ");

        match head {
            "-f" | "-a" => {
                if text.is_empty() {
                    let flag = if head == "-f" { "-f" } else { "-a" };
                    return Err(InputError::MissingText { flag });
                }
                Ok(if head == "-f" {
                    Input::Forbid(text)
                } else {
                    Input::AddAnswer(text)
                })
            }
            "-b" => Ok(Input::Burn),
            "-u" => Ok(Input::Unburn),
            _ => Ok(Input::Answer(line.to_string())),
        }
    }

    /// Whether this input targets the previous question.
    pub fn is_retroactive(&self) -> bool {
        matches!(
            self,
            Input::Forbid(_) | Input::AddAnswer(_) | Input::Burn | Input::Unburn
        )
    }
}
