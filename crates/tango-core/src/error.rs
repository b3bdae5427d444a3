//! Domain error types.
//!
//! File plumbing uses `anyhow` with context; these enums cover the failures
//! callers need to tell apart.

use thiserror::Error;

use crate::vocab::ItemKind;

/// Errors raised while loading a vocabulary feed. Always fatal.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A word row did not carry exactly five fields.
    #[error("malformed word row at line {line}: expected 5 fields, found {found}")]
    MalformedRow { line: usize, found: usize },

    /// The word feed had no header row.
    #[error("word feed is empty (missing header row)")]
    MissingHeader,
}

/// Errors raised when turning an item into a question.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    /// Every quiz-able field of the item is burned or ineligible.
    #[error("no field left to ask for {kind} #{index}")]
    FieldsExhausted { kind: ItemKind, index: usize },
}

/// Errors in a line typed during a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// `-f` or `-a` was given without any text.
    #[error("'{flag}' needs some text after it")]
    MissingText { flag: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_item() {
        let err = QuestionError::FieldsExhausted {
            kind: ItemKind::Word,
            index: 12,
        };
        assert_eq!(err.to_string(), "no field left to ask for word #12");

        let err = FeedError::MalformedRow { line: 3, found: 4 };
        assert!(err.to_string().contains("line 3"));
    }
}
