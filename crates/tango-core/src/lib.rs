//! tango-core — Adaptive question engine for Japanese vocabulary drills.
//!
//! This crate holds the vocabulary model, the per-item learner state files,
//! question field selection, fuzzy answer scoring, and the interactive
//! session loop. The `tango` binary is a thin wrapper around it.

pub mod error;
pub mod evaluate;
pub mod input;
pub mod question;
pub mod session;
pub mod stats;
pub mod store;
pub mod vocab;

pub use error::{FeedError, InputError, QuestionError};
pub use evaluate::{score, Evaluation};
pub use question::Question;
pub use session::{Mode, Session, SessionScope, SessionSummary};
pub use store::AnnotationStore;
pub use vocab::{Item, ItemKind, Level, Vocabulary};
