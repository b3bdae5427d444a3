//! The ask / evaluate / record loop.
//!
//! A session builds its pool of questions once, then asks them one at a
//! time until the pool is empty or input runs out. Only the annotation
//! store outlives it.

use std::collections::VecDeque;
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::input::Input;
use crate::question::Question;
use crate::store::AnnotationStore;
use crate::vocab::{Item, ItemKind, Level, Vocabulary};

/// Which item kinds a session draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Words,
    Kanji,
    Both,
}

impl Mode {
    pub fn includes(self, kind: ItemKind) -> bool {
        matches!(
            (self, kind),
            (Mode::Both, _) | (Mode::Words, ItemKind::Word) | (Mode::Kanji, ItemKind::Kanji)
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Words => write!(f, "words"),
            Mode::Kanji => write!(f, "kanji"),
            Mode::Both => write!(f, "both"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "w" | "word" | "words" => Ok(Mode::Words),
            "k" | "kanji" => Ok(Mode::Kanji),
            "b" | "both" => Ok(Mode::Both),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Which items a session covers.
#[derive(Debug, Clone, Copy)]
pub struct SessionScope {
    pub level: Level,
    pub mode: Mode,
}

/// Tally of a finished (or interrupted) session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Items in scope left out because every field is burned.
    pub exhausted: usize,
    pub asked: usize,
    pub passed: usize,
    pub failed: usize,
    /// Turns ended with an empty response.
    pub skipped: usize,
}

/// An interactive drill over a pool of questions.
pub struct Session<'v> {
    vocab: &'v Vocabulary,
    pending: VecDeque<Question<'v>>,
    last: Option<Question<'v>>,
    initial_words: usize,
    initial_kanji: usize,
    remaining_words: usize,
    remaining_kanji: usize,
    summary: SessionSummary,
}

impl<'v> Session<'v> {
    /// Build the pool from every in-scope item that still has a field to ask.
    /// Items are kept in feed order, words first; call [`Session::shuffle`]
    /// to randomise.
    pub fn new(vocab: &'v Vocabulary, store: &AnnotationStore, scope: SessionScope) -> Self {
        let mut summary = SessionSummary::default();
        let mut pending = VecDeque::new();

        let feeds: [(ItemKind, &'v [Item]); 2] = [
            (ItemKind::Word, vocab.words()),
            (ItemKind::Kanji, vocab.kanji()),
        ];
        for (kind, items) in feeds {
            if !scope.mode.includes(kind) {
                continue;
            }
            for item in items.iter().filter(|i| i.in_level(scope.level)) {
                match Question::from_store(item, store) {
                    Ok(q) => pending.push_back(q),
                    Err(e) => {
                        tracing::debug!("skipping: {e}");
                        summary.exhausted += 1;
                    }
                }
            }
        }

        let count = |kind: ItemKind| pending.iter().filter(|q| q.item().kind() == kind).count();
        let initial_words = count(ItemKind::Word);
        let initial_kanji = count(ItemKind::Kanji);
        tracing::info!(
            level = %scope.level,
            mode = %scope.mode,
            words = initial_words,
            kanji = initial_kanji,
            exhausted = summary.exhausted,
            "session pool built"
        );

        Self {
            vocab,
            pending,
            last: None,
            initial_words,
            initial_kanji,
            remaining_words: initial_words,
            remaining_kanji: initial_kanji,
            summary,
        }
    }

    /// Shuffle the remaining questions.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pending.make_contiguous().shuffle(rng);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn total(&self) -> usize {
        self.initial_words + self.initial_kanji
    }

    /// The most recently completed question, target of retroactive commands.
    pub fn last_question(&self) -> Option<&Question<'v>> {
        self.last.as_ref()
    }

    /// Ask every pending question, reading answers from `input` and writing
    /// prompts and feedback to `output`. Stops early at end of input.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        store: &mut AnnotationStore,
        mut input: R,
        mut output: W,
    ) -> Result<SessionSummary> {
        let mut number = 1;
        while let Some(question) = self.pending.pop_front() {
            match question.item().kind() {
                ItemKind::Word => self.remaining_words -= 1,
                ItemKind::Kanji => self.remaining_kanji -= 1,
            }
            if !self.turn(question, number, store, &mut input, &mut output)? {
                tracing::info!("input closed, ending session early");
                break;
            }
            number += 1;
        }
        tracing::info!(
            asked = self.summary.asked,
            passed = self.summary.passed,
            failed = self.summary.failed,
            skipped = self.summary.skipped,
            "session finished"
        );
        Ok(self.summary)
    }

    fn progress(&self, number: usize) -> String {
        format!(
            "[{number}/{} (k:{}/{}, w:{}/{})]",
            self.total(),
            self.remaining_kanji,
            self.initial_kanji,
            self.remaining_words,
            self.initial_words
        )
    }

    /// One question turn. Returns `false` when input is exhausted before an
    /// answer was given.
    fn turn<R: BufRead, W: Write>(
        &mut self,
        question: Question<'v>,
        number: usize,
        store: &mut AnnotationStore,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool> {
        let item = question.item();
        let mut help = false;

        let response = loop {
            if help {
                for line in self.vocab.help_lines(item) {
                    writeln!(output, "\t{line}")?;
                }
            } else {
                writeln!(output, "{} {}", self.progress(number), question.prompt())?;
            }
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(false);
            }

            match Input::parse(&line) {
                Err(e) => writeln!(output, "{e}")?,
                Ok(Input::Empty) => {
                    if help || !self.vocab.has_help(item) {
                        break String::new();
                    }
                    help = true;
                }
                Ok(Input::Answer(text)) => break text,
                Ok(command) => self.apply_retroactive(&command, store, output)?,
            }
        };

        let eval = question.evaluate(&response, store);
        self.summary.asked += 1;
        if eval.passed {
            self.summary.passed += 1;
            writeln!(
                output,
                "Good ({}) : {}",
                eval.score_display(),
                question.answer_display(store)
            )?;
            if let Err(e) = question.record_success(store) {
                tracing::warn!("success not recorded for '{}': {e:#}", item.label());
                writeln!(output, "Could not record success: {e:#}")?;
            }
        } else {
            if eval.score.is_none() {
                self.summary.skipped += 1;
            } else {
                self.summary.failed += 1;
            }
            let forbid = question.forbid_display(store);
            let reveal = question.reveal_display();
            let mut feedback = format!(
                "Nop ({}) : {}",
                eval.score_display(),
                question.answer_display(store)
            );
            if !forbid.is_empty() {
                feedback.push_str(&format!(" (forbid = {forbid})"));
            }
            if !reveal.is_empty() {
                feedback.push_str(&format!("; {reveal}"));
            }
            writeln!(output, "{feedback}")?;
            if !help {
                for line in self.vocab.help_lines(item) {
                    writeln!(output, "\t{line}")?;
                }
            }
        }
        writeln!(output)?;

        self.last = Some(question);
        Ok(true)
    }

    fn apply_retroactive<W: Write>(
        &self,
        command: &Input,
        store: &mut AnnotationStore,
        output: &mut W,
    ) -> Result<()> {
        let Some(last) = self.last else {
            writeln!(output, "No previous question.")?;
            return Ok(());
        };
        let label = last.item().label();
        let field = last.field();

        let (applied, done) = match command {
            Input::Forbid(text) => (
                last.add_forbid(text, store),
                format!("Added forbidden answer '{text}' to '{label}' ({field})."),
            ),
            Input::AddAnswer(text) => (
                last.add_answer(text, store),
                format!("Added answer '{text}' to '{label}' ({field})."),
            ),
            Input::Burn => (last.burn(store), format!("'{label}' ({field}) has been burned.")),
            Input::Unburn => (
                last.unburn(store),
                format!("'{label}' ({field}) has been unburned."),
            ),
            Input::Empty | Input::Answer(_) => return Ok(()),
        };
        match applied {
            Ok(()) => writeln!(output, "{done}")?,
            Err(e) => {
                tracing::warn!("edit to '{label}' ({field}) not saved: {e:#}");
                writeln!(output, "Could not update '{label}' ({field}): {e:#}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::vocab::fixtures::{kanji, word};
    use crate::vocab::Field;

    fn vocab() -> Vocabulary {
        Vocabulary::from_parts(
            vec![
                word(0, "食べる", "たべる", "taberu", "to eat"),
                word(1, "学校", "がっこう", "gakkou", "school"),
            ],
            vec![
                kanji(0, "学", &["Study"], &[]),
                kanji(1, "校", &["School"], &[]),
            ],
        )
    }

    fn scope(mode: Mode) -> SessionScope {
        SessionScope {
            level: Level(5),
            mode,
        }
    }

    fn run(session: &mut Session, store: &mut AnnotationStore, input: &str) -> (SessionSummary, String) {
        let mut out = Vec::new();
        let summary = session
            .run(store, Cursor::new(input.to_string()), &mut out)
            .unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("w".parse::<Mode>().unwrap(), Mode::Words);
        assert_eq!("Kanji".parse::<Mode>().unwrap(), Mode::Kanji);
        assert_eq!("both".parse::<Mode>().unwrap(), Mode::Both);
        assert!("all".parse::<Mode>().is_err());
        assert!(Mode::Both.includes(ItemKind::Kanji));
        assert!(!Mode::Words.includes(ItemKind::Kanji));
    }

    #[test]
    fn pool_respects_mode_and_burns() {
        let vocab = vocab();
        let dir = tempfile::tempdir().unwrap();
        let mut store = AnnotationStore::open(dir.path());

        assert_eq!(Session::new(&vocab, &store, scope(Mode::Both)).pending(), 4);
        assert_eq!(Session::new(&vocab, &store, scope(Mode::Words)).pending(), 2);
        assert_eq!(Session::new(&vocab, &store, scope(Mode::Kanji)).pending(), 2);

        store.set_burned(Field::Meanings, 0, true).unwrap();
        let session = Session::new(&vocab, &store, scope(Mode::Kanji));
        assert_eq!(session.pending(), 1);
        assert_eq!(session.summary.exhausted, 1);

        let other_level = SessionScope {
            level: Level(1),
            mode: Mode::Both,
        };
        assert_eq!(Session::new(&vocab, &store, other_level).pending(), 0);
    }

    #[test]
    fn shuffle_keeps_every_question() {
        let vocab = vocab();
        let dir = tempfile::tempdir().unwrap();
        let store = AnnotationStore::open(dir.path());
        let mut session = Session::new(&vocab, &store, scope(Mode::Both));
        session.shuffle(&mut StdRng::seed_from_u64(7));
        assert_eq!(session.pending(), 4);
        assert_eq!(session.total(), 4);
    }

    #[test]
    fn answers_are_scored_and_recorded() {
        let vocab = vocab();
        let dir = tempfile::tempdir().unwrap();
        let mut store = AnnotationStore::open(dir.path());
        let mut session = Session::new(&vocab, &store, scope(Mode::Words));

        let (summary, out) = run(&mut session, &mut store, "to eat\nhospital\n");
        assert_eq!(summary.asked, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert!(out.contains("[1/2 (k:0/0, w:1/2)] 食べる, たべる : meaning ?"));
        assert!(out.contains("Good (1.00) : to eat"));
        assert!(out.contains("Nop ("));
        assert_eq!(store.successes(ItemKind::Word, 0), 1);
        assert_eq!(store.successes(ItemKind::Word, 1), 0);
    }

    #[test]
    fn retroactive_commands_target_previous_question() {
        let vocab = vocab();
        let dir = tempfile::tempdir().unwrap();
        let mut store = AnnotationStore::open(dir.path());
        let mut session = Session::new(&vocab, &store, scope(Mode::Words));

        let input = "-b\nto eat\n-a to consume\n-b\nschool\n";
        let (summary, out) = run(&mut session, &mut store, input);

        assert!(out.contains("No previous question."));
        assert!(out.contains("Added answer 'to consume' to '食べる' (meaning)."));
        assert!(out.contains("'食べる' (meaning) has been burned."));
        assert_eq!(summary.asked, 2);
        assert_eq!(summary.passed, 2);
        assert_eq!(store.overlay(Field::Meaning, 0), "to consume");
        assert!(store.is_burned(Field::Meaning, 0));
        // The second prompt was shown again after each command.
        assert_eq!(out.matches("学校, がっこう : meaning ?").count(), 3);
    }

    #[test]
    fn invalid_command_is_reported_inline() {
        let vocab = vocab();
        let dir = tempfile::tempdir().unwrap();
        let mut store = AnnotationStore::open(dir.path());
        let mut session = Session::new(&vocab, &store, scope(Mode::Words));

        let (summary, out) = run(&mut session, &mut store, "-f\nto eat\n");
        assert!(out.contains("'-f' needs some text after it"));
        assert_eq!(summary.asked, 1);
        assert_eq!(summary.passed, 1);
    }

    #[test]
    fn empty_input_toggles_help_then_skips() {
        let vocab = vocab();
        let dir = tempfile::tempdir().unwrap();
        let mut store = AnnotationStore::open(dir.path());
        let mut session = Session::new(&vocab, &store, scope(Mode::Words));
        session.pending.pop_front();

        // 学校 has two dictionary kanji, so the first empty line shows help.
        let (summary, out) = run(&mut session, &mut store, "\n\n");
        assert!(out.contains("\t学 : Study\n\t校 : School\n"));
        assert!(out.contains("Nop (-) : school"));
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        // Help is not repeated after the failure.
        assert_eq!(out.matches("学 : Study").count(), 1);
        assert_eq!(store.successes(ItemKind::Word, 1), 0);
    }

    #[test]
    fn empty_input_without_help_ends_turn() {
        let vocab = vocab();
        let dir = tempfile::tempdir().unwrap();
        let mut store = AnnotationStore::open(dir.path());
        let mut session = Session::new(&vocab, &store, scope(Mode::Kanji));

        let (summary, _) = run(&mut session, &mut store, "\nschool\n");
        assert_eq!(summary.asked, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.passed, 1);
    }

    #[test]
    fn wrong_answer_shows_forbid_reveal_and_help() {
        let vocab = vocab();
        let dir = tempfile::tempdir().unwrap();
        let mut store = AnnotationStore::open(dir.path());
        store.set_burned(Field::Meaning, 1, true).unwrap();
        store
            .append(crate::store::Annotation::Forbid, Field::Romaji, 1, "gakko")
            .unwrap();
        let mut session = Session::new(&vocab, &store, scope(Mode::Words));
        session.pending.pop_front();

        let (_, out) = run(&mut session, &mut store, "gakko\n");
        assert!(out.contains("学校 : romaji ?"));
        assert!(out.contains("Nop (0.00) : gakkou (forbid = gakko); school"));
        assert!(out.contains("\t学 : Study"));
    }

    #[test]
    fn end_of_input_stops_early() {
        let vocab = vocab();
        let dir = tempfile::tempdir().unwrap();
        let mut store = AnnotationStore::open(dir.path());
        let mut session = Session::new(&vocab, &store, scope(Mode::Both));

        let (summary, _) = run(&mut session, &mut store, "to eat\n");
        assert_eq!(summary.asked, 1);
        assert_eq!(session.pending(), 2);
        assert!(session.last_question().is_some());
    }

    #[test]
    fn unwritable_state_is_reported_and_the_drill_goes_on() {
        let vocab = vocab();
        let dir = tempfile::tempdir().unwrap();
        let counters = dir.path().join("result_word.txt");
        std::fs::write(&counters, b"\xff\xfe1\n").unwrap();
        std::fs::create_dir(dir.path().join("burn_meaning.txt")).unwrap();
        let mut store = AnnotationStore::open(dir.path());
        let mut session = Session::new(&vocab, &store, scope(Mode::Words));

        let (summary, out) = run(&mut session, &mut store, "to eat\n-b\nschool\n");
        assert_eq!(summary.asked, 2);
        assert_eq!(summary.passed, 2);
        assert!(out.contains("Good (1.00) : to eat"));
        assert!(out.contains("Good (1.00) : school"));
        assert!(out.contains("Could not record success"));
        assert!(out.contains("Could not update '食べる' (meaning)"));
        assert!(!out.contains("has been burned"));
        assert_eq!(std::fs::read(&counters).unwrap(), b"\xff\xfe1\n");
    }
}
