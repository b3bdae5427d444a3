//! End-to-end tests: feeds on disk, annotation files in a temp directory,
//! sessions driven through in-memory input.

use std::io::Cursor;
use std::path::Path;

use tango_core::evaluate::ACCEPT_THRESHOLD;
use tango_core::vocab::Field;
use tango_core::{
    AnnotationStore, ItemKind, Level, Mode, Question, Session, SessionScope, Vocabulary,
};

const WORDS_CSV: &str = "expression,reading,romaji,meaning,tags
食べる,たべる,taberu,to eat,JLPT_5
すし,すし,sushi,sushi,JLPT_5
テレビ,てれび,terebi,television,JLPT_5
大学,だいがく,daigaku,university; college,JLPT_4
";

const KANJI_JSON: &str = r#"{
  "食": {"strokes": 9, "grade": 2, "freq": 328, "jlpt_old": 3, "jlpt_new": 5,
         "meanings": ["Eat", "Food"], "wk_radicals": ["Eat"]},
  "大": {"strokes": 3, "grade": 1, "freq": 7, "jlpt_old": 4, "jlpt_new": 5,
         "meanings": ["Large", "Big"], "wk_radicals": ["Big"]},
  "学": {"strokes": 8, "grade": 1, "freq": 63, "jlpt_old": 4, "jlpt_new": 4,
         "meanings": ["Study", "Learning", "Science"], "wk_radicals": null}
}"#;

fn write_feeds(dir: &Path) -> Vocabulary {
    let words = dir.join("all_hiragana.csv");
    let kanji = dir.join("kanji.json");
    std::fs::write(&words, WORDS_CSV).unwrap();
    std::fs::write(&kanji, KANJI_JSON).unwrap();
    Vocabulary::load(&words, Some(&kanji)).unwrap()
}

#[test]
fn taberu_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let vocab = write_feeds(dir.path());
    let mut store = AnnotationStore::open(dir.path().join("state"));
    let taberu = &vocab.words()[0];

    let q = Question::from_store(taberu, &store).unwrap();
    assert_eq!(q.field(), Field::Meaning);

    let exact = q.evaluate("to eat", &store);
    assert!(exact.passed);
    assert_eq!(exact.score, Some(1.0));

    let partial = q.evaluate("eat", &store);
    assert!(partial.passed);
    let s = partial.score.unwrap();
    assert!(s > ACCEPT_THRESHOLD && s < 1.0, "partial score was {s}");

    let empty = q.evaluate("", &store);
    assert!(!empty.passed);
    assert_eq!(empty.score, None);

    q.burn(&mut store).unwrap();
    let next = Question::from_store(taberu, &store).unwrap();
    assert_eq!(next.field(), Field::Romaji);
    assert!(next.evaluate("taberu", &store).passed);
}

#[test]
fn state_survives_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let vocab = write_feeds(dir.path());
    let state = dir.path().join("state");

    {
        let mut store = AnnotationStore::open(&state);
        let mut session = Session::new(
            &vocab,
            &store,
            SessionScope {
                level: Level(5),
                mode: Mode::Words,
            },
        );
        // 食べる, すし, テレビ in feed order.
        let input = "to eat\n-b\nsushi\n-b\n-a tv\ntelevision\n";
        let summary = session
            .run(&mut store, Cursor::new(input), std::io::sink())
            .unwrap();
        assert_eq!(summary.asked, 3);
        assert_eq!(summary.passed, 3);
    }

    // A fresh store sees the previous run's files.
    let store = AnnotationStore::open(&state);
    assert!(store.is_burned(Field::Meaning, 0));
    assert!(store.is_burned(Field::Meaning, 1));
    assert_eq!(store.overlay(Field::Meaning, 1), "tv");
    assert_eq!(store.successes(ItemKind::Word, 2), 1);

    let session = Session::new(
        &vocab,
        &store,
        SessionScope {
            level: Level(5),
            mode: Mode::Words,
        },
    );
    // すし is fully burned; 食べる moves on to romaji.
    assert_eq!(session.pending(), 2);
    assert_eq!(
        Question::from_store(&vocab.words()[0], &store)
            .unwrap()
            .field(),
        Field::Romaji
    );
    assert!(Question::from_store(&vocab.words()[1], &store).is_err());

    let lines = std::fs::read_to_string(state.join("burn_meaning.txt")).unwrap();
    assert_eq!(lines, "o\no\n");
}

#[test]
fn kanji_session_with_help() {
    let dir = tempfile::tempdir().unwrap();
    let vocab = write_feeds(dir.path());
    let mut store = AnnotationStore::open(dir.path().join("state"));
    let mut session = Session::new(
        &vocab,
        &store,
        SessionScope {
            level: Level(5),
            mode: Mode::Kanji,
        },
    );
    assert_eq!(session.pending(), 2);

    let mut out = Vec::new();
    let summary = session
        .run(&mut store, Cursor::new("\nFood\nsmall\n"), &mut out)
        .unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("食 : meanings ?"));
    assert!(out.contains("\tEat\n"));
    assert!(out.contains("Good (1.00) : Eat; Food"));
    assert!(out.contains("Nop ("));
    assert!(out.contains("\tBig"));
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(store.successes(ItemKind::Kanji, 0), 1);
}

#[test]
fn malformed_feed_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    let words = dir.path().join("words.csv");
    std::fs::write(&words, "a,b,c,d,e\n食べる,たべる,taberu\n").unwrap();
    let err = Vocabulary::load(&words, None).unwrap_err();
    assert!(format!("{err:#}").contains("malformed word row"));
}
