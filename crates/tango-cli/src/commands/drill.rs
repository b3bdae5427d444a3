//! The `tango drill` command.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};

use tango_core::{AnnotationStore, Mode, Session, SessionScope, SessionSummary, Vocabulary};

use crate::config::load_config_from;

pub fn execute(
    level: Option<String>,
    mode: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let level = super::resolve_level(level.as_deref(), &config)?;
    let mode = match mode {
        Some(m) => m.parse::<Mode>().map_err(|e| anyhow::anyhow!("{e}"))?,
        None => config.mode,
    };

    // The kanji feed is required when drilling kanji; for words it only
    // feeds the help decomposition.
    let kanji_path = match mode {
        Mode::Words => config.kanji_if_present(),
        Mode::Kanji | Mode::Both => Some(config.kanji.as_path()),
    };
    let vocab = Vocabulary::load(&config.words, kanji_path)?;
    let mut store = AnnotationStore::open(&config.state_dir);

    let mut session = Session::new(&vocab, &store, SessionScope { level, mode });
    if session.pending() == 0 {
        println!("Nothing to ask for {level} ({mode}): every item is burned or out of scope.");
        return Ok(());
    }
    session.shuffle(&mut rand::rng());

    let started = chrono::Local::now();
    let stdin = io::stdin();
    let summary = session
        .run(&mut store, stdin.lock(), io::stdout().lock())
        .context("drill session failed")?;

    print_summary(&summary, started);
    Ok(())
}

fn print_summary(summary: &SessionSummary, started: chrono::DateTime<chrono::Local>) {
    use comfy_table::{Cell, Table};

    let elapsed = chrono::Local::now() - started;
    let rate = if summary.asked == 0 {
        0.0
    } else {
        summary.passed as f64 / summary.asked as f64
    };

    let mut table = Table::new();
    table.set_header(vec!["Asked", "Passed", "Failed", "Skipped", "Pass %", "Time"]);
    table.add_row(vec![
        Cell::new(summary.asked),
        Cell::new(summary.passed),
        Cell::new(summary.failed),
        Cell::new(summary.skipped),
        Cell::new(format!("{:.1}%", rate * 100.0)),
        Cell::new(format!(
            "{}m{:02}s",
            elapsed.num_minutes(),
            elapsed.num_seconds() % 60
        )),
    ]);

    eprintln!("\n{table}");
    if summary.exhausted > 0 {
        eprintln!("{} item(s) skipped: every field burned.", summary.exhausted);
    }
}
