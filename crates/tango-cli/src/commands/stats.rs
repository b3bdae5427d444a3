//! The `tango stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use tango_core::stats::LevelStats;
use tango_core::{AnnotationStore, Vocabulary};

use crate::config::load_config_from;

pub fn execute(level: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let level = super::resolve_level(level.as_deref(), &config)?;

    let vocab = Vocabulary::load(&config.words, config.kanji_if_present())?;
    let store = AnnotationStore::open(&config.state_dir);
    let stats = LevelStats::collect(&vocab, &store, level);

    println!("Progress for {level}");

    let mut fields = Table::new();
    fields.set_header(vec!["Kind", "Field", "Askable", "Burned", "Mastered %"]);
    for f in &stats.fields {
        fields.add_row(vec![
            Cell::new(f.kind),
            Cell::new(f.field),
            Cell::new(f.applicable),
            Cell::new(f.burned),
            Cell::new(format!("{:.1}%", f.mastery_rate() * 100.0)),
        ]);
    }
    println!("{fields}");

    let mut kinds = Table::new();
    kinds.set_header(vec!["Kind", "Items", "Fully burned", "Successes"]);
    for k in &stats.kinds {
        kinds.add_row(vec![
            Cell::new(k.kind),
            Cell::new(k.items),
            Cell::new(k.exhausted),
            Cell::new(k.successes),
        ]);
    }
    println!("{kinds}");

    Ok(())
}
