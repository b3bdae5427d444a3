//! The `tango validate` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

use tango_core::{Item, Vocabulary};

use crate::config::load_config_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let kanji_path = config.kanji_if_present();
    if kanji_path.is_none() {
        println!(
            "Kanji feed {} not found, checking words only.",
            config.kanji.display()
        );
    }

    let vocab = Vocabulary::load(&config.words, kanji_path)?;

    println!(
        "Word feed: {} ({} words)",
        config.words.display(),
        vocab.words().len()
    );
    print_levels(vocab.words(), |item| match item {
        Item::Word(w) => Some(w.level_tag.clone()).filter(|t| !t.is_empty()),
        Item::Kanji(_) => None,
    });

    if kanji_path.is_some() {
        println!(
            "Kanji feed: {} ({} kanji)",
            config.kanji.display(),
            vocab.kanji().len()
        );
        print_levels(vocab.kanji(), |item| match item {
            Item::Kanji(k) => k.jlpt_new.map(|n| format!("N{n}")),
            Item::Word(_) => None,
        });
    }

    println!("All feeds valid.");
    Ok(())
}

fn print_levels(items: &[Item], level_of: impl Fn(&Item) -> Option<String>) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut untagged = 0;
    for item in items {
        match level_of(item) {
            Some(level) => *counts.entry(level).or_default() += 1,
            None => untagged += 1,
        }
    }
    for (level, count) in &counts {
        println!("  {level}: {count}");
    }
    if untagged > 0 {
        println!("  (no level): {untagged}");
    }
}
