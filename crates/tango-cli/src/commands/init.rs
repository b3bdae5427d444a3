//! The `tango init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("tango.toml").exists() {
        println!("tango.toml already exists, skipping.");
    } else {
        std::fs::write("tango.toml", SAMPLE_CONFIG)?;
        println!("Created tango.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point `words` and `kanji` at your vocabulary feeds");
    println!("  2. Run: tango validate");
    println!("  3. Run: tango drill --level 5 --mode words");
    println!("\nDuring a drill, answer the prompt or type a command about the previous question:");
    println!("  -f <text>  forbid a near-miss answer");
    println!("  -a <text>  accept an extra answer");
    println!("  -b / -u    burn / unburn the field");
    println!("  (empty)    show kanji help, then skip");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# tango configuration

# Word feed: CSV with header "expression,reading,romaji,meaning,tags"
words = "all_hiragana.csv"

# Kanji feed: JSON object keyed by glyph
kanji = "kanji.json"

# Where burn / overlay / forbid / result files are kept
state_dir = "."

level = 5
mode = "both"
"#;
