//! Vocabulary items and the read-only feeds they are loaded from.
//!
//! Items are immutable once loaded. Each carries an `index` equal to its
//! position in its feed; the annotation files are keyed by that index.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wana_kana::utils::{is_char_kanji, is_char_katakana};

use crate::error::FeedError;

/// Which feed an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Word,
    Kanji,
}

impl ItemKind {
    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Word => "word",
            ItemKind::Kanji => "kanji",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A quiz-able field. Names are unique across item kinds, so they double as
/// annotation file keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Meaning,
    Romaji,
    Meanings,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Meaning, Field::Romaji, Field::Meanings];

    pub fn name(self) -> &'static str {
        match self {
            Field::Meaning => "meaning",
            Field::Romaji => "romaji",
            Field::Meanings => "meanings",
        }
    }

    /// The attribute holding this field's canonical answer.
    pub fn attr(self) -> Attr {
        match self {
            Field::Meaning => Attr::Meaning,
            Field::Romaji => Attr::Romaji,
            Field::Meanings => Attr::Meanings,
        }
    }

    /// Gloss fields may carry parenthetical qualifiers that are not part of
    /// the expected answer.
    pub fn is_gloss(self) -> bool {
        matches!(self, Field::Meaning | Field::Meanings)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A displayable attribute of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    Surface,
    Kana,
    Romaji,
    Meaning,
    Glyph,
    Meanings,
}

/// One entry of an item's ordered field list.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// The field being asked for.
    pub field: Field,
    /// Attributes shown in the prompt.
    pub context: &'static [Attr],
    /// Extra attributes shown after a wrong answer.
    pub reveal: &'static [Attr],
}

const WORD_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        field: Field::Meaning,
        context: &[Attr::Surface, Attr::Kana],
        reveal: &[],
    },
    FieldSpec {
        field: Field::Romaji,
        context: &[Attr::Surface],
        reveal: &[Attr::Meaning],
    },
];

const KANJI_FIELDS: &[FieldSpec] = &[FieldSpec {
    field: Field::Meanings,
    context: &[Attr::Glyph],
    reveal: &[],
}];

/// A vocabulary word from the CSV feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub index: usize,
    /// Written form, usually with kanji.
    pub surface: String,
    pub kana: String,
    pub romaji: String,
    /// `;`-delimited meanings, parenthetical qualifiers allowed.
    pub meaning: String,
    /// Raw level tag such as `JLPT_5` or `JLPT_N5`.
    pub level_tag: String,
}

/// A kanji entry from the JSON feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kanji {
    pub index: usize,
    pub glyph: String,
    pub strokes: u32,
    pub grade: Option<u32>,
    pub freq: Option<u32>,
    pub jlpt_old: Option<u32>,
    pub jlpt_new: Option<u32>,
    pub meanings: Vec<String>,
    pub radicals: Vec<String>,
}

/// A quiz item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Item {
    Word(Word),
    Kanji(Kanji),
}

impl Item {
    pub fn index(&self) -> usize {
        match self {
            Item::Word(w) => w.index,
            Item::Kanji(k) => k.index,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Word(_) => ItemKind::Word,
            Item::Kanji(_) => ItemKind::Kanji,
        }
    }

    /// The item's quiz-able fields in selection order.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Item::Word(_) => WORD_FIELDS,
            Item::Kanji(_) => KANJI_FIELDS,
        }
    }

    /// The surface form or glyph, used in messages.
    pub fn label(&self) -> &str {
        match self {
            Item::Word(w) => &w.surface,
            Item::Kanji(k) => &k.glyph,
        }
    }

    /// Value of an attribute. Attributes that do not apply to this kind
    /// read as empty.
    pub fn attr(&self, attr: Attr) -> Cow<'_, str> {
        match (self, attr) {
            (Item::Word(w), Attr::Surface) => Cow::Borrowed(&w.surface),
            (Item::Word(w), Attr::Kana) => Cow::Borrowed(&w.kana),
            (Item::Word(w), Attr::Romaji) => Cow::Borrowed(&w.romaji),
            (Item::Word(w), Attr::Meaning) => Cow::Borrowed(&w.meaning),
            (Item::Kanji(k), Attr::Glyph) => Cow::Borrowed(&k.glyph),
            (Item::Kanji(k), Attr::Meanings) => Cow::Owned(k.meanings.join(";")),
            _ => Cow::Borrowed(""),
        }
    }

    /// Canonical answer for a field, still `;`-delimited.
    pub fn answer(&self, field: Field) -> Cow<'_, str> {
        self.attr(field.attr())
    }

    pub fn in_level(&self, level: Level) -> bool {
        match self {
            Item::Word(w) => level.matches_tag(&w.level_tag),
            Item::Kanji(k) => k.jlpt_new == Some(u32::from(level.0)),
        }
    }
}

/// Proficiency level (JLPT N-number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level(pub u8);

impl Level {
    /// True for `JLPT_<n>` and `JLPT_N<n>`.
    pub fn matches_tag(self, tag: &str) -> bool {
        tag.trim()
            .strip_prefix("JLPT_")
            .map(|rest| rest.strip_prefix('N').unwrap_or(rest))
            .and_then(|n| n.parse::<u8>().ok())
            == Some(self.0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("JLPT_").unwrap_or(trimmed);
        let digits = digits
            .strip_prefix('N')
            .or_else(|| digits.strip_prefix('n'))
            .unwrap_or(digits);
        match digits.parse::<u8>() {
            Ok(n) if (1..=5).contains(&n) => Ok(Level(n)),
            _ => Err(format!("invalid level: {s} (expected 1-5)")),
        }
    }
}

/// True when the text holds at least one kanji.
pub fn contains_kanji(text: &str) -> bool {
    text.chars().any(is_char_kanji)
}

/// True when the text holds at least one katakana character, including the
/// iteration marks.
pub fn contains_katakana(text: &str) -> bool {
    text.chars()
        .any(|c| is_char_katakana(c) || c == 'ヽ' || c == 'ヾ')
}

// ---------------------------------------------------------------------------
// Feed loading
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawKanji {
    strokes: u32,
    #[serde(default)]
    grade: Option<u32>,
    #[serde(default)]
    freq: Option<u32>,
    #[serde(default)]
    jlpt_old: Option<u32>,
    #[serde(default)]
    jlpt_new: Option<u32>,
    #[serde(default)]
    meanings: Vec<String>,
    #[serde(default)]
    wk_radicals: Option<Vec<String>>,
}

/// Parse the word CSV. The first row is a header and is skipped. A blank
/// line is an empty row and fails like any other short row.
pub fn parse_words_str(content: &str) -> Result<Vec<Item>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header = reader.headers().context("failed to read word header")?;
    if header.is_empty() {
        return Err(FeedError::MissingHeader.into());
    }
    // The reader drops blank lines, so find them as gaps between records.
    let mut next_line = 2 + embedded_newlines(header);

    let mut words = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.context("failed to read word row")?;
        let line = record.position().map(|p| p.line()).unwrap_or(next_line);
        if line > next_line {
            return Err(blank_row(next_line));
        }
        next_line = line + 1 + embedded_newlines(&record);

        if record.len() != 5 {
            return Err(FeedError::MalformedRow {
                line: line as usize,
                found: record.len(),
            }
            .into());
        }
        words.push(Item::Word(Word {
            index,
            surface: record[0].to_string(),
            kana: record[1].to_string(),
            romaji: record[2].to_string(),
            meaning: record[3].to_string(),
            level_tag: record[4].to_string(),
        }));
    }

    if content.lines().count() as u64 >= next_line {
        return Err(blank_row(next_line));
    }
    Ok(words)
}

fn embedded_newlines(record: &csv::StringRecord) -> u64 {
    record.iter().map(|f| f.matches('\n').count() as u64).sum()
}

fn blank_row(line: u64) -> anyhow::Error {
    FeedError::MalformedRow {
        line: line as usize,
        found: 0,
    }
    .into()
}

/// Parse the kanji JSON. Indexes follow key order.
pub fn parse_kanji_str(content: &str) -> Result<Vec<Item>> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(content).context("failed to parse kanji JSON")?;

    map.into_iter()
        .enumerate()
        .map(|(index, (glyph, value))| {
            let raw: RawKanji = serde_json::from_value(value)
                .with_context(|| format!("invalid kanji entry '{glyph}'"))?;
            Ok(Item::Kanji(Kanji {
                index,
                glyph,
                strokes: raw.strokes,
                grade: raw.grade,
                freq: raw.freq,
                jlpt_old: raw.jlpt_old,
                jlpt_new: raw.jlpt_new,
                meanings: raw.meanings,
                radicals: raw.wk_radicals.unwrap_or_default(),
            }))
        })
        .collect()
}

/// Both feeds, loaded once per run.
#[derive(Debug, Default)]
pub struct Vocabulary {
    words: Vec<Item>,
    kanji: Vec<Item>,
    by_glyph: HashMap<String, usize>,
}

impl Vocabulary {
    /// Load the word CSV and, when given, the kanji JSON.
    pub fn load(words_path: &Path, kanji_path: Option<&Path>) -> Result<Self> {
        let content = std::fs::read_to_string(words_path)
            .with_context(|| format!("failed to read word feed: {}", words_path.display()))?;
        let words = parse_words_str(&content)
            .with_context(|| format!("failed to load word feed: {}", words_path.display()))?;

        let kanji = match kanji_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read kanji feed: {}", path.display()))?;
                parse_kanji_str(&content)
                    .with_context(|| format!("failed to load kanji feed: {}", path.display()))?
            }
            None => Vec::new(),
        };

        tracing::debug!(words = words.len(), kanji = kanji.len(), "vocabulary loaded");
        Ok(Self::from_parts(words, kanji))
    }

    pub fn from_parts(words: Vec<Item>, kanji: Vec<Item>) -> Self {
        let by_glyph = kanji
            .iter()
            .enumerate()
            .map(|(i, item)| (item.label().to_string(), i))
            .collect();
        Self {
            words,
            kanji,
            by_glyph,
        }
    }

    pub fn words(&self) -> &[Item] {
        &self.words
    }

    pub fn kanji(&self) -> &[Item] {
        &self.kanji
    }

    pub fn kanji_by_glyph(&self, glyph: char) -> Option<&Kanji> {
        let mut buf = [0u8; 4];
        let key: &str = glyph.encode_utf8(&mut buf);
        self.by_glyph.get(key).and_then(|&i| match &self.kanji[i] {
            Item::Kanji(k) => Some(k),
            Item::Word(_) => None,
        })
    }

    /// Dictionary kanji appearing in `text`, in order.
    pub fn decompose(&self, text: &str) -> Vec<&Kanji> {
        text.chars().filter_map(|c| self.kanji_by_glyph(c)).collect()
    }

    /// Whether an item has auxiliary help to show.
    pub fn has_help(&self, item: &Item) -> bool {
        match item {
            Item::Word(w) => w.surface.chars().count() > 1 && !self.decompose(&w.surface).is_empty(),
            Item::Kanji(k) => !k.radicals.is_empty(),
        }
    }

    /// Auxiliary help: constituent kanji for a word, radicals for a kanji.
    pub fn help_lines(&self, item: &Item) -> Vec<String> {
        match item {
            Item::Word(w) => self
                .decompose(&w.surface)
                .into_iter()
                .map(|k| format!("{} : {}", k.glyph, k.meanings.join("; ")))
                .collect(),
            Item::Kanji(k) if !k.radicals.is_empty() => vec![k.radicals.join("; ")],
            Item::Kanji(_) => Vec::new(),
        }
    }
}
