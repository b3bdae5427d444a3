//! Line-indexed annotation files holding learner state.
//!
//! Line `i` of every file belongs to item index `i`. Files are read once at
//! startup and cached; every mutation reloads the file, pads it with default
//! lines up to the target index, edits that one line and rewrites the whole
//! file. Missing files read as defaults.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::vocab::{Field, ItemKind};

/// Sentinel line marking a burned field.
pub const BURN_MARK: &str = "o";

/// Delimiter between accreted overlay and forbid fragments.
pub const DELIMITER: char = ';';

/// The per-field annotation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotation {
    Burn,
    Overlay,
    Forbid,
}

impl Annotation {
    pub const ALL: [Annotation; 3] = [Annotation::Burn, Annotation::Overlay, Annotation::Forbid];

    pub fn file_name(self, field: Field) -> String {
        match self {
            Annotation::Burn => format!("burn_{field}.txt"),
            Annotation::Overlay => format!("overlay_response_{field}.txt"),
            Annotation::Forbid => format!("overlay_forbid_{field}.txt"),
        }
    }
}

/// Result of reading a stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Lookup::Found(v) => v,
            Lookup::NotFound => default,
        }
    }
}

/// Read a file as trimmed lines. A missing file is `NotFound`; any other
/// I/O failure is an error.
fn read_lines(path: &Path) -> io::Result<Lookup<Vec<String>>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Lookup::Found(
            content.lines().map(|l| l.trim().to_string()).collect(),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Lookup::NotFound),
        Err(e) => Err(e),
    }
}

/// Reload `path`, pad to `index + 1` lines with `default`, apply `edit` to
/// line `index`, and rewrite the file. Returns the new contents.
fn rewrite_line(
    path: &Path,
    index: usize,
    default: &str,
    edit: impl FnOnce(&mut String),
) -> Result<Vec<String>> {
    let mut lines = read_lines(path)
        .with_context(|| format!("failed to read annotation file: {}", path.display()))?
        .unwrap_or(Vec::new());

    if lines.len() <= index {
        lines.resize(index + 1, default.to_string());
    }
    edit(&mut lines[index]);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create state directory: {}", parent.display()))?;
    }
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content)
        .with_context(|| format!("failed to write annotation file: {}", path.display()))?;

    tracing::debug!(file = %path.display(), index, lines = lines.len(), "annotation rewritten");
    Ok(lines)
}

/// Learner state for one run, backed by files in a state directory.
#[derive(Debug)]
pub struct AnnotationStore {
    dir: PathBuf,
    cache: HashMap<(Annotation, Field), Vec<String>>,
}

impl AnnotationStore {
    /// Open the store and read every burn, overlay and forbid file. Files
    /// that cannot be read are logged and treated as empty.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let mut cache = HashMap::new();
        for field in Field::ALL {
            for annotation in Annotation::ALL {
                let path = dir.join(annotation.file_name(field));
                match read_lines(&path) {
                    Ok(Lookup::Found(lines)) => {
                        cache.insert((annotation, field), lines);
                    }
                    Ok(Lookup::NotFound) => {}
                    Err(e) => {
                        tracing::warn!("ignoring unreadable {}: {e}", path.display());
                    }
                }
            }
        }
        Self { dir, cache }
    }

    /// Raw line for an item. Absent files, short files and empty lines are
    /// all `NotFound`.
    pub fn lookup(&self, annotation: Annotation, field: Field, index: usize) -> Lookup<&str> {
        match self
            .cache
            .get(&(annotation, field))
            .and_then(|lines| lines.get(index))
        {
            Some(line) if !line.is_empty() => Lookup::Found(line.as_str()),
            _ => Lookup::NotFound,
        }
    }

    pub fn is_burned(&self, field: Field, index: usize) -> bool {
        self.lookup(Annotation::Burn, field, index).unwrap_or("") == BURN_MARK
    }

    /// Extra accepted answers, `;`-joined.
    pub fn overlay(&self, field: Field, index: usize) -> &str {
        self.lookup(Annotation::Overlay, field, index).unwrap_or("")
    }

    /// Forbidden answers, `;`-joined.
    pub fn forbid(&self, field: Field, index: usize) -> &str {
        self.lookup(Annotation::Forbid, field, index).unwrap_or("")
    }

    /// Set or clear the burn flag.
    pub fn set_burned(&mut self, field: Field, index: usize, burned: bool) -> Result<()> {
        let mark = if burned { BURN_MARK } else { "" };
        let path = self.dir.join(Annotation::Burn.file_name(field));
        let lines = rewrite_line(&path, index, "", |line| *line = mark.to_string())?;
        self.cache.insert((Annotation::Burn, field), lines);
        Ok(())
    }

    /// Append `text` to an overlay or forbid line. Existing text is kept.
    pub fn append(
        &mut self,
        annotation: Annotation,
        field: Field,
        index: usize,
        text: &str,
    ) -> Result<()> {
        anyhow::ensure!(
            annotation != Annotation::Burn,
            "burn flags are set with set_burned, not appended"
        );
        let path = self.dir.join(annotation.file_name(field));
        let lines = rewrite_line(&path, index, "", |line| {
            if !line.is_empty() {
                line.push(DELIMITER);
            }
            line.push_str(text);
        })?;
        self.cache.insert((annotation, field), lines);
        Ok(())
    }

    fn counter_path(&self, kind: ItemKind) -> PathBuf {
        self.dir.join(format!("result_{kind}.txt"))
    }

    /// Recorded successes for an item. Unreadable files and non-integer
    /// lines read as zero.
    pub fn successes(&self, kind: ItemKind, index: usize) -> u32 {
        self.success_counts(kind).get(index).copied().unwrap_or(0)
    }

    /// Every success counter for a kind, by index.
    pub fn success_counts(&self, kind: ItemKind) -> Vec<u32> {
        let path = self.counter_path(kind);
        match read_lines(&path) {
            Ok(Lookup::Found(lines)) => lines.iter().map(|l| l.parse().unwrap_or(0)).collect(),
            Ok(Lookup::NotFound) => Vec::new(),
            Err(e) => {
                tracing::warn!("ignoring unreadable {}: {e}", path.display());
                Vec::new()
            }
        }
    }

    /// Add one to an item's success counter.
    pub fn record_success(&mut self, kind: ItemKind, index: usize) -> Result<()> {
        let path = self.counter_path(kind);
        rewrite_line(&path, index, "0", |line| {
            let count: u32 = line.parse().unwrap_or(0);
            *line = count.saturating_add(1).to_string();
        })?;
        Ok(())
    }
}
