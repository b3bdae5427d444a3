//! Fuzzy answer scoring.
//!
//! A response is compared against accepted solutions and known wrong
//! answers with a Ratcliff/Obershelp similarity ratio. A close match to a
//! forbidden answer overrides any solution match.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A response must score strictly above this against some solution to pass.
pub const ACCEPT_THRESHOLD: f64 = 0.6;

/// A response scoring strictly above this against a forbidden answer fails
/// with a score of zero.
pub const FORBID_THRESHOLD: f64 = 0.85;

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(.*?\)\s*").expect("static regex"));

/// Outcome of scoring one response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub passed: bool,
    /// `None` when there was nothing to score (empty response).
    pub score: Option<f64>,
}

impl Evaluation {
    pub fn skipped() -> Self {
        Self {
            passed: false,
            score: None,
        }
    }

    /// Score formatted for display; `-` when absent.
    pub fn score_display(&self) -> String {
        match self.score {
            Some(s) => format!("{s:.2}"),
            None => "-".to_string(),
        }
    }
}

/// Score `response` against the accepted and forbidden strings.
pub fn score<S: AsRef<str>, F: AsRef<str>>(
    response: &str,
    solutions: &[S],
    forbids: &[F],
) -> Evaluation {
    if response.is_empty() {
        return Evaluation::skipped();
    }

    let best_solution = best_ratio(response, solutions);
    let best_forbid = best_ratio(response, forbids);

    if best_forbid > FORBID_THRESHOLD {
        return Evaluation {
            passed: false,
            score: Some(0.0),
        };
    }

    Evaluation {
        passed: best_solution > ACCEPT_THRESHOLD,
        score: Some(best_solution),
    }
}

fn best_ratio<S: AsRef<str>>(response: &str, candidates: &[S]) -> f64 {
    candidates
        .iter()
        .map(|c| ratio(c.as_ref(), response))
        .fold(0.0, f64::max)
}

/// Remove `( ... )` qualifiers and the whitespace around them.
pub fn strip_parentheticals(text: &str) -> String {
    PARENTHETICAL.replace_all(text, "").into_owned()
}

/// Split a `;`-delimited annotation into trimmed, non-empty parts.
pub fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(';').map(str::trim).filter(|s| !s.is_empty())
}

/// Ratcliff/Obershelp similarity: `2 * M / (len(a) + len(b))`, where `M` is
/// the number of characters in the recursively found longest common blocks.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+k] == b[j..j+k]` within the given ranges; ties go
/// to the earliest `i`, then the earliest `j`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // Length of the match ending at (i - 1, j), keyed by j.
    let mut run: HashMap<usize, usize> = HashMap::new();
    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_run = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_run.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        run = next_run;
    }
    (best_i, best_j, best_k)
}
