//! Progress statistics for a level.
//!
//! Summarises burn flags and success counters across the items of a level so
//! the learner can see how close each field is to being mastered.

use serde::Serialize;

use crate::question::{field_applies, Question};
use crate::store::AnnotationStore;
use crate::vocab::{Field, Item, ItemKind, Level, Vocabulary};

/// Burn progress for one field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldStats {
    pub kind: ItemKind,
    pub field: Field,
    /// Items in the level for which this field can be asked.
    pub applicable: usize,
    pub burned: usize,
}

impl FieldStats {
    /// Fraction of applicable items already burned.
    pub fn mastery_rate(&self) -> f64 {
        if self.applicable == 0 {
            return 0.0;
        }
        self.burned as f64 / self.applicable as f64
    }
}

/// Totals for one item kind.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KindStats {
    pub kind: ItemKind,
    pub items: usize,
    /// Items with no field left to ask.
    pub exhausted: usize,
    pub successes: u64,
}

/// Statistics for every field and kind of a level.
#[derive(Debug, Clone, Serialize)]
pub struct LevelStats {
    pub level: Level,
    pub fields: Vec<FieldStats>,
    pub kinds: Vec<KindStats>,
}

impl LevelStats {
    pub fn collect(vocab: &Vocabulary, store: &AnnotationStore, level: Level) -> Self {
        let mut fields = Vec::new();
        let mut kinds = Vec::new();

        let feeds: [(ItemKind, &[Item]); 2] = [
            (ItemKind::Word, vocab.words()),
            (ItemKind::Kanji, vocab.kanji()),
        ];
        for (kind, items) in feeds {
            let in_level: Vec<&Item> = items.iter().filter(|i| i.in_level(level)).collect();
            let counts = store.success_counts(kind);

            let field_list: Vec<Field> = match kind {
                ItemKind::Word => vec![Field::Meaning, Field::Romaji],
                ItemKind::Kanji => vec![Field::Meanings],
            };
            for field in field_list {
                let applicable: Vec<&&Item> = in_level
                    .iter()
                    .filter(|i| field_applies(i, field))
                    .collect();
                let burned = applicable
                    .iter()
                    .filter(|i| store.is_burned(field, i.index()))
                    .count();
                fields.push(FieldStats {
                    kind,
                    field,
                    applicable: applicable.len(),
                    burned,
                });
            }

            kinds.push(KindStats {
                kind,
                items: in_level.len(),
                exhausted: in_level
                    .iter()
                    .filter(|i| Question::from_store(i, store).is_err())
                    .count(),
                successes: in_level
                    .iter()
                    .map(|i| u64::from(counts.get(i.index()).copied().unwrap_or(0)))
                    .sum(),
            });
        }

        Self {
            level,
            fields,
            kinds,
        }
    }
}
