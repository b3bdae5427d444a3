//! Binding of one item to the single field it is quizzed on.

use anyhow::Result;

use crate::error::QuestionError;
use crate::evaluate::{self, split_list, strip_parentheticals, Evaluation};
use crate::store::{Annotation, AnnotationStore};
use crate::vocab::{contains_kanji, contains_katakana, Field, FieldSpec, Item};

/// A quiz turn for one item. The field is chosen at construction and never
/// re-evaluated; burn changes only affect questions built afterwards.
#[derive(Debug, Clone, Copy)]
pub struct Question<'v> {
    item: &'v Item,
    spec: &'static FieldSpec,
}

impl<'v> Question<'v> {
    /// Select the first eligible field of `item` that `burned` does not
    /// report as burned.
    ///
    /// The `romaji` field of a word is only eligible when the surface form
    /// has kanji and no katakana.
    pub fn new(item: &'v Item, burned: impl Fn(Field) -> bool) -> Result<Self, QuestionError> {
        item.fields()
            .iter()
            .find(|spec| !burned(spec.field) && field_applies(item, spec.field))
            .map(|spec| Self { item, spec })
            .ok_or(QuestionError::FieldsExhausted {
                kind: item.kind(),
                index: item.index(),
            })
    }

    /// Build a question using the burn flags held in `store`.
    pub fn from_store(item: &'v Item, store: &AnnotationStore) -> Result<Self, QuestionError> {
        Self::new(item, |field| store.is_burned(field, item.index()))
    }

    pub fn item(&self) -> &'v Item {
        self.item
    }

    pub fn field(&self) -> Field {
        self.spec.field
    }

    /// Context values followed by the field being asked for.
    pub fn prompt(&self) -> String {
        let context: Vec<_> = self
            .spec
            .context
            .iter()
            .map(|attr| self.item.attr(*attr))
            .collect();
        format!("{} : {} ?", context.join(", "), self.field())
    }

    /// Accepted answers: the canonical list, then any overlay answers.
    pub fn solutions(&self, store: &AnnotationStore) -> Vec<String> {
        let canonical = self.item.answer(self.field());
        let canonical = if self.field().is_gloss() {
            strip_parentheticals(&canonical)
        } else {
            canonical.into_owned()
        };
        split_list(&canonical)
            .chain(split_list(store.overlay(self.field(), self.item.index())))
            .map(str::to_string)
            .collect()
    }

    pub fn forbids<'s>(&self, store: &'s AnnotationStore) -> Vec<&'s str> {
        split_list(store.forbid(self.field(), self.item.index())).collect()
    }

    /// Score a response. Overlay and forbid lists are read from `store` on
    /// every call.
    pub fn evaluate(&self, response: &str, store: &AnnotationStore) -> Evaluation {
        evaluate::score(response, &self.solutions(store), &self.forbids(store))
    }

    pub fn burn(&self, store: &mut AnnotationStore) -> Result<()> {
        store.set_burned(self.field(), self.item.index(), true)
    }

    pub fn unburn(&self, store: &mut AnnotationStore) -> Result<()> {
        store.set_burned(self.field(), self.item.index(), false)
    }

    pub fn add_forbid(&self, text: &str, store: &mut AnnotationStore) -> Result<()> {
        store.append(Annotation::Forbid, self.field(), self.item.index(), text)
    }

    pub fn add_answer(&self, text: &str, store: &mut AnnotationStore) -> Result<()> {
        store.append(Annotation::Overlay, self.field(), self.item.index(), text)
    }

    /// Count a passed turn for this item.
    pub fn record_success(&self, store: &mut AnnotationStore) -> Result<()> {
        store.record_success(self.item.kind(), self.item.index())
    }

    /// Canonical answer plus overlay, for display.
    pub fn answer_display(&self, store: &AnnotationStore) -> String {
        let canonical = self.item.answer(self.field());
        split_list(&canonical)
            .chain(split_list(store.overlay(self.field(), self.item.index())))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn forbid_display(&self, store: &AnnotationStore) -> String {
        self.forbids(store).join("; ")
    }

    /// Extra attributes shown after a wrong answer.
    pub fn reveal_display(&self) -> String {
        self.spec
            .reveal
            .iter()
            .map(|attr| self.item.attr(*attr))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Whether `field` can ever be asked for `item`, regardless of burn state.
pub fn field_applies(item: &Item, field: Field) -> bool {
    match (item, field) {
        (Item::Word(w), Field::Romaji) => {
            !contains_katakana(&w.surface) && contains_kanji(&w.surface)
        }
        _ => item.fields().iter().any(|spec| spec.field == field),
    }
}
