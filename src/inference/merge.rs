//! Type merger: folds every observation at a structural path into one type.
//!
//! Values are partitioned by shape before anything is joined. Scalars go to
//! the leaf classifier, lists are merged through the union of all of their
//! items, and records are first offered to the choice engine and otherwise
//! merged field by field over every instance that carries the field.
//!
//! Alternatives of a union are emitted in a fixed order (boolean, number,
//! string, list, record, then null) so the result does not depend on the
//! order instances were observed in.

use indexmap::IndexMap;

use super::arr::ListItems;
use super::choice;
use super::leaf::{self, Classification, ScalarClass};
use super::obj::{self, FieldObservation, FieldPresence};
use super::path::Path;
use crate::config::InferenceConfig;
use crate::ir::{Field, InferredType, RecordType};
use crate::value::{Fields, Value};

/// Merged type of one field slot plus its presence flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSlot {
    pub ty: InferredType,
    pub required: bool,
    pub nullable: bool,
}

pub struct Merger<'c> {
    config: &'c InferenceConfig,
}

impl<'c> Merger<'c> {
    pub fn new(config: &'c InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        self.config
    }

    /// Merge one field across the records at its parent path.
    pub fn merge_slot(&self, path: &Path, observations: &[FieldObservation<'_>], budget: usize) -> MergedSlot {
        let presence = FieldPresence::tally(observations);
        let present: Vec<&Value> = observations.iter().filter_map(FieldObservation::value).collect();
        MergedSlot {
            ty: self.merge_present(path, &present, budget),
            required: presence.required(),
            nullable: presence.nullable(),
        }
    }

    /// Merge a population of values. Nulls carry no type information here;
    /// an all-null population is `Primitive(null)`.
    pub fn merge_present(&self, path: &Path, values: &[&Value], budget: usize) -> InferredType {
        let mut scalars = Vec::new();
        let mut lists = Vec::new();
        let mut records = Vec::new();
        for v in values {
            match v {
                Value::Null => {}
                Value::List(xs) => lists.push(xs),
                Value::Record(fields) => records.push(fields),
                scalar => scalars.push(*scalar),
            }
        }

        let mut alternatives = Vec::with_capacity(3);
        if !scalars.is_empty() {
            alternatives.push(self.merge_scalars(path, &scalars));
        }
        if !lists.is_empty() {
            alternatives.push(self.merge_lists(path, &lists, budget));
        }
        if !records.is_empty() {
            alternatives.push(self.merge_records(path, &records, budget));
        }
        if alternatives.len() > 1 {
            tracing::debug!(%path, alternatives = alternatives.len(), "mixed shapes, emitting union");
        }
        InferredType::union(alternatives)
    }

    /// Classify a scalar population; conflicting scalar classes become a
    /// union with one alternative per class.
    pub fn merge_scalars(&self, path: &Path, values: &[&Value]) -> InferredType {
        let field_name = path.field_name();
        match leaf::classify(values, field_name, self.config) {
            Classification::Empty => InferredType::null(),
            Classification::Kind(kind) => InferredType::primitive(kind),
            Classification::Mixed => {
                let alternatives = [ScalarClass::Boolean, ScalarClass::Number, ScalarClass::String]
                    .into_iter()
                    .filter(|class| values.iter().any(|v| ScalarClass::of(v) == Some(*class)))
                    .map(|class| InferredType::primitive(leaf::classify_class(class, values, field_name, self.config)))
                    .collect::<Vec<_>>();
                tracing::debug!(%path, alternatives = alternatives.len(), "scalar kind conflict");
                InferredType::union(alternatives)
            }
        }
    }

    /// Records at one path: a choice when the population splits into tagged
    /// variants, otherwise a single record over the union of their fields.
    pub fn merge_records(&self, path: &Path, records: &[&Fields], budget: usize) -> InferredType {
        if budget > 0 {
            if let Some(choice) = choice::infer_choice(self, path, records, budget) {
                return InferredType::Choice(choice);
            }
        }
        let record = self.build_record(path, records, budget.saturating_sub(1), None, &IndexMap::new());
        InferredType::Record(record)
    }

    /// Build one record type from `records`.
    ///
    /// `skip` names a field left out of the result (a choice discriminator).
    /// `overrides` supplies field types computed elsewhere; presence flags are
    /// still taken from `records`.
    pub fn build_record(
        &self,
        path: &Path,
        records: &[&Fields],
        field_budget: usize,
        skip: Option<&str>,
        overrides: &IndexMap<String, InferredType>,
    ) -> RecordType {
        let mut fields = Vec::new();
        for name in obj::field_names(records) {
            if skip == Some(name) {
                continue;
            }
            let observations = obj::observations(records, name);
            let slot = match overrides.get(name) {
                Some(ty) => {
                    let presence = FieldPresence::tally(&observations);
                    MergedSlot {
                        ty: ty.clone(),
                        required: presence.required(),
                        nullable: presence.nullable(),
                    }
                }
                None => self.merge_slot(&path.field(name), &observations, field_budget),
            };
            fields.push(Field {
                name: name.to_string(),
                ty: slot.ty,
                required: slot.required,
                nullable: slot.nullable,
            });
        }
        RecordType { name: path.type_name(), fields }
    }

    /// Lists at one path merge into an array over the items of all of them.
    pub fn merge_lists(&self, path: &Path, lists: &[&Vec<Value>], budget: usize) -> InferredType {
        let items = ListItems::collect(lists.iter().copied());
        tracing::trace!(%path, lists = items.lists, items = items.items.len(), "merging list items");
        InferredType::array(self.merge_items(&path.items(), &items.items, budget))
    }

    /// Item type of an array. Null items alongside real ones add a null
    /// alternative; no items at all (or only nulls) give `Primitive(null)`.
    pub fn merge_items(&self, path: &Path, items: &[&Value], budget: usize) -> InferredType {
        let non_null: Vec<&Value> = items.iter().copied().filter(|v| !v.is_null()).collect();
        if non_null.is_empty() {
            return InferredType::null();
        }
        let ty = self.merge_present(path, &non_null, budget);
        if non_null.len() < items.len() {
            InferredType::union(vec![ty, InferredType::null()])
        } else {
            ty
        }
    }
}
