//! Synthetic corpora that conform to an inferred type.
//!
//! The generated documents are shaped so that inferring over them again,
//! with the configuration that produced the type, gives back the same type:
//!
//! - every record carries every field; optional fields are null in the last
//!   instance only, so all instances keep one field signature;
//! - plain strings never repeat, so they read neither as enums nor as tags;
//! - enum symbols cycle from the first, preserving first-seen order;
//! - the population is large enough for every enum to pass its ratio test.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::ir::{ChoiceType, InferredType, PrimitiveKind, RecordType};
use crate::value::{Fields, Value};

/// Instances generated per unit of population scale.
const BASE_POPULATION: usize = 12;

/// A synthetic corpus for `ty`.
pub fn exemplars(ty: &InferredType) -> Vec<Value> {
    let n = population_size(ty);
    Synth::default().values(ty, n, None)
}

/// Enough instances that every sub-population (union alternatives, choice
/// variants) still clears the enum ratio for the largest symbol set.
pub fn population_size(ty: &InferredType) -> usize {
    BASE_POPULATION * max_symbols(ty).max(2) * scale(ty) + 2
}

fn max_symbols(ty: &InferredType) -> usize {
    match ty {
        InferredType::Primitive(PrimitiveKind::Enum { symbols }) => symbols.len(),
        InferredType::Primitive(_) => 0,
        InferredType::Array { items } => max_symbols(items),
        InferredType::Record(r) => r.fields.iter().map(|f| max_symbols(&f.ty)).max().unwrap_or(0),
        InferredType::Choice(c) => c
            .variants
            .values()
            .flat_map(|r| r.fields.iter().map(|f| max_symbols(&f.ty)))
            .max()
            .unwrap_or(0),
        InferredType::Union { alternatives } => alternatives.iter().map(max_symbols).max().unwrap_or(0),
    }
}

/// How many ways the population is split on the way down to any leaf.
fn scale(ty: &InferredType) -> usize {
    let fields_scale = |r: &RecordType| r.fields.iter().map(|f| scale(&f.ty)).max().unwrap_or(1);
    match ty {
        InferredType::Primitive(_) => 1,
        InferredType::Array { items } => scale(items),
        InferredType::Record(r) => fields_scale(r),
        InferredType::Choice(c) => {
            c.variants.len().max(1) * c.variants.values().map(fields_scale).max().unwrap_or(1)
        }
        InferredType::Union { alternatives } => {
            alternatives.len().max(1) * alternatives.iter().map(scale).max().unwrap_or(1)
        }
    }
}

#[derive(Default)]
struct Synth {
    /// Source of never-repeating string values.
    counter: usize,
}

impl Synth {
    fn values(&mut self, ty: &InferredType, n: usize, field: Option<&str>) -> Vec<Value> {
        match ty {
            InferredType::Primitive(kind) => (0..n).map(|i| self.scalar(kind, i, field)).collect(),
            InferredType::Array { items } => {
                let mut pool = self.values(items, 2 * n, field).into_iter();
                (0..n)
                    .map(|_| Value::List(pool.by_ref().take(2).collect()))
                    .collect()
            }
            InferredType::Record(r) => self.records(r, n).into_iter().map(Value::Record).collect(),
            InferredType::Choice(c) => self.choice(c, n),
            InferredType::Union { alternatives } => {
                let columns = alternatives
                    .iter()
                    .enumerate()
                    .map(|(j, alt)| self.values(alt, share(n, alternatives.len(), j), field))
                    .collect();
                interleave(columns, n)
            }
        }
    }

    fn records(&mut self, record: &RecordType, n: usize) -> Vec<Fields> {
        let mut columns: Vec<std::vec::IntoIter<Value>> = Vec::with_capacity(record.fields.len());
        for f in &record.fields {
            // the null is appended, never overwritten, so nested optionals survive
            let column = if f.required {
                self.values(&f.ty, n, Some(&f.name))
            } else {
                let mut column = self.values(&f.ty, n.saturating_sub(1), Some(&f.name));
                column.push(Value::Null);
                column
            };
            columns.push(column.into_iter());
        }
        (0..n)
            .map(|_| {
                record
                    .fields
                    .iter()
                    .zip(columns.iter_mut())
                    .map(|(f, column)| (f.name.clone(), column.next().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect()
    }

    fn choice(&mut self, choice: &ChoiceType, n: usize) -> Vec<Value> {
        let v = choice.variants.len();
        let columns = choice
            .variants
            .iter()
            .enumerate()
            .map(|(j, (tag, record))| {
                self.records(record, share(n, v, j))
                    .into_iter()
                    .map(|fields| {
                        let mut tagged = Fields::with_capacity(fields.len() + 1);
                        tagged.insert(choice.discriminator.clone(), Value::Str(tag.clone()));
                        tagged.extend(fields);
                        Value::Record(tagged)
                    })
                    .collect()
            })
            .collect();
        interleave(columns, n)
    }

    fn scalar(&mut self, kind: &PrimitiveKind, i: usize, field: Option<&str>) -> Value {
        let step = i as i64;
        match kind {
            PrimitiveKind::Null => Value::Null,
            PrimitiveKind::Boolean => Value::Bool(i % 2 == 0),
            PrimitiveKind::Integer => Value::Int(step + 1),
            PrimitiveKind::Real => Value::real(step as f64 + 0.5),
            PrimitiveKind::String => {
                self.counter += 1;
                Value::Str(format!("{}-sample-{}", field.unwrap_or("value"), self.counter))
            }
            PrimitiveKind::Date => {
                let date = NaiveDate::default() + TimeDelta::days(step);
                Value::Str(date.format("%Y-%m-%d").to_string())
            }
            PrimitiveKind::Time => {
                let time = NaiveTime::default() + TimeDelta::seconds(step * 61);
                Value::Str(time.format("%H:%M:%S").to_string())
            }
            PrimitiveKind::DateTime => {
                let at = NaiveDateTime::default() + TimeDelta::minutes(step * 7);
                Value::Str(at.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            }
            PrimitiveKind::Enum { symbols } => match symbols.get(i % symbols.len().max(1)) {
                Some(s) => Value::Str(s.clone()),
                None => Value::Null,
            },
        }
    }
}

/// Size of the `j`-th of `k` round-robin shares of `n`.
fn share(n: usize, k: usize, j: usize) -> usize {
    (n + k - 1 - j) / k
}

/// Round-robin: instance `i` comes from column `i % k`.
fn interleave(columns: Vec<Vec<Value>>, n: usize) -> Vec<Value> {
    let k = columns.len();
    if k == 0 {
        return vec![Value::Null; n];
    }
    let mut iters: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
    (0..n)
        .map(|i| iters[i % k].next().unwrap_or(Value::Null))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceConfig;
    use crate::inference::infer;
    use serde_json::json;

    fn corpus(v: serde_json::Value) -> Vec<Value> {
        match Value::from(v) {
            Value::List(xs) => xs,
            other => vec![other],
        }
    }

    fn assert_idempotent(docs: &[Value], config: &InferenceConfig) -> InferredType {
        let first = infer(docs, config).unwrap();
        let again = infer(&exemplars(&first), config).unwrap();
        assert_eq!(again, first);
        first
    }

    #[test]
    fn shares_cover_the_population() {
        assert_eq!((0..3).map(|j| share(10, 3, j)).collect::<Vec<_>>(), [4, 3, 3]);
        assert_eq!(share(5, 1, 0), 5);
    }

    #[test]
    fn records_round_trip() {
        let docs = corpus(json!([
            {"id": 1, "name": "a", "born": "1990-04-01", "seen": "2024-01-01T10:00:00Z",
             "score": 1.5, "tags": ["x", "y"], "home": {"city": "Oslo", "zip": "0150"}},
            {"id": 2, "name": "b", "born": "1985-12-31", "seen": "2024-01-02T11:00:00Z",
             "score": 2, "tags": [], "home": null, "alarm": "07:30"},
            {"id": 3, "name": "c", "born": "2001-07-15", "seen": "2024-01-03T12:00:00Z",
             "score": 3, "tags": ["z"], "home": {"city": "Bergen"}, "v": "x"},
            {"id": 4, "name": "d", "born": "1999-01-01", "seen": "2024-01-04T13:00:00Z",
             "score": 4.25, "tags": ["w"], "v": 3, "mixed": [1, null]},
        ]));
        let ty = assert_idempotent(&docs, &InferenceConfig::default());
        let root = ty.as_record().unwrap();
        assert_eq!(root.field("born").unwrap().ty, InferredType::primitive(PrimitiveKind::Date));
        assert!(matches!(root.field("v").unwrap().ty, InferredType::Union { .. }));
    }

    #[test]
    fn choices_round_trip() {
        let docs = corpus(json!([
            {"type": "goal_event", "player": "A", "minute": 12},
            {"type": "card_event", "card": "red", "minute": 30},
            {"type": "goal_event", "player": "B", "minute": 44, "penalty": true},
            {"type": "card_event", "card": "yellow", "minute": 81},
        ]));
        let ty = assert_idempotent(&docs, &InferenceConfig::default());
        assert_eq!(ty.as_choice().unwrap().variants.len(), 2);
    }

    #[test]
    fn enums_round_trip() {
        let levels = ["debug", "info", "warn"];
        let docs: Vec<Value> = (0..60)
            .map(|i| json!({"level": levels[i % 3], "msg": format!("message {i}")}).into())
            .collect();
        let config = InferenceConfig::builder().infer_enums(true).build();
        let ty = assert_idempotent(&docs, &config);
        assert_eq!(
            ty.as_record().unwrap().field("level").unwrap().ty,
            InferredType::primitive(PrimitiveKind::Enum {
                symbols: levels.iter().map(|s| s.to_string()).collect()
            })
        );
    }

    #[test]
    fn list_roots_round_trip() {
        let docs = corpus(json!([[{"x": 1}], [{"y": "s"}, {"x": 2, "y": "t"}], [null]]));
        assert_idempotent(&docs, &InferenceConfig::default());
    }

    #[test]
    fn nested_choices_round_trip() {
        let docs = corpus(json!([
            {"seq": 1, "event": {"kind": "goal", "scorer": "A", "minute": 12}},
            {"seq": 2, "event": {"kind": "card", "color": "red"}},
            {"seq": 3, "event": {"kind": "goal", "scorer": "B", "minute": 40}},
        ]));
        let config = InferenceConfig::builder().choice_depth(2).build();
        assert_idempotent(&docs, &config);
    }
}
