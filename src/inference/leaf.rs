//! Leaf classifier: semantic primitive kind of a scalar population.
//!
//! The population is every non-null scalar observed at one structural path.
//! Booleans, numbers and strings are classified independently; a population
//! that mixes them is reported back as [`Classification::Mixed`] and the
//! merger decides what to do with it.

use indexmap::IndexSet;

use super::num::NumC;
use super::str::{Temporal, is_numeric_string, looks_like_id_field, temporal_kind};
use crate::config::{EnumTuning, InferenceConfig};
use crate::ir::PrimitiveKind;
use crate::value::Value;

/// Scalar families that never merge with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarClass {
    Boolean,
    Number,
    String,
}

impl ScalarClass {
    pub fn of(v: &Value) -> Option<Self> {
        match v {
            Value::Bool(_) => Some(ScalarClass::Boolean),
            Value::Int(_) | Value::Real(_) => Some(ScalarClass::Number),
            Value::Str(_) => Some(ScalarClass::String),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No non-null scalar in the population.
    Empty,
    Kind(PrimitiveKind),
    /// More than one scalar class; the merger splits and unions them.
    Mixed,
}

/// Classify a scalar population. Nulls and non-scalars are ignored.
pub fn classify(values: &[&Value], field_name: Option<&str>, config: &InferenceConfig) -> Classification {
    let mut class = None;
    for v in values {
        match (class, ScalarClass::of(v)) {
            (_, None) => continue,
            (None, Some(c)) => class = Some(c),
            (Some(a), Some(b)) if a != b => return Classification::Mixed,
            _ => {}
        }
    }
    match class {
        None => Classification::Empty,
        Some(c) => Classification::Kind(classify_class(c, values, field_name, config)),
    }
}

/// Classify the members of one scalar class, ignoring everything else.
pub fn classify_class(
    class: ScalarClass,
    values: &[&Value],
    field_name: Option<&str>,
    config: &InferenceConfig,
) -> PrimitiveKind {
    match class {
        ScalarClass::Boolean => PrimitiveKind::Boolean,
        ScalarClass::Number => {
            let num = values
                .iter()
                .filter_map(|v| NumC::observe(v))
                .fold(NumC::default(), |acc, n| NumC::join(&acc, &n));
            tracing::trace!(min = ?num.min, max = ?num.max, "numeric population");
            num.kind()
        }
        ScalarClass::String => {
            let strings: Vec<&str> = values.iter().filter_map(|v| v.as_str()).collect();
            classify_strings(&strings, field_name, config)
        }
    }
}

fn classify_strings(strings: &[&str], field_name: Option<&str>, config: &InferenceConfig) -> PrimitiveKind {
    if let Some(t) = uniform_temporal(strings) {
        return match t {
            Temporal::DateTime => PrimitiveKind::DateTime,
            Temporal::Date => PrimitiveKind::Date,
            Temporal::Time => PrimitiveKind::Time,
        };
    }
    if config.infer_enums {
        if let Some(symbols) = enum_symbols(strings, field_name, &config.enums) {
            return PrimitiveKind::Enum { symbols };
        }
    }
    PrimitiveKind::String
}

/// The temporal shape shared by every string, if there is exactly one.
fn uniform_temporal(strings: &[&str]) -> Option<Temporal> {
    let first = temporal_kind(strings.first()?)?;
    strings[1..]
        .iter()
        .all(|s| temporal_kind(s) == Some(first))
        .then_some(first)
}

/// Enum symbols in first-seen order when the population qualifies.
pub fn enum_symbols(strings: &[&str], field_name: Option<&str>, tuning: &EnumTuning) -> Option<Vec<String>> {
    if field_name.is_some_and(looks_like_id_field) {
        return None;
    }
    let distinct: IndexSet<&str> = strings.iter().copied().collect();
    let d = distinct.len();
    let n = strings.len();
    if d < tuning.min_symbols || d > tuning.max_symbols {
        return None;
    }
    if (d as f64) / (n as f64) >= tuning.max_ratio {
        return None;
    }
    if distinct.iter().any(|s| is_numeric_string(s) || temporal_kind(s).is_some()) {
        return None;
    }
    Some(distinct.into_iter().map(str::to_string).collect())
}
