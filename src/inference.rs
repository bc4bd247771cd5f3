//! Schema inference over a corpus of example documents.
//!
//! The corpus is sampled, its root shape is decided, and the merger folds
//! every structural path bottom-up into one [`InferredType`]:
//!
//! - records merge field by field over every instance carrying the field,
//!   after the choice engine had a chance to split them into variants;
//! - lists merge through the union of all of their items;
//! - scalars are classified into semantic primitives, and conflicting
//!   kinds become unions instead of errors.
//!
//! Fatal outcomes are limited to an empty corpus and a corpus whose
//! documents disagree on the root shape. Everything else is resolved by
//! generalizing the inferred type.
pub mod arr;
pub mod choice;
pub mod leaf;
pub mod merge;
pub mod num;
pub mod obj;
pub mod path;
pub mod str;

use crate::config::{InferenceConfig, SampleStrategy};
use crate::error::InferenceError;
use crate::ir::InferredType;
use crate::value::{Fields, Value};

use self::arr::ListItems;
use self::merge::Merger;
use self::path::Path;

// ------------------------------- Sampling -------------------------------- //

/// Apply the sample cap. Prefix keeps the head of the corpus; stride keeps
/// evenly spaced members. Either way the choice is fixed before merging.
pub fn sample<T: Copy>(items: &[T], size: usize, strategy: SampleStrategy) -> Vec<T> {
    let len = items.len();
    if size == 0 || len <= size {
        return items.to_vec();
    }
    match strategy {
        SampleStrategy::Prefix => items[..size].to_vec(),
        SampleStrategy::Stride => (0..size).map(|i| items[i * len / size]).collect(),
    }
}

// ------------------------------ Root shape -------------------------------- //

enum RootShape<'a> {
    /// Only null documents.
    Null,
    Records(Vec<&'a Fields>),
    Lists(Vec<&'a Vec<Value>>),
    Scalars(Vec<&'a Value>),
}

fn shape_name(v: &Value) -> &'static str {
    match v {
        Value::Record(_) => "record",
        Value::List(_) => "list",
        _ => "scalar",
    }
}

/// Top-level nulls are skipped; every other document must share one shape.
fn root_shape<'a>(documents: &[&'a Value]) -> Result<RootShape<'a>, InferenceError> {
    let mut shape = RootShape::Null;
    for doc in documents.iter().copied() {
        shape = match (shape, doc) {
            (shape, Value::Null) => shape,
            (RootShape::Null, Value::Record(r)) => RootShape::Records(vec![r]),
            (RootShape::Null, Value::List(xs)) => RootShape::Lists(vec![xs]),
            (RootShape::Null, scalar) => RootShape::Scalars(vec![scalar]),
            (RootShape::Records(mut rs), Value::Record(r)) => {
                rs.push(r);
                RootShape::Records(rs)
            }
            (RootShape::Lists(mut ls), Value::List(xs)) => {
                ls.push(xs);
                RootShape::Lists(ls)
            }
            (RootShape::Scalars(mut ss), scalar @ (Value::Bool(_) | Value::Int(_) | Value::Real(_) | Value::Str(_))) => {
                ss.push(scalar);
                RootShape::Scalars(ss)
            }
            (seen, other) => {
                let first = match seen {
                    RootShape::Records(_) => "record",
                    RootShape::Lists(_) => "list",
                    _ => "scalar",
                };
                return Err(InferenceError::HeterogeneousRoot { first, second: shape_name(other) });
            }
        };
    }
    Ok(shape)
}

// ------------------------------- Front API -------------------------------- //

/// Infer one type describing every document in `corpus`.
#[tracing::instrument(skip_all, fields(documents = corpus.len()))]
pub fn infer(corpus: &[Value], config: &InferenceConfig) -> Result<InferredType, InferenceError> {
    if corpus.is_empty() {
        return Err(InferenceError::EmptyCorpus);
    }
    let documents: Vec<&Value> = corpus.iter().collect();
    let documents = sample(&documents, config.sample_size, config.sample_strategy);
    if documents.len() < corpus.len() {
        tracing::debug!(sampled = documents.len(), "sample cap applied");
    }

    let merger = Merger::new(config);
    let root = Path::root(&config.root_name);
    let budget = config.root_choice_budget();
    let ty = match root_shape(&documents)? {
        RootShape::Null => InferredType::null(),
        RootShape::Records(records) => merger.merge_records(&root, &records, budget),
        RootShape::Lists(lists) => {
            let items = ListItems::collect(lists);
            let items = sample(&items.items, config.sample_size, config.sample_strategy);
            InferredType::array(merger.merge_items(&root.items(), &items, budget))
        }
        RootShape::Scalars(values) => merger.merge_scalars(&root, &values),
    };
    tracing::debug!(root = ty.kind_name(), "inference complete");
    Ok(ty)
}

/// Accumulates documents, then infers their type in one pass.
#[derive(Debug, Clone, Default)]
pub struct SchemaInferrer {
    config: InferenceConfig,
    corpus: Vec<Value>,
}

impl SchemaInferrer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config, corpus: Vec::new() }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn observe(&mut self, document: impl Into<Value>) {
        self.corpus.push(document.into());
    }

    pub fn observed(&self) -> usize {
        self.corpus.len()
    }

    pub fn solve(&self) -> Result<InferredType, InferenceError> {
        infer(&self.corpus, &self.config)
    }
}

// ------------------------------- Tests ------------------------------------ //
