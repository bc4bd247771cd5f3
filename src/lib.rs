//! Structural schema inference over JSON-like document corpora.
//!
//! ```
//! use shape_infer::{infer, InferenceConfig, Value};
//! use serde_json::json;
//!
//! let docs: Vec<Value> = vec![json!({"id": 1}).into(), json!({"id": 2, "tag": "x"}).into()];
//! let ty = infer(&docs, &InferenceConfig::default()).unwrap();
//! assert!(!ty.as_record().unwrap().field("tag").unwrap().required);
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod ir;
pub mod render;
pub mod synth;
pub mod value;

pub use config::{ChoiceTuning, EnumTuning, InferenceConfig, SampleStrategy};
pub use error::{AdapterError, InferenceError};
pub use inference::{infer, SchemaInferrer};
pub use ir::{ChoiceType, Field, InferredType, PrimitiveKind, RecordType};
pub use value::Value;
