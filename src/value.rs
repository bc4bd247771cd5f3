//! Generic document tree the inference engine consumes.
//!
//! Input adapters turn JSON, NDJSON and XML into this shape before inference
//! starts. Numbers are split only into integers and reals; strings carry no
//! semantic tag.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;

/// Ordered string-keyed members of a record value.
pub type Fields = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Real(OrderedFloat<f64>),
    Str(String),
    List(Vec<Value>),
    Record(Fields),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Fields> {
        match self {
            Value::Record(m) => Some(m),
            _ => None,
        }
    }

    pub fn real(f: f64) -> Self {
        Value::Real(OrderedFloat(f))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 beyond i64::MAX lands here as an integral real
                None => Value::real(n.as_f64().unwrap_or(f64::NAN)),
            },
            J::String(s) => Value::Str(s),
            J::Array(xs) => Value::List(xs.into_iter().map(Value::from).collect()),
            J::Object(m) => Value::Record(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        use serde_json::Value as J;
        match v {
            Value::Null => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Int(i) => J::from(*i),
            Value::Real(f) => serde_json::Number::from_f64(f.0).map(J::Number).unwrap_or(J::Null),
            Value::Str(s) => J::String(s.clone()),
            Value::List(xs) => J::Array(xs.iter().map(J::from).collect()),
            Value::Record(m) => J::Object(m.iter().map(|(k, v)| (k.clone(), J::from(v))).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_split_into_int_and_real() {
        assert_eq!(Value::from(json!(3)), Value::Int(3));
        assert_eq!(Value::from(json!(2.5)), Value::real(2.5));
        assert!(matches!(Value::from(json!(u64::MAX)), Value::Real(_)));
    }

    #[test]
    fn json_objects_keep_member_order() {
        let v = Value::from(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<&str> = v.as_record().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn converts_back_to_json() {
        let src = json!({"a": [1, 2.5, "x", null, true], "b": {"c": null}});
        let back = serde_json::Value::from(&Value::from(src.clone()));
        assert_eq!(back, src);
    }
}
