use indexmap::IndexSet;

use crate::value::{Fields, Value};

/// One field of one record instance: missing, explicitly null, or a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldObservation<'a> {
    Absent,
    Null,
    Present(&'a Value),
}

impl<'a> FieldObservation<'a> {
    pub fn of(record: &'a Fields, name: &str) -> Self {
        match record.get(name) {
            None => FieldObservation::Absent,
            Some(Value::Null) => FieldObservation::Null,
            Some(v) => FieldObservation::Present(v),
        }
    }

    pub fn value(&self) -> Option<&'a Value> {
        match self {
            FieldObservation::Present(v) => Some(v),
            _ => None,
        }
    }
}

/// Presence counts for one field across the instances at a path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldPresence {
    pub present: usize, // key exists, value non-null
    pub null: usize,
    pub absent: usize,
}

impl FieldPresence {
    pub fn tally(observations: &[FieldObservation<'_>]) -> Self {
        let mut out = Self::default();
        for obs in observations {
            match obs {
                FieldObservation::Absent => out.absent += 1,
                FieldObservation::Null => out.null += 1,
                FieldObservation::Present(_) => out.present += 1,
            }
        }
        out
    }

    /// Present and non-null in every single instance.
    pub fn required(&self) -> bool {
        self.present > 0 && self.null == 0 && self.absent == 0
    }

    pub fn nullable(&self) -> bool {
        self.null > 0 || self.absent > 0
    }
}

/// Union of field names across records, first-seen order.
pub fn field_names<'a>(records: &[&'a Fields]) -> IndexSet<&'a str> {
    records
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect()
}

/// The field as seen by every record, in record order.
pub fn observations<'a>(records: &[&'a Fields], name: &str) -> Vec<FieldObservation<'a>> {
    records.iter().map(|r| FieldObservation::of(r, name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: &[Value]) -> Vec<&Fields> {
        values.iter().filter_map(Value::as_record).collect()
    }

    #[test]
    fn names_are_first_seen_across_all_records() {
        let docs: Vec<Value> = vec![
            json!({"b": 1, "a": 2}).into(),
            json!({"c": 3, "a": 4}).into(),
        ];
        let names: Vec<&str> = field_names(&records(&docs)).into_iter().collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn presence_distinguishes_null_and_absent() {
        let docs: Vec<Value> = vec![
            json!({"a": 1}).into(),
            json!({"a": null}).into(),
            json!({}).into(),
        ];
        let obs = observations(&records(&docs), "a");
        assert_eq!(obs[0], FieldObservation::Present(&Value::Int(1)));
        assert_eq!(obs[1], FieldObservation::Null);
        assert_eq!(obs[2], FieldObservation::Absent);

        let p = FieldPresence::tally(&obs);
        assert_eq!(p, FieldPresence { present: 1, null: 1, absent: 1 });
        assert!(!p.required());
        assert!(p.nullable());
    }

    #[test]
    fn required_only_when_always_present() {
        let p = FieldPresence { present: 999, null: 0, absent: 1 };
        assert!(!p.required());
        let p = FieldPresence { present: 1000, null: 0, absent: 0 };
        assert!(p.required());
        assert!(!p.nullable());
    }
}
