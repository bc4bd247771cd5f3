// Format-agnostic type model handed to emitters. No serialization syntax here.

use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PrimitiveKind {
    Null,
    Boolean,
    Integer,
    Real,
    String,
    Date,
    Time,
    DateTime,
    /// Discovered symbols, first-seen order.
    Enum { symbols: Vec<String> },
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Null => "null",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Real => "real",
            PrimitiveKind::String => "string",
            PrimitiveKind::Date => "date",
            PrimitiveKind::Time => "time",
            PrimitiveKind::DateTime => "datetime",
            PrimitiveKind::Enum { .. } => "enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InferredType {
    Primitive(PrimitiveKind),
    Array { items: Box<InferredType> },
    Record(RecordType),
    Choice(ChoiceType),
    /// Pairwise non-mergeable alternatives, never fewer than two.
    Union { alternatives: Vec<InferredType> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordType {
    pub name: String,
    pub fields: Vec<Field>, // first-seen order, unique names
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: InferredType,
    pub required: bool, // present & non-null in every instance
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceType {
    pub discriminator: String,
    /// Keyed by discriminator value with its original casing.
    pub variants: IndexMap<String, RecordType>,
}

impl InferredType {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        InferredType::Primitive(kind)
    }

    pub fn null() -> Self {
        InferredType::Primitive(PrimitiveKind::Null)
    }

    pub fn array(items: InferredType) -> Self {
        InferredType::Array { items: Box::new(items) }
    }

    /// Build a union, flattening nested unions and dropping duplicates.
    /// Zero alternatives collapse to null, one to itself.
    pub fn union(alternatives: Vec<InferredType>) -> Self {
        let mut flat: Vec<InferredType> = Vec::with_capacity(alternatives.len());
        for alt in alternatives {
            match alt {
                InferredType::Union { alternatives } => {
                    for inner in alternatives {
                        if !flat.contains(&inner) {
                            flat.push(inner);
                        }
                    }
                }
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }
        match flat.len() {
            0 => InferredType::null(),
            1 => flat.remove(0),
            _ => InferredType::Union { alternatives: flat },
        }
    }

    /// Order-insensitive normal form: record fields, choice variants and enum
    /// symbols sorted by name. Two corpora that differ only in document order
    /// infer types with equal normal forms.
    pub fn canonical(&self) -> InferredType {
        fn record(r: &RecordType) -> RecordType {
            let mut fields: Vec<Field> = r
                .fields
                .iter()
                .map(|f| Field { ty: f.ty.canonical(), ..f.clone() })
                .collect();
            fields.sort_by(|a, b| a.name.cmp(&b.name));
            RecordType { name: r.name.clone(), fields }
        }
        match self {
            InferredType::Primitive(PrimitiveKind::Enum { symbols }) => {
                let mut symbols = symbols.clone();
                symbols.sort();
                InferredType::Primitive(PrimitiveKind::Enum { symbols })
            }
            InferredType::Primitive(_) => self.clone(),
            InferredType::Array { items } => InferredType::array(items.canonical()),
            InferredType::Record(r) => InferredType::Record(record(r)),
            InferredType::Choice(c) => {
                let mut variants: IndexMap<String, RecordType> =
                    c.variants.iter().map(|(tag, r)| (tag.clone(), record(r))).collect();
                variants.sort_keys();
                InferredType::Choice(ChoiceType { discriminator: c.discriminator.clone(), variants })
            }
            InferredType::Union { alternatives } => InferredType::Union {
                alternatives: alternatives.iter().map(InferredType::canonical).collect(),
            },
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            InferredType::Primitive(k) => k.name(),
            InferredType::Array { .. } => "array",
            InferredType::Record(_) => "record",
            InferredType::Choice(_) => "choice",
            InferredType::Union { .. } => "union",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, InferredType::Primitive(PrimitiveKind::Null))
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            InferredType::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&ChoiceType> {
        match self {
            InferredType::Choice(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_array_items(&self) -> Option<&InferredType> {
        match self {
            InferredType::Array { items } => Some(items),
            _ => None,
        }
    }
}

impl RecordType {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// PascalCase type name from a raw field name or tag value.
///
/// Non-alphanumeric characters split words; a leading digit gets a `T` prefix
/// so the result is always usable as an identifier by emitters.
pub fn type_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() {
        return "Anonymous".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'T');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_collapses_and_flattens() {
        let int = InferredType::primitive(PrimitiveKind::Integer);
        let s = InferredType::primitive(PrimitiveKind::String);
        assert_eq!(InferredType::union(vec![int.clone()]), int);
        assert_eq!(InferredType::union(vec![int.clone(), int.clone()]), int);
        assert!(InferredType::union(vec![]).is_null());

        let nested = InferredType::union(vec![
            InferredType::union(vec![int.clone(), s.clone()]),
            s.clone(),
        ]);
        assert_eq!(nested, InferredType::Union { alternatives: vec![int, s] });
    }

    #[test]
    fn canonical_form_sorts_names() {
        let s = InferredType::primitive(PrimitiveKind::String);
        let field = |name: &str| Field { name: name.to_string(), ty: s.clone(), required: true, nullable: false };
        let record = |names: &[&str]| RecordType { name: "R".into(), fields: names.iter().map(|n| field(*n)).collect() };
        let choice = |tags: &[&str], names: &[&str]| {
            InferredType::Choice(ChoiceType {
                discriminator: "type".into(),
                variants: tags.iter().map(|t| (t.to_string(), record(names))).collect(),
            })
        };
        let a = choice(&["b", "a"], &["y", "x"]);
        let b = choice(&["a", "b"], &["x", "y"]);
        assert_ne!(a, b);
        assert_eq!(a.canonical(), b.canonical());

        let e = InferredType::primitive(PrimitiveKind::Enum { symbols: vec!["warn".into(), "info".into()] });
        assert_eq!(
            e.canonical(),
            InferredType::primitive(PrimitiveKind::Enum { symbols: vec!["info".into(), "warn".into()] })
        );
    }

    #[test]
    fn type_names_are_pascal_case() {
        assert_eq!(type_name("goal_event"), "GoalEvent");
        assert_eq!(type_name("card-event"), "CardEvent");
        assert_eq!(type_name("@href"), "Href");
        assert_eq!(type_name("2020 season"), "T2020Season");
        assert_eq!(type_name("--"), "Anonymous");
    }

    #[test]
    fn serializes_with_type_tags() {
        let ty = InferredType::array(InferredType::primitive(PrimitiveKind::Enum {
            symbols: vec!["a".into(), "b".into()],
        }));
        let json = serde_json::to_value(&ty).unwrap();
        assert_eq!(json["type"], "array");
        assert_eq!(json["items"]["type"], "primitive");
        assert_eq!(json["items"]["kind"], "enum");
        assert_eq!(json["items"]["symbols"][1], "b");
    }
}
