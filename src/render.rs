//! Human-readable type tree.
//!
//! ```text
//! record Root
//!   id: integer
//!   home?: record Home | null
//!     city: string
//!   event: choice on "kind"
//!     <goal> record Goal
//!       minute: integer
//! ```

use std::fmt::Write;

use colored::{ColoredString, Colorize};

use crate::ir::{InferredType, PrimitiveKind, RecordType};

const INDENT: &str = "  ";

/// Render `ty` as an indented tree; `color` adds ANSI styling.
pub fn render_tree(ty: &InferredType, color: bool) -> String {
    let painter = Painter { color };
    let mut out = String::new();
    out.push_str(&painter.head(ty));
    out.push('\n');
    painter.children(&mut out, 1, ty);
    out
}

struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color { style(text).to_string() } else { text.to_string() }
    }

    fn head(&self, ty: &InferredType) -> String {
        match ty {
            InferredType::Primitive(PrimitiveKind::Enum { symbols }) => {
                format!("{}[{}]", self.paint("enum", |s| s.cyan()), symbols.join(", "))
            }
            InferredType::Primitive(PrimitiveKind::Null) => self.paint("null", |s| s.dimmed()),
            InferredType::Primitive(kind) => self.paint(kind.name(), |s| s.cyan()),
            InferredType::Array { items } => format!("{}<{}>", self.paint("array", |s| s.cyan()), self.head(items)),
            InferredType::Record(r) => self.record_head(r),
            InferredType::Choice(c) => format!("{} on \"{}\"", self.paint("choice", |s| s.cyan()), self.paint(&c.discriminator, |s| s.bold())),
            InferredType::Union { alternatives } => {
                let heads: Vec<String> = alternatives.iter().map(|alt| self.head(alt)).collect();
                heads.join(" | ")
            }
        }
    }

    fn record_head(&self, record: &RecordType) -> String {
        format!("{} {}", self.paint("record", |s| s.cyan()), self.paint(&record.name, |s| s.green()))
    }

    fn children(&self, out: &mut String, depth: usize, ty: &InferredType) {
        match ty {
            InferredType::Primitive(_) => {}
            InferredType::Array { items } => self.children(out, depth, items),
            InferredType::Record(r) => self.fields(out, depth, r),
            InferredType::Choice(c) => {
                for (tag, record) in &c.variants {
                    let tag = format!("<{tag}>");
                    let _ = writeln!(
                        out,
                        "{}{} {}",
                        INDENT.repeat(depth),
                        self.paint(&tag, |s| s.magenta()),
                        self.record_head(record),
                    );
                    self.fields(out, depth + 1, record);
                }
            }
            InferredType::Union { alternatives } => {
                for alt in alternatives {
                    self.children(out, depth, alt);
                }
            }
        }
    }

    fn fields(&self, out: &mut String, depth: usize, record: &RecordType) {
        for f in &record.fields {
            let marker = if f.required { String::new() } else { self.paint("?", |s| s.yellow()) };
            let null = if f.nullable && !f.ty.is_null() {
                format!(" | {}", self.paint("null", |s| s.dimmed()))
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "{}{}{}: {}{}",
                INDENT.repeat(depth),
                self.paint(&f.name, |s| s.bold()),
                marker,
                self.head(&f.ty),
                null,
            );
            self.children(out, depth + 1, &f.ty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceConfig;
    use crate::inference::infer;
    use crate::value::Value;
    use serde_json::json;

    fn tree(v: serde_json::Value, config: &InferenceConfig) -> String {
        let docs: Vec<Value> = match Value::from(v) {
            Value::List(xs) => xs,
            other => vec![other],
        };
        render_tree(&infer(&docs, config).unwrap(), false)
    }

    #[test]
    fn renders_records_and_optionals() {
        let out = tree(
            json!([
                {"id": 1, "home": {"city": "Oslo"}, "tags": ["a"]},
                {"id": 2, "tags": [], "v": "x"},
                {"id": 3, "tags": [], "v": 4},
            ]),
            &InferenceConfig::default(),
        );
        let expected = "\
record Root
  id: integer
  home?: record Home | null
    city: string
  tags: array<string>
  v?: integer | string | null
";
        assert_eq!(out, expected);
    }

    #[test]
    fn renders_choices() {
        let out = tree(
            json!([
                {"type": "goal_event", "player": "A"},
                {"type": "card_event", "card": "red"},
            ]),
            &InferenceConfig::default(),
        );
        let expected = "\
choice on \"type\"
  <goal_event> record GoalEvent
    player: string
  <card_event> record CardEvent
    card: string
";
        assert_eq!(out, expected);
    }

    #[test]
    fn colors_are_optional() {
        let ty = InferredType::primitive(PrimitiveKind::Integer);
        assert_eq!(render_tree(&ty, false), "integer\n");
        colored::control::set_override(true);
        assert!(render_tree(&ty, true).contains("\u{1b}["));
        colored::control::unset_override();
    }
}
