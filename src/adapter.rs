//! Input adapters: raw JSON, NDJSON and XML text to documents.
//!
//! Failures are per document. A bad line in an NDJSON file, or a pointer that
//! selects nothing in one file, is recorded and the rest of the input is kept.

pub mod jq;
pub mod json;
pub mod xml;

use std::path::Path;

use crate::error::AdapterError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// One JSON document per source
    #[default]
    Json,
    /// One JSON document per non-blank line
    Ndjson,
    /// One XML document per source
    Xml,
}

impl InputFormat {
    /// Guess from the file extension; `None` when it is not recognised.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(InputFormat::Json),
            "ndjson" | "jsonl" => Some(InputFormat::Ndjson),
            "xml" => Some(InputFormat::Xml),
            _ => None,
        }
    }
}

/// Narrowing applied to every parsed document, pointer first.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// RFC 6901 JSON Pointer, e.g. `/data/items`
    pub json_pointer: Option<String>,
    /// jq filter; each output becomes its own document
    pub jq_expr: Option<String>,
}

impl Selection {
    fn apply(&self, source_name: &str, doc: serde_json::Value) -> Result<Vec<serde_json::Value>, AdapterError> {
        let doc = match self.json_pointer.as_deref() {
            None | Some("") => doc,
            Some(pointer) => match doc.pointer(pointer) {
                Some(v) => v.clone(),
                None => {
                    return Err(AdapterError::Pointer {
                        source_name: source_name.to_string(),
                        pointer: pointer.to_string(),
                    });
                }
            },
        };
        match self.jq_expr.as_deref() {
            None => Ok(vec![doc]),
            Some(filter) => jq::run_jaq(source_name, filter, &doc),
        }
    }
}

/// Documents parsed from one source, plus the ones that failed.
#[derive(Debug, Default)]
pub struct Parsed {
    pub documents: Vec<Value>,
    pub failures: Vec<AdapterError>,
}

impl Parsed {
    fn record(&mut self, result: Result<Vec<serde_json::Value>, AdapterError>) {
        match result {
            Ok(docs) => self.documents.extend(docs.into_iter().map(Value::from)),
            Err(error) => {
                tracing::warn!(source = error.source_name(), %error, "skipping document");
                self.failures.push(error);
            }
        }
    }

    pub fn extend(&mut self, other: Parsed) {
        self.documents.extend(other.documents);
        self.failures.extend(other.failures);
    }
}

/// Parse `text` as `format` and apply `selection` to each document.
pub fn parse_documents(source_name: &str, text: &str, format: InputFormat, selection: &Selection) -> Parsed {
    let mut parsed = Parsed::default();
    match format {
        InputFormat::Json => {
            let result = json::from_str_with_path::<serde_json::Value>(source_name, text)
                .and_then(|doc| selection.apply(source_name, doc));
            parsed.record(result);
        }
        InputFormat::Ndjson => {
            for (index, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let line_name = format!("{source_name}:{}", index + 1);
                let result = json::from_str_with_path::<serde_json::Value>(&line_name, line)
                    .and_then(|doc| selection.apply(&line_name, doc));
                parsed.record(result);
            }
        }
        InputFormat::Xml => {
            let result = xml::from_str(source_name, text).and_then(|doc| selection.apply(source_name, doc));
            parsed.record(result);
        }
    }
    tracing::debug!(
        source = source_name,
        documents = parsed.documents.len(),
        failures = parsed.failures.len(),
        "parsed source"
    );
    parsed
}

/// Read and parse one file.
pub fn load_file(path: &Path, format: InputFormat, selection: &Selection) -> Parsed {
    let source_name = path.to_string_lossy().to_string();
    match std::fs::read_to_string(path) {
        Ok(text) => parse_documents(&source_name, &text, format, selection),
        Err(error) => {
            let mut parsed = Parsed::default();
            parsed.record(Err(AdapterError::Io {
                source_name,
                message: error.to_string(),
            }));
            parsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn select(pointer: Option<&str>, jq: Option<&str>) -> Selection {
        Selection {
            json_pointer: pointer.map(str::to_string),
            jq_expr: jq.map(str::to_string),
        }
    }

    #[test]
    fn formats_from_extensions() {
        assert_eq!(InputFormat::from_path(Path::new("a/b.JSON")), Some(InputFormat::Json));
        assert_eq!(InputFormat::from_path(Path::new("events.jsonl")), Some(InputFormat::Ndjson));
        assert_eq!(InputFormat::from_path(Path::new("events.ndjson")), Some(InputFormat::Ndjson));
        assert_eq!(InputFormat::from_path(Path::new("feed.xml")), Some(InputFormat::Xml));
        assert_eq!(InputFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(InputFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn ndjson_keeps_good_lines() {
        let text = "{\"a\": 1}\n\n{\"a\": \n{\"a\": 3}\n";
        let parsed = parse_documents("events.ndjson", text, InputFormat::Ndjson, &Selection::default());
        assert_eq!(parsed.documents.len(), 2);
        assert_eq!(parsed.failures.len(), 1);
        assert_eq!(parsed.failures[0].source_name(), "events.ndjson:3");
    }

    #[test]
    fn pointer_selects_a_subtree() {
        let text = r#"{"data": {"items": [{"x": 1}, {"x": 2}]}}"#;
        let parsed = parse_documents("doc.json", text, InputFormat::Json, &select(Some("/data/items"), None));
        assert_eq!(parsed.documents, vec![Value::from(json!([{"x": 1}, {"x": 2}]))]);

        let parsed = parse_documents("doc.json", text, InputFormat::Json, &select(Some("/missing"), None));
        assert!(parsed.documents.is_empty());
        assert!(matches!(parsed.failures[0], AdapterError::Pointer { .. }));
    }

    #[test]
    fn jq_runs_after_the_pointer() {
        let text = r#"{"data": {"items": [{"x": 1}, {"x": 2}]}}"#;
        let parsed = parse_documents("doc.json", text, InputFormat::Json, &select(Some("/data"), Some(".items[]")));
        assert_eq!(
            parsed.documents,
            vec![Value::from(json!({"x": 1})), Value::from(json!({"x": 2}))]
        );
    }

    #[test]
    fn xml_documents_are_values() {
        let parsed = parse_documents(
            "feed.xml",
            "<feed><entry id=\"1\"/><entry id=\"2\"/></feed>",
            InputFormat::Xml,
            &select(Some("/entry"), None),
        );
        assert_eq!(parsed.documents, vec![Value::from(json!([{"@id": "1"}, {"@id": "2"}]))]);
    }

    #[test]
    fn missing_files_are_io_failures() {
        let parsed = load_file(Path::new("/definitely/not/here.json"), InputFormat::Json, &Selection::default());
        assert!(matches!(parsed.failures[0], AdapterError::Io { .. }));
    }
}
