//! XML to JSON-shaped values.
//!
//! The root element's content is the document. Child elements become fields
//! keyed by local name and repeated siblings become a list. Attributes are
//! `@name` strings (namespace declarations are dropped). A leaf element's text
//! is a string; text next to attributes or children lands under `#text`. An
//! element with nothing in it is null.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::AdapterError;

pub const TEXT_KEY: &str = "#text";
pub const ATTRIBUTE_PREFIX: char = '@';

struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn finish(self) -> Value {
        let text = self.text.trim();
        if self.fields.is_empty() {
            return if text.is_empty() { Value::Null } else { Value::String(text.to_string()) };
        }
        let mut fields = self.fields;
        if !text.is_empty() {
            fields.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
        }
        Value::Object(fields)
    }

    fn push_child(&mut self, name: String, value: Value) {
        match self.fields.get_mut(&name) {
            // element values are never arrays, so an array here is a repetition
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.fields.insert(name, value);
            }
        }
    }
}

/// Parse one XML document.
pub fn from_str(source_name: &str, src: &str) -> Result<Value, AdapterError> {
    let mut reader = Reader::from_str(src);
    reader.config_mut().trim_text(true);

    let fail = |position: u64, message: String| AdapterError::Xml {
        source_name: source_name.to_string(),
        position,
        message,
    };

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(fail(reader.buffer_position(), "more than one root element".into()));
                }
                let frame = open(e).map_err(|m| fail(reader.buffer_position(), m))?;
                stack.push(frame);
            }
            Ok(Event::Empty(ref e)) => {
                let frame = open(e).map_err(|m| fail(reader.buffer_position(), m))?;
                let name = frame.name.clone();
                close(&mut stack, &mut root, name, frame.finish())
                    .map_err(|m| fail(reader.buffer_position(), m))?;
            }
            Ok(Event::End(_)) => {
                let Some(frame) = stack.pop() else {
                    return Err(fail(reader.buffer_position(), "unbalanced end tag".into()));
                };
                let name = frame.name.clone();
                close(&mut stack, &mut root, name, frame.finish())
                    .map_err(|m| fail(reader.buffer_position(), m))?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| fail(reader.buffer_position(), err.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(fail(reader.error_position(), e.to_string())),
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(fail(reader.buffer_position(), "unexpected end of input".into()));
    }
    root.ok_or_else(|| fail(reader.buffer_position(), "no root element".into()))
}

fn open(e: &BytesStart<'_>) -> Result<Frame, String> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
    let mut fields = Map::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = format!(
            "{ATTRIBUTE_PREFIX}{}",
            String::from_utf8_lossy(attr.key.local_name().as_ref())
        );
        let value = attr.unescape_value().map_err(|err| err.to_string())?;
        fields.insert(key, Value::String(value.into_owned()));
    }
    Ok(Frame { name, fields, text: String::new() })
}

fn close(stack: &mut [Frame], root: &mut Option<Value>, name: String, value: Value) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_child(name, value);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(value);
            Ok(())
        }
        None => Err("more than one root element".into()),
    }
}
