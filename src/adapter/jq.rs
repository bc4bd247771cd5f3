use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

use crate::error::AdapterError;

/// Run a jq filter over one document; every output becomes a document.
pub fn run_jaq(source_name: &str, filter_src: &str, input: &Value) -> Result<Vec<Value>, AdapterError> {
    let fail = |message: String| AdapterError::Jq {
        source_name: source_name.to_string(),
        message,
    };

    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(|errs| fail(format_parse_errors(errs)))?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| fail(format_undefined_errors(errs)))?;

    let inputs = RcIter::new(core::iter::empty());
    let it = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    for item in it {
        let v = item.map_err(|e| fail(format!("{e:?}")))?;
        // Val renders as JSON text
        let json = serde_json::from_str::<Value>(&v.to_string())
            .map_err(|e| fail(format!("filter output is not JSON: {e}")))?;
        out.push(json);
    }
    Ok(out)
}

fn format_parse_errors(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> String {
    let mut s = String::new();
    for (file, err) in errs {
        s.push_str(&format!("parse error: {err:?} in `{}`\n", file.code));
    }
    s
}

fn format_undefined_errors(errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>) -> String {
    let mut s = String::new();
    for (file, list) in errs {
        for (name, undef) in list {
            s.push_str(&format!("undefined `{name}`: {undef:?} in `{}`\n", file.code));
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn each_output_is_a_document() {
        let out = run_jaq("doc", ".events[]", &json!({"events": [{"a": 1}, {"a": 2}]})).unwrap();
        assert_eq!(out, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn bad_filters_are_reported() {
        let err = run_jaq("doc", ".[", &json!({})).unwrap_err();
        assert!(matches!(err, AdapterError::Jq { .. }));
        let err = run_jaq("doc", "no_such_function", &json!({})).unwrap_err();
        assert_eq!(err.source_name(), "doc");
    }
}
