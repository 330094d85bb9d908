//! jq pre-filtering of a catalog before it is parsed as a document.
use anyhow::{Context, Result, anyhow};
use jaq_core::{Compiler, Ctx, RcIter, compile::Undefined, load};
use jaq_json::Val;
use serde_json::Value;

use crate::error::DocumentError;

/// Every output of `filter_src` applied to `input`.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader.load(&arena, program).map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    for item in outputs {
        let val = item.map_err(|err| anyhow!("jq runtime error: {err:?}"))?;
        // Val displays as JSON text
        let text = val.to_string();
        let value = serde_json::from_str(&text).with_context(|| format!("jq produced non-JSON output: {text}"))?;
        out.push(value);
    }
    tracing::debug!(filter = filter_src, outputs = out.len(), "jq filter applied");
    Ok(out)
}

/// A catalog filter must yield exactly one document.
pub fn single_document(mut outputs: Vec<Value>) -> Result<Value, DocumentError> {
    match outputs.len() {
        1 => Ok(outputs.remove(0)),
        count => Err(DocumentError::Filter { count }),
    }
}

fn format_parse_errors(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> anyhow::Error {
    let mut message = String::new();
    for (file, err) in errs {
        message.push_str(&format!("jq parse error: {err:?} in `{}`\n", file.code));
    }
    anyhow!(message)
}

fn format_undefined_errors(errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>) -> anyhow::Error {
    let mut message = String::new();
    for (file, list) in errs {
        for (name, undef) in list {
            message.push_str(&format!("jq: undefined `{name}`: {undef:?} in `{}`\n", file.code));
        }
    }
    anyhow!(message)
}
