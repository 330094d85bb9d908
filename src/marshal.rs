//! Positional argument marshaling.
//!
//! Trailing absent arguments are dropped; absent arguments before the last
//! present one are sent as `null` so every later argument keeps its position.
use serde_json::Value;

use crate::codegen::writer::CodeWriter;
use crate::ir::MethodDef;
use crate::resolve::SLOTS_BINDING;

pub fn positional_arguments(slots: Vec<Option<Value>>) -> Vec<Value> {
    match slots.iter().rposition(Option::is_some) {
        Some(last) => slots
            .into_iter()
            .take(last + 1)
            .map(|slot| slot.unwrap_or(Value::Null))
            .collect(),
        None => Vec::new(),
    }
}

/// Write the body of a generated method stub: marshal, then `self.call(..)`.
///
/// Generated code carries the same algorithm as [`positional_arguments`] so the
/// binding has no runtime dependency on this crate.
pub fn write_call_body(w: &mut CodeWriter, method: &MethodDef) {
    let rpc_name = rust_string_literal(&method.rpc_name);
    if method.params.is_empty() {
        w.line(format!("self.call({rpc_name}, Vec::new()).await"));
        return;
    }

    let slots = SLOTS_BINDING;
    w.line(format!(
        "let mut {slots}: Vec<Option<Value>> = vec![None; {}];",
        method.params.len()
    ));
    for (index, param) in method.params.iter().enumerate() {
        if param.required {
            w.line(format!(
                "{slots}[{index}] = Some(serde_json::to_value({})?);",
                param.name
            ));
        } else {
            w.block(&format!("if let Some(value) = {}", param.name), |w| {
                w.line(format!("{slots}[{index}] = Some(serde_json::to_value(value)?);"));
            });
        }
    }
    w.line(format!(
        "let params: Vec<Value> = match {slots}.iter().rposition(Option::is_some) {{"
    ));
    {
        let _arm = w.indent();
        w.line(format!(
            "Some(last) => {slots}.into_iter().take(last + 1).map(|slot| slot.unwrap_or(Value::Null)).collect(),"
        ));
        w.line("None => Vec::new(),");
    }
    w.line("};");
    w.line(format!("self.call({rpc_name}, params).await"));
}

/// `value` as a Rust string literal, escaped.
pub fn rust_string_literal(value: &str) -> String {
    format!("\"{}\"", value.escape_default())
}
