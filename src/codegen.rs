//! Rust source emission. Every naming and typing decision has already been
//! made by the time a [`Registry`] and its methods reach this module.
pub mod writer;

use crate::config::Options;
use crate::ir::{CanonicalType, Definition, EnumDef, FieldDef, MethodDef, Primitive, StructDef};
use crate::marshal::{rust_string_literal, write_call_body};
use crate::registry::Registry;

use self::writer::CodeWriter;

pub const DEFAULT_HEADER: &str = "This file is @generated by openrpc-bindgen. Do not edit by hand.";

const DERIVES: &str = "#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]";
const DENY_UNKNOWN: &str = "#[cfg_attr(feature = \"serde-deny-unknown-fields\", serde(deny_unknown_fields))]";
const OPTIONAL_FIELD: &str = "#[serde(default, skip_serializing_if = \"Option::is_none\")]";

pub fn rust_type(ty: &CanonicalType) -> String {
    match ty {
        CanonicalType::Primitive(primitive) => match primitive {
            Primitive::String => "String",
            Primitive::Integer => "i64",
            Primitive::Float => "f64",
            Primitive::Decimal => "rust_decimal::Decimal",
            Primitive::Boolean => "bool",
            Primitive::Unit => "()",
        }
        .to_string(),
        CanonicalType::Opaque => "Value".to_string(),
        CanonicalType::Collection(item) => format!("Vec<{}>", rust_type(item)),
        CanonicalType::Map(value) => format!("BTreeMap<String, {}>", rust_type(value)),
        CanonicalType::Optional(inner) => format!("Option<{}>", rust_type(inner)),
        CanonicalType::RangeValue => "RangeParam".to_string(),
        CanonicalType::StructRef(name) | CanonicalType::EnumRef(name) => name.clone(),
    }
}

pub fn emit(registry: &Registry, methods: &[MethodDef], options: &Options) -> String {
    let mut w = CodeWriter::new();

    let header = options.header.as_deref().unwrap_or(DEFAULT_HEADER);
    for line in header.trim().lines() {
        let line = line.trim_end();
        if line.is_empty() { w.line("//") } else { w.line(format!("// {line}")) }
    }
    w.blank_line();

    w.block("pub mod types", |w| {
        w.line("use serde::{Deserialize, Serialize};");
        if registry.needs_open_map() {
            w.line("use std::collections::BTreeMap;");
        }
        w.line("pub use serde_json::Value;");
        w.blank_line();

        if registry.needs_range_helper() {
            write_range_helper(w);
            w.blank_line();
        }
        for definition in registry.definitions() {
            match definition {
                Definition::Struct(def) => write_struct(w, def),
                Definition::Enum(def) => write_enum(w, def),
            }
            w.blank_line();
        }
    });
    w.blank_line();

    w.line("use self::types::*;");
    if methods.iter().any(signature_mentions_map) {
        w.line("use std::collections::BTreeMap;");
    }
    w.blank_line();

    w.block(&format!("impl {}", options.client_type), |w| {
        for (index, method) in methods.iter().enumerate() {
            if index > 0 {
                w.blank_line();
            }
            write_method(w, method, &options.result_alias);
        }
    });

    w.finish()
}

fn signature_mentions_map(method: &MethodDef) -> bool {
    method.result.mentions_map() || method.params.iter().any(|param| param.ty.mentions_map())
}

fn write_range_helper(w: &mut CodeWriter) {
    w.line(DERIVES);
    w.line("#[serde(untagged)]");
    w.block("pub enum RangeParam", |w| {
        w.line("Single(u64),");
        w.line("Range([u64; 2]),");
    });
}

fn write_struct(w: &mut CodeWriter, def: &StructDef) {
    w.line(DERIVES);
    // serde refuses deny_unknown_fields next to flatten
    if def.open_field.is_none() {
        w.line(DENY_UNKNOWN);
    }
    w.block(&format!("pub struct {}", def.name), |w| {
        for field in &def.fields {
            write_field(w, field);
        }
        if let Some(open) = &def.open_field {
            if let Some(doc) = &open.doc {
                w.doc_comment(doc);
            }
            w.line("#[serde(flatten)]");
            w.line(format!("pub {}: {},", open.name, rust_type(&open.ty)));
        }
    });
}

fn write_field(w: &mut CodeWriter, field: &FieldDef) {
    if let Some(doc) = &field.doc {
        w.doc_comment(doc);
    }
    if let Some(source) = &field.source_name {
        w.line(format!("#[serde(rename = {})]", rust_string_literal(source)));
    }
    if field.optional {
        w.line(OPTIONAL_FIELD);
    }
    w.line(format!("pub {}: {},", field.name, rust_type(&field.declared_type())));
}

fn write_enum(w: &mut CodeWriter, def: &EnumDef) {
    w.line(DERIVES);
    w.line("#[serde(untagged)]");
    w.block(&format!("pub enum {}", def.name), |w| {
        for variant in &def.variants {
            if let Some(doc) = &variant.doc {
                w.doc_comment(doc);
            }
            w.line(format!("{}({}),", variant.label, rust_type(&variant.ty)));
        }
    });
}

fn write_method(w: &mut CodeWriter, method: &MethodDef, result_alias: &str) {
    if let Some(doc) = &method.doc {
        w.doc_comment(doc);
    }
    let mut signature = String::from("&self");
    for param in &method.params {
        signature.push_str(&format!(", {}: {}", param.name, rust_type(&param.declared_type())));
    }
    let header = format!(
        "pub async fn {}({signature}) -> {result_alias}<{}>",
        method.name,
        rust_type(&method.result)
    );
    w.block(&header, |w| write_call_body(w, method));
}
