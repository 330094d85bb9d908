//! Compile an OpenRPC-style method catalog into a typed async Rust client binding.
//!
//! ```no_run
//! use openrpc_bindgen::{Document, NamingContext, Options, compile};
//!
//! let document = Document::load("api.json".as_ref())?;
//! let source = compile(&document, &NamingContext::builtin(), &Options::default())?;
//! std::fs::write("src/generated.rs", source)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod codegen;
pub mod config;
pub mod document;
pub mod error;
pub mod ir;
pub mod jq_exec;
pub mod marshal;
pub mod naming;
pub mod registry;
pub mod resolve;
pub mod scaffold;
pub mod schema;

pub use config::{Options, ShapePolicy};
pub use document::Document;
pub use error::{DocumentError, Result};
pub use naming::NamingContext;

use ir::MethodDef;
use registry::{FieldScope, Registry};
use resolve::Resolver;

/// Resolve every method of `document`, in document order, into `registry`.
pub fn resolve_methods(
    document: &Document,
    naming: &NamingContext,
    policy: ShapePolicy,
    registry: &mut Registry,
) -> Result<Vec<MethodDef>> {
    let mut resolver = Resolver::new(registry, naming, policy);
    let mut fn_names = FieldScope::with_reserved(scaffold::CLIENT_METHODS);
    document
        .methods
        .iter()
        .map(|method| resolver.resolve_method(method, &mut fn_names))
        .collect()
}

/// One whole compilation with a private registry. Byte-stable for a fixed
/// `(document, naming, options)`.
pub fn compile(document: &Document, naming: &NamingContext, options: &Options) -> Result<String> {
    let mut registry = Registry::new();
    let methods = resolve_methods(document, naming, options.policy, &mut registry)?;
    let source = codegen::emit(&registry, &methods, options);
    tracing::debug!(
        methods = methods.len(),
        definitions = registry.definitions().len(),
        range_helper = registry.needs_range_helper(),
        bytes = source.len(),
        "compiled catalog"
    );
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn catalog() -> Value {
        json!({
            "openrpc": "1.2.6",
            "info": {"title": "node", "version": "27.0"},
            "methods": [
                {
                    "name": "getblockchaininfo",
                    "summary": "Returns an object containing various state info regarding blockchain processing.",
                    "params": [],
                    "result": {"name": "info", "schema": {
                        "type": "object",
                        "required": ["chain", "blocks"],
                        "properties": {
                            "chain": {"type": "string", "description": "current network name"},
                            "blocks": {"type": "integer"},
                            "mediantime": {"type": "number", "x-bitcoin-format": "unix-time"},
                            "pruneheight": {"type": ["integer", "null"]},
                            "warnings": {"oneOf": [
                                {"type": "string", "x-bitcoin-condition": "if -deprecatedrpc=warnings is passed"},
                                {"type": "array", "items": {"type": "string"}}
                            ]}
                        }
                    }}
                },
                {
                    "name": "getbalances",
                    "params": [
                        {"name": "minconf", "required": false, "schema": {"type": "integer"}},
                        {"name": "include_watchonly", "required": false, "schema": {"type": "boolean"}}
                    ],
                    "result": {"schema": {
                        "type": "object",
                        "additionalProperties": {"type": "number", "x-bitcoin-type": "amount"}
                    }}
                },
                {
                    "name": "scantxoutset",
                    "params": [
                        {"name": "action", "required": true, "schema": {"type": "string"}},
                        {"name": "range", "schema": {"x-bitcoin-type": "range"}}
                    ]
                }
            ]
        })
    }

    fn compile_value(value: Value) -> String {
        let document = Document::from_value(value).unwrap();
        compile(&document, &NamingContext::builtin(), &Options::default()).unwrap()
    }

    #[test]
    fn compiling_twice_is_byte_identical() {
        let first = compile_value(catalog());
        let second = compile_value(catalog());
        assert_eq!(first, second);
    }

    #[test]
    fn end_to_end_binding() {
        let out = compile_value(catalog());

        assert!(out.starts_with("// This file is @generated by openrpc-bindgen."));
        assert!(out.contains("    pub struct GetBlockChainInfo {\n"), "{out}");
        assert!(out.contains("        /// current network name\n        pub chain: String,\n"));
        assert!(out.contains("        #[serde(default, skip_serializing_if = \"Option::is_none\")]\n        pub mediantime: Option<i64>,\n"));
        assert!(out.contains("        pub pruneheight: Option<i64>,\n"));
        assert!(out.contains("    pub enum GetBlockChainInfoWarnings {\n"));
        assert!(out.contains("        /// if -deprecatedrpc=warnings is passed\n        Variant0(String),\n        Variant1(Vec<String>),\n"));
        assert!(out.contains("    pub enum RangeParam {\n"));

        assert!(out.contains(
            "    pub async fn get_balances(&self, minconf: Option<i64>, include_watchonly: Option<bool>) -> crate::RpcResult<BTreeMap<String, rust_decimal::Decimal>> {\n"
        ));
        assert!(out.contains("use self::types::*;\nuse std::collections::BTreeMap;\n"));
        assert!(out.contains("    use std::collections::BTreeMap;\n    pub use serde_json::Value;\n"));
        assert!(out.contains(
            "    pub async fn scantxoutset(&self, action: String, range: Option<RangeParam>) -> crate::RpcResult<()> {\n"
        ));
        assert!(out.contains("        self.call(\"scantxoutset\", params).await\n"));
    }

    #[test]
    fn definitions_follow_document_order() {
        let out = compile_value(catalog());
        let warnings = out.find("pub enum GetBlockChainInfoWarnings").unwrap();
        let info = out.find("pub struct GetBlockChainInfo {").unwrap();
        let range = out.find("pub enum RangeParam").unwrap();
        assert!(range < warnings);
        assert!(warnings < info);
    }

    #[test]
    fn shared_hints_mint_distinct_types() {
        let out = compile_value(json!({"methods": [
            {"name": "foo", "result": {"schema": {"properties": {"a": {"type": "string"}}}}},
            {"name": "foo", "result": {"schema": {"properties": {"b": {"type": "integer"}}}}}
        ]}));
        assert!(out.contains("pub struct Foo {\n"));
        assert!(out.contains("pub struct Foo2 {\n"));
        assert!(out.contains("pub async fn foo(&self) -> crate::RpcResult<Foo> {"));
        assert!(out.contains("pub async fn foo_2(&self) -> crate::RpcResult<Foo2> {"));
        assert!(out.contains("self.call(\"foo\", Vec::new()).await"));
        assert!(!out.contains("self.call(\"foo_2\""));
    }

    #[test]
    fn stubs_avoid_client_method_names() {
        let out = compile_value(json!({"methods": [
            {"name": "call", "params": [{"name": "method", "required": true, "schema": {"type": "string"}}]},
            {"name": "new"},
            {"name": "withAuth"}
        ]}));
        assert!(out.contains("pub async fn call_2(&self, method: String) -> crate::RpcResult<()> {"), "{out}");
        assert!(out.contains("pub async fn new_2(&self) -> crate::RpcResult<()> {"));
        assert!(out.contains("pub async fn with_auth_2(&self) -> crate::RpcResult<()> {"));
        assert!(out.contains("self.call(\"call\", params).await"));
        assert!(!out.contains("pub async fn call("));
    }

    #[test]
    fn union_order_is_preserved() {
        let out = compile_value(json!({"methods": [
            {"name": "a", "result": {"schema": {"oneOf": [{"type": "string"}, {"type": "integer"}]}}},
            {"name": "b", "result": {"schema": {"oneOf": [{"type": "integer"}, {"type": "string"}]}}}
        ]}));
        assert!(out.contains("pub enum A {\n        Variant0(String),\n        Variant1(i64),\n    }"));
        assert!(out.contains("pub enum B {\n        Variant0(i64),\n        Variant1(String),\n    }"));
    }

    #[test]
    fn degenerate_shapes_still_compile() {
        let out = compile_value(json!({"methods": [
            {"name": "weird", "params": [{"schema": {"type": "tuple"}}, {"schema": 7}], "result": {"schema": {"$ref": "#/components/x"}}}
        ]}));
        assert!(out.contains("pub async fn weird(&self, arg0: Option<Value>, arg1: Option<Value>) -> crate::RpcResult<Value> {"));
    }

    #[test]
    fn fixture_catalog_compiles_under_strict_policy() {
        let document = Document::from_str(include_str!("../fixtures/node-subset.json")).unwrap();
        let naming = NamingContext::builtin();
        let options = Options {
            policy: ShapePolicy::Strict,
            ..Options::default()
        };
        let first = compile(&document, &naming, &options).unwrap();
        assert_eq!(first, compile(&document, &naming, &options).unwrap());

        assert!(first.contains("pub struct GetBalancesMine {\n"));
        assert!(first.contains("        #[serde(flatten)]\n        pub extra: BTreeMap<String, rust_decimal::Decimal>,\n"));
        assert!(first.contains(
            "        #[serde(rename = \"type\")]\n        #[serde(default, skip_serializing_if = \"Option::is_none\")]\n        pub type_: Option<String>,\n"
        ));
        assert!(first.contains("        #[serde(rename = \"nTx\")]\n"));
        assert!(first.contains("    /// Request a graceful shutdown.\n    pub async fn stop(&self) -> crate::RpcResult<()> {\n"));
        assert!(first.contains("    /// Returns block data.\n    ///\n    /// Verbosity 0 returns hex"));
    }

    #[test]
    fn strict_policy_rejects_degenerate_shapes() {
        let document = Document::from_value(json!({"methods": [
            {"name": "weird", "result": {"schema": {"type": "tuple"}}}
        ]}))
        .unwrap();
        let options = Options {
            policy: ShapePolicy::Strict,
            ..Options::default()
        };
        let err = compile(&document, &NamingContext::builtin(), &options).unwrap_err();
        match err {
            DocumentError::UnsupportedShape { hint, .. } => assert_eq!(hint, "Weird"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
