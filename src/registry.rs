//! Per-run naming and definition store.
//!
//! One `Registry` lives for exactly one compilation: names are only ever
//! reserved, never released, and definitions come out in the order they went in.
use std::collections::HashSet;

use crate::ir::Definition;

/// Names the generated module already binds. Minting never hands these out.
const PRELUDE_NAMES: &[&str] = &[
    "Value", "RangeParam", "BTreeMap", "Option", "Vec", "String", "Box",
    "Result", "Self", "Serialize", "Deserialize",
];

/// Known same-struct collisions and the name the second occurrence gets:
/// `(source name, colliding candidate, replacement)`.
const FIELD_OVERRIDES: &[(&str, &str, &str)] = &[("feeRate", "fee_rate", "fee_rate_btc_kvb")];

#[derive(Debug)]
pub struct Registry {
    defined_names: HashSet<String>,
    definitions: Vec<Definition>,
    needs_range_helper: bool,
    needs_open_map: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            defined_names: PRELUDE_NAMES.iter().map(|name| name.to_string()).collect(),
            definitions: Vec::new(),
            needs_range_helper: false,
            needs_open_map: false,
        }
    }

    /// Reserve `candidate`, or `candidate2`, `candidate3`, ... if it is taken.
    pub fn mint_type_name(&mut self, candidate: &str) -> String {
        let mut name = candidate.to_string();
        let mut suffix = 2;
        while self.defined_names.contains(&name) {
            name = format!("{candidate}{suffix}");
            suffix += 1;
        }
        if name != candidate {
            tracing::trace!(candidate, minted = %name, "type name taken, suffixed");
        }
        self.defined_names.insert(name.clone());
        name
    }

    #[cfg(test)]
    fn is_defined(&self, name: &str) -> bool {
        self.defined_names.contains(name)
    }

    pub fn register(&mut self, definition: Definition) {
        tracing::trace!(name = definition.name(), "registered definition");
        self.definitions.push(definition);
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|definition| definition.name() == name)
    }

    pub fn mark_range_helper(&mut self) {
        self.needs_range_helper = true;
    }

    pub fn needs_range_helper(&self) -> bool {
        self.needs_range_helper
    }

    pub fn mark_open_map(&mut self) {
        self.needs_open_map = true;
    }

    pub fn needs_open_map(&self) -> bool {
        self.needs_open_map
    }
}

/// Field names already taken inside one struct (or one parameter list).
#[derive(Debug, Default)]
pub struct FieldScope {
    used: HashSet<String>,
}

impl FieldScope {
    /// A scope in which `reserved` can never be claimed as-is.
    pub fn with_reserved(reserved: &[&str]) -> Self {
        Self {
            used: reserved.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Claim `candidate` for the property called `source` in the input.
    pub fn claim(&mut self, candidate: &str, source: &str) -> String {
        let name = dedupe_field_name(candidate, source, &self.used);
        self.used.insert(name.clone());
        name
    }
}

pub fn dedupe_field_name(candidate: &str, source: &str, used: &HashSet<String>) -> String {
    if !used.contains(candidate) {
        return candidate.to_string();
    }
    let semantic = FIELD_OVERRIDES
        .iter()
        .find(|(from, colliding, _)| *from == source && *colliding == candidate)
        .map(|(_, _, replacement)| *replacement)
        .filter(|replacement| !used.contains(*replacement));
    if let Some(replacement) = semantic {
        return replacement.to_string();
    }
    let mut suffix = 2;
    loop {
        let numbered = format!("{candidate}_{suffix}");
        if !used.contains(&numbered) {
            return numbered;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EnumDef, StructDef};

    #[test]
    fn minted_names_are_unique_and_monotonic() {
        let mut registry = Registry::new();
        assert_eq!(registry.mint_type_name("Foo"), "Foo");
        assert_eq!(registry.mint_type_name("Foo"), "Foo2");
        assert_eq!(registry.mint_type_name("Foo"), "Foo3");
        assert_eq!(registry.mint_type_name("Foo2"), "Foo22");
        assert!(registry.is_defined("Foo3"));
    }

    #[test]
    fn prelude_names_are_never_minted() {
        let mut registry = Registry::new();
        assert_eq!(registry.mint_type_name("Value"), "Value2");
        assert_eq!(registry.mint_type_name("Self"), "Self2");
        assert_eq!(registry.mint_type_name("RangeParam"), "RangeParam2");
    }

    #[test]
    fn definitions_keep_registration_order() {
        let mut registry = Registry::new();
        registry.register(Definition::Struct(StructDef { name: "B".into(), fields: vec![], open_field: None }));
        registry.register(Definition::Enum(EnumDef { name: "A".into(), variants: vec![] }));
        let names: Vec<&str> = registry.definitions().iter().map(Definition::name).collect();
        assert_eq!(names, ["B", "A"]);
        assert!(registry.get("A").is_some());
        assert!(registry.get("C").is_none());
    }

    #[test]
    fn field_collisions_use_overrides_then_suffixes() {
        let mut scope = FieldScope::default();
        assert_eq!(scope.claim("fee_rate", "fee_rate"), "fee_rate");
        assert_eq!(scope.claim("fee_rate", "feeRate"), "fee_rate_btc_kvb");
        assert_eq!(scope.claim("fee_rate", "feeRate"), "fee_rate_2");
        assert_eq!(scope.claim("fee_rate", "fee-rate"), "fee_rate_3");
    }

    #[test]
    fn reserved_scope_names() {
        let mut scope = FieldScope::with_reserved(&["slots"]);
        assert!(scope.is_used("slots"));
        assert_eq!(scope.claim("slots", "slots"), "slots_2");
    }
}
