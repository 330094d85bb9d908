//! Schema resolution: raw JSON schemas in, [`CanonicalType`]s out.
//!
//! The check order in [`Resolver::resolve`] and [`Resolver::resolve_node`] is
//! part of the behaviour: nullability before everything else, extension tags
//! before the generic `type` keyword, unions before primitives.
use serde_json::Value;

use crate::config::ShapePolicy;
use crate::document::MethodSpec;
use crate::error::{DocumentError, Result};
use crate::ir::{CanonicalType, Definition, EnumDef, FieldDef, MethodDef, ParamDef, Primitive, StructDef, Variant};
use crate::naming::{NamingContext, to_field_identifier, to_type_identifier};
use crate::registry::{FieldScope, Registry};
use crate::schema::{ExtensionTag, Items, Kind, Nullability, OpenMap, SchemaNode};

/// Name of the marshaling buffer inside generated method bodies.
pub const SLOTS_BINDING: &str = "slots";

const OPEN_FIELD_NAMES: &[&str] = &["extra", "extra_fields"];
const OPEN_FIELD_DOC: &str = "Additional properties";

pub struct Resolver<'r> {
    registry: &'r mut Registry,
    naming: &'r NamingContext,
    policy: ShapePolicy,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r mut Registry, naming: &'r NamingContext, policy: ShapePolicy) -> Self {
        Self { registry, naming, policy }
    }

    pub fn resolve(&mut self, schema: Option<&Value>, hint: &str) -> Result<CanonicalType> {
        let node = match schema {
            None | Some(Value::Bool(_)) => return Ok(CanonicalType::Opaque),
            Some(value) => match SchemaNode::new(value) {
                Some(node) => node,
                None => return self.degrade(hint, "schema is neither an object nor a boolean"),
            },
        };
        if node.is_reference() {
            return self.degrade(hint, "`$ref` schemas are not followed");
        }

        match node.split_nullable() {
            Nullability::NonNull(node) => self.resolve_node(node, hint),
            Nullability::Nullable(node) => Ok(self.resolve_node(node, hint)?.optional()),
            Nullability::NullableBranch(branch) => Ok(self.resolve(Some(branch), hint)?.optional()),
        }
    }

    fn resolve_node(&mut self, node: SchemaNode<'_>, hint: &str) -> Result<CanonicalType> {
        match node.extension() {
            ExtensionTag::Amount => return Ok(CanonicalType::Primitive(Primitive::Decimal)),
            ExtensionTag::Hex => return Ok(CanonicalType::Primitive(Primitive::String)),
            ExtensionTag::Range => {
                self.registry.mark_range_helper();
                return Ok(CanonicalType::RangeValue);
            }
            ExtensionTag::None => {}
        }

        let ty = match node.kind() {
            Kind::Union => return self.resolve_union(node, hint),
            Kind::String => CanonicalType::Primitive(Primitive::String),
            Kind::Boolean => CanonicalType::Primitive(Primitive::Boolean),
            Kind::Null => CanonicalType::Primitive(Primitive::Unit),
            Kind::Integer => CanonicalType::Primitive(Primitive::Integer),
            Kind::Number if node.is_unix_time() => CanonicalType::Primitive(Primitive::Integer),
            Kind::Number => CanonicalType::Primitive(Primitive::Float),
            Kind::Array => return self.resolve_array(node, hint),
            Kind::Object => return self.resolve_object(node, hint),
            Kind::Any => CanonicalType::Opaque,
            Kind::Unknown => return self.degrade(hint, "unrecognized `type` keyword"),
        };
        Ok(ty)
    }

    fn resolve_union(&mut self, node: SchemaNode<'_>, hint: &str) -> Result<CanonicalType> {
        let branches = node.branches().unwrap_or_default();
        let name = self.mint(hint);
        let mut variants = Vec::with_capacity(branches.len());
        for (index, branch) in branches.iter().enumerate() {
            let ty = self.resolve(Some(branch), &format!("{hint}Variant{index}"))?;
            let doc = SchemaNode::new(branch)
                .and_then(|branch| branch.description().or_else(|| branch.condition()))
                .map(str::to_string);
            variants.push(Variant {
                label: format!("Variant{index}"),
                ty,
                doc,
            });
        }
        self.registry.register(Definition::Enum(EnumDef { name: name.clone(), variants }));
        Ok(CanonicalType::EnumRef(name))
    }

    fn resolve_array(&mut self, node: SchemaNode<'_>, hint: &str) -> Result<CanonicalType> {
        match node.items() {
            Items::Tuple => Ok(CanonicalType::collection(CanonicalType::Opaque)),
            Items::Single(item) => {
                let item = self.resolve(item, &format!("{hint}Item"))?;
                Ok(CanonicalType::collection(item))
            }
        }
    }

    fn resolve_object(&mut self, node: SchemaNode<'_>, hint: &str) -> Result<CanonicalType> {
        let Some(properties) = node.properties() else {
            return match node.open_map() {
                OpenMap::Closed => Ok(CanonicalType::Opaque),
                OpenMap::Any => {
                    self.registry.mark_open_map();
                    Ok(CanonicalType::map(CanonicalType::Opaque))
                }
                OpenMap::Typed(value) => {
                    let value = self.resolve(Some(value), &format!("{hint}Value"))?;
                    self.registry.mark_open_map();
                    Ok(CanonicalType::map(value))
                }
            };
        };

        let name = self.mint(hint);
        let required = node.required_names();
        let mut scope = FieldScope::default();
        let mut fields = Vec::with_capacity(properties.len());

        for (source, schema) in properties {
            let candidate = to_field_identifier(source, self.naming);
            let field_name = scope.claim(&candidate, source);
            let sub_hint = format!("{name}{}", to_type_identifier(source, self.naming));
            let ty = self.resolve(Some(schema), &sub_hint)?;
            let prop = SchemaNode::new(schema);
            let optional = !required.contains(source.as_str()) || prop.is_some_and(|prop| prop.forced_optional());
            fields.push(FieldDef {
                source_name: (field_name != *source).then(|| source.clone()),
                name: field_name,
                ty,
                optional,
                doc: prop.and_then(|prop| prop.description()).map(str::to_string),
            });
        }

        let open_field = match node.open_map() {
            OpenMap::Closed => None,
            open => {
                let value = match open {
                    OpenMap::Typed(value) => self.resolve(Some(value), &format!("{name}ExtraValue"))?,
                    _ => CanonicalType::Opaque,
                };
                self.registry.mark_open_map();
                Some(FieldDef {
                    name: open_field_name(&mut scope),
                    source_name: None,
                    ty: CanonicalType::map(value),
                    optional: false,
                    doc: Some(OPEN_FIELD_DOC.to_string()),
                })
            }
        };

        self.registry.register(Definition::Struct(StructDef {
            name: name.clone(),
            fields,
            open_field,
        }));
        Ok(CanonicalType::StructRef(name))
    }

    /// Resolve one catalog entry. `fn_names` is shared by every method of the binding.
    pub fn resolve_method(&mut self, method: &MethodSpec, fn_names: &mut FieldScope) -> Result<MethodDef> {
        let name = fn_names.claim(&to_field_identifier(&method.name, self.naming), &method.name);
        let method_hint = to_type_identifier(&method.name, self.naming);

        let mut param_names = FieldScope::with_reserved(&[SLOTS_BINDING]);
        let mut params = Vec::with_capacity(method.params.len());
        for (index, param) in method.params.iter().enumerate() {
            let (raw, hint_part) = match param.name.as_deref() {
                Some(raw) => (raw.to_string(), to_type_identifier(raw, self.naming)),
                None => (format!("arg{index}"), format!("Arg{index}")),
            };
            let param_name = param_names.claim(&to_field_identifier(&raw, self.naming), &raw);
            let ty = self.resolve(param.schema.as_ref(), &format!("{method_hint}{hint_part}"))?;
            params.push(ParamDef {
                name: param_name,
                ty: if param.required { ty } else { ty.optional() },
                required: param.required,
            });
        }

        let result = match method.result_schema() {
            Some(schema) => self.resolve(Some(schema), &method_hint)?,
            None => CanonicalType::Primitive(Primitive::Unit),
        };

        Ok(MethodDef {
            name,
            rpc_name: method.name.clone(),
            doc: method.doc().map(str::to_string),
            params,
            result,
        })
    }

    fn mint(&mut self, hint: &str) -> String {
        let candidate = to_type_identifier(hint, self.naming);
        self.registry.mint_type_name(&candidate)
    }

    fn degrade(&self, hint: &str, reason: &'static str) -> Result<CanonicalType> {
        match self.policy {
            ShapePolicy::Permissive => {
                tracing::debug!(hint, reason, "shape degraded to opaque");
                Ok(CanonicalType::Opaque)
            }
            ShapePolicy::Strict => Err(DocumentError::UnsupportedShape {
                hint: hint.to_string(),
                reason,
            }),
        }
    }
}

fn open_field_name(scope: &mut FieldScope) -> String {
    let free = OPEN_FIELD_NAMES.iter().find(|name| !scope.is_used(name));
    match free {
        Some(name) => scope.claim(name, name),
        None => scope.claim(OPEN_FIELD_NAMES[1], OPEN_FIELD_NAMES[1]),
    }
}
