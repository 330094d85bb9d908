// Canonical type model for codegen. No serde_json::Value here.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Integer,                 // 64-bit signed
    Float,                   // 64-bit binary float
    Decimal,                 // monetary amounts, never binary float
    Boolean,
    Unit,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalType {
    Primitive(Primitive),
    Opaque,                  // dynamic fallback, rendered as serde_json::Value
    Collection(Box<CanonicalType>),
    Map(Box<CanonicalType>), // string-keyed
    Optional(Box<CanonicalType>),
    RangeValue,              // scalar-or-pair helper
    StructRef(String),
    EnumRef(String),
}

impl CanonicalType {
    /// Wraps in `Optional` unless it already is one.
    pub fn optional(self) -> Self {
        match self {
            CanonicalType::Optional(_) => self,
            other => CanonicalType::Optional(Box::new(other)),
        }
    }

    pub fn collection(item: CanonicalType) -> Self {
        CanonicalType::Collection(Box::new(item))
    }

    pub fn map(value: CanonicalType) -> Self {
        CanonicalType::Map(Box::new(value))
    }

    #[cfg(test)]
    fn is_optional(&self) -> bool {
        matches!(self, CanonicalType::Optional(_))
    }

    pub fn mentions_map(&self) -> bool {
        match self {
            CanonicalType::Map(_) => true,
            CanonicalType::Collection(inner) | CanonicalType::Optional(inner) => inner.mentions_map(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub source_name: Option<String>, // only when it differs from `name`
    pub ty: CanonicalType,
    pub optional: bool,
    pub doc: Option<String>,
}

impl FieldDef {
    /// The type as declared on the struct, `Option` included.
    pub fn declared_type(&self) -> CanonicalType {
        if self.optional { self.ty.clone().optional() } else { self.ty.clone() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<FieldDef>,   // declaration order
    pub open_field: Option<FieldDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub label: String,
    pub ty: CanonicalType,
    pub doc: Option<String>,
}

/// Untagged: decoders try variants in order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Struct(StructDef),
    Enum(EnumDef),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Struct(def) => &def.name,
            Definition::Enum(def) => &def.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub name: String,
    pub ty: CanonicalType,
    pub required: bool,
}

impl ParamDef {
    pub fn declared_type(&self) -> CanonicalType {
        if self.required { self.ty.clone() } else { self.ty.clone().optional() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    pub name: String,        // Rust fn name
    pub rpc_name: String,    // name on the wire
    pub doc: Option<String>,
    pub params: Vec<ParamDef>,
    pub result: CanonicalType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_never_nests() {
        let once = CanonicalType::Primitive(Primitive::Integer).optional();
        let twice = once.clone().optional();
        assert_eq!(once, twice);
        assert_eq!(
            twice,
            CanonicalType::Optional(Box::new(CanonicalType::Primitive(Primitive::Integer)))
        );
    }

    #[test]
    fn optional_params_and_fields_declare_option() {
        let param = ParamDef {
            name: "verbose".into(),
            ty: CanonicalType::Primitive(Primitive::Boolean).optional(),
            required: false,
        };
        assert_eq!(param.declared_type(), param.ty);

        let field = FieldDef {
            name: "extra".into(),
            source_name: None,
            ty: CanonicalType::map(CanonicalType::Opaque),
            optional: false,
            doc: None,
        };
        assert!(!field.declared_type().is_optional());
        assert!(field.declared_type().mentions_map());
    }
}
