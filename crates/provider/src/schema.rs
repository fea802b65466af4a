//! Schema model
//!
//! Resources describe their attributes and nested blocks with the builders in
//! this module. The same description is sent to Terraform, used to bring
//! values into the exact shape Terraform expects (every declared attribute
//! present, nothing undeclared, values of the declared type) and used to run
//! attribute validators.

use std::collections::HashMap;

use serde_json::json;

use crate::state::DynamicValue;
use crate::tfplugin6::{self, schema as pb};
use crate::validators::Validator;

/// cty type of an attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttrType {
    String,
    Number,
    Bool,
    List(Box<AttrType>),
    Set(Box<AttrType>),
    Map(Box<AttrType>),
    Object(Vec<(String, AttrType)>),
}

impl AttrType {
    pub fn list_of(inner: AttrType) -> Self {
        AttrType::List(Box::new(inner))
    }

    pub fn set_of(inner: AttrType) -> Self {
        AttrType::Set(Box::new(inner))
    }

    pub fn map_of(inner: AttrType) -> Self {
        AttrType::Map(Box::new(inner))
    }

    pub fn object(fields: &[(&str, AttrType)]) -> Self {
        AttrType::Object(
            fields
                .iter()
                .map(|(name, ty)| (name.to_string(), ty.clone()))
                .collect(),
        )
    }

    /// JSON type descriptor, e.g. `["set","string"]`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttrType::String => json!("string"),
            AttrType::Number => json!("number"),
            AttrType::Bool => json!("bool"),
            AttrType::List(inner) => json!(["list", inner.to_json()]),
            AttrType::Set(inner) => json!(["set", inner.to_json()]),
            AttrType::Map(inner) => json!(["map", inner.to_json()]),
            AttrType::Object(fields) => {
                let fields: serde_json::Map<String, serde_json::Value> = fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.to_json()))
                    .collect();
                json!(["object", fields])
            }
        }
    }

    /// Coerce a value to this type; values that cannot be coerced become null
    pub fn normalize(&self, value: &DynamicValue, keep_unknown: bool) -> DynamicValue {
        match value {
            DynamicValue::Null => return DynamicValue::Null,
            DynamicValue::Unknown if keep_unknown => return DynamicValue::Unknown,
            DynamicValue::Unknown => return DynamicValue::Null,
            _ => {}
        }

        match self {
            AttrType::String => match value {
                DynamicValue::String(_) => value.clone(),
                DynamicValue::Number(n) => DynamicValue::String(n.to_string()),
                DynamicValue::Bool(b) => DynamicValue::String(b.to_string()),
                other => DynamicValue::String(other.to_json().to_string()),
            },
            AttrType::Number => match value {
                DynamicValue::Number(_) => value.clone(),
                DynamicValue::String(s) => parse_number(s),
                _ => DynamicValue::Null,
            },
            AttrType::Bool => match value {
                DynamicValue::Bool(_) => value.clone(),
                DynamicValue::String(s) => match s.as_str() {
                    "true" => DynamicValue::Bool(true),
                    "false" => DynamicValue::Bool(false),
                    _ => DynamicValue::Null,
                },
                _ => DynamicValue::Null,
            },
            AttrType::List(inner) | AttrType::Set(inner) => match value {
                DynamicValue::List(items) => DynamicValue::List(
                    items
                        .iter()
                        .map(|i| inner.normalize(i, keep_unknown))
                        .collect(),
                ),
                _ => DynamicValue::Null,
            },
            AttrType::Map(inner) => match value {
                DynamicValue::Map(map) => DynamicValue::Map(
                    map.iter()
                        .map(|(k, v)| (k.clone(), inner.normalize(v, keep_unknown)))
                        .collect(),
                ),
                _ => DynamicValue::Null,
            },
            AttrType::Object(fields) => match value {
                DynamicValue::Map(map) => DynamicValue::Map(
                    fields
                        .iter()
                        .map(|(name, ty)| {
                            let v = map.get(name).unwrap_or(&DynamicValue::Null);
                            (name.clone(), ty.normalize(v, keep_unknown))
                        })
                        .collect(),
                ),
                _ => DynamicValue::Null,
            },
        }
    }

    /// Semantic equality; sets ignore element order
    pub fn equal(&self, a: &DynamicValue, b: &DynamicValue) -> bool {
        match (self, a, b) {
            (AttrType::Set(inner), DynamicValue::List(x), DynamicValue::List(y)) => {
                same_elements(x, y, |p, q| inner.equal(p, q))
            }
            (AttrType::List(inner), DynamicValue::List(x), DynamicValue::List(y)) => {
                x.len() == y.len() && x.iter().zip(y).all(|(p, q)| inner.equal(p, q))
            }
            (AttrType::Map(inner), DynamicValue::Map(x), DynamicValue::Map(y)) => {
                x.len() == y.len()
                    && x.iter()
                        .all(|(k, v)| y.get(k).map_or(false, |w| inner.equal(v, w)))
            }
            (AttrType::Object(fields), DynamicValue::Map(_), DynamicValue::Map(_)) => fields
                .iter()
                .all(|(name, ty)| ty.equal(a.attr(name), b.attr(name))),
            (_, DynamicValue::Number(x), DynamicValue::Number(y)) => x.as_f64() == y.as_f64(),
            _ => a == b,
        }
    }
}

fn parse_number(s: &str) -> DynamicValue {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return DynamicValue::Number(i.into());
    }
    s.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(DynamicValue::Number)
        .unwrap_or(DynamicValue::Null)
}

/// Order-insensitive comparison of two collections
fn same_elements<F>(x: &[DynamicValue], y: &[DynamicValue], eq: F) -> bool
where
    F: Fn(&DynamicValue, &DynamicValue) -> bool,
{
    if x.len() != y.len() {
        return false;
    }
    let mut used = vec![false; y.len()];
    x.iter().all(|item| {
        match y
            .iter()
            .enumerate()
            .position(|(i, other)| !used[i] && eq(item, other))
        {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Attribute of a block
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub ty: AttrType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// A change replaces the resource
    pub force_new: bool,
    /// Computed value that is expected to change whenever the resource changes
    pub volatile: bool,
    /// Value planned when the configuration leaves the attribute unset
    pub default: Option<DynamicValue>,
    pub validators: Vec<Validator>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: AttrType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: String::new(),
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            force_new: false,
            volatile: false,
            default: None,
            validators: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, AttrType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, AttrType::Number)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, AttrType::Bool)
    }

    pub fn string_list(name: impl Into<String>) -> Self {
        Self::new(name, AttrType::list_of(AttrType::String))
    }

    pub fn string_set(name: impl Into<String>) -> Self {
        Self::new(name, AttrType::set_of(AttrType::String))
    }

    /// List of objects with the given fields
    pub fn object_list(name: impl Into<String>, fields: &[(&str, AttrType)]) -> Self {
        Self::new(name, AttrType::list_of(AttrType::object(fields)))
    }

    pub fn string_map(name: impl Into<String>) -> Self {
        Self::new(name, AttrType::map_of(AttrType::String))
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn volatile(mut self) -> Self {
        self.volatile = true;
        self
    }

    /// Default value; implies optional
    pub fn default(mut self, value: DynamicValue) -> Self {
        self.optional = true;
        self.default = Some(value);
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    fn to_proto(&self) -> pb::Attribute {
        pb::Attribute {
            name: self.name.clone(),
            r#type: self.ty.to_json().to_string().into_bytes(),
            description: self.description.clone(),
            required: self.required,
            optional: self.optional,
            computed: self.computed,
            sensitive: self.sensitive,
            description_kind: tfplugin6::StringKind::Plain as i32,
            deprecated: false,
        }
    }
}

/// How a nested block repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    Single,
    List,
    Set,
}

/// Block nested inside another block
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub name: String,
    pub nesting: Nesting,
    pub block: Block,
    pub min_items: i64,
    pub max_items: i64,
    pub force_new: bool,
}

impl NestedBlock {
    fn new(name: impl Into<String>, nesting: Nesting, block: Block) -> Self {
        Self {
            name: name.into(),
            nesting,
            block,
            min_items: 0,
            max_items: 0,
            force_new: false,
        }
    }

    pub fn single(name: impl Into<String>, block: Block) -> Self {
        Self::new(name, Nesting::Single, block)
    }

    pub fn list(name: impl Into<String>, block: Block) -> Self {
        Self::new(name, Nesting::List, block)
    }

    pub fn set(name: impl Into<String>, block: Block) -> Self {
        Self::new(name, Nesting::Set, block)
    }

    pub fn min_items(mut self, n: i64) -> Self {
        self.min_items = n;
        self
    }

    pub fn max_items(mut self, n: i64) -> Self {
        self.max_items = n;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    fn to_proto(&self) -> pb::NestedBlock {
        let nesting = match self.nesting {
            Nesting::Single => pb::nested_block::NestingMode::Single,
            Nesting::List => pb::nested_block::NestingMode::List,
            Nesting::Set => pb::nested_block::NestingMode::Set,
        };
        pb::NestedBlock {
            type_name: self.name.clone(),
            block: Some(self.block.to_proto()),
            nesting: nesting as i32,
            min_items: self.min_items,
            max_items: self.max_items,
        }
    }

    pub fn normalize(&self, value: Option<&DynamicValue>, keep_unknown: bool) -> DynamicValue {
        let value = value.unwrap_or(&DynamicValue::Null);
        match self.nesting {
            Nesting::Single => match value {
                DynamicValue::Map(_) => self.block.normalize(value, keep_unknown),
                DynamicValue::List(items) => items
                    .iter()
                    .find(|i| !i.is_null())
                    .map(|i| self.block.normalize(i, keep_unknown))
                    .unwrap_or(DynamicValue::Null),
                DynamicValue::Unknown if keep_unknown => DynamicValue::Unknown,
                _ => DynamicValue::Null,
            },
            Nesting::List | Nesting::Set => match value {
                DynamicValue::List(items) => DynamicValue::List(
                    items
                        .iter()
                        .filter(|i| !i.is_null())
                        .map(|i| self.block.normalize(i, keep_unknown))
                        .collect(),
                ),
                DynamicValue::Map(_) => {
                    DynamicValue::List(vec![self.block.normalize(value, keep_unknown)])
                }
                DynamicValue::Unknown if keep_unknown => DynamicValue::Unknown,
                _ => DynamicValue::List(Vec::new()),
            },
        }
    }

    pub fn equal(&self, a: &DynamicValue, b: &DynamicValue) -> bool {
        match (self.nesting, a, b) {
            (Nesting::Set, DynamicValue::List(x), DynamicValue::List(y)) => {
                same_elements(x, y, |p, q| self.block.equal(p, q))
            }
            (Nesting::List, DynamicValue::List(x), DynamicValue::List(y)) => {
                x.len() == y.len() && x.iter().zip(y).all(|(p, q)| self.block.equal(p, q))
            }
            _ => self.block.equal(a, b),
        }
    }
}

/// Step of an attribute path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Attribute(String),
    Index(i64),
    Key(String),
}

/// Path of `steps` as sent to Terraform
pub fn attribute_path(steps: &[PathStep]) -> tfplugin6::AttributePath {
    use tfplugin6::attribute_path::{step::Selector, Step};

    tfplugin6::AttributePath {
        steps: steps
            .iter()
            .map(|step| Step {
                selector: Some(match step {
                    PathStep::Attribute(name) => Selector::AttributeName(name.clone()),
                    PathStep::Index(i) => Selector::ElementKeyInt(*i),
                    PathStep::Key(k) => Selector::ElementKeyString(k.clone()),
                }),
            })
            .collect(),
    }
}

/// Failed validation at a path
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub path: Vec<PathStep>,
    pub message: String,
}

impl Violation {
    pub fn new(path: Vec<PathStep>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// Violation of a top-level attribute
    pub fn at(attribute: &str, message: impl Into<String>) -> Self {
        Self::new(vec![PathStep::Attribute(attribute.to_string())], message)
    }

    pub fn to_diagnostic(&self) -> tfplugin6::Diagnostic {
        let diag = tfplugin6::Diagnostic::error("Invalid configuration", self.message.clone());
        if self.path.is_empty() {
            diag
        } else {
            diag.with_attribute(attribute_path(&self.path))
        }
    }
}

/// Object made of attributes and nested blocks
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub version: i64,
    pub description: String,
    pub attributes: Vec<Attribute>,
    pub blocks: Vec<NestedBlock>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn to_proto(&self) -> pb::Block {
        pb::Block {
            version: self.version,
            attributes: self.attributes.iter().map(Attribute::to_proto).collect(),
            block_types: self.blocks.iter().map(NestedBlock::to_proto).collect(),
            description: self.description.clone(),
            description_kind: tfplugin6::StringKind::Plain as i32,
            deprecated: false,
        }
    }

    pub fn to_schema(&self) -> tfplugin6::Schema {
        tfplugin6::Schema {
            version: self.version,
            block: Some(self.to_proto()),
        }
    }

    /// Shape `value` to exactly this block: declared attributes present and
    /// coerced, undeclared keys dropped, list and set blocks never null.
    /// With `keep_unknown` false unknown values become null.
    pub fn normalize(&self, value: &DynamicValue, keep_unknown: bool) -> DynamicValue {
        let map = match value {
            DynamicValue::Map(map) => map,
            DynamicValue::Unknown if keep_unknown => return DynamicValue::Unknown,
            _ => return DynamicValue::Null,
        };

        let mut out = HashMap::with_capacity(self.attributes.len() + self.blocks.len());
        for attr in &self.attributes {
            let v = map.get(&attr.name).unwrap_or(&DynamicValue::Null);
            out.insert(attr.name.clone(), attr.ty.normalize(v, keep_unknown));
        }
        for nested in &self.blocks {
            out.insert(
                nested.name.clone(),
                nested.normalize(map.get(&nested.name), keep_unknown),
            );
        }
        DynamicValue::Map(out)
    }

    /// Semantic equality of two objects of this block
    pub fn equal(&self, a: &DynamicValue, b: &DynamicValue) -> bool {
        if !(matches!(a, DynamicValue::Map(_)) && matches!(b, DynamicValue::Map(_))) {
            return a == b;
        }
        let attributes_equal = self
            .attributes
            .iter()
            .all(|attr| attr.ty.equal(a.attr(&attr.name), b.attr(&attr.name)));
        attributes_equal
            && self.blocks.iter().all(|nested| {
                nested.equal(
                    &nested.normalize(a.get(&nested.name), true),
                    &nested.normalize(b.get(&nested.name), true),
                )
            })
    }

    /// Run attribute validators over known values
    pub fn validate(&self, value: &DynamicValue) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.validate_at(value, &mut Vec::new(), &mut violations);
        violations
    }

    fn validate_at(
        &self,
        value: &DynamicValue,
        path: &mut Vec<PathStep>,
        violations: &mut Vec<Violation>,
    ) {
        let Some(map) = value.as_map() else {
            return;
        };

        for attr in &self.attributes {
            let Some(v) = map.get(&attr.name) else {
                continue;
            };
            if v.is_null() || v.is_unknown() {
                continue;
            }
            for validator in &attr.validators {
                if let Err(message) = validator.check(v) {
                    path.push(PathStep::Attribute(attr.name.clone()));
                    violations.push(Violation::new(
                        path.clone(),
                        format!("{}: {}", attr.name, message),
                    ));
                    path.pop();
                }
            }
        }

        for nested in &self.blocks {
            let Some(v) = map.get(&nested.name) else {
                continue;
            };
            path.push(PathStep::Attribute(nested.name.clone()));
            match (nested.nesting, v) {
                (Nesting::List, DynamicValue::List(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        path.push(PathStep::Index(i as i64));
                        nested.block.validate_at(item, path, violations);
                        path.pop();
                    }
                }
                (Nesting::Set, DynamicValue::List(items)) => {
                    for item in items {
                        nested.block.validate_at(item, path, violations);
                    }
                }
                _ => nested.block.validate_at(v, path, violations),
            }
            path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{float_value, int_value, make_state, string_list_value, string_value};

    fn sample() -> Block {
        Block::new()
            .attribute(Attribute::string("id").computed())
            .attribute(Attribute::string("name").required())
            .attribute(Attribute::number("capacity").optional())
            .attribute(Attribute::string_list("regions").optional().validate(Validator::Unique))
            .block(NestedBlock::set(
                "tags",
                Block::new()
                    .attribute(Attribute::string("key").required())
                    .attribute(Attribute::string("value").required()),
            ))
            .block(NestedBlock::single(
                "timeouts",
                Block::new().attribute(Attribute::string("create").optional()),
            ))
    }

    #[test]
    fn test_type_encoding() {
        assert_eq!(AttrType::String.to_json(), json!("string"));
        assert_eq!(
            AttrType::set_of(AttrType::String).to_json().to_string(),
            r#"["set","string"]"#
        );
        assert_eq!(
            AttrType::map_of(AttrType::list_of(AttrType::Number)).to_json(),
            json!(["map", ["list", "number"]])
        );
    }

    #[test]
    fn test_object_type() {
        let ty = AttrType::object(&[("key", AttrType::String), ("size", AttrType::Number)]);
        assert_eq!(
            ty.to_json(),
            json!(["object", {"key": "string", "size": "number"}])
        );
        let normalized = ty.normalize(
            &make_state(vec![("key", string_value("a")), ("extra", string_value("x"))]),
            false,
        );
        let map = normalized.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["size"], DynamicValue::Null);
        assert!(ty.equal(
            &make_state(vec![("key", string_value("a")), ("size", int_value(1))]),
            &make_state(vec![("key", string_value("a")), ("size", float_value(1.0))]),
        ));
    }

    #[test]
    fn test_schema_proto() {
        let schema = sample().to_schema();
        let block = schema.block.unwrap();
        assert_eq!(block.attributes.len(), 4);
        assert_eq!(block.attributes[1].name, "name");
        assert!(block.attributes[1].required);
        assert_eq!(block.attributes[3].r#type, br#"["set","string"]"#.to_vec());
        assert_eq!(
            block.block_types[0].nesting,
            pb::nested_block::NestingMode::Set as i32
        );
    }

    #[test]
    fn test_normalize_fills_and_drops() {
        let value = make_state(vec![
            ("name", string_value("disk")),
            ("capacity", string_value("8")),
            ("unexpected", string_value("dropped")),
        ]);
        let normalized = sample().normalize(&value, false);
        let map = normalized.as_map().unwrap();
        assert_eq!(map.len(), 6);
        assert_eq!(map["id"], DynamicValue::Null);
        assert_eq!(map["capacity"], int_value(8));
        assert_eq!(map["tags"], DynamicValue::List(vec![]));
        assert_eq!(map["timeouts"], DynamicValue::Null);
        assert!(!map.contains_key("unexpected"));
    }

    #[test]
    fn test_normalize_unknowns() {
        let value = make_state(vec![("id", DynamicValue::Unknown)]);
        let kept = sample().normalize(&value, true);
        assert_eq!(kept.get("id"), Some(&DynamicValue::Unknown));
        let dropped = sample().normalize(&value, false);
        assert_eq!(dropped.get("id"), Some(&DynamicValue::Null));
    }

    #[test]
    fn test_scalars_coerce_to_strings() {
        assert_eq!(
            AttrType::String.normalize(&int_value(42), false),
            string_value("42")
        );
        assert_eq!(
            AttrType::String.normalize(&DynamicValue::Bool(true), false),
            string_value("true")
        );
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let ty = AttrType::set_of(AttrType::String);
        assert!(ty.equal(&string_list_value(["a", "b"]), &string_list_value(["b", "a"])));
        assert!(!ty.equal(&string_list_value(["a", "a"]), &string_list_value(["a", "b"])));
        let list = AttrType::list_of(AttrType::String);
        assert!(!list.equal(&string_list_value(["a", "b"]), &string_list_value(["b", "a"])));
    }

    #[test]
    fn test_validate_reports_paths() {
        let value = make_state(vec![("regions", string_list_value(["a", "a"]))]);
        let violations = sample().validate(&value);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].path,
            vec![PathStep::Attribute("regions".into())]
        );
        let diag = violations[0].to_diagnostic();
        assert!(diag.attribute.is_some());
    }

    #[test]
    fn test_validate_nested_list_index() {
        let block = Block::new().block(NestedBlock::list(
            "routes",
            Block::new().attribute(
                Attribute::string("protocol")
                    .required()
                    .validate(Validator::OneOf(crate::validators::LOAD_BALANCER_PROTOCOLS)),
            ),
        ));
        let value = make_state(vec![(
            "routes",
            DynamicValue::List(vec![
                make_state(vec![("protocol", string_value("TCP"))]),
                make_state(vec![("protocol", string_value("SCTP"))]),
            ]),
        )]);
        let violations = block.validate(&value);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].path,
            vec![PathStep::Attribute("routes".into()), PathStep::Index(1)]
        );
    }
}
