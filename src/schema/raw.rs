//! Schema documents as written, before normalization.
//!
//! An entry may be any of:
//! - `"Number"` → a field of that type
//! - `["Number", "String"]` → a field of any of those types
//! - `{ "type": ..., "required": ..., "arrayType": ..., "allowEmpty": ..., "values": [...] }`
use indexmap::IndexMap;
use serde::Deserialize;

use super::{FieldRule, Schema, SchemaError};
use crate::descriptor::TypeDescriptor;
use crate::value::Value;

pub(crate) type RawSchema = IndexMap<String, RawEntry>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawEntry {
    Types(RawTypes),
    Rule(RawRule),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTypes {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct RawRule {
    #[serde(rename = "type")]
    ty: Option<RawTypes>,
    #[serde(default)]
    required: bool,
    array_type: Option<RawTypes>,
    #[serde(default)]
    allow_empty: bool,
    values: Option<Vec<serde_json::Value>>,
}

impl RawTypes {
    fn resolve(&self) -> Result<TypeDescriptor, SchemaError> {
        match self {
            RawTypes::One(name) => TypeDescriptor::parse_names([name.as_str()]),
            RawTypes::Many(names) => TypeDescriptor::parse_names(names.iter().map(String::as_str)),
        }
    }
}

impl RawRule {
    fn resolve(self) -> Result<FieldRule, SchemaError> {
        // `values` takes precedence; `type`/`arrayType` are then irrelevant.
        let mut rule = match (self.values, &self.ty) {
            (Some(values), _) => FieldRule::one_of(values.into_iter().map(Value::from))?,
            (None, Some(ty)) => {
                let mut rule = FieldRule::of(ty.resolve()?);
                if let Some(elem) = &self.array_type {
                    rule = rule.array_type(elem.resolve()?);
                }
                rule
            }
            (None, None) => return Err(SchemaError::MissingType),
        };
        if self.required {
            rule = rule.required();
        }
        if self.allow_empty {
            rule = rule.allow_empty();
        }
        Ok(rule)
    }
}

impl RawEntry {
    fn resolve(self) -> Result<FieldRule, SchemaError> {
        match self {
            RawEntry::Types(types) => Ok(FieldRule::of(types.resolve()?)),
            RawEntry::Rule(rule) => rule.resolve(),
        }
    }
}

pub(crate) fn normalize(doc: RawSchema) -> Result<Schema, SchemaError> {
    let mut builder = Schema::builder();
    for (name, entry) in doc {
        let rule = entry.resolve().map_err(|e| e.in_field(&name))?;
        builder = builder.field(name, rule);
    }
    let schema = builder.build()?;
    tracing::debug!(fields = schema.len(), "schema document normalized");
    Ok(schema)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeTag;
    use crate::schema::Constraint;
    use serde_json::json;

    fn load(v: serde_json::Value) -> Result<Schema, SchemaError> {
        Schema::from_json_value(v)
    }

    #[test]
    fn all_entry_shapes_normalize() {
        let schema = load(json!({
            "num": "Number",
            "otherNum": { "type": "Number" },
            "args": ["Array", "Object"],
            "otherArgs": { "type": ["Array", "Object"] },
            "strings": { "type": "Array", "arrayType": "String" },
            "primitives": { "type": "Array", "arrayType": ["String", "Number", "Boolean"] },
            "str": { "type": "String", "required": true },
            "val": { "values": ["red", "yellow", "blue"] }
        }))
        .unwrap();

        assert_eq!(schema.get("num"), schema.get("otherNum"));
        assert_eq!(schema.get("args"), schema.get("otherArgs"));
        assert!(schema.get("str").unwrap().is_required());
        assert!(!schema.get("num").unwrap().is_required());

        match schema.get("primitives").unwrap().constraint() {
            Constraint::Type { ty, array_type: Some(elem) } => {
                assert_eq!(ty, &TypeDescriptor::single(TypeTag::Array));
                assert_eq!(elem.tags(), &[TypeTag::String, TypeTag::Number, TypeTag::Boolean]);
            }
            other => panic!("unexpected constraint: {other:?}"),
        }
        match schema.get("val").unwrap().constraint() {
            Constraint::Values(vs) => assert_eq!(vs[1], Value::from("yellow")),
            other => panic!("unexpected constraint: {other:?}"),
        }
    }

    #[test]
    fn values_take_precedence_over_type() {
        let schema = load(json!({ "mode": { "type": "Number", "values": ["a", "b"] } })).unwrap();
        assert!(matches!(schema.get("mode").unwrap().constraint(), Constraint::Values(_)));
    }

    #[test]
    fn construction_errors_name_the_field() {
        let err = load(json!({ "mode": { "values": [] } })).unwrap_err();
        assert_eq!(err, SchemaError::EmptyValues.in_field("mode"));

        let err = load(json!({ "count": [] })).unwrap_err();
        assert_eq!(err, SchemaError::EmptyTypeSet.in_field("count"));

        let err = load(json!({ "flag": { "required": true } })).unwrap_err();
        assert_eq!(err, SchemaError::MissingType.in_field("flag"));

        let err = load(json!({ "x": "no such type!" })).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidTypeName("no such type!".into()).in_field("x")
        );
    }

    #[test]
    fn unknown_rule_keys_are_rejected() {
        // `optional` belongs to an older convention and is not accepted.
        let err = load(json!({ "port": { "type": "Number", "optional": true } })).unwrap_err();
        assert!(matches!(err, SchemaError::Document { .. }), "{err}");
    }

    #[test]
    fn document_errors_carry_a_path() {
        let err = Schema::from_json_str(r#"{ "port": 5 }"#).unwrap_err();
        match err {
            SchemaError::Document { path, .. } => assert_eq!(path, "port"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
