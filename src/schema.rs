//! Field rules and schemas.
//!
//! A schema maps each accepted option name to one canonical [`FieldRule`].
//! Rules are written either through the builder API or as a JSON document
//! whose entries may take any of the short forms (see [`raw`]); both paths
//! normalize to the same record, so validation never cares how an entry was
//! spelled.
//!
//! All structural mistakes in a schema (empty type sets, empty value sets,
//! duplicate names, `arrayType` on a non-array field) are rejected when the
//! schema is built, not when options are checked.
pub mod raw;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::descriptor::TypeDescriptor;
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// ERRORS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid type name `{0}`")]
    InvalidTypeName(String),

    #[error("type set must name at least one type")]
    EmptyTypeSet,

    #[error("`values` must list at least one value")]
    EmptyValues,

    #[error("rule defines neither `type` nor `values`")]
    MissingType,

    #[error("`arrayType` given but `type` does not accept Array (found {0})")]
    ArrayTypeWithoutArray(TypeDescriptor),

    #[error("field `{0}` defined more than once")]
    DuplicateField(String),

    #[error("field `{field}`: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("schema document at {path}: {message}")]
    Document { path: String, message: String },
}

impl SchemaError {
    pub(crate) fn in_field(self, field: &str) -> Self {
        SchemaError::Field { field: field.to_string(), source: Box::new(self) }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FIELD RULE
// ————————————————————————————————————————————————————————————————————————————

/// What a present value must satisfy. `Values` overrides all type checking.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Type {
        ty: TypeDescriptor,
        array_type: Option<TypeDescriptor>,
    },
    Values(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    constraint: Constraint,
    required: bool,
    allow_empty: bool,
}

impl FieldRule {
    /// An optional field of the given type(s).
    pub fn of(ty: impl Into<TypeDescriptor>) -> Self {
        Self {
            constraint: Constraint::Type { ty: ty.into(), array_type: None },
            required: false,
            allow_empty: false,
        }
    }

    /// An optional field restricted to an enumerated set of literals.
    pub fn one_of<I, V>(values: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(SchemaError::EmptyValues);
        }
        Ok(Self {
            constraint: Constraint::Values(values),
            required: false,
            allow_empty: false,
        })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Restrict array elements. Ignored on a `values` rule.
    pub fn array_type(mut self, elem: impl Into<TypeDescriptor>) -> Self {
        if let Constraint::Type { array_type, .. } = &mut self.constraint {
            *array_type = Some(elem.into());
        }
        self
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }

    fn check_well_formed(&self) -> Result<(), SchemaError> {
        if let Constraint::Type { ty, array_type: Some(_) } = &self.constraint {
            if !ty.contains(&crate::descriptor::TypeTag::Array) {
                return Err(SchemaError::ArrayTypeWithoutArray(ty.clone()));
            }
        }
        Ok(())
    }
}

impl From<TypeDescriptor> for FieldRule {
    fn from(ty: TypeDescriptor) -> Self {
        Self::of(ty)
    }
}

impl From<crate::descriptor::TypeTag> for FieldRule {
    fn from(tag: crate::descriptor::TypeTag) -> Self {
        Self::of(tag)
    }
}

// Canonical, long-form view used for `Serialize`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalRule<'a> {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    ty: Option<&'a TypeDescriptor>,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    array_type: Option<&'a TypeDescriptor>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    allow_empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<&'a [Value]>,
}

impl Serialize for FieldRule {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let (ty, array_type, values) = match &self.constraint {
            Constraint::Type { ty, array_type } => (Some(ty), array_type.as_ref(), None),
            Constraint::Values(vs) => (None, None, Some(vs.as_slice())),
        };
        CanonicalRule {
            ty,
            required: self.required,
            array_type,
            allow_empty: self.allow_empty,
            values,
        }
        .serialize(s)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SCHEMA
// ————————————————————————————————————————————————————————————————————————————

/// Immutable once built; safe to share across threads and reuse across calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: IndexMap<String, FieldRule>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Load a schema document from JSON text.
    pub fn from_json_str(src: &str) -> Result<Self, SchemaError> {
        let doc: raw::RawSchema = crate::path_de::from_str_with_path(src)?;
        raw::normalize(doc)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, SchemaError> {
        let doc: raw::RawSchema = crate::path_de::from_slice_with_path(bytes)?;
        raw::normalize(doc)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        let doc: raw::RawSchema = crate::path_de::from_value_with_path(value)?;
        raw::normalize(doc)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(s)
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, FieldRule)>,
}

impl SchemaBuilder {
    pub fn field(mut self, name: impl Into<String>, rule: impl Into<FieldRule>) -> Self {
        self.fields.push((name.into(), rule.into()));
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for (name, rule) in self.fields {
            rule.check_well_formed().map_err(|e| e.in_field(&name))?;
            if fields.contains_key(&name) {
                return Err(SchemaError::DuplicateField(name));
            }
            fields.insert(name, rule);
        }
        Ok(Schema { fields })
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeTag;
    use serde_json::json;

    #[test]
    fn builder_keeps_declaration_order() {
        let schema = Schema::builder()
            .field("port", FieldRule::of(TypeTag::Number).required())
            .field("host", TypeTag::String)
            .field("mode", FieldRule::one_of(["a", "b"]).unwrap())
            .build()
            .unwrap();
        assert_eq!(schema.field_names().collect::<Vec<_>>(), ["port", "host", "mode"]);
        assert!(schema.get("port").unwrap().is_required());
        assert!(!schema.get("host").unwrap().is_required());
        assert!(matches!(schema.get("mode").unwrap().constraint(), Constraint::Values(v) if v.len() == 2));
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let err = Schema::builder()
            .field("a", TypeTag::String)
            .field("a", TypeTag::Number)
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField("a".into()));
    }

    #[test]
    fn empty_values_is_rejected() {
        let err = FieldRule::one_of(Vec::<Value>::new()).unwrap_err();
        assert_eq!(err, SchemaError::EmptyValues);
    }

    #[test]
    fn array_type_needs_array() {
        let err = Schema::builder()
            .field("names", FieldRule::of(TypeTag::String).array_type(TypeTag::String))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Field { ref field, ref source }
                if field == "names" && matches!(**source, SchemaError::ArrayTypeWithoutArray(_))
        ));
    }

    #[test]
    fn values_rule_ignores_array_type() {
        let rule = FieldRule::one_of([1, 2]).unwrap().array_type(TypeTag::Number);
        assert!(matches!(rule.constraint(), Constraint::Values(_)));
    }

    #[test]
    fn serializes_canonical_form() {
        let schema = Schema::builder()
            .field("names", FieldRule::of(TypeTag::Array).array_type(TypeTag::String).allow_empty())
            .field("mode", FieldRule::one_of(["a"]).unwrap().required())
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "names": { "type": "Array", "required": false, "arrayType": "String", "allowEmpty": true },
                "mode": { "required": true, "values": ["a"] }
            })
        );
    }
}
