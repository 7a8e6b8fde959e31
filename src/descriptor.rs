//! Type descriptors: the acceptable nominal shape(s) of a value.
use std::fmt;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::schema::SchemaError;
use crate::value::Value;

// Nominal names a user-defined type may carry (e.g. `Port`, `net.Socket`).
static CUSTOM_TYPE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
        .expect("static regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Null,
    /// A user-defined nominal type, matched by class name.
    Custom(String),
}

impl TypeTag {
    /// Resolve a type name. Built-in names win; anything else must be an identifier.
    pub fn parse(name: &str) -> Result<Self, SchemaError> {
        let tag = match name {
            "String" => TypeTag::String,
            "Number" => TypeTag::Number,
            "Boolean" => TypeTag::Boolean,
            "Array" => TypeTag::Array,
            "Object" => TypeTag::Object,
            "Null" => TypeTag::Null,
            other if CUSTOM_TYPE_NAME.is_match(other) => TypeTag::Custom(other.to_string()),
            other => return Err(SchemaError::InvalidTypeName(other.to_string())),
        };
        Ok(tag)
    }

    pub fn name(&self) -> &str {
        match self {
            TypeTag::String => "String",
            TypeTag::Number => "Number",
            TypeTag::Boolean => "Boolean",
            TypeTag::Array => "Array",
            TypeTag::Object => "Object",
            TypeTag::Null => "Null",
            TypeTag::Custom(name) => name.as_str(),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

/// A non-empty set of acceptable tags. A value matches if it matches any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    tags: Vec<TypeTag>, // non-empty, de-duplicated, declaration order
}

impl TypeDescriptor {
    pub fn single(tag: TypeTag) -> Self {
        Self { tags: vec![tag] }
    }

    pub fn any_of<I>(tags: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = TypeTag>,
    {
        let mut out = Vec::<TypeTag>::new();
        for tag in tags {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
        if out.is_empty() {
            return Err(SchemaError::EmptyTypeSet);
        }
        Ok(Self { tags: out })
    }

    /// Parse a list of type names, e.g. `["Number", "String"]`.
    pub fn parse_names<'a, I>(names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let tags = names
            .into_iter()
            .map(TypeTag::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::any_of(tags)
    }

    pub fn tags(&self) -> &[TypeTag] {
        &self.tags
    }

    pub fn is_variadic(&self) -> bool {
        self.tags.len() > 1
    }

    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.tags.contains(tag)
    }

    /// Exactly the `Array` tag, which is what enables `arrayType`.
    pub fn is_array(&self) -> bool {
        self.tags == [TypeTag::Array]
    }

    pub fn matches(&self, value: &Value) -> bool {
        match value.nominal_tag() {
            Some(tag) => self.tags.contains(&tag),
            None => false,
        }
    }
}

impl From<TypeTag> for TypeDescriptor {
    fn from(tag: TypeTag) -> Self {
        Self::single(tag)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 { f.write_str(", ")?; }
            write!(f, "{tag}")?;
        }
        Ok(())
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if self.is_variadic() {
            self.tags.serialize(s)
        } else {
            self.tags[0].serialize(s)
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_builtin_and_custom_names() {
        assert_eq!(TypeTag::parse("Number").unwrap(), TypeTag::Number);
        assert_eq!(TypeTag::parse("Null").unwrap(), TypeTag::Null);
        assert_eq!(
            TypeTag::parse("net.Socket").unwrap(),
            TypeTag::Custom("net.Socket".into())
        );
        assert!(matches!(
            TypeTag::parse("not a type"),
            Err(SchemaError::InvalidTypeName(name)) if name == "not a type"
        ));
        assert!(TypeTag::parse("").is_err());
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(matches!(
            TypeDescriptor::any_of(Vec::<TypeTag>::new()),
            Err(SchemaError::EmptyTypeSet)
        ));
    }

    #[test]
    fn duplicates_collapse_and_order_is_kept() {
        let d = TypeDescriptor::parse_names(["String", "Number", "String"]).unwrap();
        assert_eq!(d.tags(), &[TypeTag::String, TypeTag::Number]);
        assert!(d.is_variadic());
        assert_eq!(d.to_string(), "String, Number");

        let single = TypeDescriptor::parse_names(["String"]).unwrap();
        assert!(!single.is_variadic());
        assert_eq!(single, TypeDescriptor::single(TypeTag::String));
    }

    #[test]
    fn matching_is_nominal() {
        let d = TypeDescriptor::parse_names(["Number", "Port"]).unwrap();
        assert!(d.matches(&Value::from(8080)));
        assert!(d.matches(&Value::instance("Port")));
        assert!(!d.matches(&Value::from("8080")));
        assert!(!d.matches(&Value::Undefined));

        let obj = TypeDescriptor::single(TypeTag::Object);
        assert!(!obj.matches(&Value::instance("Port")));
        assert!(!obj.matches(&Value::Null));
    }

    #[test]
    fn serializes_as_name_or_list() {
        let single = TypeDescriptor::single(TypeTag::Array);
        assert_eq!(serde_json::to_value(&single).unwrap(), serde_json::json!("Array"));
        let many = TypeDescriptor::parse_names(["Array", "Object"]).unwrap();
        assert_eq!(serde_json::to_value(&many).unwrap(), serde_json::json!(["Array", "Object"]));
    }
}
