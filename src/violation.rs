//! The first rule an options structure broke.
use std::panic::Location;

use crate::descriptor::TypeDescriptor;
use crate::reporter::Reporter;
use crate::value::{Options, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    UnrecognizedProperty,
    MissingRequired,
    UndefinedValue,
    EmptyArray,
    UndefinedElement,
    UnacceptableValue,
    WrongType,
    WrongElementType,
}

impl ViolationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnrecognizedProperty => "UnrecognizedProperty",
            Self::MissingRequired => "MissingRequired",
            Self::UndefinedValue => "UndefinedValue",
            Self::EmptyArray => "EmptyArray",
            Self::UndefinedElement => "UndefinedElement",
            Self::UnacceptableValue => "UnacceptableValue",
            Self::WrongType => "WrongType",
            Self::WrongElementType => "WrongElementType",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("Unrecognized property: '{field}'")]
    UnrecognizedProperty { field: String, acceptable: Vec<String> },

    #[error("Missing '{field}' property")]
    MissingRequired { field: String },

    #[error("undefined found in '{field}'")]
    UndefinedValue { field: String },

    #[error("Empty array found in '{field}'")]
    EmptyArray { field: String },

    #[error("'{field}' array contains undefined")]
    UndefinedElement { field: String },

    #[error("Unrecognized value for '{field}': {value}")]
    UnacceptableValue { field: String, value: Value, acceptable: Vec<Value> },

    #[error("{} {value}", wrong_type_headline(.field, .expected))]
    WrongType { field: String, value: Value, expected: TypeDescriptor },

    #[error("{} {element}", wrong_element_headline(.field, .expected))]
    WrongElementType { field: String, element: Value, expected: TypeDescriptor },
}

fn wrong_type_headline(field: &str, expected: &TypeDescriptor) -> String {
    if expected.is_variadic() {
        format!("Incorrect type for '{field}':")
    } else {
        format!("'{field}' not of type {expected}:")
    }
}

fn wrong_element_headline(field: &str, expected: &TypeDescriptor) -> String {
    if expected.is_variadic() {
        format!("'{field}' array contains element of incorrect type:")
    } else {
        format!("'{field}' array contains element not of type {expected}:")
    }
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::UnrecognizedProperty { .. } => ViolationKind::UnrecognizedProperty,
            Violation::MissingRequired { .. } => ViolationKind::MissingRequired,
            Violation::UndefinedValue { .. } => ViolationKind::UndefinedValue,
            Violation::EmptyArray { .. } => ViolationKind::EmptyArray,
            Violation::UndefinedElement { .. } => ViolationKind::UndefinedElement,
            Violation::UnacceptableValue { .. } => ViolationKind::UnacceptableValue,
            Violation::WrongType { .. } => ViolationKind::WrongType,
            Violation::WrongElementType { .. } => ViolationKind::WrongElementType,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Violation::UnrecognizedProperty { field, .. }
            | Violation::MissingRequired { field }
            | Violation::UndefinedValue { field }
            | Violation::EmptyArray { field }
            | Violation::UndefinedElement { field }
            | Violation::UnacceptableValue { field, .. }
            | Violation::WrongType { field, .. }
            | Violation::WrongElementType { field, .. } => field,
        }
    }

    /// The value (or array element) that broke the rule, where there is one.
    pub fn offending_value(&self) -> Option<&Value> {
        match self {
            Violation::UnacceptableValue { value, .. } | Violation::WrongType { value, .. } => Some(value),
            Violation::WrongElementType { element, .. } => Some(element),
            _ => None,
        }
    }

    /// The message without the offending value, which reporters render separately.
    pub fn headline(&self) -> String {
        match self {
            Violation::UnacceptableValue { field, .. } => format!("Unrecognized value for '{field}':"),
            Violation::WrongType { field, expected, .. } => wrong_type_headline(field, expected),
            Violation::WrongElementType { field, expected, .. } => wrong_element_headline(field, expected),
            other => other.to_string(),
        }
    }

    /// The acceptable set, as a label and a value, for kinds that have one worth listing.
    fn acceptable(&self) -> Option<(String, Value)> {
        match self {
            Violation::UnrecognizedProperty { acceptable, .. } => Some((
                "Acceptable properties:".to_string(),
                Value::Array(acceptable.iter().map(|p| Value::from(p.as_str())).collect()),
            )),
            Violation::UnacceptableValue { field, acceptable, .. } => Some((
                format!("Acceptable values for '{field}':"),
                Value::Array(acceptable.clone()),
            )),
            Violation::WrongType { field, expected, .. } if expected.is_variadic() => Some((
                format!("Acceptable types for '{field}':"),
                type_names(expected),
            )),
            Violation::WrongElementType { field, expected, .. } if expected.is_variadic() => Some((
                format!("Acceptable types for elements of '{field}':"),
                type_names(expected),
            )),
            _ => None,
        }
    }

    /// Emit this violation: one error, an optional listing of what was acceptable,
    /// then the offending options with whatever caller location is known.
    pub fn report<R: Reporter + ?Sized>(
        &self,
        reporter: &mut R,
        candidate: Option<&Options>,
        location: Option<&'static Location<'static>>,
    ) {
        reporter.report_error(&self.headline(), self.offending_value());
        if let Some((label, detail)) = self.acceptable() {
            reporter.report_info(&label, &detail);
        }
        reporter.dump_context(candidate, location);
    }
}

fn type_names(d: &TypeDescriptor) -> Value {
    Value::Array(d.tags().iter().map(|t| Value::from(t.name())).collect())
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeTag;
    use crate::reporter::{RecordingReporter, Report};

    #[test]
    fn headlines() {
        let v = Violation::MissingRequired { field: "port".into() };
        assert_eq!(v.to_string(), "Missing 'port' property");

        let v = Violation::WrongType {
            field: "port".into(),
            value: Value::from("80"),
            expected: TypeDescriptor::single(TypeTag::Number),
        };
        assert_eq!(v.to_string(), "'port' not of type Number: '80'");
        assert_eq!(v.headline(), "'port' not of type Number:");

        let v = Violation::WrongElementType {
            field: "names".into(),
            element: Value::from(2),
            expected: TypeDescriptor::parse_names(["String", "Boolean"]).unwrap(),
        };
        assert_eq!(v.to_string(), "'names' array contains element of incorrect type: 2");
        assert_eq!(v.kind(), ViolationKind::WrongElementType);
        assert_eq!(v.field(), "names");
        assert_eq!(v.offending_value(), Some(&Value::from(2)));
    }

    #[test]
    fn report_sequence() {
        let v = Violation::UnrecognizedProperty {
            field: "extra".into(),
            acceptable: vec!["flag".into()],
        };
        let mut rec = RecordingReporter::default();
        v.report(&mut rec, None, None);
        assert_eq!(
            rec.events,
            vec![
                Report::Error { headline: "Unrecognized property: 'extra'".into(), detail: None },
                Report::Info {
                    label: "Acceptable properties:".into(),
                    detail: Value::Array(vec![Value::from("flag")]),
                },
                Report::Context { candidate: None, location: None },
            ]
        );
    }

    #[test]
    fn single_type_mismatch_lists_nothing_extra() {
        let v = Violation::WrongType {
            field: "flag".into(),
            value: Value::from(1),
            expected: TypeDescriptor::single(TypeTag::Boolean),
        };
        let mut rec = RecordingReporter::default();
        v.report(&mut rec, None, None);
        assert_eq!(rec.events.len(), 2);
        assert_eq!(rec.error_count(), 1);
    }
}
