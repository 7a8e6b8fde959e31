//! The decision procedure: does an options structure conform to a schema?
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. every supplied key is known to the schema
//! 2. every required field is supplied
//! 3. each supplied value, in supplied order, satisfies its rule
//!
//! so that when several things are wrong, which one surfaces is predictable:
//! shape problems before content problems, earlier fields before later ones.
use std::panic::Location;

use crate::descriptor::TypeDescriptor;
use crate::reporter::{ConsoleReporter, Reporter};
use crate::schema::{Constraint, FieldRule, Schema};
use crate::value::{Options, Value};
use crate::violation::Violation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Treat an explicit undefined on a non-required field as if it were absent.
    pub ignore_undefined: bool,
}

impl ValidateOptions {
    pub fn ignore_undefined(mut self, yes: bool) -> Self {
        self.ignore_undefined = yes;
        self
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECISION
// ————————————————————————————————————————————————————————————————————————————

/// Decide whether `options` conforms to `schema`. `None` means no options were given at all.
pub fn check(schema: &Schema, options: Option<&Options>, settings: &ValidateOptions) -> Result<(), Violation> {
    check_recognized(schema, options)?;
    check_required(schema, options)?;
    if let Some(options) = options {
        for (name, value) in options {
            // recognized by the first pass
            let Some(rule) = schema.get(name) else { continue };
            check_field(name, value, rule, settings)?;
        }
    }
    Ok(())
}

fn check_recognized(schema: &Schema, options: Option<&Options>) -> Result<(), Violation> {
    tracing::trace!("checking for unrecognized properties");
    let Some(options) = options else { return Ok(()) };
    match options.keys().find(|name| !schema.contains(name)) {
        Some(name) => Err(Violation::UnrecognizedProperty {
            field: name.clone(),
            acceptable: schema.field_names().map(str::to_string).collect(),
        }),
        None => Ok(()),
    }
}

fn check_required(schema: &Schema, options: Option<&Options>) -> Result<(), Violation> {
    tracing::trace!("checking for missing required properties");
    for (name, rule) in schema.iter() {
        if !rule.is_required() {
            continue;
        }
        let present = options.is_some_and(|o| o.contains_key(name));
        if !present {
            return Err(Violation::MissingRequired { field: name.to_string() });
        }
    }
    Ok(())
}

fn check_field(name: &str, value: &Value, rule: &FieldRule, settings: &ValidateOptions) -> Result<(), Violation> {
    let field = || name.to_string();

    if value.is_undefined() {
        if !rule.is_required() && settings.ignore_undefined {
            tracing::trace!(field = name, "ignoring undefined value");
            return Ok(());
        }
        return Err(Violation::UndefinedValue { field: field() });
    }

    if let Some(elems) = value.as_array() {
        if elems.is_empty() && !rule.allows_empty() {
            return Err(Violation::EmptyArray { field: field() });
        }
        if elems.iter().any(Value::is_undefined) {
            return Err(Violation::UndefinedElement { field: field() });
        }
    }

    match rule.constraint() {
        Constraint::Values(acceptable) => {
            if !acceptable.contains(value) {
                return Err(Violation::UnacceptableValue {
                    field: field(),
                    value: value.clone(),
                    acceptable: acceptable.clone(),
                });
            }
        }
        Constraint::Type { ty, array_type } => {
            if !ty.matches(value) {
                return Err(Violation::WrongType {
                    field: field(),
                    value: value.clone(),
                    expected: ty.clone(),
                });
            }
            if let (Some(elem_ty), Some(elems)) = (array_type, value.as_array()) {
                check_elements(name, elems, elem_ty)?;
            }
        }
    }
    Ok(())
}

fn check_elements(name: &str, elems: &[Value], elem_ty: &TypeDescriptor) -> Result<(), Violation> {
    match elems.iter().find(|el| !elem_ty.matches(el)) {
        Some(el) => Err(Violation::WrongElementType {
            field: name.to_string(),
            element: el.clone(),
            expected: elem_ty.clone(),
        }),
        None => Ok(()),
    }
}

impl Schema {
    /// Shorthand for [`check`].
    pub fn check(&self, options: Option<&Options>, settings: &ValidateOptions) -> Result<(), Violation> {
        check(self, options, settings)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// VALIDATOR (decision + reporting)
// ————————————————————————————————————————————————————————————————————————————

/// Runs [`check`] and hands any violation to the injected reporter, exactly once.
#[derive(Debug, Default)]
pub struct Validator<R: Reporter> {
    reporter: R,
    settings: ValidateOptions,
}

impl<R: Reporter> Validator<R> {
    pub fn new(reporter: R) -> Self {
        Self { reporter, settings: ValidateOptions::default() }
    }

    pub fn with_settings(mut self, settings: ValidateOptions) -> Self {
        self.settings = settings;
        self
    }

    pub fn ignore_undefined(mut self, yes: bool) -> Self {
        self.settings.ignore_undefined = yes;
        self
    }

    pub fn settings(&self) -> &ValidateOptions {
        &self.settings
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Returns `true` if `options` is ill-formed, after reporting why.
    #[track_caller]
    pub fn validate(&mut self, schema: &Schema, options: Option<&Options>) -> bool {
        let location = Location::caller();
        self.validate_at(schema, options, Some(location))
    }

    /// As [`Validator::validate`], with an explicit (or no) call-site location.
    pub fn validate_at(
        &mut self,
        schema: &Schema,
        options: Option<&Options>,
        location: Option<&'static Location<'static>>,
    ) -> bool {
        match check(schema, options, &self.settings) {
            Ok(()) => {
                tracing::debug!(fields = options.map_or(0, |o| o.len()), "options well-formed");
                false
            }
            Err(violation) => {
                tracing::debug!(
                    kind = %violation.kind(),
                    field = violation.field(),
                    "options ill-formed"
                );
                violation.report(&mut self.reporter, options, location);
                true
            }
        }
    }
}

/// Check `options` against `schema`, printing diagnostics to stderr.
/// Returns `true` if `options` is ill-formed.
#[track_caller]
pub fn ill_formed(schema: &Schema, options: Option<&Options>) -> bool {
    let location = Location::caller();
    Validator::new(ConsoleReporter::stderr()).validate_at(schema, options, Some(location))
}

// ------------------------------- Tests ------------------------------------ //
