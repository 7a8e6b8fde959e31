//! Runtime schema validation for loosely-typed options structures.
//!
//! ```
//! use ill_formed_opts::{FieldRule, Schema, TypeTag, ValidateOptions, Validator, RecordingReporter};
//! use ill_formed_opts::value::options_from_json;
//!
//! let schema = Schema::builder()
//!     .field("port", FieldRule::of(TypeTag::Number).required())
//!     .field("mode", FieldRule::one_of(["dev", "prod"]).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let options = options_from_json(serde_json::json!({ "port": 8080, "mode": "test" }));
//! let mut validator = Validator::new(RecordingReporter::default());
//! assert!(validator.validate(&schema, options.as_ref()));
//!
//! let options = options_from_json(serde_json::json!({ "port": 8080 }));
//! assert!(schema.check(options.as_ref(), &ValidateOptions::default()).is_ok());
//! ```
pub mod descriptor;
mod path_de;
pub mod reporter;
pub mod schema;
pub mod validate;
pub mod value;
pub mod violation;

pub use descriptor::{TypeDescriptor, TypeTag};
pub use reporter::{ConsoleReporter, NoopReporter, RecordingReporter, Report, Reporter};
pub use schema::{Constraint, FieldRule, Schema, SchemaBuilder, SchemaError};
pub use validate::{ValidateOptions, Validator, check, ill_formed};
pub use value::{Options, Value};
pub use violation::{Violation, ViolationKind};
