//! Runs every `cases/*.json` fixture against the library and prints a verdict per case.
use std::path::PathBuf;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use ill_formed_opts::value::options_from_json;
use ill_formed_opts::{Options, RecordingReporter, Schema, ValidateOptions, Validator, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Case {
    name: String,
    schema: serde_json::Value,
    /// `null` means no options were passed at all.
    options: serde_json::Value,
    /// Top-level keys whose value is replaced by undefined before checking.
    #[serde(default)]
    undefined: Vec<String>,
    #[serde(default)]
    ignore_undefined: bool,
    /// `null` means the options must be well-formed.
    expect: Option<Expect>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Expect {
    kind: String,
    field: String,
}

fn load_cases(path: &PathBuf) -> Result<Vec<Case>> {
    let src = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let de = &mut serde_json::Deserializer::from_str(&src);
    serde_path_to_error::deserialize::<_, Vec<Case>>(de).map_err(|err| {
        let at = err.path().to_string();
        anyhow!("{} at JSON path {at} → {}", path.display(), err.into_inner())
    })
}

fn candidate(case: &Case) -> Result<Option<Options>> {
    if case.options.is_null() {
        return Ok(None);
    }
    let mut options = options_from_json(case.options.clone())
        .ok_or_else(|| anyhow!("`options` must be an object or null"))?;
    for key in &case.undefined {
        options.insert(key.clone(), Value::Undefined);
    }
    Ok(Some(options))
}

/// `Ok(None)` on pass, `Ok(Some(reason))` on mismatch.
fn run_case(case: &Case) -> Result<Option<String>> {
    let schema = Schema::from_json_value(case.schema.clone()).context("invalid schema")?;
    let options = candidate(case)?;
    let settings = ValidateOptions::default().ignore_undefined(case.ignore_undefined);

    let mut validator = Validator::new(RecordingReporter::default()).with_settings(settings);
    let ill_formed = validator.validate(&schema, options.as_ref());
    let verdict = schema.check(options.as_ref(), &settings);
    let errors = validator.reporter().error_count();

    if ill_formed != verdict.is_err() || errors != usize::from(ill_formed) {
        return Ok(Some(format!("validator and check disagree ({errors} errors reported)")));
    }
    let mismatch = match (&case.expect, verdict) {
        (None, Ok(())) => None,
        (None, Err(v)) => Some(format!("expected well-formed, got {} on '{}'", v.kind(), v.field())),
        (Some(e), Ok(())) => Some(format!("expected {} on '{}', got well-formed", e.kind, e.field)),
        (Some(e), Err(v)) if v.kind().as_str() == e.kind && v.field() == e.field => None,
        (Some(e), Err(v)) => Some(format!(
            "expected {} on '{}', got {} on '{}'",
            e.kind, e.field, v.kind(), v.field()
        )),
    };
    Ok(mismatch)
}

fn main() -> Result<()> {
    let cases_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("cases"));
    let pattern = format!("{}/*.json", cases_dir.display());

    let mut failed = 0usize;
    let mut total = 0usize;
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        eprintln!("—— {} ——", path.display());
        for case in load_cases(&path)? {
            total += 1;
            match run_case(&case) {
                Ok(None) => eprintln!("✅ {}", case.name),
                Ok(Some(reason)) => {
                    failed += 1;
                    eprintln!("❌ {}: {reason}", case.name);
                }
                Err(error) => {
                    failed += 1;
                    eprintln!("❌ {}: {error:#}", case.name);
                }
            }
        }
    }

    eprintln!("{} / {total} cases passed", total - failed);
    if failed > 0 {
        return Err(anyhow!("{failed} case(s) failed"));
    }
    Ok(())
}
