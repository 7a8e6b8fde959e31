//! Minimal CLI: check options documents against a schema, or print the normalized schema.
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;

use ill_formed_opts::value::options_from_json;
use ill_formed_opts::{ConsoleReporter, Options, Schema, ValidateOptions, Validator};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate JSON options documents against an options schema
#[derive(Parser, Debug)]
#[command(name = "ill-formed-opts", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// check each input document against the schema
    Check(CheckOut),
    /// print the schema in its normalized, long form
    Schema(SchemaOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select the options object in each document (e.g. /config/server)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    /// schema document (.json)
    #[arg(long, short)]
    schema: PathBuf,

    #[command(flatten)]
    input_settings: InputSettings,

    /// read top-level `null` values as undefined (JSON has no undefined of its own)
    #[arg(long, default_value_t = false)]
    null_as_undefined: bool,

    /// skip undefined values on optional fields instead of rejecting them
    #[arg(long, default_value_t = false)]
    ignore_undefined: bool,

    /// disable colored diagnostics
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    /// schema document (.json)
    #[arg(long, short)]
    schema: PathBuf,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    WellFormed,
    IllFormed,
}

struct FileVerdict {
    path: PathBuf,
    ill_formed: bool,
    diagnostics: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_options(&self, source_path: &Path, null_as_undefined: bool) -> Result<Option<Options>> {
        let source = std::fs::read_to_string(source_path)
            .with_context(|| format!("failed to read {}", source_path.display()))?;
        let json_value = serde_json::from_str::<serde_json::Value>(&source)
            .with_context(|| format!("failed to parse JSON in {}", source_path.display()))?;
        let json_value = match self.json_pointer.as_deref() {
            None => json_value,
            Some(ptr) => json_value
                .pointer(ptr)
                .cloned()
                .ok_or_else(|| anyhow!("{}: nothing at JSON pointer {ptr}", source_path.display()))?,
        };
        if json_value.is_null() {
            // no options at all
            return Ok(None);
        }
        let Some(mut options) = options_from_json(json_value) else {
            bail!("{}: options document is not a JSON object", source_path.display());
        };
        if null_as_undefined {
            for value in options.values_mut() {
                if matches!(value, ill_formed_opts::Value::Null) {
                    *value = ill_formed_opts::Value::Undefined;
                }
            }
        }
        Ok(Some(options))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<Outcome> {
        match &self.cmd {
            Command::Check(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(Outcome::WellFormed);
                }
                target.run()
            }
            Command::Schema(target) => {
                let schema = load_schema(&target.schema)?;
                let schema_src = serde_json::to_string_pretty(&schema)?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &schema_src)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{schema_src}");
                }
                Ok(Outcome::WellFormed)
            }
        }
    }
}

impl CheckOut {
    fn run(&self) -> Result<Outcome> {
        let schema = load_schema(&self.schema)?;
        let source_paths = resolve_file_path_patterns(&self.input_settings.input)
            .context("failed to resolve input file paths")?;
        let color = !self.no_color && std::io::stderr().is_terminal();
        let settings = ValidateOptions::default().ignore_undefined(self.ignore_undefined);

        // schema is shared read-only; each file gets its own reporter buffer
        let verdicts = source_paths
            .par_iter()
            .map(|path| -> Result<FileVerdict> {
                let options = self.input_settings.load_options(path, self.null_as_undefined)?;
                let mut validator = Validator::new(ConsoleReporter::buffered().with_color(color))
                    .with_settings(settings);
                let ill_formed = validator.validate_at(&schema, options.as_ref(), None);
                Ok(FileVerdict {
                    path: path.clone(),
                    ill_formed,
                    diagnostics: validator.into_reporter().into_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut outcome = Outcome::WellFormed;
        for verdict in verdicts {
            if verdict.ill_formed {
                outcome = Outcome::IllFormed;
                println!("ill-formed  {}", verdict.path.display());
                eprint!("{}", verdict.diagnostics);
            } else {
                println!("ok          {}", verdict.path.display());
            }
        }
        Ok(outcome)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn load_schema(path: &Path) -> Result<Schema> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read schema {}", path.display()))?;
    let schema = Schema::from_json_slice(&bytes)
        .with_context(|| format!("invalid schema {}", path.display()))?;
    tracing::info!(path = %path.display(), fields = schema.len(), "schema loaded");
    Ok(schema)
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ill-formed-opts-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parses_check_command() {
        let cli = CommandLineInterface::try_parse_from([
            "ill-formed-opts", "check", "--schema", "s.json", "-i", "a.json", "b.json", "--no-color",
        ])
        .unwrap();
        match cli.cmd {
            Command::Check(c) => {
                assert_eq!(c.input_settings.input, ["a.json", "b.json"]);
                assert!(c.no_color);
                assert!(!c.null_as_undefined);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn glob_with_no_matches_is_an_error() {
        let dir = scratch_dir("glob");
        let pattern = format!("{}/*.nothing", dir.display());
        assert!(resolve_file_path_patterns([pattern]).is_err());
    }

    #[test]
    fn check_reports_ill_formed_files() {
        let dir = scratch_dir("check");
        std::fs::write(dir.join("schema.json"), r#"{ "port": { "type": "Number", "required": true } }"#).unwrap();
        std::fs::write(dir.join("good.json"), r#"{ "cfg": { "port": 80 } }"#).unwrap();
        std::fs::write(dir.join("bad.json"), r#"{ "cfg": { "port": "80" } }"#).unwrap();

        let run = |file: &str| {
            let cli = CommandLineInterface::try_parse_from([
                "ill-formed-opts".to_string(),
                "check".into(),
                "--schema".into(),
                dir.join("schema.json").display().to_string(),
                "--json-pointer".into(),
                "/cfg".into(),
                "--no-color".into(),
                "-i".into(),
                dir.join(file).display().to_string(),
            ])
            .unwrap();
            cli.run().unwrap()
        };
        assert_eq!(run("good.json"), Outcome::WellFormed);
        assert_eq!(run("bad.json"), Outcome::IllFormed);
    }

    #[test]
    fn null_as_undefined_skips_optional_fields() {
        let dir = scratch_dir("nulls");
        let path = dir.join("opts.json");
        std::fs::write(&path, r#"{ "host": null }"#).unwrap();
        let settings = InputSettings { json_pointer: None, input: vec![] };
        let options = settings.load_options(&path, true).unwrap().unwrap();
        assert!(options["host"].is_undefined());
        let options = settings.load_options(&path, false).unwrap().unwrap();
        assert!(!options["host"].is_undefined());
    }
}
