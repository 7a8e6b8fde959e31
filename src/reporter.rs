//! Diagnostic reporters: where a violation goes once it has been decided.
//!
//! The validator only decides. Rendering is delegated to a [`Reporter`],
//! injected by the caller: [`ConsoleReporter`] for humans, [`RecordingReporter`]
//! for tests, [`NoopReporter`] when only the verdict matters.
use std::io::{self, Write};
use std::panic::Location;
use colored::Colorize;

use crate::value::{Options, Value, format_number};

pub trait Reporter {
    fn report_error(&mut self, headline: &str, detail: Option<&Value>);
    fn report_info(&mut self, label: &str, detail: &Value);
    /// Render the offending options. `location` is the call site that handed
    /// them to the validator, when known.
    fn dump_context(&mut self, candidate: Option<&Options>, location: Option<&'static Location<'static>>);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report_error(&mut self, headline: &str, detail: Option<&Value>) {
        (**self).report_error(headline, detail)
    }
    fn report_info(&mut self, label: &str, detail: &Value) {
        (**self).report_info(label, detail)
    }
    fn dump_context(&mut self, candidate: Option<&Options>, location: Option<&'static Location<'static>>) {
        (**self).dump_context(candidate, location)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// NO-OP / RECORDING
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn report_error(&mut self, _: &str, _: Option<&Value>) {}
    fn report_info(&mut self, _: &str, _: &Value) {}
    fn dump_context(&mut self, _: Option<&Options>, _: Option<&'static Location<'static>>) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Error { headline: String, detail: Option<Value> },
    Info { label: String, detail: Value },
    Context {
        candidate: Option<Options>,
        location: Option<&'static Location<'static>>,
    },
}

/// Keeps every call, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    pub events: Vec<Report>,
}

impl RecordingReporter {
    pub fn error_count(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, Report::Error { .. })).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Reporter for RecordingReporter {
    fn report_error(&mut self, headline: &str, detail: Option<&Value>) {
        self.events.push(Report::Error { headline: headline.to_string(), detail: detail.cloned() });
    }
    fn report_info(&mut self, label: &str, detail: &Value) {
        self.events.push(Report::Info { label: label.to_string(), detail: detail.clone() });
    }
    fn dump_context(&mut self, candidate: Option<&Options>, location: Option<&'static Location<'static>>) {
        self.events.push(Report::Context { candidate: candidate.cloned(), location });
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONSOLE
// ————————————————————————————————————————————————————————————————————————————

/// Human-readable, optionally colorized output.
#[derive(Debug)]
pub struct ConsoleReporter<W: Write> {
    out: W,
    color: bool,
}

impl ConsoleReporter<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl ConsoleReporter<Vec<u8>> {
    /// Collects output in memory; used when several reports must not interleave.
    pub fn buffered() -> Self {
        Self::new(Vec::new())
    }

    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, color: true }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // write failures are logged, never propagated
    fn emit(&mut self, line: String) {
        if let Err(error) = writeln!(self.out, "{line}") {
            tracing::warn!(%error, "failed to write diagnostic");
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report_error(&mut self, headline: &str, detail: Option<&Value>) {
        let prefix = if self.color { "Error:".red().bold().to_string() } else { "Error:".to_string() };
        let line = match detail {
            Some(v) => format!("{prefix} {headline} {}", stylize(v, self.color)),
            None => format!("{prefix} {headline}"),
        };
        self.emit(line);
    }

    fn report_info(&mut self, label: &str, detail: &Value) {
        // aligned under the text following "Error: "
        let listing = match detail {
            Value::Array(xs) => xs.iter().map(|x| stylize(x, self.color)).collect::<Vec<_>>().join(", "),
            other => stylize(other, self.color),
        };
        self.emit(format!("       {label} {listing}"));
    }

    fn dump_context(&mut self, candidate: Option<&Options>, location: Option<&'static Location<'static>>) {
        if let Some(loc) = location {
            let at = format!("  {}:{}:{}", loc.file(), loc.line(), loc.column());
            let at = if self.color { at.dimmed().to_string() } else { at };
            self.emit(at);
        }
        let body = match candidate {
            Some(opts) => stylize(&Value::Object(opts.clone()), self.color),
            None => stylize(&Value::Undefined, self.color),
        };
        self.emit(format!("  {body}"));
    }
}

/// Inspect-style rendering with per-kind colors.
pub fn stylize(v: &Value, color: bool) -> String {
    if !color {
        return v.to_string();
    }
    match v {
        Value::Undefined => "undefined".dimmed().to_string(),
        Value::Null => "null".bold().to_string(),
        Value::Bool(b) => b.to_string().yellow().to_string(),
        Value::Number(n) => format_number(*n).yellow().to_string(),
        Value::String(_) => v.to_string().green().to_string(),
        Value::Array(xs) if xs.is_empty() => "[]".to_string(),
        Value::Array(xs) => {
            let inner = xs.iter().map(|x| stylize(x, true)).collect::<Vec<_>>().join(", ");
            format!("[ {inner} ]")
        }
        Value::Object(m) => stylize_fields(None, m),
        Value::Instance { class, fields } => stylize_fields(Some(class.as_str()), fields),
    }
}

fn stylize_fields(class: Option<&str>, m: &indexmap::IndexMap<String, Value>) -> String {
    let class = class.map(|c| format!("{} ", c.cyan())).unwrap_or_default();
    if m.is_empty() {
        return format!("{class}{{}}");
    }
    let inner = m
        .iter()
        .map(|(k, v)| format!("{k}: {}", stylize(v, true)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{class}{{ {inner} }}")
}

// ------------------------------- Tests ------------------------------------ //
