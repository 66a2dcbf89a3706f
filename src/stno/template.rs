//! # Templates
//!
//! A notebook uses two templates:
//!
//! - the **entry template**, rendered with `{ datetime }` to seed the text of a
//!   new entry, and
//! - the **entry ID template**, rendered with the parsed content of an entry to
//!   produce the seed of its identifier.
//!
//! Both are Jinja templates rendered by `minijinja`. Rendering is lenient:
//! a variable that is not in the context renders as [`PLACEHOLDER`] instead
//! of failing, so an ID template that mentions an optional field still
//! produces an identifier.
//!
//! Templates are validated when they are compiled. Syntax errors fail right
//! away, and so does any reference to a function, filter, test or method that
//! does not exist. Misconfiguration therefore shows up when the template is
//! set, not when an entry is saved.
//!
//! Available helpers beyond the Jinja builtins:
//!
//! - `strftime(format)`: formats an RFC 3339 / TOML datetime with chrono
//!   format specifiers, e.g. `{{ datetime|strftime("%Y %b %-d") }}`.

use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use minijinja::machinery::{self, Instruction};
use minijinja::{AutoEscape, Environment, Error, ErrorKind, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::{self, Write};
use std::iter;

/// Rendered in place of variables that are not defined in the context.
pub const PLACEHOLDER: &str = "<no value>";

/// Used when an identifier seed sanitizes down to nothing.
pub const FALLBACK_IDENTIFIER: &str = "entry";

static DISALLOWED_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-*[^A-Za-z0-9_-]+-*").expect("identifier pattern is valid"));

/// A compiled, validated template.
#[derive(Clone)]
pub struct Template {
    name: String,
    source: String,
    env: Environment<'static>,
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}

impl Template {
    pub fn compile(name: &str, source: &str) -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.set_formatter(placeholder_formatter);
        env.add_filter("strftime", strftime);
        env.add_template_owned(name.to_string(), source.to_string())?;

        let template = Self {
            name: name.to_string(),
            source: source.to_string(),
            env,
        };
        template.check_references()?;
        Ok(template)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render<S: Serialize>(&self, ctx: S) -> Result<String> {
        let tmpl = self.env.get_template(&self.name)?;
        Ok(tmpl.render(ctx)?)
    }

    /// Rejects calls to functions, filters and tests the environment does not
    /// provide, wherever they appear in the template. A trial render against
    /// an empty context then catches unknown methods on literals.
    fn check_references(&self) -> Result<()> {
        let tmpl = self.env.get_template(&self.name)?;
        let compiled = machinery::get_compiled_template(&tmpl);

        let mut locals = HashSet::new();
        let mut references = Vec::new();
        for instructions in iter::once(&compiled.instructions).chain(compiled.blocks.values()) {
            for idx in 0..instructions.len() {
                match instructions.get(idx as u32) {
                    Some(Instruction::StoreLocal(name)) => {
                        locals.insert(*name);
                    }
                    Some(Instruction::CallFunction(name, _)) => {
                        references.push(Reference::Function(*name))
                    }
                    Some(Instruction::ApplyFilter(name, ..)) => {
                        references.push(Reference::Filter(*name))
                    }
                    Some(Instruction::PerformTest(name, ..)) => {
                        references.push(Reference::Test(*name))
                    }
                    _ => {}
                }
            }
        }

        for reference in references {
            if let Reference::Function(name) = reference {
                if locals.contains(name) || RUNTIME_FUNCTIONS.contains(&name) {
                    continue;
                }
            }
            self.check_reference(reference)?;
        }

        match self.render(minijinja::context! {}) {
            Err(crate::error::StnoError::Template(err))
                if matches!(
                    err.kind(),
                    ErrorKind::UnknownFunction
                        | ErrorKind::UnknownFilter
                        | ErrorKind::UnknownTest
                        | ErrorKind::UnknownMethod
                ) =>
            {
                Err(err.into())
            }
            _ => Ok(()),
        }
    }

    /// Evaluates the reference on its own so that only the lookup can fail
    /// with an `Unknown*` error.
    fn check_reference(&self, reference: Reference<'_>) -> Result<()> {
        let (source, unknown) = match reference {
            Reference::Function(name) => (format!("{{{{ {name}() }}}}"), ErrorKind::UnknownFunction),
            Reference::Filter(name) => (format!("{{{{ none|{name} }}}}"), ErrorKind::UnknownFilter),
            Reference::Test(name) => (format!("{{{{ none is {name} }}}}"), ErrorKind::UnknownTest),
        };
        match self.env.render_str(&source, minijinja::context! {}) {
            Err(err) if err.kind() == unknown => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Copy)]
enum Reference<'a> {
    Function(&'a str),
    Filter(&'a str),
    Test(&'a str),
}

/// Callables that only exist while a template runs.
const RUNTIME_FUNCTIONS: &[&str] = &["super", "loop", "caller"];

/// Collapses every run of characters outside `[A-Za-z0-9_-]` (together with
/// any dashes around it) into a single `-` and trims dashes from both ends.
pub fn sanitize_identifier(raw: &str) -> String {
    let replaced = DISALLOWED_RUN.replace_all(raw, "-");
    let trimmed = replaced.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_IDENTIFIER.to_string()
    } else {
        trimmed.to_string()
    }
}

fn placeholder_formatter(
    out: &mut minijinja::Output<'_>,
    state: &minijinja::State<'_, '_>,
    value: &Value,
) -> std::result::Result<(), Error> {
    if value.is_undefined() {
        out.write_str(PLACEHOLDER)
            .map_err(|e| Error::new(ErrorKind::WriteFailure, e.to_string()))
    } else {
        minijinja::escape_formatter(out, state, value)
    }
}

fn strftime(value: Value, format: String) -> std::result::Result<Value, Error> {
    if value.is_undefined() || value.is_none() {
        return Ok(Value::UNDEFINED);
    }
    let text = value.to_string();

    let mut out = String::new();
    let written = if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        write!(out, "{}", dt.format(&format))
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f") {
        write!(out, "{}", dt.format(&format))
    } else if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        write!(out, "{}", date.format(&format))
    } else {
        return Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("'{text}' is not a datetime"),
        ));
    };

    written.map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid strftime format '{format}'"),
        )
    })?;
    Ok(Value::from(out))
}
