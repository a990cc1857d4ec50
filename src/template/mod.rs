//! Loader for single-function C source templates.
//!
//! A template is free header text, one `PROTOTYPE` declaration naming the
//! parameter kinds, and exactly one function body:
//!
//! ```text
//! #include "ompi_config.h"
//!
//! PROTOTYPE ERROR_CLASS comm_size(COMM comm, INT_OUT size)
//! {
//!     return ompi_comm_size_impl(comm, size, FUNC_NAME);
//! }
//! ```

pub mod parser;

use crate::{
    c::types::CKind,
    errors::{BindingError, BindingResult},
    output::LineSink,
    prototype::{Parameter, Prototype},
};
use nom::Offset;
use parser::{PROTOTYPE_KEYWORD, parse_declaration};
use std::{collections::HashSet, fs, path::Path};
use tracing::debug;

/// Placeholder in template bodies replaced by the quoted entry point name.
pub const FUNC_NAME: &str = "FUNC_NAME";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceTemplate {
    pub header: Vec<String>,
    pub prototype: Prototype,
    pub body: Vec<String>,
}

#[derive(Clone, Copy)]
enum Section {
    Header,
    Declaration { start: usize },
    Body,
}

impl SourceTemplate {
    /// Reads `path`, resolved against `prefix` when one is given.
    pub fn load(path: &Path, prefix: Option<&Path>) -> BindingResult<Self> {
        let path = match prefix {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        };
        let text = fs::read_to_string(&path).map_err(|error| BindingError::io(&path, error))?;
        let template = Self::parse(&path.display().to_string(), &text)?;
        debug!(
            path = %path.display(),
            prototype = %template.prototype.name,
            params = template.prototype.parameters.len(),
            "loaded template"
        );
        Ok(template)
    }

    pub fn parse(path_name: &str, text: &str) -> BindingResult<Self> {
        let fail = |message: &str, span: (usize, usize)| {
            BindingError::template(path_name, text, message, span)
        };

        let mut header = Vec::new();
        let mut body: Vec<(usize, String)> = Vec::new();
        let mut declaration = None;
        let mut section = Section::Header;
        let mut offset = 0usize;

        for raw in text.split_inclusive('\n') {
            let line_offset = offset;
            offset += raw.len();
            let line = raw.trim_end();

            if line.starts_with(PROTOTYPE_KEYWORD) && !matches!(section, Section::Header) {
                return Err(fail(
                    "more than one PROTOTYPE declaration in template",
                    (line_offset, PROTOTYPE_KEYWORD.len()),
                ));
            }

            match section {
                Section::Header if line.starts_with(PROTOTYPE_KEYWORD) => {
                    section = Section::Declaration { start: line_offset };
                }
                Section::Header => {
                    header.push(line.to_string());
                    continue;
                }
                Section::Body => {
                    body.push((line_offset, line.to_string()));
                    continue;
                }
                Section::Declaration { .. } => {}
            }

            if let (Section::Declaration { start }, Some(close)) = (section, line.find(')')) {
                let end = line_offset + close + 1;
                declaration = Some((start, end));
                let rest = line[close + 1..].trim_start();
                if !rest.is_empty() {
                    body.push((line_offset + line.len() - rest.len(), rest.to_string()));
                }
                section = Section::Body;
            }
        }

        let (start, end) = match (declaration, section) {
            (Some(span), _) => span,
            (None, Section::Declaration { start }) => {
                return Err(fail(
                    "PROTOTYPE declaration is missing its closing `)`",
                    (start, text.len() - start),
                ));
            }
            (None, _) => return Err(fail("missing PROTOTYPE declaration in template", (0, 0))),
        };

        let source = &text[start..end];
        let decl = parse_declaration(source)
            .map_err(|err| fail(&err.message, (start + err.offset, 1)))?;
        let span_of = |word: &str| (start + source.offset(word), word.len());

        let return_kind = decl.return_kind.parse::<CKind>().map_err(|_| {
            fail(
                &format!("unknown return kind `{}`", decl.return_kind),
                span_of(decl.return_kind),
            )
        })?;
        let mut seen = HashSet::new();
        let mut parameters = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let kind = param.kind.parse::<CKind>().map_err(|_| {
                fail(
                    &format!("unknown parameter kind `{}`", param.kind),
                    span_of(param.kind),
                )
            })?;
            if !seen.insert(param.name) {
                return Err(fail(
                    &format!("duplicate parameter name `{}`", param.name),
                    span_of(param.name),
                ));
            }
            parameters.push(Parameter::new(
                kind,
                param.name,
                param.count_param.map(str::to_string),
            ));
        }

        validate_body(&body, (start, end - start))
            .map_err(|(message, span)| fail(message, span))?;

        Ok(Self {
            header,
            prototype: Prototype {
                name: decl.name.to_string(),
                return_kind,
                parameters,
            },
            body: body.into_iter().map(|(_, line)| line).collect(),
        })
    }

    pub fn print_header(&self, out: &mut impl LineSink) {
        for line in &self.header {
            out.dump(line);
        }
    }

    /// Prints the body with `FUNC_NAME` replaced by `"func_name"`.
    pub fn print_body(&self, func_name: &str, out: &mut impl LineSink) {
        let quoted = format!("\"{func_name}\"");
        for line in &self.body {
            out.dump(&line.replace(FUNC_NAME, &quoted));
        }
    }
}

/// The body must be a single brace-balanced block followed only by blank lines.
/// `declaration` is reported when the body has no lines to point at.
fn validate_body(
    body: &[(usize, String)],
    declaration: (usize, usize),
) -> Result<(), (&'static str, (usize, usize))> {
    let mut balance = 0i64;
    let mut opened = false;
    for (offset, line) in body {
        let line = line.trim();
        if balance == 0 && opened && !line.is_empty() {
            return Err((
                "extra code after the function body; only one function is allowed per template",
                (*offset, line.len()),
            ));
        }
        opened |= line.contains('{');
        balance += line.matches('{').count() as i64 - line.matches('}').count() as i64;
        if balance < 0 {
            return Err((
                "closing brace without a matching opening brace in the function body",
                (*offset, line.len()),
            ));
        }
    }
    if !opened {
        let span = body
            .iter()
            .find(|(_, line)| !line.trim().is_empty())
            .map(|(offset, line)| (*offset, line.len()))
            .unwrap_or(declaration);
        return Err(("missing function body after the PROTOTYPE declaration", span));
    }
    if balance != 0 {
        let span = body
            .last()
            .map(|(offset, line)| (*offset, line.len()))
            .unwrap_or(declaration);
        return Err(("mismatched braces in the function body", span));
    }
    Ok(())
}
