//! Metric name templates.
//!
//! A template is literal text interleaved with actions of the form `{{.Field}}`. Templates are
//! parsed once, when a drain is built, and rendered against each metric as it is drained.
//!
//! The following fields are available:
//!
//! - `Name`: the name of the metric
//! - `Kind` (or `Type`): `count`, `sample`, or `measure`
//! - `Value`: the value of the metric
//! - `Units`: the units of the metric, possibly empty
//! - `Source`: the configured source, or an empty string
use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::Metric;

/// Errors that could occur while parsing or rendering a [`NameTemplate`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// The template is malformed.
    #[error("invalid template at byte {position}: {reason}")]
    Parse {
        /// Byte offset of the offending action.
        position: usize,

        /// What was wrong with it.
        reason: &'static str,
    },

    /// The template references a field that metrics do not have.
    #[error("template references undefined field `.{field}`")]
    UnknownField {
        /// Name of the field.
        field: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed metric name template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl NameTemplate {
    /// Parses a template.
    ///
    /// # Errors
    ///
    /// If an action is unterminated, empty, or is not a field reference, an error is returned.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = template;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_owned()));
            }

            let position = offset + open;
            let action_start = open + 2;
            let close = rest[action_start..]
                .find("}}")
                .ok_or(TemplateError::Parse { position, reason: "unclosed action" })?;

            let action = rest[action_start..action_start + close].trim();
            segments.push(Segment::Field(parse_field(action, position)?.to_owned()));

            let consumed = action_start + close + 2;
            rest = &rest[consumed..];
            offset += consumed;
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }

        Ok(NameTemplate { raw: template.to_owned(), segments })
    }

    /// Renders the template against the given metric.
    ///
    /// # Errors
    ///
    /// If the template references a field that does not exist, an error is returned.
    pub fn render(&self, metric: &Metric, source: Option<&str>) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.raw.len() + metric.name().len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Field(field) => match field.as_str() {
                    "Name" => out.push_str(metric.name()),
                    "Kind" | "Type" => out.push_str(metric.kind().as_str()),
                    "Units" => out.push_str(metric.units()),
                    "Value" => out.push_str(&metric.value().to_string()),
                    "Source" => out.push_str(source.unwrap_or_default()),
                    other => {
                        return Err(TemplateError::UnknownField { field: other.to_owned() })
                    }
                },
            }
        }
        Ok(out)
    }

    /// Gets the template text this was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn parse_field(action: &str, position: usize) -> Result<&str, TemplateError> {
    if action.is_empty() {
        return Err(TemplateError::Parse { position, reason: "empty action" });
    }

    let field = action.strip_prefix('.').unwrap_or_default();
    let mut chars = field.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(TemplateError::Parse {
            position,
            reason: "expected a field reference such as `.Name`",
        });
    }

    Ok(field)
}

impl FromStr for NameTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NameTemplate::parse(s)
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
