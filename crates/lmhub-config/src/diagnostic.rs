// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Miette diagnostics for configuration failures.
//!
//! Figment reports deserialization problems as flat error values. This
//! module turns them into annotated reports: the offending key is located
//! in whichever TOML file supplied it, unknown keys get a closest-match
//! suggestion, and everything renders through miette's graphical handler.

use std::fmt::Write as _;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler similarity floor for "did you mean" suggestions. 0.75
/// catches `catalogid` -> `catalog_id` and `prority` -> `priority` while
/// rejecting unrelated keys.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// The TOML files that fed the Figment merge, kept so diagnostics can point
/// at the exact line that introduced a bad key.
#[derive(Debug, Default)]
pub struct TomlSources {
    files: Vec<(String, String)>,
}

impl TomlSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one TOML file's content under its display path.
    pub fn push(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.push((path.into(), content.into()));
    }

    /// Locate `key` inside the table named by `section` in the file Figment
    /// blamed, returning a span plus the source for miette to excerpt.
    fn locate(
        &self,
        blamed_file: Option<&str>,
        section: &[String],
        key: &str,
    ) -> Option<(SourceSpan, NamedSource<String>)> {
        let (name, content) = self.files.iter().find(|(p, _)| Some(p.as_str()) == blamed_file)?;
        let offset = key_offset(content, section.first().map(String::as_str), key)?;
        Some((
            SourceSpan::new(offset.into(), key.len()),
            NamedSource::new(name, content.clone()),
        ))
    }
}

/// A configuration error, rendered as a miette report with source excerpt,
/// suggestion, and help text where available.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key the target section does not define.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(code(lmhub::config::unknown_key), help("{help}"))]
    UnknownKey {
        key: String,
        /// Closest valid key above the similarity floor, if any.
        suggestion: Option<String>,
        help: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(lmhub::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A required key with no default and no configured value.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(lmhub::config::missing_key),
        help("add `{key} = <value>` to your lmhub.toml")
    )]
    MissingKey { key: String },

    /// A semantic rule violated by an otherwise well-formed config.
    #[error("validation error: {message}")]
    #[diagnostic(code(lmhub::config::validation))]
    Validation { message: String },

    /// Anything Figment reports that has no richer mapping.
    #[error("configuration error: {0}")]
    #[diagnostic(code(lmhub::config::other))]
    Other(String),
}

/// Convert a Figment error (which may bundle several failures) into one
/// diagnostic per failure.
pub fn explain_figment_error(err: figment::Error, sources: &TomlSources) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let section: Vec<String> = error.path.iter().map(ToString::to_string).collect();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let valid: Vec<&str> = expected.to_vec();
                    let suggestion = closest_key(field, &valid);
                    let mut help = String::new();
                    if let Some(s) = &suggestion {
                        let _ = write!(help, "did you mean `{s}`? ");
                    }
                    let _ = write!(help, "valid keys: {}", valid.join(", "));

                    let located =
                        sources.locate(blamed_file(&error).as_deref(), &section, field);
                    let (span, src) = match located {
                        Some((span, src)) => (Some(span), Some(src)),
                        None => (None, None),
                    };
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion,
                        help,
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: field.clone().into_owned(),
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: section.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// The file Figment's metadata blames for a value, if it was a file at all.
fn blamed_file(error: &figment::Error) -> Option<String> {
    match error.metadata.as_ref()?.source.as_ref()? {
        figment::Source::File(path) => Some(path.display().to_string()),
        _ => None,
    }
}

/// Byte offset of `key` within `content`, restricted to the table named by
/// `section` (`None` means the top-level table). Understands both `[table]`
/// and `[[table]]` headers, so keys inside `[[models]]` entries resolve too.
fn key_offset(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut in_target = section.is_none();
    let mut offset = 0;

    for line in content.lines() {
        let trimmed = line.trim_start();
        if let Some(name) = table_header(trimmed) {
            in_target = section == Some(name);
        } else if in_target {
            if let Some(rest) = trimmed.strip_prefix(key) {
                if rest.trim_start().starts_with('=') {
                    return Some(offset + (line.len() - trimmed.len()));
                }
            }
        }
        offset += line.len() + 1;
    }

    None
}

/// Parse `[name]` or `[[name]]` at the start of an already-trimmed line.
fn table_header(line: &str) -> Option<&str> {
    let inner = line
        .strip_prefix("[[")
        .and_then(|rest| rest.strip_suffix("]]"))
        .or_else(|| line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')))?;
    Some(inner.trim())
}

/// Best fuzzy match for an unknown key among the valid ones.
fn closest_key(unknown: &str, valid: &[&str]) -> Option<String> {
    valid
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        if handler.render_report(&mut out, error).is_err() {
            let _ = writeln!(out, "error: {error}");
        }
    }
    eprint!("{out}");
}
