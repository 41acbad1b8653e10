// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean" suggestions.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(consulta::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest valid key, if any is similar enough.
        suggestion: Option<String>,
        /// Comma-separated keys accepted in the section.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(consulta::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A configuration value failed a semantic check.
    #[error("validation error: {message}")]
    #[diagnostic(code(consulta::config::validation))]
    Validation { message: String },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(consulta::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert every error inside a `figment::Error` into a [`ConfigError`].
///
/// `toml_sources` pairs each file path the loader read with its content, so
/// unknown keys can be underlined in place.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = locate_key(&error, &path, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Resolve the file an error came from and the byte span of the offending key.
fn locate_key(
    error: &figment::error::Error,
    path: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some(figment::Source::File(file)) = error.metadata.as_ref().and_then(|m| m.source.as_ref())
    else {
        return (None, None);
    };
    let file = file.display().to_string();

    let Some((name, content)) = toml_sources.iter().find(|(p, _)| *p == file) else {
        return (None, None);
    };

    match find_key_offset(content, path, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` as a key inside the `[section]` named by `path[0]`.
///
/// Top-level keys (empty `path`) are searched from the start of the file.
/// Only lines whose key is followed by whitespace or `=` count as a match.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];
        if rest.starts_with('[') && offset != start {
            // Next section header: the key is not in this section.
            return None;
        }
        if let Some(after) = rest.strip_prefix(field)
            && after.starts_with([' ', '\t', '='])
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// Best Jaro-Winkler match above the suggestion threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|k| (strsim::jaro_winkler(unknown, k), *k))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, k)| k.to_string())
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_booking_key() {
        let valid = &["alternatives_limit", "max_options", "confirmation_mode"];
        assert_eq!(
            suggest_key("max_optoins", valid),
            Some("max_options".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["name", "log_level"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn finds_key_inside_its_section() {
        let content = "[agent]\nname = \"a\"\n\n[booking]\nmax_optoins = 3\n";
        let path = vec!["booking".to_string()];
        let o = find_key_offset(content, &path, "max_optoins").unwrap();
        assert_eq!(&content[o..o + 11], "max_optoins");
    }

    #[test]
    fn key_in_other_section_is_not_found() {
        let content = "[booking]\nmax_options = 3\n[nlu]\nstray = 1\n";
        let path = vec!["booking".to_string()];
        assert_eq!(find_key_offset(content, &path, "stray"), None);
    }
}
