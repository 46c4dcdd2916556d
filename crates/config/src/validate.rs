//! Configuration validation.
//!
//! Reports syntax errors, unknown or misspelled fields, type errors and
//! settings that would make the bot misbehave at runtime.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use {secrecy::ExposeSecret, serde_json::Value};

use crate::{loader, schema::EditReplyConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "gallery",
    /// "telegram", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "gallery.items[0].file_id"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Expected shape of the configuration.
enum KnownKeys {
    Struct(HashMap<&'static str, KnownKeys>),
    Array(Box<KnownKeys>),
    Leaf,
}

fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Array, Leaf, Struct};

    let telegram = Struct(HashMap::from([
        ("token", Leaf),
        ("poll_timeout_secs", Leaf),
        ("client_timeout_secs", Leaf),
        ("retry_after_max_retries", Leaf),
        ("poll_error_backoff_secs", Leaf),
        ("api_url", Leaf),
    ]));

    let item = Struct(HashMap::from([
        ("kind", Leaf),
        ("file_id", Leaf),
        ("title", Leaf),
    ]));

    let gallery = Struct(HashMap::from([
        ("prompt", Leaf),
        ("back_label", Leaf),
        ("items", Array(Box::new(item))),
    ]));

    Struct(HashMap::from([("telegram", telegram), ("gallery", gallery)]))
}

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Closest candidate within `max_distance` edits.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&c| (c, levenshtein(needle, c)))
        .filter(|&(_, d)| d > 0 && d <= max_distance)
        .min_by_key(|&(c, d)| (d, c))
        .map(|(c, _)| c)
}

fn child_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn check_unknown_fields(
    value: &Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match (value, schema) {
        (Value::Object(table), KnownKeys::Struct(fields)) => {
            let known_keys: Vec<&str> = fields.keys().copied().collect();
            for (key, child_value) in table {
                let path = child_path(prefix, key);
                if let Some(child_schema) = fields.get(key.as_str()) {
                    check_unknown_fields(child_value, child_schema, &path, diagnostics);
                    continue;
                }
                let message = match suggest(key, &known_keys, 3) {
                    Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
                    None => "unknown field".to_string(),
                };
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "unknown-field",
                    path,
                    message,
                ));
            }
        },
        (Value::Array(items), KnownKeys::Array(item_schema)) => {
            for (i, item) in items.iter().enumerate() {
                let path = format!("{prefix}[{i}]");
                check_unknown_fields(item, item_schema, &path, diagnostics);
            }
        },
        // Leaf or type mismatch, caught by the type check.
        _ => {},
    }
}

fn check_semantics(config: &EditReplyConfig, diagnostics: &mut Vec<Diagnostic>) {
    let telegram = &config.telegram;
    if !telegram.has_token() {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "telegram",
            "telegram.token",
            format!("bot token is empty (set it here or via {})", loader::TOKEN_ENV),
        ));
    } else if !telegram.token.expose_secret().contains(':') {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "telegram",
            "telegram.token",
            "bot token does not look like <id>:<secret>",
        ));
    }

    if u64::from(telegram.poll_timeout_secs) >= telegram.client_timeout_secs {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "telegram",
            "telegram.client_timeout_secs",
            format!(
                "client timeout ({}s) must exceed the polling timeout ({}s)",
                telegram.client_timeout_secs, telegram.poll_timeout_secs
            ),
        ));
    }

    let gallery = &config.gallery;
    if gallery.items.is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "gallery",
            "gallery.items",
            "gallery is empty; send media to the bot to learn file ids",
        ));
    }
    if gallery.prompt.trim().is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "gallery",
            "gallery.prompt",
            "prompt must not be empty",
        ));
    }

    let mut seen = HashSet::new();
    for (i, item) in gallery.items.iter().enumerate() {
        let path = format!("gallery.items[{i}].file_id");
        if item.file_id.trim().is_empty() {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "gallery",
                path,
                "file id must not be empty",
            ));
        } else if !seen.insert(item.file_id.as_str()) {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                "gallery",
                path,
                "duplicate file id",
            ));
        }
    }
}

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => loader::find_config_file(),
    };

    let Some(ref actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Info,
                "file-ref",
                "",
                "no config file found; using defaults",
            )],
            config_path: None,
        };
    };

    match std::fs::read_to_string(actual_path) {
        Ok(content) => {
            let mut result = validate_str(&content, actual_path);
            result.config_path = Some(actual_path.clone());
            result
        },
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("failed to read config file: {e}"),
            )],
            config_path: Some(actual_path.clone()),
        },
    }
}

/// Validate raw config text; the format is taken from `path`'s extension.
#[must_use]
pub fn validate_str(raw: &str, path: &Path) -> ValidationResult {
    validate_str_with(raw, path, |name| std::env::var(name).ok())
}

/// Same as [`validate_str`] with an explicit variable lookup, used for both
/// `${VAR}` substitution and the environment overrides `load` applies.
#[must_use]
pub fn validate_str_with(
    raw: &str,
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> ValidationResult {
    let mut diagnostics = Vec::new();
    let raw = crate::env_subst::substitute_env_with(raw, &lookup);

    let value = match loader::parse_config_value(&raw, path) {
        Ok(value) => value,
        Err(e) => {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("syntax error: {e}"),
            ));
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    check_unknown_fields(&value, &build_schema_map(), "", &mut diagnostics);

    match serde_json::from_value::<EditReplyConfig>(value) {
        Ok(mut config) => {
            loader::apply_env_overrides(&mut config, &lookup);
            check_semantics(&config, &mut diagnostics);
        },
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    diagnostics.sort_by_key(|d| d.severity);
    ValidationResult {
        diagnostics,
        config_path: None,
    }
}
