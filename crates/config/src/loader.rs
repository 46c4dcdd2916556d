use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::EditReplyConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "editreply.toml",
    "editreply.yaml",
    "editreply.yml",
    "editreply.json",
];

/// Overrides `telegram.token` when set.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<EditReplyConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path).with_context(|| format!("failed to parse {}", path.display()))
}

/// Load `path` when given, otherwise discover the config file.
///
/// An explicit path must load; a discovered file that fails to parse falls
/// back to defaults with a warning. Environment overrides are applied last.
pub fn load(path: Option<&Path>) -> anyhow::Result<EditReplyConfig> {
    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(path)?
        },
        None => discover_and_load(),
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./editreply.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/editreply/editreply.{toml,yaml,yml,json}` (user-global)
///
/// Returns `EditReplyConfig::default()` if no config file is found.
pub fn discover_and_load() -> EditReplyConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    EditReplyConfig::default()
}

/// Apply environment overrides through `lookup`.
pub fn apply_env_overrides(
    config: &mut EditReplyConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        debug!(var = TOKEN_ENV, "telegram token taken from environment");
        config.telegram.token = Secret::new(token);
    }
}

/// Find the first config file in standard locations.
pub(crate) fn find_config_file() -> Option<PathBuf> {
    find_config_file_in(Path::new("."), config_dir().as_deref())
}

fn find_config_file_in(local: &Path, global: Option<&Path>) -> Option<PathBuf> {
    std::iter::once(local)
        .chain(global)
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/editreply/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "editreply").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<EditReplyConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Parse raw config text into a JSON value, whatever its format.
pub(crate) fn parse_config_value(raw: &str, path: &Path) -> anyhow::Result<serde_json::Value> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => {
            let v: toml::Value = toml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "yaml" | "yml" => {
            let v: serde_yaml::Value = serde_yaml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
