//! Configuration loading, validation and env substitution.
//!
//! Config files: `editreply.toml`, `editreply.yaml`, `editreply.yml` or
//! `editreply.json`, searched in `./` then `~/.config/editreply/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw
//! file text.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{TOKEN_ENV, apply_env_overrides, config_dir, discover_and_load, load, load_config},
    schema::{EditReplyConfig, GalleryConfig, GalleryItem},
    validate::{Diagnostic, Severity, ValidationResult, validate, validate_str, validate_str_with},
};
