//! Configuration management for Oblish.
//!
//! Parses the vault's `.oblish/config.toml` with serde. Template paths and
//! `[[copy]]` bases are resolved relative to the directory holding the
//! config file, and template sources are read during load so a missing
//! template is reported before any output is written.
//!
//! CLI settings are applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Path values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `note_template`
//! - `tags_template`
//! - `copy.base`
//!
//! ## Example
//!
//! ```toml
//! note_template = "note.html"
//! tags_template = "tags.html"
//!
//! [vars]
//! site_name = "My Garden"
//!
//! [[copy]]
//! base = "static"
//! relative = "assets"
//! ```

mod expand;

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

/// Directory inside the vault holding the configuration.
pub const CONFIG_DIR: &str = ".oblish";

/// Configuration filename inside [`CONFIG_DIR`].
pub const CONFIG_FILENAME: &str = "config.toml";

/// Output directory used when none is given.
pub const DEFAULT_DESTINATION: &str = "public";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the output directory.
    pub destination: Option<PathBuf>,
}

/// Raw configuration as parsed from TOML (paths as strings).
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigRaw {
    note_template: Option<String>,
    tags_template: Option<String>,
    destination: Option<String>,
    hard_wraps: Option<bool>,
    vars: toml::Table,
    copy: Vec<CopyEntryRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CopyEntryRaw {
    base: String,
    relative: String,
}

/// Template file loaded from disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    /// Resolved path of the template file.
    pub path: PathBuf,
    /// Template source.
    pub source: String,
}

/// Extra file or directory copied into the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyEntry {
    /// Source file or directory (resolved).
    pub base: PathBuf,
    /// Target path relative to the output directory.
    pub relative: PathBuf,
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    /// Template for note pages.
    pub note_template: Template,
    /// Template for the tag page. The page is skipped when unset.
    pub tags_template: Option<Template>,
    /// Values exposed to templates as `vars`.
    pub vars: toml::Table,
    /// Extra copy entries.
    pub copy: Vec<CopyEntry>,
    /// Vault directory being built.
    pub vault_dir: PathBuf,
    /// Output directory.
    pub destination: PathBuf,
    /// Render soft line breaks as `<br>`.
    pub hard_wraps: bool,
    /// Path to the config file.
    pub config_path: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Template file could not be read.
    #[error("Failed to read template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`note_template`").
        field: String,
        /// Error message (e.g., "${`THEME_DIR`} not set").
        message: String,
    },
}

impl Config {
    /// Default config file location for a vault.
    #[must_use]
    pub fn default_path(vault_dir: &Path) -> PathBuf {
        vault_dir.join(CONFIG_DIR).join(CONFIG_FILENAME)
    }

    /// Load configuration for `vault_dir` with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise loads
    /// `<vault_dir>/.oblish/config.toml`.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if the config file doesn't exist, parsing or validation
    /// fails, or a template cannot be read.
    pub fn load(
        config_path: Option<&Path>,
        vault_dir: &Path,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = config_path.map_or_else(|| Self::default_path(vault_dir), Path::to_path_buf);
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }

        let content = std::fs::read_to_string(&path)?;
        let raw: ConfigRaw = toml::from_str(&content)?;
        let mut config = Self::resolve(raw, &path, vault_dir)?;

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(destination) = &settings.destination {
            self.destination.clone_from(destination);
        }
    }

    /// Expand, resolve and validate raw values, reading template sources.
    fn resolve(raw: ConfigRaw, config_path: &Path, vault_dir: &Path) -> Result<Self, ConfigError> {
        let config_dir = config_path.parent().unwrap_or(Path::new("."));

        let note_template = raw
            .note_template
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("note_template is required".to_owned()))?;
        require_non_empty(note_template, "note_template")?;
        let note_template = read_template(expand::expand_path(
            note_template,
            "note_template",
            config_dir,
        )?)?;

        let tags_template = match raw.tags_template.as_deref() {
            Some(value) => {
                require_non_empty(value, "tags_template")?;
                Some(read_template(expand::expand_path(
                    value,
                    "tags_template",
                    config_dir,
                )?)?)
            }
            None => None,
        };

        let copy = raw
            .copy
            .iter()
            .enumerate()
            .map(|(i, entry)| resolve_copy_entry(entry, i, config_dir))
            .collect::<Result<Vec<_>, _>>()?;

        let destination = raw
            .destination
            .map_or_else(|| PathBuf::from(DEFAULT_DESTINATION), PathBuf::from);

        Ok(Self {
            note_template,
            tags_template,
            vars: raw.vars,
            copy,
            vault_dir: vault_dir.to_path_buf(),
            destination,
            hard_wraps: raw.hard_wraps.unwrap_or(true),
            config_path: config_path.to_path_buf(),
        })
    }
}

fn resolve_copy_entry(
    entry: &CopyEntryRaw,
    index: usize,
    config_dir: &Path,
) -> Result<CopyEntry, ConfigError> {
    let base_field = format!("copy[{index}].base");
    require_non_empty(&entry.base, &base_field)?;
    let base = expand::expand_path(&entry.base, &base_field, config_dir)?;

    let relative = PathBuf::from(&entry.relative);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::Validation(format!(
            "copy[{index}].relative must stay inside the destination: {}",
            entry.relative
        )));
    }

    Ok(CopyEntry { base, relative })
}

fn read_template(path: PathBuf) -> Result<Template, ConfigError> {
    match std::fs::read_to_string(&path) {
        Ok(source) => Ok(Template { path, source }),
        Err(source) => Err(ConfigError::Template { path, source }),
    }
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    /// Create a vault with `.oblish/config.toml` and a note template.
    fn vault(config: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(CONFIG_FILENAME), config).unwrap();
        fs::write(config_dir.join("note.html"), "<h1>{{ title }}</h1>").unwrap();
        dir
    }

    #[test]
    fn test_load_minimal_config() {
        let dir = vault(r#"note_template = "note.html""#);
        let config = Config::load(None, dir.path(), None).unwrap();

        assert_eq!(
            config.note_template.path,
            dir.path().join(".oblish/note.html")
        );
        assert_eq!(config.note_template.source, "<h1>{{ title }}</h1>");
        assert!(config.tags_template.is_none());
        assert!(config.vars.is_empty());
        assert!(config.copy.is_empty());
        assert_eq!(config.destination, PathBuf::from("public"));
        assert!(config.hard_wraps);
        assert_eq!(config.vault_dir, dir.path());
    }

    #[test]
    fn test_load_full_config() {
        let dir = vault(
            r#"
note_template = "note.html"
tags_template = "tags.html"
destination = "site"
hard_wraps = false

[vars]
site_name = "Garden"
year = 2024

[[copy]]
base = "static"
relative = "assets"
"#,
        );
        fs::write(dir.path().join(".oblish/tags.html"), "tags").unwrap();

        let config = Config::load(None, dir.path(), None).unwrap();

        assert_eq!(config.tags_template.unwrap().source, "tags");
        assert_eq!(
            config.vars.get("site_name").and_then(toml::Value::as_str),
            Some("Garden")
        );
        assert_eq!(
            config.copy,
            vec![CopyEntry {
                base: dir.path().join(".oblish/static"),
                relative: PathBuf::from("assets"),
            }]
        );
        assert_eq!(config.destination, PathBuf::from("site"));
        assert!(!config.hard_wraps);
    }

    #[test]
    fn test_missing_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(None, dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(ref p) if p.ends_with(".oblish/config.toml")));
    }

    #[test]
    fn test_explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("custom.toml"), r#"note_template = "n.html""#).unwrap();
        fs::write(dir.path().join("n.html"), "x").unwrap();

        let config = Config::load(
            Some(&dir.path().join("custom.toml")),
            Path::new("/elsewhere"),
            None,
        )
        .unwrap();

        assert_eq!(config.note_template.path, dir.path().join("n.html"));
        assert_eq!(config.vault_dir, PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_explicit_config_path_missing() {
        let err = Config::load(Some(Path::new("/no/such/config.toml")), Path::new("."), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_note_template_required() {
        let dir = vault("[vars]\na = 1\n");
        let err = Config::load(None, dir.path(), None).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        assert!(err.to_string().contains("note_template"));
    }

    #[test]
    fn test_missing_template_file() {
        let dir = vault(r#"note_template = "absent.html""#);
        let err = Config::load(None, dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Template { ref path, .. } if path.ends_with("absent.html")));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = vault("note_template = \"note.html\"\nnoteTemplate = \"x\"\n");
        let err = Config::load(None, dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_copy_relative_cannot_escape() {
        let dir = vault(
            r#"
note_template = "note.html"

[[copy]]
base = "static"
relative = "../outside"
"#,
        );
        let err = Config::load(None, dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("copy[0].relative"));
    }

    #[test]
    fn test_template_path_expansion() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("OBLISH_TEST_TEMPLATE_NAME", "note");
        }
        let dir = vault(r#"note_template = "${OBLISH_TEST_TEMPLATE_NAME}.html""#);
        let config = Config::load(None, dir.path(), None).unwrap();
        assert_eq!(config.note_template.source, "<h1>{{ title }}</h1>");
        unsafe {
            std::env::remove_var("OBLISH_TEST_TEMPLATE_NAME");
        }
    }

    #[test]
    fn test_apply_cli_settings_destination() {
        let dir = vault(r#"note_template = "note.html""#);
        let settings = CliSettings {
            destination: Some(PathBuf::from("/tmp/out")),
        };
        let config = Config::load(None, dir.path(), Some(&settings)).unwrap();
        assert_eq!(config.destination, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_empty_cli_settings_keep_config() {
        let dir = vault("note_template = \"note.html\"\ndestination = \"site\"\n");
        let config = Config::load(None, dir.path(), Some(&CliSettings::default())).unwrap();
        assert_eq!(config.destination, PathBuf::from("site"));
    }
}
