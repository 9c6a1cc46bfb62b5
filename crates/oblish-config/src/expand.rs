//! `${VAR}` expansion for configured paths.

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// Bare `$VAR` is left alone. An unset variable without a default is an
/// error naming both the variable and `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| match std::env::var(var) {
        Ok(val) => Ok(Some(val)),
        Err(_) => Err(UnsetVar(var.to_owned())),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand `value` and resolve it against `base` when relative.
pub(crate) fn expand_path(value: &str, field: &str, base: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_env(value, field)?;
    Ok(base.join(expanded))
}

struct UnsetVar(String);
