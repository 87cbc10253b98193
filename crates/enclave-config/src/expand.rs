//! `${VAR}` and `${VAR:-default}` expansion for string settings.

use std::borrow::Cow;

use crate::ConfigError;

/// Name of the first variable that could not be resolved.
struct Unset(String);

/// Expand `field` in place from the process environment.
pub(crate) fn expand_field(value: &mut String, field: &str) -> Result<(), ConfigError> {
    expand_field_with(value, field, |name| std::env::var(name).ok())
}

/// Expand `field` in place, resolving names through `lookup`.
///
/// Values without a `${` are left alone, so a bare `$` in a URL survives.
fn expand_field_with(
    value: &mut String,
    field: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if !value.contains("${") {
        return Ok(());
    }

    let expanded = shellexpand::env_with_context(value.as_str(), |name| {
        lookup(name)
            .map(Some)
            .ok_or_else(|| Unset(name.to_owned()))
    })
    .map(Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })?;

    *value = expanded;
    Ok(())
}
