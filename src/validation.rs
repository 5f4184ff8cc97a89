//! Request validation utilities.
//!
//! Shared by every trigger adapter so that all three event shapes reject the
//! same inputs with the same message.

use crate::types::{Error, Result};

/// Maximum length accepted for a language code (e.g. `zh-TW`, `fa-AF`).
pub const MAX_LANGUAGE_CODE_LEN: usize = 10;

/// Validate that a string is not empty (whitespace counts as empty).
pub fn validate_non_empty(s: &str, field: &str) -> Result<()> {
    if s.trim().is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

/// Validate a language code shape. The provider decides whether it is supported.
pub fn validate_language_code(code: &str, field: &str) -> Result<()> {
    validate_non_empty(code, field)?;
    if code.len() > MAX_LANGUAGE_CODE_LEN
        || !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(Error::validation(format!(
            "{field} is not a valid language code: {code:?}"
        )));
    }
    Ok(())
}

/// The three fields every canonical request needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredParameters {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

/// Require `text`, `source_language` and `target_language` together.
///
/// Every absent or blank field is reported in one error so the caller can
/// fix the request in a single round trip.
pub fn require_parameters(
    text: Option<&str>,
    source_language: Option<&str>,
    target_language: Option<&str>,
) -> Result<RequiredParameters> {
    fn present(v: Option<&str>) -> Option<&str> {
        v.filter(|s| !s.trim().is_empty())
    }

    let missing: Vec<&str> = [
        ("text", present(text)),
        ("source_language", present(source_language)),
        ("target_language", present(target_language)),
    ]
    .iter()
    .filter(|(_, v)| v.is_none())
    .map(|(name, _)| *name)
    .collect();

    match (present(text), present(source_language), present(target_language)) {
        (Some(text), Some(source), Some(target)) => {
            let source = source.trim();
            let target = target.trim();
            validate_language_code(source, "source_language")?;
            validate_language_code(target, "target_language")?;
            Ok(RequiredParameters {
                text: text.to_string(),
                source_language: source.to_string(),
                target_language: target.to_string(),
            })
        }
        _ => Err(Error::validation(format!(
            "missing required parameters: {}",
            missing.join(", ")
        ))),
    }
}
