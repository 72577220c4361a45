use std::path::PathBuf;

use thiserror::Error;
use validator::ValidationErrors;

/// Why a configuration could not be produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `load_from_path` was pointed at a file that does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The document parsed but a value is out of range.
    #[error("Invalid configuration:\n{}", format_validation_errors(.0))]
    Validation(#[source] ValidationErrors),

    /// Malformed YAML, a wrong type, or an unparsable `LOCKBETE_*` value.
    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),
}

/// One `Field 'name':` block per failing field, with each section's
/// failures listed under `[section]`.
fn format_validation_errors(errors: &ValidationErrors) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    for (field, failures) in errors.field_errors() {
        let _ = writeln!(output, "Field '{field}':");
        for failure in failures {
            match &failure.message {
                Some(message) => {
                    let _ = writeln!(output, "  - {message}");
                }
                None => {
                    let _ = writeln!(output, "  - {}", failure.code);
                }
            }
        }
    }
    for (section, kind) in errors.errors() {
        if let validator::ValidationErrorsKind::Struct(inner) = kind {
            let _ = write!(output, "[{section}]\n{}", format_validation_errors(inner));
        }
    }
    output
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn nested_failures_name_their_section() {
        let mut telemetry = ValidationErrors::new();
        telemetry.add("log_level", ValidationError::new("invalid_log_level"));
        let mut top = ValidationErrors::new();
        top.errors_mut().insert(
            "telemetry".into(),
            validator::ValidationErrorsKind::Struct(Box::new(telemetry)),
        );

        let message = ConfigError::from(top).to_string();
        assert!(message.contains("[telemetry]"), "{message}");
        assert!(message.contains("Field 'log_level':\n  - invalid_log_level"), "{message}");
    }
}
