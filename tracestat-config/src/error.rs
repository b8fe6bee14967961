//! Error types for configuration loading and validation.

use std::path::PathBuf;
use thiserror::Error;
use validator::ValidationErrors;

/// Unified configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Configuration validation error.
    #[error("Invalid configuration:\n{}", format_validation_errors(.0))]
    Validation(#[source] ValidationErrors),

    /// Figment parsing error.
    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    for (field, errors) in collect_field_errors(errors, "") {
        let _ = writeln!(output, "Field '{}':", field);
        for error in errors {
            let message = match &error.message {
                Some(msg) => msg.to_string(),
                None => error.code.to_string(),
            };
            let _ = writeln!(output, "  - {}", message);
        }
    }
    output
}

// Nested sections report their errors one level down; flatten them into
// dotted paths such as `flow_table.capacity`.
fn collect_field_errors(
    errors: &ValidationErrors,
    prefix: &str,
) -> Vec<(String, Vec<validator::ValidationError>)> {
    use validator::ValidationErrorsKind;

    let mut fields = Vec::new();
    for (name, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => fields.push((path, list.clone())),
            ValidationErrorsKind::Struct(inner) => {
                fields.extend(collect_field_errors(inner, &path))
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    fields.extend(collect_field_errors(inner, &format!("{path}[{index}]")));
                }
            }
        }
    }
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}
