//! Custom validation functions for configuration.

use validator::ValidationError;

/// Validate that an interface name follows Linux naming conventions.
pub fn validate_interface(name: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new(r"^[a-zA-Z0-9_.\-]{1,15}$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;

    if re.is_match(name) && name != "." && name != ".." {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_interface"))
    }
}

/// Validate a tracing level name.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new("^(?i)(trace|debug|info|warn|error)$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;
    if re.is_match(level) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}
