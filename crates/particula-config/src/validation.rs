//! Range and format validation for configuration values.
//!
//! Parameter ranges come from the engine's parameter table, so a config
//! file, a score and a command-line override are all checked against the
//! same limits the engine clamps to.
//!
//! # Example
//!
//! ```rust
//! use particula_config::{parse_param_value, validate_param};
//!
//! assert_eq!(parse_param_value("spawn_origin", "top-band").unwrap(), 3.0);
//! assert_eq!(parse_param_value("size_by_note", "off").unwrap(), 0.0);
//! assert!(validate_param("gravity", 25.0).is_err());
//! ```

use particula_core::SpawnOrigin;
use particula_engine::ParamId;
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Unknown parameter name.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Value out of range.
    #[error("'{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Parameter or setting name.
        param: String,
        /// The rejected value.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Value could not be interpreted.
    #[error("invalid format for '{param}': {reason}")]
    InvalidFormat {
        /// Parameter or setting name.
        param: String,
        /// Description of the format error.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check a numeric setting against an inclusive range.
pub fn validate_range(param: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min,
            max,
        })
    }
}

/// Check a parameter value against its descriptor's range.
pub fn validate_param(name: &str, value: f32) -> ValidationResult<()> {
    let id = ParamId::from_name(name).ok_or_else(|| ValidationError::UnknownParameter(name.to_string()))?;
    let d = id.descriptor();
    validate_range(name, f64::from(value), f64::from(d.min), f64::from(d.max))
}

/// Parse a textual parameter value.
///
/// Numbers are accepted for every parameter. `spawn_origin` also accepts
/// the origin names and `size_by_note` accepts `true`/`false`/`on`/`off`.
/// The result is range-checked.
pub fn parse_param_value(name: &str, value: &str) -> ValidationResult<f32> {
    let id = ParamId::from_name(name).ok_or_else(|| ValidationError::UnknownParameter(name.to_string()))?;
    let trimmed = value.trim();
    let parsed = match id {
        ParamId::SpawnOrigin => trimmed
            .parse::<SpawnOrigin>()
            .map(|o| o.index() as f32)
            .ok(),
        ParamId::SizeByNote => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" => Some(1.0),
            "false" | "off" | "no" => Some(0.0),
            _ => None,
        },
        _ => None,
    };
    let number = match parsed {
        Some(v) => v,
        None => trimmed
            .parse::<f32>()
            .map_err(|e| ValidationError::InvalidFormat {
                param: name.to_string(),
                reason: format!("'{trimmed}': {e}"),
            })?,
    };
    validate_param(name, number)?;
    Ok(number)
}

/// Fold a list of errors into one result.
pub(crate) fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_checks_are_inclusive() {
        assert!(validate_range("x", 1.0, 1.0, 2.0).is_ok());
        assert!(validate_range("x", 2.0, 1.0, 2.0).is_ok());
        assert!(validate_range("x", f64::NAN, 1.0, 2.0).is_err());
    }

    #[test]
    fn parses_origin_names_and_numbers() {
        assert_eq!(parse_param_value("spawn_origin", "corner-cluster"), Ok(0.0));
        assert_eq!(parse_param_value("spawn_origin", "2"), Ok(2.0));
        assert!(parse_param_value("spawn_origin", "7").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_param_value("gravity", "heavy"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert_eq!(
            parse_param_value("volume", "1"),
            Err(ValidationError::UnknownParameter("volume".into()))
        );
    }

    #[test]
    fn collect_folds() {
        assert!(collect(vec![]).is_ok());
        let one = ValidationError::UnknownParameter("a".into());
        assert_eq!(collect(vec![one.clone()]), Err(one.clone()));
        assert!(matches!(
            collect(vec![one.clone(), one]),
            Err(ValidationError::Multiple(v)) if v.len() == 2
        ));
    }
}
