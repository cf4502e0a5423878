use crate::utils::error::{RegistryError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Rejects empty and whitespace-only values.
pub fn validate_non_blank(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::invalid_argument(
            field_name,
            "value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// Rejects only the empty string; whitespace is a legal name.
pub fn validate_non_empty(field_name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(RegistryError::invalid_argument(
            field_name,
            "value cannot be empty",
        ));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(RegistryError::invalid_argument(
            field_name,
            format!("value must be positive, got {}", value),
        ));
    }
    Ok(())
}
