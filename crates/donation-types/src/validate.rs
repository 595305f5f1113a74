//! Write-time checks for fee configuration.

use crate::error::ValidationError;
use crate::fee::SPLIT_TOLERANCE;

pub fn validate_percent(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::PercentOutOfRange { field, value });
    }
    Ok(())
}

/// Foundation and company shares must each be a valid percentage and sum to 100.
pub fn validate_share_split(foundation: f64, company: f64) -> Result<(), ValidationError> {
    validate_percent("Foundation share", foundation)?;
    validate_percent("Company share", company)?;

    if (foundation + company - 100.0).abs() > SPLIT_TOLERANCE {
        return Err(ValidationError::ShareSplit {
            foundation,
            company,
        });
    }
    Ok(())
}
