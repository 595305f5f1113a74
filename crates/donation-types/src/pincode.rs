//! Pincode format rules used before any delivery-area lookup.

pub const DEFAULT_PINCODE_LENGTH: usize = 6;

/// Returns every format problem with `pincode` (already trimmed). Empty means valid.
pub fn check_pincode_format(pincode: &str, required_length: usize, strict: bool) -> Vec<String> {
    let mut errors = Vec::new();

    if pincode.chars().count() != required_length {
        errors.push(format!("Pincode must be exactly {required_length} digits"));
    }

    let all_digits = !pincode.is_empty() && pincode.chars().all(|c| c.is_ascii_digit());
    if !all_digits {
        errors.push("Pincode must contain only numbers".to_string());
    }

    if strict && !(all_digits && pincode.len() == DEFAULT_PINCODE_LENGTH) {
        errors.push("Invalid pincode format. Must be exactly 6 digits (000000-999999)".to_string());
    }

    errors
}
