//! Validation helpers for DTOs.

use validator::ValidationError;

const MAX_DISPLAY_NAME_LEN: usize = 80;

/// Validates that a player display name is non-blank, reasonably short, and
/// free of control characters.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("display_name_blank");
        err.message = Some("Display name must not be blank".into());
        return Err(err);
    }

    if trimmed.chars().count() > MAX_DISPLAY_NAME_LEN {
        let mut err = ValidationError::new("display_name_length");
        err.message = Some(
            format!("Display name must be at most {MAX_DISPLAY_NAME_LEN} characters").into(),
        );
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("display_name_control_chars");
        err.message = Some("Display name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
