//! Client-side checks run before anything is dispatched.

use levdash_core::{ClientError, ClientResult};

/// Longest accepted bug description, in characters.
pub const MAX_BUG_DESCRIPTION_CHARS: usize = 1000;

/// Trimmed bug description, non-blank and within the length limit.
pub fn bug_description(raw: &str) -> ClientResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(
            "Describe the problem before sending".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_BUG_DESCRIPTION_CHARS {
        return Err(ClientError::Validation(format!(
            "Description must be at most {MAX_BUG_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Telegram user id: one or more ASCII digits.
pub fn telegram_id(raw: &str) -> ClientResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::Validation(
            "Telegram id must contain digits only".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
