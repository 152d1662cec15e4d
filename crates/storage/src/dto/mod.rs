pub mod admin;
pub mod auth;
pub mod challenge;
pub mod common;
pub mod leaderboard;
pub mod question;

/// Challenge and question codes such as `CH-256` or `01`.
fn validate_code(code: &str) -> Result<(), validator::ValidationError> {
    let trimmed = code.trim();
    if trimmed.is_empty() || trimmed.len() > 50 {
        let mut error = validator::ValidationError::new("invalid_code");
        error.message = Some("code must be between 1 and 50 characters".into());
        return Err(error);
    }
    Ok(())
}
