use tracing::warn;

use crate::shared::AppError;

/// Checks a path-supplied secret against the configured admin secret.
///
/// Failures answer 404 rather than 403 so the admin routes stay hidden,
/// and an unset secret disables them entirely.
pub fn validate_admin_secret(configured: Option<&str>, supplied: &str) -> Result<(), AppError> {
    match configured {
        Some(secret) if !secret.is_empty() && secret == supplied => Ok(()),
        Some(_) => {
            warn!("Admin route hit with wrong secret");
            Err(AppError::NotFound("Not found".to_string()))
        }
        None => {
            warn!("Admin route hit but ADMIN_SECRET is not set");
            Err(AppError::NotFound("Not found".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_secret_passes() {
        assert!(validate_admin_secret(Some("hunter2"), "hunter2").is_ok());
    }

    #[test]
    fn test_wrong_or_missing_secret_is_not_found() {
        for (configured, supplied) in [
            (Some("hunter2"), "hunter3"),
            (None, "hunter2"),
            (Some(""), ""),
        ] {
            let result = validate_admin_secret(configured, supplied);
            assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "Not found"));
        }
    }
}
