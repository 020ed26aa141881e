// src/models/mod.rs

use url::Url;

pub mod course;
pub mod learning_path;
pub mod progress;
pub mod user;

/// Validates that a string is a correctly formatted URL.
pub(crate) fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if url.len() > 500 {
        return Err(validator::ValidationError::new("url_too_long"));
    }
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
