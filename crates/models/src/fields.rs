//! Field rules shared by shops and products.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ModelError;

pub const MAX_NAME_LEN: usize = 255;
/// One DNS label.
pub const MAX_SUBDOMAIN_LEN: usize = 63;
pub const MAX_EMAIL_LEN: usize = 254;

static SUBDOMAIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("static regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

/// Trimmed, non-empty display name.
pub fn validate_name(field: &str, value: &str) -> Result<String, ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::required(field));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ModelError::Validation(format!("{field} must be at most {MAX_NAME_LEN} characters")));
    }
    Ok(trimmed.to_string())
}

pub fn validate_subdomain(value: &str) -> Result<(), ModelError> {
    if value.is_empty() {
        return Err(ModelError::required("subdomain"));
    }
    if value.len() > MAX_SUBDOMAIN_LEN {
        return Err(ModelError::Validation(format!(
            "subdomain must be at most {MAX_SUBDOMAIN_LEN} characters"
        )));
    }
    if !SUBDOMAIN_RE.is_match(value) {
        return Err(ModelError::Validation(
            "subdomain may only contain lowercase letters, numbers, and hyphens".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), ModelError> {
    if value.is_empty() {
        return Err(ModelError::required("owner_email"));
    }
    if value.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(value) {
        return Err(ModelError::Validation("owner_email must be a valid email address".into()));
    }
    Ok(())
}

pub fn validate_price(value: f64) -> Result<f64, ModelError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::Validation("price must be a non-negative number".into()));
    }
    // -0.0 passes the bound but must be stored as 0.0
    Ok(if value == 0.0 { 0.0 } else { value })
}

pub fn validate_stock(value: i64) -> Result<i32, ModelError> {
    if value < 0 {
        return Err(ModelError::Validation("stock must be a non-negative integer".into()));
    }
    i32::try_from(value).map_err(|_| ModelError::Validation("stock is too large".into()))
}
