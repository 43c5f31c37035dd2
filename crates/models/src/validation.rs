//! Declarative field checks shared by the entity schemas.

use crate::errors::ModelError;

/// Field-level constraints for an entity, checked before it is persisted.
pub trait Validate {
    fn validate(&self) -> Result<(), ModelError>;
}

pub fn require(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::invalid(format!("{field} is required")));
    }
    Ok(())
}

pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), ModelError> {
    if value.chars().count() > max {
        return Err(ModelError::invalid(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}

/// Slugs are lowercase ASCII alphanumerics separated by single dashes.
pub fn slug(field: &str, value: &str) -> Result<(), ModelError> {
    let ok = !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !ok {
        return Err(ModelError::invalid(format!("{field} must be a lowercase slug (a-z, 0-9, '-')")));
    }
    Ok(())
}

pub fn email(field: &str, value: &str) -> Result<(), ModelError> {
    let mut parts = value.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ModelError::invalid(format!("{field} must be a valid email"))),
    }
}

/// Absolute http(s) URLs or site-relative paths.
pub fn link(field: &str, value: &str) -> Result<(), ModelError> {
    if value.starts_with("http://") || value.starts_with("https://") || value.starts_with('/') {
        return Ok(());
    }
    Err(ModelError::invalid(format!("{field} must start with http(s):// or '/'")))
}

pub fn optional<F>(value: &Option<String>, check: F) -> Result<(), ModelError>
where
    F: FnOnce(&str) -> Result<(), ModelError>,
{
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => check(v),
        _ => Ok(()),
    }
}

/// Derive a slug from free text: "Umrah Plus Turki 2025!" -> "umrah-plus-turki-2025".
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Umrah Plus Turki 2025!"), "umrah-plus-turki-2025");
        assert_eq!(slugify("  --Hajj  Furoda-- "), "hajj-furoda");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slug_rules() {
        assert!(slug("slug", "umrah-ramadhan").is_ok());
        assert!(slug("slug", "Umrah").is_err());
        assert!(slug("slug", "umrah--x").is_err());
        assert!(slug("slug", "-umrah").is_err());
        assert!(slug("slug", "").is_err());
    }

    #[test]
    fn email_and_link_rules() {
        assert!(email("email", "cs@travel.co.id").is_ok());
        assert!(email("email", "travel.co.id").is_err());
        assert!(email("email", "@x.id").is_err());
        assert!(link("link", "/paket/umrah").is_ok());
        assert!(link("link", "https://tripbaitullah.com").is_ok());
        assert!(link("link", "ftp://x").is_err());
    }

    #[test]
    fn optional_skips_blank() {
        assert!(optional(&None, |v| email("email", v)).is_ok());
        assert!(optional(&Some("  ".into()), |v| email("email", v)).is_ok());
        assert!(optional(&Some("nope".into()), |v| email("email", v)).is_err());
    }
}
