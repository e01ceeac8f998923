use crate::utils::error::{MoittError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> MoittError {
    MoittError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Mirror and quay endpoints must be plain http(s) URLs.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// `oc apply -f` only takes YAML or JSON manifests.
pub fn validate_manifest_extension(field_name: &str, file: &str) -> Result<()> {
    const ALLOWED: [&str; 3] = ["yaml", "yml", "json"];

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if ALLOWED.contains(&extension) => Ok(()),
        Some(extension) => Err(invalid(
            field_name,
            file,
            format!(
                "Unsupported manifest extension: {}. Allowed extensions: {}",
                extension,
                ALLOWED.join(", ")
            ),
        )),
        None => Err(invalid(field_name, file, "Manifest file has no extension")),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Value cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("mirror.base_url", "https://mirror.openshift.com").is_ok());
        assert!(validate_url("mirror.base_url", "http://localhost:8080").is_ok());
        assert!(validate_url("mirror.base_url", "").is_err());
        assert!(validate_url("mirror.base_url", "invalid-url").is_err());
        assert!(validate_url("mirror.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("istio.check_timeout_seconds", 5, 1).is_ok());
        assert!(validate_positive_number("istio.check_timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_manifest_extension() {
        assert!(validate_manifest_extension("CR_FILE", "testdata/smcp.yaml").is_ok());
        assert!(validate_manifest_extension("CR_FILE", "cr.yml").is_ok());
        assert!(validate_manifest_extension("CR_FILE", "cr.txt").is_err());
        assert!(validate_manifest_extension("CR_FILE", "cr").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("version", "4.3.9").is_ok());
        assert!(validate_non_empty_string("version", "   ").is_err());
    }
}
