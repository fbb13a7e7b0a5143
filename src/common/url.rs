use reqwest::Url;

use crate::common::error::{BrandingError, Result};

/// Normalizes user input to an `https://host[/path]` base url without trailing slash.
pub fn normalize_instance_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let with_scheme = if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("https://{rest}")
    } else if trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&with_scheme)
        .map_err(|e| BrandingError::Config(format!("invalid DRACOON url '{}': {}", input, e)))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(BrandingError::Config(format!("invalid DRACOON url '{}': missing host", input)));
    }

    Ok(with_scheme.trim_end_matches('/').to_string())
}

/// Host (with port, if any) of a base url, used for `Host` header routing.
pub fn host_of(base_url: &str) -> Result<String> {
    let parsed = Url::parse(base_url)
        .map_err(|e| BrandingError::Config(format!("invalid DRACOON url '{}': {}", base_url, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| BrandingError::Config(format!("invalid DRACOON url '{}': missing host", base_url)))?;
    Ok(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
