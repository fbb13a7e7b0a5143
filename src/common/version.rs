use serde::Deserialize;

use crate::common::constants::{MIN_MINOR_VERSION, REQUIRED_MAJOR_VERSION};
use crate::common::error::{BrandingError, Result};

/// Response of `GET /api/v4/public/software/version`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareVersion {
    pub rest_api_version: String,
}

/// Accepts `4.19.x` and newer 4.x versions, rejects everything else.
pub fn check_version(version: &str) -> Result<()> {
    let mut parts = version.trim().split('.');
    let major = parts.next().and_then(|p| p.trim().parse::<u32>().ok());
    let minor = parts.next().and_then(|p| p.trim().parse::<u32>().ok());

    match (major, minor) {
        (Some(major), Some(minor)) if major == REQUIRED_MAJOR_VERSION && minor >= MIN_MINOR_VERSION => Ok(()),
        _ => Err(BrandingError::IncompatibleVersion(format!(
            "{} (requires {}.{} or newer)",
            version, REQUIRED_MAJOR_VERSION, MIN_MINOR_VERSION
        ))),
    }
}
