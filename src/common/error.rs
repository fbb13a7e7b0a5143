use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::ImageKind;

#[derive(Error, Debug)]
pub enum BrandingError {
    #[error("no connection possible: {0}")]
    Connectivity(#[from] reqwest::Error),

    #[error("incompatible DRACOON version: {0}")]
    IncompatibleVersion(String),

    #[error("config manager role required ({status})")]
    PermissionDenied { status: u16 },

    #[error("request failed with status {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("invalid branding zip file: {0}")]
    InvalidArchive(String),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("staged file missing during cleanup: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("image kind {0} cannot be resized")]
    InvalidKind(ImageKind),

    #[error("invalid branding descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
}

impl BrandingError {
    /// Short label shown in front of the message when a run fails.
    pub fn label(&self) -> &'static str {
        match self {
            BrandingError::Connectivity(_) => "Connection error",
            BrandingError::IncompatibleVersion(_) => "Version error",
            BrandingError::PermissionDenied { .. } => "Permission error",
            BrandingError::Remote { .. } => "Remote error",
            BrandingError::InvalidArchive(_) => "Format error",
            BrandingError::NotFound(_) | BrandingError::MissingFile(_) => "File error",
            BrandingError::InvalidKind(_) | BrandingError::Image(_) => "Image error",
            BrandingError::InvalidDescriptor(_) => "Branding error",
            BrandingError::Authentication(_) => "Authentication error",
            BrandingError::Config(_) | BrandingError::Toml(_) => "Configuration error",
            BrandingError::Io(_) | BrandingError::Json(_) | BrandingError::Zip(_) => "Error",
        }
    }

    /// Maps a non-2xx status from the branding API to the matching error.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 403 {
            BrandingError::PermissionDenied { status }
        } else {
            BrandingError::Remote { status, body }
        }
    }
}

pub type Result<T> = std::result::Result<T, BrandingError>;

/// Maps an I/O error on `path` to `NotFound` when the file is absent.
pub fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> BrandingError + '_ {
    move |e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BrandingError::NotFound(path.to_path_buf())
        } else {
            BrandingError::Io(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_maps_to_permission_denied() {
        let err = BrandingError::from_status(403, "Forbidden".to_string());
        assert!(matches!(err, BrandingError::PermissionDenied { status: 403 }));
        assert_eq!(err.label(), "Permission error");
    }

    #[test]
    fn other_statuses_keep_body() {
        let err = BrandingError::from_status(502, "bad gateway".to_string());
        match err {
            BrandingError::Remote { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
