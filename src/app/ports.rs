use async_trait::async_trait;

use crate::common::error::{BrandingError, Result};
use crate::domain::{BrandingDescriptor, ImageKind, UpdateBrandingPayload};

/// Raw image bytes plus the content type the server declared for them.
#[derive(Clone, Debug)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Read side of an instance: everything the fetch stage needs.
#[async_trait]
pub trait BrandingSourcePort: Send + Sync {
    /// REST API version string, e.g. `4.19.0`.
    async fn software_version(&self) -> Result<String>;

    async fn public_branding(&self) -> Result<BrandingDescriptor>;

    async fn download_image(&self, url: &str) -> Result<ImagePayload>;
}

/// Write side of an instance. Requires an authenticated session with the config manager role.
#[async_trait]
pub trait BrandingTargetPort: Send + Sync {
    /// Multipart upload into the slot `kind`; returns the new image id.
    async fn upload_image(&self, kind: ImageKind, file_name: &str, bytes: Vec<u8>) -> Result<u64>;

    async fn update_branding(&self, payload: &UpdateBrandingPayload) -> Result<()>;

    /// Branding currently active on the target, used for style-only transfers.
    async fn current_branding(&self) -> Result<BrandingDescriptor>;
}

/// Pipeline stages reported to a [`ProgressReporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Download,
    Resize,
    Pack,
    Unpack,
    Upload,
    Publish,
    Cleanup,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Download => "download",
            Stage::Resize => "resize",
            Stage::Pack => "pack",
            Stage::Unpack => "unpack",
            Stage::Upload => "upload",
            Stage::Publish => "publish",
            Stage::Cleanup => "cleanup",
        }
    }
}

/// Observer for pipeline progress; replaces printing from inside the pipeline.
pub trait ProgressReporter: Send + Sync {
    fn stage_started(&self, stage: Stage);

    fn item_progress(&self, stage: Stage, done: usize, total: usize, item: &str);

    fn stage_error(&self, stage: Stage, error: &BrandingError);

    fn finished(&self, summary: &str);
}

/// Reporter that drops every event.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn stage_started(&self, _stage: Stage) {}

    fn item_progress(&self, _stage: Stage, _done: usize, _total: usize, _item: &str) {}

    fn stage_error(&self, _stage: Stage, _error: &BrandingError) {}

    fn finished(&self, _summary: &str) {}
}
