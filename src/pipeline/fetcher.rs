use image::ImageFormat;
use tracing::{info, instrument};

use crate::app::ports::{BrandingSourcePort, ProgressReporter, Stage};
use crate::common::error::Result;
use crate::common::version::check_version;
use crate::domain::{BrandingDescriptor, StagedImage, BRANDING_IMAGES};
use crate::metrics::ImageMetrics;
use crate::pipeline::staging::StagingStore;

/// Reads branding and its images from a source instance.
pub struct BrandingFetcher<'a> {
    source: &'a dyn BrandingSourcePort,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> BrandingFetcher<'a> {
    pub fn new(source: &'a dyn BrandingSourcePort, reporter: &'a dyn ProgressReporter) -> Self {
        Self { source, reporter }
    }

    /// Checks the source version, then fetches and validates its public branding.
    #[instrument(skip(self))]
    pub async fn fetch_descriptor(&self) -> Result<BrandingDescriptor> {
        let version = self.source.software_version().await?;
        check_version(&version)?;

        let descriptor = self.source.public_branding().await?;
        descriptor.validate()?;
        info!("Fetched branding '{}' (API {})", descriptor.product_name, version);
        Ok(descriptor)
    }

    /// Downloads the large variant of every transferred image into the staging store.
    /// Stops at the first failure; files staged so far stay tracked by the store.
    pub async fn download_images(&self, descriptor: &BrandingDescriptor, store: &StagingStore) -> Result<Vec<StagedImage>> {
        let total = BRANDING_IMAGES.len();
        let mut staged = Vec::with_capacity(total);

        for (index, kind) in BRANDING_IMAGES.into_iter().enumerate() {
            let url = descriptor.large_image_url(kind)?;
            let payload = self.source.download_image(url).await?;
            let extension = infer_extension(payload.content_type.as_deref(), &payload.bytes);
            let image = store.stage_image(kind, extension, &payload.bytes)?;

            ImageMetrics::record_download(kind, payload.bytes.len());
            self.reporter.item_progress(Stage::Download, index + 1, total, kind.as_str());
            staged.push(image);
        }

        Ok(staged)
    }
}

/// File extension for a downloaded image: declared content type first, then sniffed
/// from the bytes, `png` as the last resort.
pub fn infer_extension(content_type: Option<&str>, bytes: &[u8]) -> &'static str {
    let declared = content_type
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase());

    if let Some(mime) = declared {
        match mime.as_str() {
            "image/png" => return "png",
            "image/jpeg" | "image/jpg" | "image/pjpeg" => return "jpg",
            "image/gif" => return "gif",
            "image/webp" => return "webp",
            "image/svg+xml" => return "svg",
            "image/x-icon" | "image/vnd.microsoft.icon" => return "ico",
            _ => {}
        }
    }

    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => "jpg",
        Ok(ImageFormat::Gif) => "gif",
        Ok(ImageFormat::WebP) => "webp",
        Ok(ImageFormat::Ico) => "ico",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{jpeg_bytes, png_bytes};

    #[test]
    fn extension_from_content_type() {
        assert_eq!(infer_extension(Some("image/jpeg"), &[]), "jpg");
        assert_eq!(infer_extension(Some("image/PNG; charset=binary"), &[]), "png");
        assert_eq!(infer_extension(Some("image/svg+xml"), &[]), "svg");
        assert_eq!(infer_extension(Some("image/vnd.microsoft.icon"), &[]), "ico");
    }

    #[test]
    fn extension_sniffed_when_content_type_is_generic() {
        assert_eq!(infer_extension(Some("application/octet-stream"), &jpeg_bytes(2, 2)), "jpg");
        assert_eq!(infer_extension(None, &png_bytes(2, 2)), "png");
        assert_eq!(infer_extension(None, b"not an image"), "png");
    }
}
