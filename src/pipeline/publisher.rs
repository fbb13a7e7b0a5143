use tracing::{info, instrument};

use crate::app::ports::{BrandingTargetPort, ProgressReporter, Stage};
use crate::common::error::{io_at, Result};
use crate::domain::{StagedImage, UpdateBrandingPayload, UploadedImage};
use crate::metrics::ImageMetrics;

/// Writes staged images and the branding update to a target instance.
pub struct BrandingPublisher<'a> {
    target: &'a dyn BrandingTargetPort,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> BrandingPublisher<'a> {
    pub fn new(target: &'a dyn BrandingTargetPort, reporter: &'a dyn ProgressReporter) -> Self {
        Self { target, reporter }
    }

    /// Uploads every image in order and collects the ids the target assigned.
    /// The first failed upload aborts the stage.
    pub async fn upload_images(&self, images: &[StagedImage]) -> Result<Vec<UploadedImage>> {
        let total = images.len();
        let mut uploaded = Vec::with_capacity(total);

        for (index, image) in images.iter().enumerate() {
            let bytes = tokio::fs::read(&image.file_path)
                .await
                .map_err(io_at(&image.file_path))?;
            let file_name = image.file_name();
            let id = self.target.upload_image(image.image_kind, &file_name, bytes).await?;

            ImageMetrics::record_upload(image.image_kind);
            self.reporter.item_progress(Stage::Upload, index + 1, total, image.image_kind.as_str());
            uploaded.push(UploadedImage { id, kind: image.image_kind });
        }

        Ok(uploaded)
    }

    #[instrument(skip_all, fields(product = %payload.product_name, images = payload.images.len()))]
    pub async fn publish_update(&self, payload: &UpdateBrandingPayload) -> Result<()> {
        self.target.update_branding(payload).await?;
        info!("Branding '{}' published", payload.product_name);
        Ok(())
    }
}
