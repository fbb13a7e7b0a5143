use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument, warn};

use crate::app::ports::{BrandingSourcePort, BrandingTargetPort, ProgressReporter, Stage};
use crate::common::error::{BrandingError, Result};
use crate::domain::{StagedImage, UpdateBrandingPayload};
use crate::metrics::{ImageMetrics, TransferMetrics};
use crate::pipeline::fetcher::BrandingFetcher;
use crate::pipeline::image_transform::ImageTransform;
use crate::pipeline::publisher::BrandingPublisher;
use crate::pipeline::staging::StagingStore;

/// What a spray copies to the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrandingScope {
    /// Everything, including product name, texts, legal urls and emails.
    #[default]
    Full,
    /// Colors, images and login box layout; the target keeps its own content fields.
    StylesOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Workflow {
    Spray,
    Save,
    Load,
}

impl Workflow {
    fn as_str(&self) -> &'static str {
        match self {
            Workflow::Spray => "spray",
            Workflow::Save => "save",
            Workflow::Load => "load",
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the spray, save and load workflows.
///
/// Every workflow ends in `finalize`, which removes whatever the run staged regardless of
/// the outcome. A failed stage wins over a failed cleanup when both happen.
pub struct TransferOrchestrator {
    store: StagingStore,
    reporter: Arc<dyn ProgressReporter>,
}

impl TransferOrchestrator {
    pub fn new(store: StagingStore, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self { store, reporter }
    }

    pub fn store(&self) -> &StagingStore {
        &self.store
    }

    /// Source to target, directly.
    #[instrument(skip_all, fields(scope = ?scope))]
    pub async fn spray(
        &self,
        source: &dyn BrandingSourcePort,
        target: &dyn BrandingTargetPort,
        scope: BrandingScope,
    ) -> Result<UpdateBrandingPayload> {
        let started = Instant::now();
        let outcome = self.run_spray(source, target, scope).await;
        let payload = self.finalize(Workflow::Spray, outcome, started)?;
        self.reporter.finished(&format!(
            "Branding '{}' sprayed with {} images",
            payload.product_name,
            payload.images.len()
        ));
        Ok(payload)
    }

    /// Source to archive. Returns the path of the written archive.
    #[instrument(skip_all, fields(archive = %archive_path.display()))]
    pub async fn save(&self, source: &dyn BrandingSourcePort, archive_path: &Path) -> Result<PathBuf> {
        let started = Instant::now();
        let outcome = self.run_save(source, archive_path).await;
        let archive = self.finalize(Workflow::Save, outcome, started)?;
        self.reporter.finished(&format!("Branding saved to {}", archive.display()));
        Ok(archive)
    }

    /// Archive to target.
    #[instrument(skip_all, fields(archive = %archive_path.display()))]
    pub async fn load(&self, archive_path: &Path, target: &dyn BrandingTargetPort) -> Result<UpdateBrandingPayload> {
        let started = Instant::now();
        let outcome = self.run_load(archive_path, target).await;
        let payload = self.finalize(Workflow::Load, outcome, started)?;
        self.reporter.finished(&format!(
            "Branding '{}' loaded from {}",
            payload.product_name,
            archive_path.display()
        ));
        Ok(payload)
    }

    async fn run_spray(
        &self,
        source: &dyn BrandingSourcePort,
        target: &dyn BrandingTargetPort,
        scope: BrandingScope,
    ) -> Result<UpdateBrandingPayload> {
        let reporter = self.reporter.as_ref();
        let fetcher = BrandingFetcher::new(source, reporter);

        let descriptor = self.stage(Stage::Fetch, fetcher.fetch_descriptor()).await?;
        let target_branding = match scope {
            BrandingScope::Full => None,
            BrandingScope::StylesOnly => Some(self.stage(Stage::Fetch, target.current_branding()).await?),
        };

        let images = self
            .stage(Stage::Download, fetcher.download_images(&descriptor, &self.store))
            .await?;
        let images = self.stage(Stage::Resize, self.resize_logos(images)).await?;

        let publisher = BrandingPublisher::new(target, reporter);
        let uploaded = self.stage(Stage::Upload, publisher.upload_images(&images)).await?;

        let mut payload = UpdateBrandingPayload::build(&descriptor, uploaded);
        if let Some(current) = &target_branding {
            payload = payload.keep_target_content(current);
        }
        self.stage(Stage::Publish, publisher.publish_update(&payload)).await?;
        Ok(payload)
    }

    async fn run_save(&self, source: &dyn BrandingSourcePort, archive_path: &Path) -> Result<PathBuf> {
        let fetcher = BrandingFetcher::new(source, self.reporter.as_ref());

        let descriptor = self.stage(Stage::Fetch, fetcher.fetch_descriptor()).await?;
        let images = self
            .stage(Stage::Download, fetcher.download_images(&descriptor, &self.store))
            .await?;
        let images = self.stage(Stage::Resize, self.resize_logos(images)).await?;

        self.stage(Stage::Pack, async { self.store.pack(archive_path, &descriptor, &images) })
            .await?;
        Ok(archive_path.to_path_buf())
    }

    async fn run_load(&self, archive_path: &Path, target: &dyn BrandingTargetPort) -> Result<UpdateBrandingPayload> {
        let (descriptor, images) = self
            .stage(Stage::Unpack, async {
                let images = self.store.unpack(archive_path)?;
                let descriptor = self.store.read_descriptor()?;
                Ok::<_, BrandingError>((descriptor, images))
            })
            .await?;

        let publisher = BrandingPublisher::new(target, self.reporter.as_ref());
        let uploaded = self.stage(Stage::Upload, publisher.upload_images(&images)).await?;

        let payload = UpdateBrandingPayload::build(&descriptor, uploaded);
        self.stage(Stage::Publish, publisher.publish_update(&payload)).await?;
        Ok(payload)
    }

    /// Letterboxes the web and app logo off the async runtime; other images pass through.
    async fn resize_logos(&self, images: Vec<StagedImage>) -> Result<Vec<StagedImage>> {
        let total = images.iter().filter(|image| image.image_kind.canvas().is_some()).count();
        let mut done = 0;
        let mut result = Vec::with_capacity(images.len());

        for image in images {
            if image.image_kind.canvas().is_none() {
                result.push(image);
                continue;
            }

            let kind = image.image_kind;
            let resized = tokio::task::spawn_blocking(move || ImageTransform::resize(&image))
                .await
                .map_err(|e| BrandingError::Io(io::Error::new(io::ErrorKind::Other, e)))??;
            self.store.record(resized.clone());

            done += 1;
            ImageMetrics::record_resize(kind);
            self.reporter.item_progress(Stage::Resize, done, total, kind.as_str());
            result.push(resized);
        }

        Ok(result)
    }

    async fn stage<T>(&self, stage: Stage, work: impl Future<Output = Result<T>>) -> Result<T> {
        self.reporter.stage_started(stage);
        let started = Instant::now();
        let result = work.await;
        TransferMetrics::record_stage(stage, started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            warn!(stage = stage.as_str(), "Stage failed: {}", e);
            TransferMetrics::record_stage_error(stage, e.label());
            self.reporter.stage_error(stage, e);
        }
        result
    }

    /// Cleans up unconditionally and merges the cleanup result into the run outcome.
    fn finalize<T>(&self, workflow: Workflow, outcome: Result<T>, started: Instant) -> Result<T> {
        self.reporter.stage_started(Stage::Cleanup);
        let cleanup = self.store.cleanup_all();
        if let Err(e) = &cleanup {
            TransferMetrics::record_stage_error(Stage::Cleanup, e.label());
            self.reporter.stage_error(Stage::Cleanup, e);
        }

        let result = match (outcome, cleanup) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), _) => Err(e),
        };

        let elapsed = started.elapsed().as_secs_f64();
        TransferMetrics::record_run(workflow.as_str(), result.is_ok(), elapsed);
        match &result {
            Ok(_) => info!("{} finished in {:.2}s", workflow, elapsed),
            Err(e) => error!("{} failed after {:.2}s: {}", workflow, elapsed, e),
        }
        result
    }
}
