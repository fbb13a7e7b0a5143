pub mod fetcher;
pub mod image_transform;
pub mod orchestrator;
pub mod publisher;
pub mod staging;

pub use fetcher::BrandingFetcher;
pub use image_transform::ImageTransform;
pub use orchestrator::{BrandingScope, TransferOrchestrator};
pub use publisher::BrandingPublisher;
pub use staging::StagingStore;
