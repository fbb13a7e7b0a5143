#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::json;

use dcspray::app::ports::{BrandingSourcePort, BrandingTargetPort, ImagePayload, ProgressReporter, Stage};
use dcspray::domain::{BrandingDescriptor, ImageKind, UpdateBrandingPayload, BRANDING_IMAGES};
use dcspray::pipeline::StagingStore;
use dcspray::{BrandingError, Result, TransferOrchestrator};

pub fn image_url(kind: ImageKind) -> String {
    format!("https://cdn.test/{}/large", kind)
}

pub fn descriptor() -> BrandingDescriptor {
    serde_json::from_value(json!({
        "createdAt": "2023-01-15T09:00:00Z",
        "changedAt": "2023-02-01T17:45:00Z",
        "productName": "Source Cloud",
        "colorizeHeader": true,
        "appearanceLoginBox": "dark",
        "positionLoginBox": 2,
        "colors": [
            {"type": "loginArea", "colorDetails": [
                {"type": "normal", "rgba": "#FFFFFF"},
                {"type": "hover", "rgba": "#EEEEEE"}
            ]},
            {"type": "primary", "colorDetails": [
                {"type": "normal", "rgba": "#003366"},
                {"type": "active", "rgba": "#002244"}
            ]}
        ],
        "images": ImageKind::ALL.iter().map(|kind| json!({
            "type": kind.as_str(),
            "files": [
                {"size": "small", "url": format!("https://cdn.test/{}/small", kind)},
                {"size": "large", "url": image_url(*kind)}
            ]
        })).collect::<Vec<_>>(),
        "texts": [
            {"type": "imprint", "languages": [
                {"languageTag": "de-DE", "content": "Impressum"},
                {"languageTag": "en-US", "content": "Imprint"}
            ]}
        ],
        "imprintUrl": "https://source.test/imprint",
        "privacyUrl": "https://source.test/privacy",
        "supportUrl": "https://source.test/support",
        "emailContact": "support@source.test",
        "emailSender": "Source Cloud"
    }))
    .unwrap()
}

pub fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let rgba = RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]));
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
        _ => DynamicImage::ImageRgba8(rgba),
    };
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Where the mock source should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFault {
    None,
    Descriptor,
    Download(ImageKind),
}

pub struct MockSource {
    pub version: String,
    pub descriptor: BrandingDescriptor,
    pub images: HashMap<String, ImagePayload>,
    pub fault: SourceFault,
    pub downloads: Mutex<Vec<String>>,
}

impl MockSource {
    /// A 4.19 instance serving small valid images; the app splash image comes as JPEG.
    pub fn new() -> Self {
        let images = BRANDING_IMAGES
            .iter()
            .map(|kind| {
                let payload = match kind {
                    ImageKind::AppSplashImage => ImagePayload {
                        bytes: encode(30, 60, ImageFormat::Jpeg),
                        content_type: Some("image/jpeg".to_string()),
                    },
                    ImageKind::WebLogo => ImagePayload {
                        bytes: encode(400, 100, ImageFormat::Png),
                        content_type: Some("image/png".to_string()),
                    },
                    _ => ImagePayload {
                        bytes: encode(40, 40, ImageFormat::Png),
                        content_type: Some("image/png".to_string()),
                    },
                };
                (image_url(*kind), payload)
            })
            .collect();

        Self {
            version: "4.19.0".to_string(),
            descriptor: descriptor(),
            images,
            fault: SourceFault::None,
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_fault(mut self, fault: SourceFault) -> Self {
        self.fault = fault;
        self
    }

    pub fn with_image_bytes(mut self, kind: ImageKind, bytes: Vec<u8>) -> Self {
        self.images.insert(
            image_url(kind),
            ImagePayload {
                bytes,
                content_type: Some("image/png".to_string()),
            },
        );
        self
    }
}

#[async_trait]
impl BrandingSourcePort for MockSource {
    async fn software_version(&self) -> Result<String> {
        Ok(self.version.clone())
    }

    async fn public_branding(&self) -> Result<BrandingDescriptor> {
        if self.fault == SourceFault::Descriptor {
            return Err(BrandingError::Remote {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(self.descriptor.clone())
    }

    async fn download_image(&self, url: &str) -> Result<ImagePayload> {
        if let SourceFault::Download(kind) = self.fault {
            if url == image_url(kind) {
                return Err(BrandingError::Remote {
                    status: 404,
                    body: "no such image".to_string(),
                });
            }
        }
        self.downloads.lock().unwrap().push(url.to_string());
        self.images.get(url).cloned().ok_or_else(|| BrandingError::Remote {
            status: 404,
            body: url.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub kind: ImageKind,
    pub file_name: String,
    pub size: usize,
}

/// Where the mock target should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFault {
    None,
    /// The n-th upload (0 based) is answered with this status.
    Upload { index: usize, status: u16 },
    Publish { status: u16 },
    CurrentBranding,
}

pub struct MockTarget {
    pub uploads: Arc<Mutex<Vec<Upload>>>,
    pub published: Arc<Mutex<Vec<UpdateBrandingPayload>>>,
    pub current: BrandingDescriptor,
    pub fault: TargetFault,
    next_id: AtomicU64,
}

impl MockTarget {
    pub fn new() -> Self {
        let mut current = descriptor();
        current.product_name = "Target Cloud".to_string();
        current.imprint_url = "https://target.test/imprint".to_string();
        current.privacy_url = "https://target.test/privacy".to_string();
        current.support_url = "https://target.test/support".to_string();
        current.email_contact = "help@target.test".to_string();
        current.email_sender = "Target Cloud".to_string();
        current.texts.clear();

        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            published: Arc::new(Mutex::new(Vec::new())),
            current,
            fault: TargetFault::None,
            next_id: AtomicU64::new(100),
        }
    }

    pub fn with_fault(mut self, fault: TargetFault) -> Self {
        self.fault = fault;
        self
    }

    pub fn uploaded_kinds(&self) -> Vec<ImageKind> {
        self.uploads.lock().unwrap().iter().map(|u| u.kind).collect()
    }

    pub fn published(&self) -> Vec<UpdateBrandingPayload> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrandingTargetPort for MockTarget {
    async fn upload_image(&self, kind: ImageKind, file_name: &str, bytes: Vec<u8>) -> Result<u64> {
        let mut uploads = self.uploads.lock().unwrap();
        if let TargetFault::Upload { index, status } = self.fault {
            if uploads.len() == index {
                return Err(BrandingError::from_status(status, "rejected".to_string()));
            }
        }
        uploads.push(Upload {
            kind,
            file_name: file_name.to_string(),
            size: bytes.len(),
        });
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn update_branding(&self, payload: &UpdateBrandingPayload) -> Result<()> {
        if let TargetFault::Publish { status } = self.fault {
            return Err(BrandingError::from_status(status, "update refused".to_string()));
        }
        self.published.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn current_branding(&self) -> Result<BrandingDescriptor> {
        if self.fault == TargetFault::CurrentBranding {
            return Err(BrandingError::Remote {
                status: 500,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.current.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(Stage),
    Progress(Stage, usize, usize, String),
    Failed(Stage, &'static str),
    Finished(String),
}

#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<(Stage, &'static str)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Failed(stage, label) => Some((stage, label)),
                _ => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn stage_started(&self, stage: Stage) {
        self.events.lock().unwrap().push(Event::Started(stage));
    }

    fn item_progress(&self, stage: Stage, done: usize, total: usize, item: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Progress(stage, done, total, item.to_string()));
    }

    fn stage_error(&self, stage: Stage, error: &BrandingError) {
        self.events.lock().unwrap().push(Event::Failed(stage, error.label()));
    }

    fn finished(&self, summary: &str) {
        self.events.lock().unwrap().push(Event::Finished(summary.to_string()));
    }
}

pub fn orchestrator(working_dir: &Path) -> (TransferOrchestrator, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::default());
    let store = StagingStore::open(working_dir).unwrap();
    (TransferOrchestrator::new(store, reporter.clone()), reporter)
}

pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
