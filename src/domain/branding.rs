use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::constants::{APP_LOGO_CANVAS, WEB_LOGO_CANVAS};
use crate::common::error::{BrandingError, Result};

/// Image slots known to the branding service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageKind {
    WebLogo,
    WebSplashImage,
    SquaredLogo,
    AppSplashImage,
    AppLogo,
    FavIcon,
    IngredientLogo,
}

/// Image kinds that take part in a transfer, in transfer order.
/// `FavIcon` and `IngredientLogo` are managed by the service and never copied.
pub const BRANDING_IMAGES: [ImageKind; 5] = [
    ImageKind::WebLogo,
    ImageKind::WebSplashImage,
    ImageKind::SquaredLogo,
    ImageKind::AppSplashImage,
    ImageKind::AppLogo,
];

impl ImageKind {
    pub const ALL: [ImageKind; 7] = [
        ImageKind::WebLogo,
        ImageKind::WebSplashImage,
        ImageKind::SquaredLogo,
        ImageKind::AppSplashImage,
        ImageKind::AppLogo,
        ImageKind::FavIcon,
        ImageKind::IngredientLogo,
    ];

    /// Wire name, also used as file name prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::WebLogo => "webLogo",
            ImageKind::WebSplashImage => "webSplashImage",
            ImageKind::SquaredLogo => "squaredLogo",
            ImageKind::AppSplashImage => "appSplashImage",
            ImageKind::AppLogo => "appLogo",
            ImageKind::FavIcon => "favIcon",
            ImageKind::IngredientLogo => "ingredientLogo",
        }
    }

    pub fn is_transferred(&self) -> bool {
        BRANDING_IMAGES.contains(self)
    }

    /// Fixed canvas the image is letterboxed into, if it gets resized at all.
    pub fn canvas(&self) -> Option<(u32, u32)> {
        match self {
            ImageKind::WebLogo => Some(WEB_LOGO_CANVAS),
            ImageKind::AppLogo => Some(APP_LOGO_CANVAS),
            _ => None,
        }
    }

    /// Staged file name, e.g. `webLogo_large.png`.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}_large.{}", self.as_str(), extension)
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageKind {
    type Err = BrandingError;

    fn from_str(s: &str) -> Result<Self> {
        ImageKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BrandingError::InvalidDescriptor(format!("unknown image type '{}'", s)))
    }
}

/// Image size variant. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageSize {
    Small,
    Medium,
    Large,
    Other(String),
}

impl From<String> for ImageSize {
    fn from(value: String) -> Self {
        match value.as_str() {
            "small" => ImageSize::Small,
            "medium" => ImageSize::Medium,
            "large" => ImageSize::Large,
            _ => ImageSize::Other(value),
        }
    }
}

impl From<ImageSize> for String {
    fn from(value: ImageSize) -> Self {
        match value {
            ImageSize::Small => "small".to_string(),
            ImageSize::Medium => "medium".to_string(),
            ImageSize::Large => "large".to_string(),
            ImageSize::Other(other) => other,
        }
    }
}

/// Login box appearance. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoginBoxAppearance {
    Light,
    Dark,
    Other(String),
}

impl From<String> for LoginBoxAppearance {
    fn from(value: String) -> Self {
        match value.as_str() {
            "light" => LoginBoxAppearance::Light,
            "dark" => LoginBoxAppearance::Dark,
            _ => LoginBoxAppearance::Other(value),
        }
    }
}

impl From<LoginBoxAppearance> for String {
    fn from(value: LoginBoxAppearance) -> Self {
        match value {
            LoginBoxAppearance::Light => "light".to_string(),
            LoginBoxAppearance::Dark => "dark".to_string(),
            LoginBoxAppearance::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub rgba: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingColor {
    #[serde(rename = "type")]
    pub kind: String,
    pub color_details: Vec<ColorDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingFile {
    pub size: ImageSize,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingImage {
    #[serde(rename = "type")]
    pub kind: ImageKind,
    pub files: Vec<BrandingFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageText {
    pub language_tag: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingText {
    #[serde(rename = "type")]
    pub kind: String,
    pub languages: Vec<LanguageText>,
}

/// Branding as returned by `GET /branding/api/v1/public/branding`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<DateTime<Utc>>,
    pub product_name: String,
    pub colorize_header: bool,
    pub appearance_login_box: LoginBoxAppearance,
    pub position_login_box: i32,
    pub colors: Vec<BrandingColor>,
    /// Absent in the update-ready `branding.json` of older archives.
    #[serde(default)]
    pub images: Vec<BrandingImage>,
    pub texts: Vec<BrandingText>,
    pub imprint_url: String,
    pub privacy_url: String,
    pub support_url: String,
    pub email_contact: String,
    pub email_sender: String,
}

impl BrandingDescriptor {
    /// Url of the single `large` file of `kind`.
    pub fn large_image_url(&self, kind: ImageKind) -> Result<&str> {
        let image = self
            .images
            .iter()
            .find(|image| image.kind == kind)
            .ok_or_else(|| BrandingError::InvalidDescriptor(format!("no {} image", kind)))?;

        let mut large = image.files.iter().filter(|file| file.size == ImageSize::Large);
        match (large.next(), large.next()) {
            (Some(file), None) => Ok(file.url.as_str()),
            (None, _) => Err(BrandingError::InvalidDescriptor(format!("no large file for {}", kind))),
            (Some(_), Some(_)) => Err(BrandingError::InvalidDescriptor(format!(
                "more than one large file for {}",
                kind
            ))),
        }
    }

    /// Every transferred image kind must carry exactly one `large` file.
    pub fn validate(&self) -> Result<()> {
        for kind in BRANDING_IMAGES {
            self.large_image_url(kind)?;
        }
        Ok(())
    }
}

/// Keeps only the `normal` detail of each color; colors without one are dropped.
pub fn filter_normal_colors(colors: &[BrandingColor]) -> Vec<BrandingColor> {
    colors
        .iter()
        .flat_map(|color| {
            color
                .color_details
                .iter()
                .filter(|detail| detail.kind == "normal")
                .map(move |detail| BrandingColor {
                    kind: color.kind.clone(),
                    color_details: vec![detail.clone()],
                })
        })
        .collect()
}

/// Image id returned by the upload endpoint, tagged with its slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: ImageKind,
}

/// Body of `PUT /branding/api/v1/branding`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBrandingPayload {
    pub appearance_login_box: LoginBoxAppearance,
    pub colorize_header: bool,
    pub colors: Vec<BrandingColor>,
    pub email_contact: String,
    pub email_sender: String,
    pub images: Vec<UploadedImage>,
    pub imprint_url: String,
    pub position_login_box: i32,
    pub privacy_url: String,
    pub product_name: String,
    pub support_url: String,
    pub texts: Vec<BrandingText>,
}

impl UpdateBrandingPayload {
    /// Builds the update body from a fetched descriptor and freshly uploaded image ids.
    /// Server managed timestamps are not part of the payload.
    pub fn build(descriptor: &BrandingDescriptor, images: Vec<UploadedImage>) -> Self {
        Self {
            appearance_login_box: descriptor.appearance_login_box.clone(),
            colorize_header: descriptor.colorize_header,
            colors: filter_normal_colors(&descriptor.colors),
            email_contact: descriptor.email_contact.clone(),
            email_sender: descriptor.email_sender.clone(),
            images,
            imprint_url: descriptor.imprint_url.clone(),
            position_login_box: descriptor.position_login_box,
            privacy_url: descriptor.privacy_url.clone(),
            product_name: descriptor.product_name.clone(),
            support_url: descriptor.support_url.clone(),
            texts: descriptor.texts.clone(),
        }
    }

    /// Style-only transfer: keep the target's product name, texts, legal urls and emails.
    pub fn keep_target_content(mut self, target: &BrandingDescriptor) -> Self {
        self.product_name = target.product_name.clone();
        self.texts = target.texts.clone();
        self.imprint_url = target.imprint_url.clone();
        self.privacy_url = target.privacy_url.clone();
        self.support_url = target.support_url.clone();
        self.email_contact = target.email_contact.clone();
        self.email_sender = target.email_sender.clone();
        self
    }
}

/// A branding image persisted in the staging directory for the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedImage {
    pub file_path: PathBuf,
    pub image_kind: ImageKind,
}

impl StagedImage {
    pub fn new(file_path: PathBuf, image_kind: ImageKind) -> Self {
        Self { file_path, image_kind }
    }

    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.image_kind.file_name("png"))
    }
}
