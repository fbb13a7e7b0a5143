//! Domain data shapes shared across layers

pub mod branding;

pub use branding::{
    filter_normal_colors, BrandingColor, BrandingDescriptor, BrandingFile, BrandingImage, BrandingText, ColorDetail,
    ImageKind, ImageSize, LanguageText, LoginBoxAppearance, StagedImage, UpdateBrandingPayload, UploadedImage,
    BRANDING_IMAGES,
};
