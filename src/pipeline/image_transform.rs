use std::fs;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::{debug, instrument};

use crate::common::error::{io_at, BrandingError, Result};
use crate::domain::StagedImage;

/// Fill used for the unused canvas area (transparent white).
const LETTERBOX_FILL: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Normalizes the two logos whose slots require a fixed canvas.
pub struct ImageTransform;

impl ImageTransform {
    /// Letterboxes a web or app logo into its canvas and rewrites it as `{kind}_large.png`.
    /// Any other kind is rejected with `InvalidKind`.
    #[instrument(skip(image), fields(kind = %image.image_kind))]
    pub fn resize(image: &StagedImage) -> Result<StagedImage> {
        let (width, height) = image
            .image_kind
            .canvas()
            .ok_or(BrandingError::InvalidKind(image.image_kind))?;

        let bytes = fs::read(&image.file_path).map_err(io_at(&image.file_path))?;
        let source = image::load_from_memory(&bytes)?;
        let canvas = Self::letterbox(&source, width, height);

        let target = image.file_path.with_file_name(image.image_kind.file_name("png"));
        canvas.save_with_format(&target, ImageFormat::Png)?;
        if target != image.file_path {
            fs::remove_file(&image.file_path)?;
        }

        debug!(
            "Resized {} from {}x{} to {}x{}",
            image.image_kind,
            source.width(),
            source.height(),
            width,
            height
        );
        Ok(StagedImage::new(target, image.image_kind))
    }

    /// Scales `source` to fit inside `width`x`height` keeping its aspect ratio and centers it.
    pub fn letterbox(source: &DynamicImage, width: u32, height: u32) -> RgbaImage {
        let fitted = source.resize(width, height, FilterType::Lanczos3).to_rgba8();
        let mut canvas = RgbaImage::from_pixel(width, height, LETTERBOX_FILL);
        let x = width.saturating_sub(fitted.width()) / 2;
        let y = height.saturating_sub(fitted.height()) / 2;
        imageops::overlay(&mut canvas, &fitted, i64::from(x), i64::from(y));
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImageKind;
    use crate::test_support::{jpeg_bytes, png_bytes};
    use tempfile::tempdir;

    fn stage(dir: &std::path::Path, kind: ImageKind, ext: &str, bytes: Vec<u8>) -> StagedImage {
        let path = dir.join(kind.file_name(ext));
        fs::write(&path, bytes).unwrap();
        StagedImage::new(path, kind)
    }

    #[test]
    fn web_logo_always_ends_up_1136_by_440() {
        let tmp = tempdir().unwrap();
        for (w, h) in [(300, 300), (2000, 100), (50, 900), (1136, 440)] {
            let staged = stage(tmp.path(), ImageKind::WebLogo, "png", png_bytes(w, h));
            let resized = ImageTransform::resize(&staged).unwrap();
            let out = image::open(&resized.file_path).unwrap();
            assert_eq!((out.width(), out.height()), (1136, 440), "source {w}x{h}");
        }
    }

    #[test]
    fn app_logo_always_ends_up_square() {
        let tmp = tempdir().unwrap();
        let staged = stage(tmp.path(), ImageKind::AppLogo, "png", png_bytes(640, 480));
        let resized = ImageTransform::resize(&staged).unwrap();
        let out = image::open(&resized.file_path).unwrap();
        assert_eq!((out.width(), out.height()), (1900, 1900));
    }

    #[test]
    fn resize_is_idempotent_on_dimensions() {
        let tmp = tempdir().unwrap();
        let staged = stage(tmp.path(), ImageKind::WebLogo, "png", png_bytes(500, 500));
        let once = ImageTransform::resize(&staged).unwrap();
        let twice = ImageTransform::resize(&once).unwrap();
        assert_eq!(once, twice);
        let out = image::open(&twice.file_path).unwrap();
        assert_eq!((out.width(), out.height()), (1136, 440));
    }

    #[test]
    fn jpeg_input_is_rewritten_as_png() {
        let tmp = tempdir().unwrap();
        let staged = stage(tmp.path(), ImageKind::AppLogo, "jpg", jpeg_bytes(100, 40));
        let resized = ImageTransform::resize(&staged).unwrap();

        assert!(resized.file_path.ends_with("appLogo_large.png"));
        assert!(!staged.file_path.exists());
        let bytes = fs::read(&resized.file_path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn letterbox_pads_instead_of_cropping() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 100, Rgba([0, 0, 255, 255])));
        let canvas = ImageTransform::letterbox(&source, 300, 100);
        // the square lands in the middle third, the sides stay transparent
        assert_eq!(canvas.get_pixel(150, 50)[3], 255);
        assert_eq!(canvas.get_pixel(10, 50)[3], 0);
        assert_eq!(canvas.get_pixel(290, 50)[3], 0);
    }

    #[test]
    fn other_kinds_are_rejected() {
        let tmp = tempdir().unwrap();
        for kind in [ImageKind::WebSplashImage, ImageKind::SquaredLogo, ImageKind::AppSplashImage, ImageKind::FavIcon] {
            let staged = stage(tmp.path(), kind, "png", png_bytes(10, 10));
            let err = ImageTransform::resize(&staged).unwrap_err();
            assert!(matches!(err, BrandingError::InvalidKind(k) if k == kind));
            assert!(staged.file_path.exists());
        }
    }
}
