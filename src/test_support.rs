//! Fixtures shared by unit tests.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::json;

use crate::domain::{BrandingDescriptor, ImageKind};

pub(crate) fn sample_descriptor() -> BrandingDescriptor {
    serde_json::from_value(json!({
        "createdAt": "2022-05-10T08:30:00Z",
        "changedAt": "2022-06-01T12:00:00Z",
        "productName": "Acme Cloud",
        "colorizeHeader": false,
        "appearanceLoginBox": "light",
        "positionLoginBox": 1,
        "colors": [
            {"type": "loginArea", "colorDetails": [
                {"type": "normal", "rgba": "#FFFFFF"},
                {"type": "hover", "rgba": "#EEEEEE"}
            ]}
        ],
        "images": ImageKind::ALL.iter().map(|kind| json!({
            "type": kind.as_str(),
            "files": [
                {"size": "small", "url": format!("https://cdn.acme.example/{}/small", kind)},
                {"size": "large", "url": format!("https://cdn.acme.example/{}/large", kind)}
            ]
        })).collect::<Vec<_>>(),
        "texts": [{"type": "termsOfUse", "languages": [{"languageTag": "en-US", "content": "Be nice."}]}],
        "imprintUrl": "https://acme.example/imprint",
        "privacyUrl": "https://acme.example/privacy",
        "supportUrl": "https://acme.example/support",
        "emailContact": "help@acme.example",
        "emailSender": "Acme Cloud"
    }))
    .expect("sample descriptor is valid")
}

pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub(crate) fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let rgb = DynamicImage::ImageRgba8(solid(width, height)).to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .expect("jpeg encoding");
    buf.into_inner()
}

fn solid(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(solid(width, height))
        .write_to(&mut buf, format)
        .expect("image encoding");
    buf.into_inner()
}
