use anyhow::{Result, anyhow};
use image::ImageFormat;
use image::imageops::FilterType;

/// Render a thumbnail from a stored original: fit within the requested box
/// preserving aspect ratio, then re-encode as WebP regardless of the source
/// format. A missing dimension leaves that axis unconstrained; with neither
/// given the image is returned at its original size.
pub fn render_thumbnail(data: &[u8], width: Option<u32>, height: Option<u32>) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data).map_err(|e| anyhow!("Failed to load image: {}", e))?;

    let img = match (width, height) {
        (None, None) => img,
        (w, h) => img.resize(
            w.unwrap_or(u32::MAX),
            h.unwrap_or(u32::MAX),
            FilterType::Lanczos3,
        ),
    };

    encode_to_webp(&img)
}

/// Decode just the pixel dimensions of an uploaded file.
pub fn decode_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    let img = image::load_from_memory(data).map_err(|e| anyhow!("Failed to load image: {}", e))?;
    Ok((img.width(), img.height()))
}

/// Encode to WebP bytes. WebP does not support 16-bit color, convert down
/// to 8-bit first.
fn encode_to_webp(img: &image::DynamicImage) -> Result<Vec<u8>> {
    let img_8bit = match img.color() {
        image::ColorType::Rgba16 | image::ColorType::La16 | image::ColorType::Rgba32F => {
            image::DynamicImage::ImageRgba8(img.to_rgba8())
        }
        image::ColorType::Rgb16 | image::ColorType::L16 | image::ColorType::Rgb32F => {
            image::DynamicImage::ImageRgb8(img.to_rgb8())
        }
        _ => img.clone(),
    };

    let mut out_data = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut out_data);
    img_8bit
        .write_to(&mut cursor, ImageFormat::WebP)
        .map_err(|e| anyhow!("Failed to encode WebP thumbnail: {}", e))?;
    Ok(out_data)
}
