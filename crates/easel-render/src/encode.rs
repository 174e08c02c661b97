//! Image encoding for exports.

use crate::raster::Pixmap;
use crate::renderer::{ImageFormat, RenderError, RenderResult};
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;

/// Quality used for every JPEG export.
pub const JPEG_QUALITY: u8 = 100;

/// Encode a pixmap in the requested format.
pub fn encode(pixmap: &Pixmap, format: ImageFormat) -> RenderResult<Vec<u8>> {
    match format {
        ImageFormat::Png => encode_png(pixmap.data(), pixmap.width(), pixmap.height()),
        ImageFormat::Jpeg => encode_jpeg(pixmap),
    }
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header().map_err(|e| {
            log::error!("Failed to write PNG header: {:?}", e);
            RenderError::Encode(e.to_string())
        })?;

        writer.write_image_data(rgba_data).map_err(|e| {
            log::error!("Failed to write PNG data: {:?}", e);
            RenderError::Encode(e.to_string())
        })?;
    }

    Ok(png_data)
}

/// Encode to JPEG. Transparent pixels are flattened onto white.
fn encode_jpeg(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| {
            let alpha = u32::from(px[3]);
            let over_white = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
            [over_white(px[0]), over_white(px[1]), over_white(px[2])]
        })
        .collect();

    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, JPEG_QUALITY)
        .encode(&rgb, pixmap.width(), pixmap.height(), ExtendedColorType::Rgb8)
        .map_err(|e| {
            log::error!("Failed to encode JPEG: {}", e);
            RenderError::Encode(e.to_string())
        })?;
    Ok(jpeg_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::Color;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_png_signature() {
        let pixmap = Pixmap::new(4, 3, Color::WHITE).unwrap();
        let bytes = encode(&pixmap, ImageFormat::Png).unwrap();
        assert_eq!(bytes[..8], PNG_SIGNATURE);
    }

    #[test]
    fn test_jpeg_markers() {
        let pixmap = Pixmap::new(16, 16, Color::from_rgba8(0, 0, 255, 255)).unwrap();
        let bytes = encode(&pixmap, ImageFormat::Jpeg).unwrap();
        assert_eq!(bytes[..2], [0xFF, 0xD8]);
        assert_eq!(bytes[bytes.len() - 2..], [0xFF, 0xD9]);
    }

    #[test]
    fn test_png_decodes_back() {
        let pixmap = Pixmap::new(5, 2, Color::from_rgba8(10, 20, 30, 255)).unwrap();
        let bytes = encode(&pixmap, ImageFormat::Png).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (5, 2));
        assert_eq!(decoded.get_pixel(4, 1).0, [10, 20, 30, 255]);
    }
}
