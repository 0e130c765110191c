use crate::ai::MediaType;
use crate::Result;
use image::imageops::FilterType;
use std::io::Cursor;

/// Resize an encoded image to exactly `width` x `height` and re-encode it in
/// `media_type`'s format.
pub fn resize_image(
    bytes: &[u8],
    media_type: MediaType,
    width: u32,
    height: u32,
) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);

    let mut out = Vec::new();
    match media_type {
        // JPEG has no alpha channel.
        MediaType::Jpeg => image::DynamicImage::ImageRgb8(resized.to_rgb8())
            .write_to(&mut Cursor::new(&mut out), media_type.image_format())?,
        MediaType::Png => resized.write_to(&mut Cursor::new(&mut out), media_type.image_format())?,
    }

    tracing::debug!(
        "Resized {}x{} image to {}x{} ({} -> {} bytes)",
        img.width(),
        img.height(),
        width,
        height,
        bytes.len(),
        out.len()
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use image::ImageFormat;

    fn create_test_image(format: ImageFormat) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(32, 24, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut bytes), format)
            .unwrap();
        bytes
    }

    #[test]
    fn test_resize_png_keeps_format() {
        let original = create_test_image(ImageFormat::Png);
        let resized = resize_image(&original, MediaType::Png, 8, 8).unwrap();

        assert_eq!(MediaType::sniff(&resized), Some(MediaType::Png));
        let decoded = image::load_from_memory(&resized).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn test_resize_jpeg_keeps_format() {
        let original = create_test_image(ImageFormat::Jpeg);
        let resized = resize_image(&original, MediaType::Jpeg, 16, 16).unwrap();

        assert_eq!(MediaType::sniff(&resized), Some(MediaType::Jpeg));
        let decoded = image::load_from_memory(&resized).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn test_resize_rejects_undecodable_bytes() {
        let err = resize_image(&[0x00, 0x01, 0x02], MediaType::Png, 8, 8).unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }
}
