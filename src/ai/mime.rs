use image::ImageFormat;

pub const DEFAULT_MIME: &str = "image/png";

/// Pick the MIME type for an upload: the declared type when the client sent
/// one, otherwise whatever the magic bytes say, otherwise `image/png`.
pub fn resolve_mime(declared: Option<&str>, bytes: &[u8]) -> String {
    match declared.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mime) => mime.to_string(),
        None => detect_image_mime(bytes).to_string(),
    }
}

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Gif)) => {
            format.to_mime_type()
        }
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to {}",
                &bytes[..bytes.len().min(4)],
                DEFAULT_MIME
            );
            DEFAULT_MIME
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        assert_eq!(
            detect_image_mime(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            "image/png"
        );
    }

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(detect_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    }

    #[test]
    fn test_detect_webp() {
        assert_eq!(
            detect_image_mime(&[
                0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50
            ]),
            "image/webp"
        );
    }

    #[test]
    fn test_unknown_falls_back_to_png() {
        assert_eq!(detect_image_mime(&[0x00, 0x01, 0x02, 0x03]), "image/png");
    }

    #[test]
    fn test_empty_falls_back_to_png() {
        assert_eq!(detect_image_mime(&[]), "image/png");
    }

    #[test]
    fn test_declared_type_wins_over_sniffing() {
        assert_eq!(
            resolve_mime(Some("image/heic"), &[0xFF, 0xD8, 0xFF, 0xE0]),
            "image/heic"
        );
    }

    #[test]
    fn test_blank_declared_type_is_sniffed() {
        assert_eq!(resolve_mime(Some(""), &[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(resolve_mime(None, b"plain text"), "image/png");
    }
}
