/// Media handling for uploaded images
///
/// Clients send images inline as `data:` URLs (base64 payload with a mime
/// type). This module decodes them and persists the bytes under the media
/// root, which the server exposes at `/media`.

use base64::Engine as _;
use std::path::Path;
use tokio::fs;

/// A decoded inline image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// File extension derived from the mime type
    pub extension: &'static str,

    /// Raw image bytes
    pub bytes: Vec<u8>,
}

/// Parses a `data:<mime>;base64,<payload>` URL into image bytes
///
/// Returns None for anything that is not a base64 data URL with a
/// supported image mime type (png, jpeg, gif, webp).
pub fn parse_data_url(input: &str) -> Option<DecodedImage> {
    let rest = input.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;

    let extension = match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => return None,
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;

    if bytes.is_empty() {
        return None;
    }

    Some(DecodedImage { extension, bytes })
}

/// Persists an image under `<root>/<subdir>/<stem>.<ext>`
///
/// Creates the directory if needed and returns the path relative to the
/// media root, suitable for building the public URL.
pub async fn save_image(
    root: &Path,
    subdir: &str,
    stem: &str,
    image: &DecodedImage,
) -> std::io::Result<String> {
    let dir = root.join(subdir);
    fs::create_dir_all(&dir).await?;

    let file_name = format!("{}.{}", stem, image.extension);
    fs::write(dir.join(&file_name), &image.bytes).await?;

    Ok(format!("{}/{}", subdir, file_name))
}

/// Best-effort removal of a stored image by its public URL
///
/// Derives the on-disk path from the trailing `<subdir>/<file>` components
/// of the URL. Failures are ignored; a stale file is preferable to failing
/// the request after the database row was already updated.
pub async fn remove_by_url(root: &Path, subdir: &str, url: &str) {
    if let Some(file_name) = url.rsplit('/').next() {
        // Reject anything that could escape the media directory.
        if file_name.is_empty() || file_name.contains("..") {
            return;
        }
        let _ = fs::remove_file(root.join(subdir).join(file_name)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_PAYLOAD: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_parse_png_data_url() {
        let url = format!("data:image/png;base64,{}", PNG_PAYLOAD);
        let image = parse_data_url(&url).unwrap();

        assert_eq!(image.extension, "png");
        assert!(!image.bytes.is_empty());
    }

    #[test]
    fn test_jpeg_aliases() {
        let url = format!("data:image/jpg;base64,{}", PNG_PAYLOAD);
        assert_eq!(parse_data_url(&url).unwrap().extension, "jpg");

        let url = format!("data:image/jpeg;base64,{}", PNG_PAYLOAD);
        assert_eq!(parse_data_url(&url).unwrap().extension, "jpg");
    }

    #[test]
    fn test_rejects_non_data_urls() {
        assert!(parse_data_url("https://example.com/a.png").is_none());
        assert!(parse_data_url("data:text/plain;base64,aGVsbG8=").is_none());
        assert!(parse_data_url("data:image/png;base64,!!!not-base64!!!").is_none());
        assert!(parse_data_url("data:image/png;base64,").is_none());
    }
}
