use std::path::Path;

use tracing::{info, warn};
use uuid::Uuid;

pub const FOODBANK_PICTURES_DIR: &str = "foodbank_pictures";

/// An uploaded file whose leading bytes identify it as a supported image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Accepts PNG, JPEG, GIF and WebP by signature; the client's filename and
    /// content type are not trusted.
    pub fn sniff(bytes: Vec<u8>) -> Option<Self> {
        let extension = image_extension(&bytes)?;
        Some(Self { extension, bytes })
    }
}

fn image_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

/// Writes the image under `media_root/dir/` with a fresh name and returns the
/// path relative to `media_root`.
pub async fn store_image(
    media_root: &Path,
    dir: &str,
    image: &ImageUpload,
) -> std::io::Result<String> {
    let relative = format!("{}/{}.{}", dir, Uuid::new_v4().simple(), image.extension);
    let full = media_root.join(&relative);
    if let Some(parent) = full.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&full, &image.bytes).await?;
    info!("stored upload {} ({} bytes)", relative, image.bytes.len());
    Ok(relative)
}

pub async fn remove_media(media_root: &Path, relative: &str) {
    if let Err(e) = tokio::fs::remove_file(media_root.join(relative)).await {
        warn!("could not remove media file {}: {}", relative, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_image_signatures() {
        let png = b"\x89PNG\r\n\x1a\n rest".to_vec();
        assert_eq!(ImageUpload::sniff(png).map(|i| i.extension), Some("png"));

        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        assert_eq!(ImageUpload::sniff(jpeg).map(|i| i.extension), Some("jpg"));

        let webp = b"RIFF\x00\x00\x00\x00WEBPVP8 ".to_vec();
        assert_eq!(ImageUpload::sniff(webp).map(|i| i.extension), Some("webp"));
    }

    #[test]
    fn rejects_non_images() {
        assert!(ImageUpload::sniff(b"hello world".to_vec()).is_none());
        assert!(ImageUpload::sniff(Vec::new()).is_none());
        assert!(ImageUpload::sniff(b"RIFF1234WAVE".to_vec()).is_none());
    }

    #[tokio::test]
    async fn stores_under_directory_and_removes() {
        let root = tempfile::tempdir().unwrap();
        let image = ImageUpload::sniff(b"GIF89a....".to_vec()).unwrap();

        let relative = store_image(root.path(), FOODBANK_PICTURES_DIR, &image)
            .await
            .unwrap();
        assert!(relative.starts_with("foodbank_pictures/"));
        assert!(relative.ends_with(".gif"));
        let written = std::fs::read(root.path().join(&relative)).unwrap();
        assert_eq!(written, image.bytes);

        remove_media(root.path(), &relative).await;
        assert!(!root.path().join(&relative).exists());
    }
}
