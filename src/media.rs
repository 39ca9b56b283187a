use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::extract::Multipart;
use mime::Mime;
use tokio::fs;
use uuid::Uuid;

use crate::{
    data_formats::{ImageUpload, PostForm},
    errors::RequestError,
};

/// Subdirectory of the media root that post images land in.
pub const POST_IMAGES_DIR: &str = "post_images";
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Reads a post form. Unknown fields are ignored and an empty file field means "no image".
pub async fn read_post_form(mut multipart: Multipart) -> Result<PostForm, RequestError> {
    let mut form = PostForm::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!(error = %e, "malformed multipart body");
        RequestError::RunTimeError("Malformed form data")
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|_| RequestError::RunTimeError("Could not read the uploaded image"))?;
            if !data.is_empty() {
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            continue;
        }
        let slot = match name.as_str() {
            "title" => &mut form.title,
            "text" => &mut form.text,
            "pub_date" => &mut form.pub_date,
            "category" => &mut form.category,
            "location" => &mut form.location,
            "is_published" => &mut form.is_published,
            _ => continue,
        };
        *slot = Some(
            field
                .text()
                .await
                .map_err(|_| RequestError::RunTimeError("Malformed form data"))?,
        );
    }
    Ok(form)
}

/// Extension the client claims for the upload, judged by content type and then by file name.
fn declared_extension(upload: &ImageUpload) -> Option<&'static str> {
    let content_type = match upload.content_type.as_deref() {
        Some(raw) => raw.parse::<Mime>().ok()?,
        None => return extension_from_name(&upload.file_name),
    };
    if content_type.type_() == mime::IMAGE {
        return match content_type.subtype().as_str() {
            "jpeg" => Some("jpg"),
            "png" => Some("png"),
            "gif" => Some("gif"),
            "webp" => Some("webp"),
            _ => None,
        };
    }
    if content_type.essence_str() == mime::APPLICATION_OCTET_STREAM.essence_str() {
        return extension_from_name(&upload.file_name);
    }
    None
}

/// Recognises the supported formats by their leading bytes.
fn sniffed_extension(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0xff, 0xd8, 0xff]) {
        Some("jpg")
    } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("gif")
    } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

/// File extension for an accepted image. The declared type must be a supported
/// image and the bytes must actually be one; the stored extension follows the bytes.
pub fn image_extension(upload: &ImageUpload) -> Option<&'static str> {
    declared_extension(upload)?;
    sniffed_extension(&upload.data)
}

fn extension_from_name(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("jpg"),
        "png" => Some("png"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        _ => None,
    }
}

pub fn validate_image(upload: &ImageUpload) -> Result<&'static str, RequestError> {
    if upload.data.len() > MAX_IMAGE_BYTES {
        return Err(RequestError::Unprocessable(vec![
            "image: must be at most 5 MiB".to_string()
        ]));
    }
    image_extension(upload).ok_or_else(|| {
        RequestError::Unprocessable(vec![
            "image: only jpg, png, gif and webp images are allowed".to_string(),
        ])
    })
}

/// Writes the image under the media root and returns its path relative to it.
pub async fn save_image(media_root: &Path, upload: &ImageUpload) -> Result<String> {
    let extension = validate_image(upload).map_err(|_| anyhow::anyhow!("Rejected image"))?;
    let directory = media_root.join(POST_IMAGES_DIR);
    fs::create_dir_all(&directory)
        .await
        .with_context(|| format!("Failed to create {}", directory.display()))?;
    let file_name = format!("{}.{}", Uuid::new_v4(), extension);
    let path: PathBuf = directory.join(&file_name);
    fs::write(&path, &upload.data)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "stored post image");
    Ok(format!("{}/{}", POST_IMAGES_DIR, file_name))
}

/// Best-effort removal of a stored image.
pub async fn remove_image(media_root: &Path, relative: &str) {
    let path = media_root.join(relative);
    if let Err(e) = fs::remove_file(&path).await {
        tracing::warn!(path = %path.display(), error = %e, "could not remove post image");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
    const JPEG: &[u8] = &[0xff, 0xd8, 0xff, 0xe0];
    const GIF: &[u8] = b"GIF89a";
    const WEBP: &[u8] = b"RIFF\x00\x00\x00\x00WEBPVP8 ";

    fn upload(name: &str, content_type: Option<&str>, magic: &[u8], size: usize) -> ImageUpload {
        let mut data = magic.to_vec();
        data.resize(size.max(magic.len()), 0);
        ImageUpload {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            data,
        }
    }

    #[test]
    fn accepts_common_image_types() {
        assert_eq!(validate_image(&upload("a.png", Some("image/png"), PNG, 10)).unwrap(), "png");
        assert_eq!(validate_image(&upload("a.JPEG", None, JPEG, 10)).unwrap(), "jpg");
        assert_eq!(
            validate_image(&upload("a.webp", Some("application/octet-stream"), WEBP, 16)).unwrap(),
            "webp"
        );
        assert_eq!(
            validate_image(&upload("a.gif", Some("image/gif; charset=binary"), GIF, 10)).unwrap(),
            "gif"
        );
    }

    #[test]
    fn extension_follows_the_bytes() {
        assert_eq!(validate_image(&upload("a.png", Some("image/png"), JPEG, 10)).unwrap(), "jpg");
    }

    #[test]
    fn rejects_other_files() {
        assert!(validate_image(&upload("a.svg", Some("image/svg+xml"), b"<svg", 10)).is_err());
        assert!(validate_image(&upload("a.txt", Some("text/plain"), PNG, 10)).is_err());
        assert!(validate_image(&upload("a.png", Some("image/png"), b"hello", 10)).is_err());
        assert!(validate_image(&upload("a.png", Some("not a type"), PNG, 10)).is_err());
        assert!(
            validate_image(&upload("a.png", Some("image/png"), PNG, MAX_IMAGE_BYTES + 1)).is_err()
        );
    }

    #[tokio::test]
    async fn saved_image_lands_under_post_images() {
        let root = std::env::temp_dir().join(format!("blogicum-media-{}", Uuid::new_v4()));
        let relative = save_image(&root, &upload("cat.gif", Some("image/gif"), GIF, 6))
            .await
            .unwrap();
        assert!(relative.starts_with("post_images/"));
        assert!(relative.ends_with(".gif"));
        assert!(root.join(&relative).exists());
        remove_image(&root, &relative).await;
        assert!(!root.join(&relative).exists());
        let _ = std::fs::remove_dir_all(root);
    }
}
