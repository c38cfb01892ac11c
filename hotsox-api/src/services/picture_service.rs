use axum::extract::Multipart;
use uuid::Uuid;

use hotsox_shared::clients::media::{image_extension, MediaClient, ACCEPTED_IMAGE_TYPES};
use hotsox_shared::errors::{AppError, AppResult, ErrorCode};

pub const MAX_PICTURE_BYTES: usize = 10 * 1024 * 1024;

/// A picture stored at the media host.
pub struct StoredPicture {
    pub key: String,
    pub url: String,
}

pub fn user_picture_key(user_id: Uuid, ext: &str) -> String {
    format!("users/{user_id}/{}.{ext}", Uuid::now_v7())
}

pub fn sock_picture_key(sock_id: Uuid, ext: &str) -> String {
    format!("socks/{sock_id}/{}.{ext}", Uuid::now_v7())
}

/// Reads the first file field of the form, uploads it under the key built by
/// `make_key` and returns where it landed.
pub async fn store_upload<F>(
    media: &MediaClient,
    multipart: &mut Multipart,
    make_key: F,
) -> AppResult<StoredPicture>
where
    F: FnOnce(&str) -> String,
{
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(ErrorCode::PictureUploadFailed, format!("failed to read multipart: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::PictureUploadFailed, "no file provided"))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let ext = image_extension(&content_type).ok_or_else(|| {
        AppError::new(
            ErrorCode::UnsupportedImageFormat,
            format!("unsupported image format, accepted: {ACCEPTED_IMAGE_TYPES}"),
        )
    })?;

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::new(ErrorCode::PictureUploadFailed, format!("failed to read file data: {e}")))?;

    if data.is_empty() {
        return Err(AppError::new(ErrorCode::PictureUploadFailed, "uploaded file is empty"));
    }
    if data.len() > MAX_PICTURE_BYTES {
        return Err(AppError::new(ErrorCode::PayloadTooLarge, "picture exceeds 10 MiB"));
    }

    let key = make_key(ext);
    let url = media
        .upload(&key, data.to_vec(), &content_type)
        .await
        .map_err(|e| AppError::new(ErrorCode::PictureUploadFailed, e))?;

    Ok(StoredPicture { key, url })
}

/// Removes an object, logging instead of failing; the row is the source of truth.
pub async fn remove_object(media: &MediaClient, key: &str) {
    if let Err(e) = media.delete(key).await {
        tracing::warn!(error = %e, key = %key, "failed to delete picture object");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_scoped_by_owner() {
        let user = Uuid::now_v7();
        let key = user_picture_key(user, "png");
        assert!(key.starts_with(&format!("users/{user}/")));
        assert!(key.ends_with(".png"));

        let sock = Uuid::now_v7();
        let key = sock_picture_key(sock, "gif");
        assert!(key.starts_with(&format!("socks/{sock}/")));
        assert!(key.ends_with(".gif"));
        assert_ne!(sock_picture_key(sock, "gif"), key);
    }
}
