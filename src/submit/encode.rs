/// Image to data URI encoding
///
/// Every picked file becomes a self-contained `data:` URI so the artwork
/// record can travel through every tier as plain JSON.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::validation::ImageFile;
use crate::error::EncodeError;
use crate::state::data::ArtworkImage;

/// Build a base64 data URI
pub fn to_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

/// Decode the payload of a base64 data URI.
/// Returns None for anything that is not a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload.trim()).ok()
}

/// Read one file and encode it
pub async fn encode_image(file: ImageFile) -> Result<ArtworkImage, EncodeError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| EncodeError::Unreadable {
            file_name: file.file_name.clone(),
            reason: e.to_string(),
        })?;

    let media_type = file
        .media_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    Ok(ArtworkImage {
        data: to_data_uri(media_type, &bytes),
        name: file.file_name,
    })
}

/// Encode every file concurrently, one task per image.
///
/// All tasks are joined before returning and the output keeps the input
/// order. A single failure fails the whole batch.
pub async fn encode_all(files: &[ImageFile]) -> Result<Vec<ArtworkImage>, EncodeError> {
    let handles: Vec<_> = files
        .iter()
        .cloned()
        .map(|file| tokio::spawn(encode_image(file)))
        .collect();

    let mut images = Vec::with_capacity(handles.len());
    let mut first_error = None;

    for handle in handles {
        let result = handle
            .await
            .map_err(|e| EncodeError::Task(e.to_string()))
            .and_then(|encoded| encoded);

        match result {
            Ok(image) => images.push(image),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => {
            tracing::warn!(error = %e, "image encoding failed, submission aborted");
            Err(e)
        }
        None => {
            tracing::debug!(count = images.len(), "images encoded");
            Ok(images)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_image(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> ImageFile {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        ImageFile::from_path(path).unwrap()
    }

    #[test]
    fn test_data_uri_shape() {
        assert_eq!(to_data_uri("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_decode_data_uri() {
        assert_eq!(decode_data_uri("data:image/png;base64,YWJj"), Some(b"abc".to_vec()));
        assert_eq!(decode_data_uri("data:text/plain,hello"), None);
        assert_eq!(decode_data_uri("https://example.com/a.png"), None);
    }

    #[tokio::test]
    async fn test_encode_all_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write_image(&dir, "one.png", b"first"),
            write_image(&dir, "two.jpg", b"second"),
            write_image(&dir, "three.webp", b"third"),
        ];

        let images = encode_all(&files).await.unwrap();

        let names: Vec<_> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["one.png", "two.jpg", "three.webp"]);
        assert_eq!(images[1].data, to_data_uri("image/jpeg", b"second"));
        assert_eq!(decode_data_uri(&images[2].data), Some(b"third".to_vec()));
    }

    #[tokio::test]
    async fn test_one_unreadable_file_fails_batch() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_image(&dir, "good.png", b"ok");
        let missing = ImageFile {
            path: dir.path().join("gone.png"),
            file_name: "gone.png".to_string(),
            media_type: Some("image/png".to_string()),
            size: 10,
        };

        let result = encode_all(&[good, missing]).await;

        assert!(matches!(
            result,
            Err(EncodeError::Unreadable { ref file_name, .. }) if file_name == "gone.png"
        ));
    }
}
