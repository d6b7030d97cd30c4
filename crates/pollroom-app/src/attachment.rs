//! Reading image and voice attachments from disk.
//!
//! The size limit is checked against file metadata before any bytes are read,
//! so an oversized file is refused without loading it.

use std::path::{Path, PathBuf};

use pollroom_core::{Body, MediaError};
use thiserror::Error;

use crate::AttachmentKind;

/// An attachment could not be turned into a message body.
#[derive(Error, Debug)]
pub enum AttachmentError {
    /// The file could not be inspected or read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that was offered.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file extension does not map to a supported media type.
    #[error("unsupported file type: {}", path.display())]
    UnsupportedType {
        /// File that was offered.
        path: PathBuf,
    },

    /// Size or type rejected by the media producer.
    #[error(transparent)]
    Media(#[from] MediaError),
}

/// MIME type for `path` based on its extension, restricted to `kind`.
pub fn mime_type(kind: AttachmentKind, path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match (kind, ext.as_str()) {
        (AttachmentKind::Image, "png") => Some("image/png"),
        (AttachmentKind::Image, "jpg" | "jpeg") => Some("image/jpeg"),
        (AttachmentKind::Image, "gif") => Some("image/gif"),
        (AttachmentKind::Image, "webp") => Some("image/webp"),
        (AttachmentKind::Voice, "webm") => Some("audio/webm"),
        (AttachmentKind::Voice, "ogg" | "oga" | "opus") => Some("audio/ogg"),
        (AttachmentKind::Voice, "mp3") => Some("audio/mpeg"),
        (AttachmentKind::Voice, "wav") => Some("audio/wav"),
        (AttachmentKind::Voice, "m4a") => Some("audio/mp4"),
        _ => None,
    }
}

/// Read `path` and encode it as an image or voice body.
///
/// # Errors
///
/// - `AttachmentError::UnsupportedType` for an unknown extension
/// - `AttachmentError::Media` if the file is empty or over the size limit
/// - `AttachmentError::Read` if the file cannot be read
pub async fn load(kind: AttachmentKind, path: &Path) -> Result<Body, AttachmentError> {
    let mime = mime_type(kind, path)
        .ok_or_else(|| AttachmentError::UnsupportedType { path: path.to_path_buf() })?;

    let read_error = |source| AttachmentError::Read { path: path.to_path_buf(), source };
    let metadata = tokio::fs::metadata(path).await.map_err(read_error)?;
    Body::check_attachment_size(usize::try_from(metadata.len()).unwrap_or(usize::MAX))?;

    let bytes = tokio::fs::read(path).await.map_err(read_error)?;
    tracing::debug!(path = %path.display(), mime, size = bytes.len(), "attachment loaded");

    let body = match kind {
        AttachmentKind::Image => Body::image(mime, &bytes)?,
        AttachmentKind::Voice => Body::voice(mime, &bytes)?,
    };
    Ok(body)
}

#[cfg(test)]
mod tests {
    use pollroom_core::MAX_ATTACHMENT_BYTES;

    use super::*;

    #[test]
    fn mime_depends_on_kind() {
        assert_eq!(mime_type(AttachmentKind::Image, Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_type(AttachmentKind::Voice, Path::new("a.png")), None);
        assert_eq!(mime_type(AttachmentKind::Voice, Path::new("note.webm")), Some("audio/webm"));
        assert_eq!(mime_type(AttachmentKind::Image, Path::new("noext")), None);
    }

    #[tokio::test]
    async fn image_becomes_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        tokio::fs::write(&path, [0x89, b'P', b'N', b'G']).await.unwrap();

        let body = load(AttachmentKind::Image, &path).await.unwrap();
        assert!(matches!(body, Body::Image(ref url) if url.starts_with("data:image/png;base64,")));
    }

    #[tokio::test]
    async fn oversized_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.ogg");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_ATTACHMENT_BYTES as u64 + 1).unwrap();

        let err = load(AttachmentKind::Voice, &path).await.unwrap_err();
        assert!(matches!(err, AttachmentError::Media(MediaError::TooLarge { .. })));
    }

    #[tokio::test]
    async fn missing_file() {
        let err = load(AttachmentKind::Image, Path::new("/nonexistent/x.png")).await.unwrap_err();
        assert!(matches!(err, AttachmentError::Read { .. }));
    }
}
