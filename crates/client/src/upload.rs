//! Client-side checks applied to a video before it is uploaded.

use std::path::Path;

use crate::api::ApiError;

/// Largest accepted upload (500 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Accepted extensions and the MIME type sent with each.
const VIDEO_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
];

/// Validate a video file of `size` bytes and return its MIME type.
///
/// Extensions are matched case-insensitively.
pub fn validate_upload(path: &Path, size: u64) -> Result<&'static str, ApiError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let Some((_, mime)) = VIDEO_TYPES.iter().find(|(e, _)| *e == ext) else {
        return Err(ApiError::InvalidUpload(format!(
            "Unsupported video format '{}'; expected one of mp4, avi, mov, mkv",
            path.display()
        )));
    };

    if size == 0 {
        return Err(ApiError::InvalidUpload("Video file is empty".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ApiError::InvalidUpload(format!(
            "Video is {size} bytes; the limit is {MAX_UPLOAD_BYTES} bytes (500 MiB)"
        )));
    }

    Ok(mime)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_known_formats() {
        assert_eq!(validate_upload(Path::new("drill.mp4"), 1024).unwrap(), "video/mp4");
        assert_eq!(
            validate_upload(Path::new("drill.MOV"), 1024).unwrap(),
            "video/quicktime"
        );
    }

    #[test]
    fn rejects_other_extensions() {
        assert_matches!(
            validate_upload(Path::new("drill.gif"), 1024),
            Err(ApiError::InvalidUpload(_))
        );
        assert!(validate_upload(Path::new("drill"), 1024).is_err());
    }

    #[test]
    fn enforces_size_limit() {
        assert!(validate_upload(Path::new("a.mkv"), MAX_UPLOAD_BYTES).is_ok());
        assert_matches!(
            validate_upload(Path::new("a.mkv"), MAX_UPLOAD_BYTES + 1),
            Err(ApiError::InvalidUpload(_))
        );
        assert!(validate_upload(Path::new("a.mkv"), 0).is_err());
    }
}
