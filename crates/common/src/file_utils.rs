use std::path::Path;

/// File extensions the catalog treats as playable media (lowercase, with dot)
pub const SUPPORTED_MEDIA_EXTENSIONS: [&str; 5] = [".mp3", ".flac", ".wav", ".ogg", ".m4a"];

/// Returns true when `filename` ends in one of the supported media extensions.
/// Matching is a case-insensitive suffix test, so a bare `.mp3` counts as media.
pub fn is_supported_media(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    SUPPORTED_MEDIA_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Error type for object key validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValidationError {
    Empty,
    ContainsNullByte,
    ContainsPathSeparator,
    IsSpecialDirectory,
    InvalidFileName,
}

impl KeyValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            KeyValidationError::Empty => "Object key cannot be empty",
            KeyValidationError::ContainsNullByte => "Object key cannot contain null bytes",
            KeyValidationError::ContainsPathSeparator => {
                "Object key cannot contain path separators (/ or \\)"
            }
            KeyValidationError::IsSpecialDirectory => "Object key cannot be '.' or '..'",
            KeyValidationError::InvalidFileName => "Object key must map to a single file name",
        }
    }
}

impl std::fmt::Display for KeyValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for KeyValidationError {}

/// Validate an object key before it is used as a file name on disk.
/// Keys must name exactly one file directly inside the blob directory.
pub fn validate_object_key(key: &str) -> Result<(), KeyValidationError> {
    if key.is_empty() {
        return Err(KeyValidationError::Empty);
    }

    if key.contains('\0') {
        return Err(KeyValidationError::ContainsNullByte);
    }

    if key.contains('/') || key.contains('\\') {
        return Err(KeyValidationError::ContainsPathSeparator);
    }

    if key == "." || key == ".." {
        return Err(KeyValidationError::IsSpecialDirectory);
    }

    if Path::new(key).file_name().and_then(|n| n.to_str()) != Some(key) {
        return Err(KeyValidationError::InvalidFileName);
    }

    Ok(())
}
