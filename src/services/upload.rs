use anyhow::Result;
use base64::{engine::general_purpose, Engine};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// An image picked for upload (QR code, profile picture).
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

pub fn validate_image_file(file: Option<&ImageFile>) -> Result<()> {
    let Some(file) = file else {
        anyhow::bail!("No file selected");
    };

    if file.bytes.is_empty() {
        anyhow::bail!("File '{}' is empty", file.file_name);
    }

    if !ALLOWED_TYPES.contains(&file.content_type.to_lowercase().as_str()) {
        anyhow::bail!("Invalid file type. Please upload JPEG, PNG, or WebP images only.");
    }

    if file.bytes.len() > MAX_IMAGE_BYTES {
        anyhow::bail!("File size too large. Please upload images smaller than 5MB.");
    }

    Ok(())
}

pub fn to_data_url(file: &ImageFile) -> String {
    format!(
        "data:{};base64,{}",
        file.content_type,
        general_purpose::STANDARD.encode(&file.bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, size: usize) -> ImageFile {
        ImageFile::new("test.jpg", content_type, vec![0u8; size])
    }

    #[test]
    fn test_valid_image() {
        assert!(validate_image_file(Some(&file("image/jpeg", 1024 * 1024))).is_ok());
        assert!(validate_image_file(Some(&file("IMAGE/PNG", 10))).is_ok());
    }

    #[test]
    fn test_oversized_image() {
        let err = validate_image_file(Some(&file("image/jpeg", 6 * 1024 * 1024))).unwrap_err();
        assert!(err.to_string().contains("5MB"));
        assert!(validate_image_file(Some(&file("image/jpeg", MAX_IMAGE_BYTES))).is_ok());
    }

    #[test]
    fn test_invalid_type() {
        assert!(validate_image_file(Some(&file("application/pdf", 1024))).is_err());
        assert!(validate_image_file(Some(&file("image/gif", 1024))).is_err());
    }

    #[test]
    fn test_no_file_or_empty_file() {
        assert!(validate_image_file(None).is_err());
        assert!(validate_image_file(Some(&file("image/png", 0))).is_err());
    }

    #[test]
    fn test_data_url() {
        let f = ImageFile::new("qr.png", "image/png", b"png".to_vec());
        assert_eq!(to_data_url(&f), "data:image/png;base64,cG5n");
    }
}
