use crate::error::{Result, StorageError};
use appreg_models::LogoUpload;
use image::ImageFormat;

const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
    ImageFormat::Ico,
];

/// Identify the image format of an uploaded logo from its magic bytes.
///
/// Only the payload counts; the part's declared content type is never kept.
pub fn sniff_logo(upload: &LogoUpload) -> Result<ImageFormat> {
    if upload.is_empty() {
        return Err(StorageError::InvalidImage("empty file".to_string()));
    }

    let format = image::guess_format(&upload.data)
        .map_err(|_| StorageError::InvalidImage("unrecognised image data".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(StorageError::InvalidImage(format!("{:?} is not allowed", format)));
    }

    Ok(format)
}

pub(crate) fn extension_for(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("img")
}
