/// Form input and the rules it must pass before anything is persisted.
///
/// Rules run in a fixed order and the first failure wins.

use image::ImageFormat;
use std::path::{Path, PathBuf};

use crate::config::{
    ALLOWED_IMAGE_TYPES, MAX_DESCRIPTION_LENGTH, MAX_IMAGE_SIZE, MAX_TITLE_LENGTH, MIN_TITLE_LENGTH,
    MIN_YEAR,
};
use crate::error::ValidationError;

/// One image picked in the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub file_name: String,
    /// Declared media type, derived from the extension. `None` if unknown.
    pub media_type: Option<String>,
    /// Size in bytes at the time the file was picked
    pub size: u64,
}

impl ImageFile {
    /// Describe a file on disk without reading its contents
    pub fn from_path(path: PathBuf) -> std::io::Result<Self> {
        let size = std::fs::metadata(&path)?.len();
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let media_type = media_type_for(&path);

        Ok(Self {
            path,
            file_name,
            media_type,
            size,
        })
    }
}

/// Media type implied by a file's extension
pub fn media_type_for(path: &Path) -> Option<String> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Raw form input as collected by the Add Art view
#[derive(Debug, Clone, Default)]
pub struct ArtworkForm {
    pub title: String,
    pub description: String,
    pub year: i32,
    pub link: Option<String>,
    pub images: Vec<ImageFile>,
}

/// Check every rule in order, stopping at the first violation
pub fn validate(form: &ArtworkForm, current_year: i32) -> Result<(), ValidationError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }

    let title_length = title.chars().count();
    if title_length < MIN_TITLE_LENGTH {
        return Err(ValidationError::TitleTooShort {
            min: MIN_TITLE_LENGTH,
        });
    }
    if title_length > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong {
            max: MAX_TITLE_LENGTH,
        });
    }

    if form.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::DescriptionTooLong {
            max: MAX_DESCRIPTION_LENGTH,
        });
    }

    if form.images.is_empty() {
        return Err(ValidationError::ImageRequired);
    }

    if let Some(image) = form.images.iter().find(|image| !is_allowed_type(image)) {
        return Err(ValidationError::InvalidImageType {
            file_name: image.file_name.clone(),
        });
    }

    if let Some(image) = form.images.iter().find(|image| image.size > MAX_IMAGE_SIZE) {
        return Err(ValidationError::ImageTooLarge {
            file_name: image.file_name.clone(),
        });
    }

    if !(MIN_YEAR..=current_year).contains(&form.year) {
        return Err(ValidationError::YearOutOfRange {
            min: MIN_YEAR,
            max: current_year,
        });
    }

    Ok(())
}

fn is_allowed_type(image: &ImageFile) -> bool {
    image
        .media_type
        .as_deref()
        .is_some_and(|media_type| ALLOWED_IMAGE_TYPES.contains(&media_type))
}
