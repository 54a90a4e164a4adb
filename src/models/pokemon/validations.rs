//! Helpers to validate Pokemon data.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use log::warn;
use strum_macros::{Display, EnumString, IntoStaticStr};
use validator::ValidationError;

/// Maximum number of characters in a Pokemon name (matches the `VARCHAR(200)` column).
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum number of characters in a Pokemon type (matches the `VARCHAR(100)` column).
pub const MAX_TYPE_LENGTH: usize = 100;

/// Maximum size of an uploaded Pokemon image, in kilobytes.
pub const MAX_IMAGE_KILOBYTES: usize = 2048;

/// Maximum size of an uploaded Pokemon image, in bytes.
pub const MAX_IMAGE_SIZE: usize = MAX_IMAGE_KILOBYTES * 1024;

/// File extensions accepted for uploaded Pokemon images.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["jpeg", "png", "jpg", "gif", "webp"];

/// Number of bytes needed by [`ImageFormat::detect`].
const SIGNATURE_LENGTH: usize = 12;

/// Image formats accepted for Pokemon images.
///
/// The format of an uploaded file is detected from its content (see [`ImageFormat::detect`]),
/// not from its name or declared content type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG image (`FF D8 FF`)
    Jpeg,

    /// PNG image (`89 'PNG' 0D 0A 1A 0A`)
    Png,

    /// GIF image (`'GIF87a'` or `'GIF89a'`)
    Gif,

    /// WebP image (`'RIFF' <size> 'WEBP'`)
    Webp,
}

impl ImageFormat {
    /// Detects an image format from the first bytes of a file.
    ///
    /// Returns `None` if the bytes do not start with the signature of one of the supported formats.
    pub fn detect(header: &[u8]) -> Option<Self> {
        match header {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    /// Detects the image format of the file at `path`.
    ///
    /// Files that cannot be read are treated as non-images.
    pub fn detect_file<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        let mut header = Vec::with_capacity(SIGNATURE_LENGTH);
        let read_result = std::fs::File::open(path)
            .and_then(|file| file.take(SIGNATURE_LENGTH as u64).read_to_end(&mut header));

        match read_result {
            Ok(_) => Self::detect(&header),
            Err(err) => {
                warn!("Failed to read uploaded file {}: {}", path.display(), err);
                None
            },
        }
    }

    /// Canonical file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            _ => self.into(),
        }
    }
}

/// Builds a [`ValidationError`] with the given code and message.
pub fn validation_error<M>(code: &'static str, message: M) -> ValidationError
where
    M: Into<Cow<'static, str>>,
{
    let mut validation_error = ValidationError::new(code);
    validation_error.message = Some(message.into());
    validation_error
}

/// Validates a required text field.
///
/// The value is trimmed first; a missing or blank value fails with a `required` error and a value
/// longer than `max_length` characters fails with a `max` error. Returns the trimmed value.
pub fn validate_required_text(
    field: &str,
    value: Option<&str>,
    max_length: usize,
) -> Result<String, ValidationError> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.is_empty() {
        Err(validation_error("required", format!("The {} field is required.", field)))
    } else if value.chars().count() > max_length {
        Err(validation_error(
            "max",
            format!("The {} field must not be greater than {} characters.", field, max_length),
        ))
    } else {
        Ok(value.to_string())
    }
}

/// Validates an image path given in an update: it must name a file directly inside public
/// storage's [`images`](crate::storage::IMAGES_DIR) folder (`images/<filename>`).
pub fn validate_image_path(image: &str) -> Result<(), ValidationError> {
    let file_name = image
        .strip_prefix(crate::storage::IMAGES_DIR)
        .and_then(|rest| rest.strip_prefix('/'));

    match file_name {
        Some(file_name)
            if !file_name.is_empty()
                && file_name != "."
                && file_name != ".."
                && !file_name.contains(['/', '\\']) =>
        {
            Ok(())
        },
        _ => Err(validation_error(
            "image_path",
            format!(
                "The image field must be a path of the form {}/<filename>.",
                crate::storage::IMAGES_DIR
            ),
        )),
    }
}

/// Validates the required `power` field, which must be an integer.
pub fn validate_power(value: Option<&str>) -> Result<i32, ValidationError> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.is_empty() {
        Err(validation_error("required", "The power field is required."))
    } else {
        value
            .parse()
            .map_err(|_| validation_error("integer", "The power field must be an integer."))
    }
}

/// Validates an uploaded image and returns the extension to use when storing it.
///
/// The checks are performed in this order:
///
/// 1. The file content must be one of the supported [`ImageFormat`]s.
/// 2. If the original file name has an extension, it must be one of [`ALLOWED_IMAGE_EXTENSIONS`].
/// 3. The file must not be larger than [`MAX_IMAGE_SIZE`].
///
/// The returned extension is the original one (lowercased), or the detected format's
/// [canonical extension](ImageFormat::extension) if the original file name has none.
pub fn validate_image(
    format: Option<ImageFormat>,
    file_name: Option<&str>,
    size: usize,
) -> Result<String, ValidationError> {
    let format =
        format.ok_or_else(|| validation_error("image", "The image field must be an image."))?;

    let extension = match file_name.and_then(original_extension) {
        Some(extension) if ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) => extension,
        Some(_) => {
            return Err(validation_error(
                "mimes",
                format!(
                    "The image field must be a file of type: {}.",
                    ALLOWED_IMAGE_EXTENSIONS.join(", ")
                ),
            ));
        },
        None => format.extension().to_string(),
    };

    if size > MAX_IMAGE_SIZE {
        return Err(validation_error(
            "max",
            format!(
                "The image field must not be greater than {} kilobytes.",
                MAX_IMAGE_KILOBYTES
            ),
        ));
    }

    Ok(extension)
}

/// Returns the lowercased extension of a client-provided file name, if it has one.
fn original_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .filter(|extension| !extension.is_empty())
        .map(str::to_ascii_lowercase)
}
