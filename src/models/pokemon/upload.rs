//! Multipart form used to create a Pokemon with its image.

use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::text::Text;
use actix_multipart::form::MultipartForm;
use tempfile::NamedTempFile;
use validator::{ValidationError, ValidationErrors};

use crate::models::pokemon::validations::{
    validate_image, validate_power, validate_required_text, validation_error, ImageFormat,
    MAX_NAME_LENGTH, MAX_TYPE_LENGTH,
};
use crate::models::pokemon::CreatePokemon;

/// `multipart/form-data` body submitted to create a new Pokemon.
///
/// Every field is optional at the extraction level so that [`validate_upload`](PokemonUpload::validate_upload)
/// can report all missing or invalid fields at once.
#[derive(Debug, MultipartForm)]
pub struct PokemonUpload {
    /// Pokemon name
    pub name: Option<Text<String>>,

    /// Pokemon type
    #[multipart(rename = "type")]
    pub type_: Option<Text<String>>,

    /// Pokemon power; parsed as an integer during validation
    pub power: Option<Text<String>>,

    /// Pokemon image, stored in a temporary file until it is moved to public storage
    pub image: Option<TempFile>,
}

/// Validated Pokemon information, minus its image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPokemon {
    /// Pokemon name (trimmed)
    pub name: String,

    /// Pokemon type (trimmed)
    pub type_: String,

    /// Pokemon power
    pub power: i32,
}

impl NewPokemon {
    /// Turns this into a [`CreatePokemon`] that can be inserted, using the given image path.
    pub fn with_image<S: Into<String>>(self, image: S) -> CreatePokemon {
        CreatePokemon { name: self.name, type_: self.type_, power: self.power, image: image.into() }
    }
}

/// A validated uploaded image, waiting to be moved to public storage.
#[derive(Debug)]
pub struct ImageUpload {
    /// Temporary file containing the image
    pub file: NamedTempFile,

    /// Extension to use for the stored file (without the leading `.`)
    pub extension: String,
}

impl PokemonUpload {
    /// Validates the submitted form.
    ///
    /// On success, returns the Pokemon information and its image. Otherwise, returns a
    /// [`Validation`](crate::Error::Validation) error listing every failing field.
    ///
    /// | Field   | Rules                                                                   |
    /// |---------|-------------------------------------------------------------------------|
    /// | `name`  | required, at most 200 characters                                        |
    /// | `type`  | required, at most 100 characters                                        |
    /// | `power` | required, integer                                                       |
    /// | `image` | required, jpeg/png/gif/webp content, allowed extension, at most 2048 KB |
    pub fn validate_upload(self) -> crate::Result<(NewPokemon, ImageUpload)> {
        let mut errors = ValidationErrors::new();

        let name = check(
            &mut errors,
            "name",
            validate_required_text("name", text_value(&self.name), MAX_NAME_LENGTH),
        );
        let type_ = check(
            &mut errors,
            "type",
            validate_required_text("type", text_value(&self.type_), MAX_TYPE_LENGTH),
        );
        let power = check(&mut errors, "power", validate_power(text_value(&self.power)));
        let image = match self.image {
            Some(temp_file) if temp_file.size > 0 => {
                let format = ImageFormat::detect_file(temp_file.file.path());
                let result = validate_image(format, temp_file.file_name.as_deref(), temp_file.size);

                check(&mut errors, "image", result)
                    .map(|extension| ImageUpload { file: temp_file.file, extension })
            },
            _ => check(
                &mut errors,
                "image",
                Err(validation_error("required", "The image field is required.")),
            ),
        };

        match (name, type_, power, image) {
            (Some(name), Some(type_), Some(power), Some(image)) => {
                Ok((NewPokemon { name, type_, power }, image))
            },
            _ => Err(errors.into()),
        }
    }
}

fn text_value(field: &Option<Text<String>>) -> Option<&str> {
    field.as_ref().map(|text| text.0.as_str())
}

fn check<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    result: Result<T, ValidationError>,
) -> Option<T> {
    result.map_err(|err| errors.add(field, err)).ok()
}
