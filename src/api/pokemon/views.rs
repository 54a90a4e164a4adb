//! JSON view models returned by the Pokemon endpoints that do not redirect.

use serde::{Deserialize, Serialize};
use utoipa::{ToResponse, ToSchema};

use crate::models::pokemon::validations::{
    ALLOWED_IMAGE_EXTENSIONS, MAX_IMAGE_KILOBYTES, MAX_NAME_LENGTH, MAX_TYPE_LENGTH,
};
use crate::models::pokemon::Pokemon;

/// Content returned by the [listing endpoint](super::list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, ToResponse)]
#[response(
    description = "Every Pokemon, plus the pending flash message",
    example = json!({
        "pokemon": [
            {
                "id": 1,
                "name": "Bulbasaur",
                "type": "Grass",
                "power": 45,
                "created_at": "2024-11-28T13:30:48",
                "updated_at": "2024-11-28T13:30:48",
                "image": "images/1732800648.jpg"
            }
        ],
        "success": "Pokemon created successfully."
    }),
)]
pub struct PokemonListing {
    /// Every Pokemon in the database, ordered by id
    pub pokemon: Vec<Pokemon>,

    /// Flash message left by the previous request, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
}

/// HTTP method used to submit a [`PokemonForm`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormMethod {
    /// Used by the create form
    Post,

    /// Used by the edit form
    Put,
}

/// Kind of input expected for a [`FormField`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text
    Text,

    /// Integer value
    Number,

    /// File upload
    File,
}

/// Description of one field of a [`PokemonForm`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormField {
    /// Name of the field, as expected by the submit endpoint
    #[schema(example = "name")]
    pub name: String,

    /// Kind of input
    pub kind: FieldKind,

    /// Whether the field must be provided
    pub required: bool,

    /// Maximum number of characters, for text fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Maximum size in kilobytes, for file fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_kilobytes: Option<usize>,

    /// Accepted file extensions, for file fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<Vec<String>>,

    /// Current value of the field (edit form only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[cfg_attr(
    doc,
    doc = r"
        Descriptor of a form used to create or edit a Pokemon.

        Replaces a server-rendered view: it tells the client where and how to submit the form and
        which fields to show. The [create form](PokemonForm::create) is empty and submits
        `multipart/form-data` to `POST /pokemon`; the [edit form](PokemonForm::edit) is pre-filled
        with the Pokemon's current values and submits JSON to `PUT /pokemon/{id}`.
    "
)]
#[cfg_attr(not(doc), doc = "Form used to create or edit a Pokemon")]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, ToResponse)]
#[response(
    description = "Form descriptor",
    example = json!({
        "action": "/pokemon",
        "method": "POST",
        "enctype": "multipart/form-data",
        "fields": [
            { "name": "name", "kind": "text", "required": true, "max_length": 200 },
            { "name": "type", "kind": "text", "required": true, "max_length": 100 },
            { "name": "power", "kind": "number", "required": true },
            {
                "name": "image",
                "kind": "file",
                "required": true,
                "max_kilobytes": 2048,
                "accept": ["jpeg", "png", "jpg", "gif", "webp"]
            }
        ]
    }),
)]
pub struct PokemonForm {
    /// Path where the form must be submitted
    #[schema(example = "/pokemon")]
    pub action: String,

    /// HTTP method to use when submitting the form
    pub method: FormMethod,

    /// Encoding of the submitted body
    #[schema(example = "multipart/form-data")]
    pub enctype: String,

    /// Fields of the form
    pub fields: Vec<FormField>,

    /// Pokemon being edited (edit form only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pokemon: Option<Pokemon>,
}

impl PokemonForm {
    /// Returns the empty form used to create a new Pokemon.
    pub fn create() -> Self {
        Self {
            action: "/pokemon".into(),
            method: FormMethod::Post,
            enctype: mime::MULTIPART_FORM_DATA.to_string(),
            fields: vec![
                FormField::text("name", MAX_NAME_LENGTH, None),
                FormField::text("type", MAX_TYPE_LENGTH, None),
                FormField::number("power", None),
                FormField::image(),
            ],
            pokemon: None,
        }
    }

    /// Returns the form used to edit `pokemon`, pre-filled with its current values.
    ///
    /// Every field is optional; only the submitted ones are updated.
    pub fn edit(pokemon: Pokemon) -> Self {
        let fields = vec![
            FormField::text("name", MAX_NAME_LENGTH, Some(pokemon.name.clone())),
            FormField::text("type", MAX_TYPE_LENGTH, Some(pokemon.type_.clone())),
            FormField::number("power", Some(pokemon.power)),
            FormField { value: Some(pokemon.image.clone()), ..FormField::new("image", false) },
        ]
        .into_iter()
        .map(|field| FormField { required: false, ..field })
        .collect();

        Self {
            action: format!("/pokemon/{}", pokemon.id),
            method: FormMethod::Put,
            enctype: mime::APPLICATION_JSON.to_string(),
            fields,
            pokemon: Some(pokemon),
        }
    }
}

impl FormField {
    fn new(name: &str, required: bool) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            required,
            max_length: None,
            max_kilobytes: None,
            accept: None,
            value: None,
        }
    }

    fn text(name: &str, max_length: usize, value: Option<String>) -> Self {
        Self { max_length: Some(max_length), value, ..Self::new(name, true) }
    }

    fn number(name: &str, value: Option<i32>) -> Self {
        Self {
            kind: FieldKind::Number,
            value: value.map(|value| value.to_string()),
            ..Self::new(name, true)
        }
    }

    fn image() -> Self {
        Self {
            kind: FieldKind::File,
            max_kilobytes: Some(MAX_IMAGE_KILOBYTES),
            accept: Some(ALLOWED_IMAGE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()),
            ..Self::new("image", true)
        }
    }
}
