//! Models used to create/update/load Pokemon records from the database.

pub mod upload;
pub mod validations;

use chrono::NaiveDateTime;
use diesel_derives::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
pub use upload::{ImageUpload, NewPokemon, PokemonUpload};
use utoipa::{ToResponse, ToSchema};
use validator::Validate;

use crate::models::pokemon::validations::validate_image_path;
use crate::schema::pokemon;

#[cfg_attr(
    doc,
    doc = r"
        Base Pokemon entity model.

        Used to validate queries at compile time as well as load Pokemon rows from the database
        (including those returned by insert and update queries).
    "
)]
#[cfg_attr(not(doc), doc = "Information about a Pokemon")]
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize, ToSchema, ToResponse,
)]
#[diesel(table_name = pokemon, check_for_backend(diesel::pg::Pg))]
#[serde(deny_unknown_fields)]
#[response(
    description = "Pokemon information",
    example = json!({
        "id": 1,
        "name": "Bulbasaur",
        "type": "Grass",
        "power": 45,
        "created_at": "2024-11-28T13:30:48",
        "updated_at": "2024-11-28T13:30:48",
        "image": "images/1732800648.jpg"
    }),
)]
pub struct Pokemon {
    /// Unique id of this Pokemon in the database
    pub id: i64,

    /// Pokemon name
    #[schema(example = "Bulbasaur")]
    pub name: String,

    /// Pokemon type
    #[serde(rename = "type")]
    #[schema(example = "Grass")]
    pub type_: String,

    /// Pokemon power
    #[schema(example = 45)]
    pub power: i32,

    /// When the Pokemon was created
    pub created_at: Option<NaiveDateTime>,

    /// When the Pokemon was last updated
    pub updated_at: Option<NaiveDateTime>,

    /// Path of the Pokemon's image, relative to public storage
    #[schema(example = "images/1732800648.jpg")]
    pub image: String,
}

/// Model used to insert a new Pokemon in the database.
///
/// Built from a validated [`NewPokemon`] once its image has been stored (see
/// [`NewPokemon::with_image`]). Timestamps are set by the database.
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = pokemon)]
pub struct CreatePokemon {
    /// Pokemon name
    pub name: String,

    /// Pokemon type
    pub type_: String,

    /// Pokemon power
    pub power: i32,

    /// Path of the stored image, relative to public storage (`images/<filename>`)
    pub image: String,
}

#[cfg_attr(
    doc,
    doc = r#"
        Model used to update some fields of a Pokemon in the database.

        Only `name`, `type`, `power` and `image` can be updated; any other field in the request
        body (including `id` and the timestamps) is rejected. Fields that are not specified are
        left untouched.
    "#
)]
#[cfg_attr(not(doc), doc = "Information to update specific fields of a Pokemon")]
#[derive(
    Debug, Clone, Default, PartialEq, Eq, AsChangeset, Serialize, Deserialize, Validate, ToSchema,
)]
#[diesel(table_name = pokemon)]
#[serde(deny_unknown_fields)]
#[schema(example = json!({
    "power": 60
}))]
pub struct PatchPokemon {
    /// Pokemon name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Pikachu")]
    pub name: Option<String>,

    /// Pokemon type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Electric")]
    pub type_: Option<String>,

    /// Pokemon power
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 60)]
    pub power: Option<i32>,

    /// Path of the Pokemon's image, relative to public storage; must be `images/<filename>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_image_path")]
    #[schema(example = "images/1732800648.jpg")]
    pub image: Option<String>,
}

impl PatchPokemon {
    /// Returns `true` if no field would be updated by this patch.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.type_.is_none() && self.power.is_none() && self.image.is_none()
    }
}
