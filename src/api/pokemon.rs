//! Implementation of the Pokemon management endpoints.
//!
//! # Endpoints
//!
//! | HTTP method | Endpoint             | Usage                                               | See                       |
//! |-------------|----------------------|-----------------------------------------------------|---------------------------|
//! | `GET`       | `/pokemon`           | Lists every Pokemon, with the pending flash message | [`list`]                  |
//! | `GET`       | `/pokemon/create`    | Returns the empty create form                       | [`create_form`]           |
//! | `POST`      | `/pokemon`           | Creates a Pokemon from a multipart form             | [`create`]                |
//! | `GET`       | `/pokemon/{id}/edit` | Returns the edit form, pre-filled                   | [`edit_form`]             |
//! | `PUT`       | `/pokemon/{id}`      | Updates some fields of a Pokemon                    | [`update`]                |
//! | `PATCH`     | `/pokemon/{id}`      | Same as `PUT`                                       | [`patch`](struct@patch)   |
//! | `DELETE`    | `/pokemon/{id}`      | Deletes a Pokemon                                   | [`delete`](struct@delete) |
//!
//! Mutating endpoints answer with a `302 Found` redirect to `/pokemon` carrying a
//! [flash message](crate::api::flash).

pub mod doc;
pub mod views;

use std::ops::Deref;

use actix_multipart::form::MultipartForm;
use actix_web::web::{self, Data, ServiceConfig};
use actix_web::{delete, get, patch, post, put, HttpRequest, HttpResponse};
use actix_web_validator::{Json, Path};
use log::trace;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

use crate::api::flash::{redirect_with_flash, removal_cookie, take_flash};
use crate::api::pokemon::doc::{
    IdNotFoundResponse, InvalidIdParamOrPokemonBodyResponse, InvalidIdParamResponse,
    InvalidMultipartBodyResponse, PokemonUploadBody, RedirectWithFlashResponse,
    ServerErrorResponse, ValidationFailedResponse,
};
use crate::api::pokemon::views::{PokemonForm, PokemonListing};
use crate::db::Pool;
use crate::models::pokemon::{PatchPokemon, PokemonUpload};
use crate::services::pokemon;
use crate::storage::ImageStorage;

/// Path of the Pokemon listing; every mutating endpoint redirects here.
pub const POKEMON_INDEX: &str = "/pokemon";

/// Flash message set after a successful [`create`].
pub const CREATED_MESSAGE: &str = "Pokemon created successfully.";

/// Flash message set after a successful [`update`] or [`patch`](struct@patch).
pub const UPDATED_MESSAGE: &str = "Pokemon updated successfully.";

/// Flash message set after a successful [`delete`](struct@delete).
pub const DELETED_MESSAGE: &str = "Pokemon deleted successfully.";

/// Allows registration of all Pokemon endpoints.
///
/// See [module documentation](self) for the entire list of supported endpoints.
/// Called automatically from [`api::configure`](crate::api::configure).
pub fn configure<'a>(
    pool: &'a Pool,
    storage: &'a ImageStorage,
) -> impl FnOnce(&mut ServiceConfig) + 'a {
    |config| {
        trace!("Registering Pokemon service app data");
        config.app_data(Data::new(pokemon::Service::new(pool.clone(), storage.clone())));

        trace!("Adding CRUD endpoints for /pokemon");
        config
            .service(list)
            .service(create_form)
            .service(create)
            .service(edit_form)
            .service(update)
            .service(patch)
            .service(delete);
    }
}

/// [`Result`](crate::Result) definition used to return [`HttpResponse`]s from endpoints.
///
/// If an [`Error`](crate::Error) is returned, it is converted to an appropriate [`HttpResponse`]
/// by the error handling code (see [`ErrorResponse::from`](crate::api::errors::ErrorResponse::from) for details).
pub type HttpResult = crate::Result<HttpResponse>;

/// Path parameter used for endpoints with a Pokemon id.
///
/// Any integer is accepted; an id that matches no row (negative ones included) yields a 404.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Validate, IntoParams)]
pub struct Id {
    /// id of Pokemon in database
    pub id: i64,
}

impl Deref for Id {
    type Target = i64;

    fn deref(&self) -> &Self::Target {
        &self.id
    }
}

#[cfg_attr(
    doc,
    doc = r"
        Endpoint listing every Pokemon.

        Registered as `GET /pokemon`.

        # Output

        A [`PokemonListing`], serialized as JSON. Its `success` field contains the flash message
        left by the previous mutating request, if any; the message is then cleared by sending back
        a removal cookie.
    "
)]
#[cfg_attr(not(doc), doc = "Lists every Pokemon")]
#[utoipa::path(
    context_path = "/pokemon",
    responses(
        (status = OK, response = PokemonListing),
        ServerErrorResponse,
    ),
)]
#[get("", name = "/")]
pub async fn list(request: HttpRequest, service: Data<pokemon::Service>) -> HttpResult {
    let pokemon = service.get_ref().list_pokemon().await?;
    let success = take_flash(&request);

    let mut response = HttpResponse::Ok();
    if success.is_some() {
        response.cookie(removal_cookie());
    }

    Ok(response.json(PokemonListing { pokemon, success }))
}

/// Returns the empty form used to create a Pokemon. Registered as `GET /pokemon/create`.
#[utoipa::path(
    context_path = "/pokemon",
    responses(
        (status = OK, response = PokemonForm),
    ),
)]
#[get("/create", name = "/create")]
pub async fn create_form() -> HttpResponse {
    HttpResponse::Ok().json(PokemonForm::create())
}

#[cfg_attr(
    doc,
    doc = r"
        Endpoint creating a new Pokemon.

        Registered as `POST /pokemon`.

        # Input

        A `multipart/form-data` body (see [`PokemonUpload`]) with fields `name`, `type`, `power`
        and `image`. Every failing field is reported at once; nothing is stored in that case.

        # Output

        A redirect to `/pokemon` with the flash message [`CREATED_MESSAGE`]. The image is moved to
        public storage as `images/<unix-timestamp>.<extension>`.
    "
)]
#[cfg_attr(not(doc), doc = "Creates a new Pokemon")]
#[utoipa::path(
    context_path = "/pokemon",
    request_body(
        content = inline(PokemonUploadBody),
        content_type = "multipart/form-data",
        description = "New Pokemon information and image",
    ),
    responses(
        RedirectWithFlashResponse,
        InvalidMultipartBodyResponse,
        ValidationFailedResponse,
        ServerErrorResponse,
    ),
)]
#[post("", name = "/")]
pub async fn create(
    upload: MultipartForm<PokemonUpload>,
    service: Data<pokemon::Service>,
) -> HttpResult {
    // Validation reads the uploaded file to detect its format.
    let upload = upload.into_inner();
    let (new_pokemon, image) = web::block(move || upload.validate_upload()).await??;
    service.get_ref().create_pokemon(new_pokemon, image).await?;

    Ok(redirect_with_flash(POKEMON_INDEX, CREATED_MESSAGE))
}

#[cfg_attr(
    doc,
    doc = r"
        Endpoint returning the form used to edit a Pokemon.

        Registered as `GET /pokemon/{id}/edit`.

        # Input

        - `{id}`: ID of Pokemon to edit.

        # Output

        A [`PokemonForm`] pre-filled with the Pokemon's current values, serialized as JSON.
    "
)]
#[cfg_attr(not(doc), doc = "Returns the form used to edit a Pokemon")]
#[utoipa::path(
    context_path = "/pokemon",
    params(Id),
    responses(
        (status = OK, response = PokemonForm),
        InvalidIdParamResponse,
        IdNotFoundResponse,
        ServerErrorResponse,
    ),
)]
#[get("/{id}/edit", name = "/{id}/edit")]
pub async fn edit_form(id: Path<Id>, service: Data<pokemon::Service>) -> HttpResult {
    let pokemon = service.get_ref().get_pokemon(*id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PokemonForm::edit(pokemon)))
}

#[cfg_attr(
    doc,
    doc = r"
        Endpoint updating some fields of a Pokemon.

        Registered as `PUT /pokemon/{id}`; [`patch`](struct@patch) does the same thing.

        # Input

        - `{id}`: ID of Pokemon to update.
        - Request body: the fields to update, as a JSON-serialized [`PatchPokemon`]. Only `name`,
                        `type`, `power` and `image` are accepted; any other field rejects the
                        request. Omitted fields keep their current value.

        # Output

        A redirect to `/pokemon` with the flash message [`UPDATED_MESSAGE`].
    "
)]
#[cfg_attr(not(doc), doc = "Updates some fields of a Pokemon")]
#[utoipa::path(
    context_path = "/pokemon",
    params(Id),
    request_body(
        content = inline(PatchPokemon),
        description = "Pokemon fields to update",
    ),
    responses(
        RedirectWithFlashResponse,
        InvalidIdParamOrPokemonBodyResponse,
        IdNotFoundResponse,
        ValidationFailedResponse,
        ServerErrorResponse,
    ),
)]
#[put("/{id}", name = "/{id}")]
pub async fn update(
    id: Path<Id>,
    pokemon_patch: Json<PatchPokemon>,
    service: Data<pokemon::Service>,
) -> HttpResult {
    update_pokemon(id, pokemon_patch, service).await
}

/// Updates some fields of a Pokemon. Registered as `PATCH /pokemon/{id}`; see [`update`].
#[utoipa::path(
    context_path = "/pokemon",
    params(Id),
    request_body(
        content = inline(PatchPokemon),
        description = "Pokemon fields to update",
    ),
    responses(
        RedirectWithFlashResponse,
        InvalidIdParamOrPokemonBodyResponse,
        IdNotFoundResponse,
        ValidationFailedResponse,
        ServerErrorResponse,
    ),
)]
#[patch("/{id}", name = "/{id}")]
pub async fn patch(
    id: Path<Id>,
    pokemon_patch: Json<PatchPokemon>,
    service: Data<pokemon::Service>,
) -> HttpResult {
    update_pokemon(id, pokemon_patch, service).await
}

async fn update_pokemon(
    id: Path<Id>,
    pokemon_patch: Json<PatchPokemon>,
    service: Data<pokemon::Service>,
) -> HttpResult {
    service
        .get_ref()
        .update_pokemon(*id.into_inner(), &pokemon_patch)
        .await?;

    Ok(redirect_with_flash(POKEMON_INDEX, UPDATED_MESSAGE))
}

#[cfg_attr(
    doc,
    doc = r"
        Endpoint deleting a Pokemon.

        Registered as `DELETE /pokemon/{id}`. The Pokemon's image is left in public storage.

        # Input

        - `{id}`: ID of Pokemon to delete.

        # Output

        A redirect to `/pokemon` with the flash message [`DELETED_MESSAGE`].
    "
)]
#[cfg_attr(not(doc), doc = "Deletes a Pokemon")]
#[utoipa::path(
    context_path = "/pokemon",
    params(Id),
    responses(
        RedirectWithFlashResponse,
        InvalidIdParamResponse,
        IdNotFoundResponse,
        ServerErrorResponse,
    ),
)]
#[delete("/{id}", name = "/{id}")]
pub async fn delete(id: Path<Id>, service: Data<pokemon::Service>) -> HttpResult {
    service.get_ref().delete_pokemon(*id.into_inner()).await?;

    Ok(redirect_with_flash(POKEMON_INDEX, DELETED_MESSAGE))
}
