//! [`IntoResponses`] wrappers and request body schemas for the Pokemon endpoints.
//!
//! These helper types are only used to document the endpoints using [`utoipa::path`].

use serde::Serialize;
use utoipa::{IntoResponses, ToSchema};

use crate::api::errors::ErrorResponse;

/// [`IntoResponses`] wrapper for the redirect returned by mutating endpoints.
#[derive(Debug, IntoResponses)]
#[response(
    status = FOUND,
    description = "Redirect to the Pokemon listing, with a flash message",
    headers(
        ("Location" = String, description = "Always `/pokemon`"),
        ("Set-Cookie" = String, description = "`pokemon_success` cookie containing the flash message"),
    ),
)]
pub struct RedirectWithFlashResponse;

/// [`IntoResponses`] wrapper for bad `id` path parameter errors.
///
/// Can be used to document 400 API error responses using [`utoipa::path`].
#[derive(Debug, IntoResponses)]
#[response(status = BAD_REQUEST, description = "Invalid value for id path parameter")]
pub struct InvalidIdParamResponse;

/// [`IntoResponses`] wrapper for a malformed multipart body.
#[derive(Debug, IntoResponses)]
#[response(status = BAD_REQUEST, description = "Malformed multipart/form-data request body")]
pub struct InvalidMultipartBodyResponse;

/// [`IntoResponses`] wrapper for bad `id` path parameter OR bad Pokemon request body error.
///
/// Unknown fields in the request body are rejected with this error.
#[derive(Debug, IntoResponses)]
#[response(
    status = BAD_REQUEST,
    description = "Invalid value for id path parameter OR malformed Pokemon information in request body",
)]
pub struct InvalidIdParamOrPokemonBodyResponse;

/// [`IntoResponses`] wrapper for validation errors.
///
/// The [`invalid_fields`](ErrorResponse::invalid_fields) of the response list the failing fields.
#[derive(Debug, IntoResponses)]
#[response(
    status = UNPROCESSABLE_ENTITY,
    description = "Pokemon information failed validation",
    example = json!({
        "status_code": 422,
        "error": "Unprocessable Entity",
        "details": "image: The image field is required.",
        "invalid_fields": ["image"]
    }),
)]
pub struct ValidationFailedResponse(#[to_schema] ErrorResponse);

/// [`IntoResponses`] wrapper for `Pokemon not found` errors.
///
/// Can be used to document 404 API error responses using [`utoipa::path`].
#[derive(Debug, IntoResponses)]
#[response(status = NOT_FOUND, description = "Requested Pokemon not found in database")]
pub struct IdNotFoundResponse;

/// [`IntoResponses`] wrapper for internal server errors.
///
/// Can be used to document 5XX API error responses using [`utoipa::path`].
#[derive(Debug, IntoResponses)]
#[response(status = "5XX")]
pub struct ServerErrorResponse(#[to_response] ErrorResponse);

/// Schema of the `multipart/form-data` body accepted when creating a Pokemon.
///
/// Only used for documentation; the actual form is [`PokemonUpload`](crate::models::pokemon::PokemonUpload).
#[derive(Debug, Serialize, ToSchema)]
pub struct PokemonUploadBody {
    /// Pokemon name (at most 200 characters)
    #[schema(example = "Bulbasaur")]
    pub name: String,

    /// Pokemon type (at most 100 characters)
    #[serde(rename = "type")]
    #[schema(example = "Grass")]
    pub type_: String,

    /// Pokemon power (integer)
    #[schema(example = 45)]
    pub power: i32,

    /// Pokemon image: jpeg, png, jpg, gif or webp, at most 2048 KB
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}
