//! OpenAPI documentation support.

use actix_web::web::ServiceConfig;
use log::trace;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::api::errors::ErrorResponse;
use crate::api::pokemon::views::{FieldKind, FormField, FormMethod, PokemonForm, PokemonListing};
use crate::models::pokemon::{PatchPokemon, Pokemon};

/// Registers the various OpenAPI-related endpoints, like swagger UI.
///
/// Called automatically from [`configure_app`](crate::configure_app).
pub fn configure(config: &mut ServiceConfig) {
    trace!("Adding OpenAPI doc endpoints");

    let openapi = ApiDoc::openapi();
    config
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
        )
        .service(Redoc::with_url("/redoc", openapi.clone()))
        .service(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"));
}

/// API documentation in OpenAPI format.
///
/// Generated automatically by the [`utoipa`] crate. To use, simply call [`ApiDoc::openapi`]
/// to create an instance, then pass it to the various helpers that allow the API doc to be
/// published, like [`SwaggerUi`].
#[derive(OpenApi)]
#[openapi(
    info(title = "Pokemon manager"),
    paths(
        api::pokemon::list,
        api::pokemon::create_form,
        api::pokemon::create,
        api::pokemon::edit_form,
        api::pokemon::update,
        api::pokemon::patch,
        api::pokemon::delete,
    ),
    components(
        schemas(
            Pokemon,
            PatchPokemon,
            PokemonListing,
            PokemonForm,
            FormField,
            FormMethod,
            FieldKind,
            ErrorResponse,
        ),
        responses(PokemonListing, PokemonForm, Pokemon, ErrorResponse),
    )
)]
pub struct ApiDoc;
