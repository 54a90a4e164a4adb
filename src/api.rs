//! Types and functions used to implement the Pokemon manager HTTP endpoints.

pub mod doc;
pub mod errors;
pub mod flash;
pub mod pokemon;

use actix_web::web;
use actix_web::web::ServiceConfig;
use log::trace;

use crate::db::Pool;
use crate::storage::ImageStorage;

/// Registers the Pokemon endpoints under the `/pokemon` scope.
///
/// Called automatically from [`configure_app`](crate::configure_app).
pub fn configure<'a>(
    pool: &'a Pool,
    storage: &'a ImageStorage,
) -> impl FnOnce(&mut ServiceConfig) + 'a {
    |config| {
        trace!("Adding endpoints for /pokemon");
        config.service(web::scope("/pokemon").configure(pokemon::configure(pool, storage)));
    }
}
