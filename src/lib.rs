//! Library crate of the Pokemon manager web application.
//!
//! Contains everything needed to serve the Pokemon management endpoints: database access, image
//! storage, models, services and the HTTP layer. The binary crates only wire these together.
//!
//! For more information, see `README.md`.

#![cfg_attr(backtrace_support, feature(error_generic_member_access))]
#![warn(missing_docs)]

pub mod api;
pub mod db;
pub mod error;
pub mod helpers;
pub mod models;
pub mod schema;
pub mod service_env;
pub mod services;
pub mod storage;

use actix_multipart::form::MultipartFormConfig;
use actix_web::web::ServiceConfig;
use actix_web_validator::{JsonConfig, PathConfig};
pub use error::Error;
pub use error::Result;
use log::trace;

use crate::api::errors::actix_error_handler;
use crate::db::Pool;
use crate::storage::ImageStorage;

/// Creates an [`App`](actix_web::App) serving the Pokemon manager endpoints.
///
/// Takes a database connection [`Pool`] and an [`ImageStorage`]; both are cloned for each worker.
/// This is a macro because the concrete type of an `actix_web` [`App`](actix_web::App) cannot be
/// easily named.
///
/// # Examples
///
/// ```no_run
/// use actix_web::HttpServer;
/// use pokemon_manager::db::get_pool;
/// use pokemon_manager::pokemon_app;
/// use pokemon_manager::storage::get_image_storage;
///
/// # async fn example() -> anyhow::Result<()> {
/// let pool = get_pool()?;
/// let storage = get_image_storage()?;
///
/// HttpServer::new(move || pokemon_app!(pool, storage))
///     .bind(("127.0.0.1", 8080))?
///     .run()
///     .await?;
/// #
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! pokemon_app {
    ($pool:expr, $storage:expr) => {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .configure($crate::configure_app(&$pool, &$storage))
    };
}

/// Registers the Pokemon manager endpoints and extractor configurations.
///
/// Called automatically from [`pokemon_app`].
pub fn configure_app<'a>(
    pool: &'a Pool,
    storage: &'a ImageStorage,
) -> impl FnOnce(&mut ServiceConfig) + 'a {
    |config| {
        trace!("Registering extractor error handlers");
        config
            .app_data(JsonConfig::default().error_handler(actix_error_handler))
            .app_data(PathConfig::default().error_handler(actix_error_handler))
            .app_data(MultipartFormConfig::default().error_handler(actix_error_handler));

        config.configure(api::doc::configure);
        config.configure(api::configure(pool, storage));
    }
}
