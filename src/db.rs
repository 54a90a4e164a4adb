//! PostgreSQL connection pool for the `pokemon` table.

use std::env;

use diesel::pg::Pg;
use diesel::PgConnection;
use diesel_async::pooled_connection::deadpool::Object;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

use crate::error::{EnvVarContext, EnvVarError};
use crate::helpers::env::int_env_var;

/// Database backend (Postgres).
pub type Backend = Pg;

/// Blocking connection, used by `run_migrations` and integration test cleanup.
pub type SyncConnection = PgConnection;

/// Async connection used by the services.
pub type Connection = AsyncPgConnection;

/// [`deadpool`] pool of [`Connection`]s, cloned into every actix worker.
pub type Pool = diesel_async::pooled_connection::deadpool::Pool<Connection>;

/// Connection checked out of a [`Pool`]; derefs to a [`Connection`].
pub type PooledConnection = Object<Connection>;

/// Name of the main database, last segment of [`get_db_url`].
pub const DB_NAME: &str = "pokemon";

/// Reads the connection URL from `DATABASE_URL` (required).
pub fn get_db_url() -> crate::Result<String> {
    env::var("DATABASE_URL")
        .with_env_var_context(|| "DATABASE_URL environment variable must be set")
}

/// Reads the optional pool size limit from `MAX_POOL_SIZE`.
///
/// `Ok(None)` leaves the limit to [`deadpool`]'s default.
pub fn get_max_pool_size() -> crate::Result<Option<usize>> {
    match int_env_var("MAX_POOL_SIZE") {
        Ok(value) => Ok(Some(value)),
        Err(EnvVarError::NotFound) => Ok(None),
        Err(err) => {
            Err(err.with_env_var_context(|| "failed to parse environment variable MAX_POOL_SIZE"))
        },
    }
}

/// Builds the connection [`Pool`] from `DATABASE_URL` and `MAX_POOL_SIZE`.
///
/// No connection is opened until the first [`Pool::get`].
pub fn get_pool() -> crate::Result<Pool> {
    let manager = AsyncDieselConnectionManager::new(get_db_url()?);
    let pool_builder = Pool::builder(manager);

    let pool_builder = match get_max_pool_size()? {
        Some(max_size) => pool_builder.max_size(max_size),
        None => pool_builder,
    };

    Ok(pool_builder.build()?)
}

/// Derives the test database URL from the main one.
///
/// | Main database                 | Test database                           |
/// |-------------------------------|-----------------------------------------|
/// | `...@pokemon-db:5432/pokemon` | `...@pokemon-db-test:5432/pokemon-test` |
/// | `...@localhost:5432/pokemon`  | `...@localhost:5433/pokemon-test`       |
///
/// A database name other than [`DB_NAME`] is kept as is.
pub fn get_test_db_url(db_url: &str) -> String {
    let mut test_db_url = db_url.replace("pokemon-db:", "pokemon-db-test:");
    if test_db_url == db_url {
        test_db_url = test_db_url.replace(":5432/", ":5433/");
    }

    match test_db_url.strip_suffix(&format!("/{}", DB_NAME)) {
        Some(base_url) => format!("{}/{}-test", base_url, DB_NAME),
        None => test_db_url,
    }
}
