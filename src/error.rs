//! [`Error`] type definition for the Pokemon manager.

use std::env;
use std::ffi::OsString;
use std::io;
use std::num::ParseIntError;

use actix_web::error::BlockingError;
use diesel_async::pooled_connection::deadpool::PoolError;
use validator::ValidationErrors;

use crate::forward_from;

/// [`Result`](core::result::Result) type for our crate.
///
/// Uses our crate's [`Error`] type automatically.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type used throughout this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error that occurred when loading data from an environment variable.
    #[error("error related to environment variable: {context}")]
    EnvVar {
        /// Environment variable error context.
        ///
        /// Used by the code (via [`EnvVarContext::with_env_var_context`]) to provide context for the error.
        context: String,

        /// Source of the environment error.
        source: EnvVarError,

        /// [`Backtrace`](std::backtrace::Backtrace) indicating where the error occurred.
        ///
        /// Will only contain useful information if backtrace is enabled (see
        /// [`Backtrace::capture`](std::backtrace::Backtrace::capture)).
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// Error caused by invalid user input that was rejected by an extractor
    /// (bad `id` path parameter, malformed JSON body, unknown fields, etc.)
    #[error("input parsing error")]
    Input {
        /// Source of the input error.
        #[from]
        source: actix_web_validator::error::Error,

        /// [`Backtrace`](std::backtrace::Backtrace) indicating where the error occurred.
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// Error caused by a malformed `multipart/form-data` request body.
    #[error("multipart form error")]
    Multipart {
        /// Source of the multipart error.
        #[from]
        source: actix_multipart::MultipartError,

        /// [`Backtrace`](std::backtrace::Backtrace) indicating where the error occurred.
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// Submitted Pokemon data failed one or more validation rules.
    ///
    /// Every failing field is listed in the [`ValidationErrors`]; see
    /// [`PokemonUpload::validate_upload`](crate::models::pokemon::PokemonUpload::validate_upload).
    #[error("validation failed")]
    Validation {
        /// The failing fields and their rule violations.
        #[from]
        source: ValidationErrors,

        /// [`Backtrace`](std::backtrace::Backtrace) indicating where the error occurred.
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// Error related to the database connection pool.
    ///
    /// See [`PoolError`](deadpool::managed::PoolError) (and the inner [`diesel_async::pooled_connection::PoolError`])
    /// for more information.
    #[error("database connection error")]
    Pool {
        /// Source of the pool error.
        #[from]
        source: PoolError,

        /// [`Backtrace`](std::backtrace::Backtrace) indicating where the error occurred.
        ///
        /// Will only contain useful information if backtrace is enabled (see
        /// [`Backtrace::capture`](std::backtrace::Backtrace::capture)).
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// Error that occurred while performing a database query using [`diesel`].
    #[error("query error: {context}")]
    Query {
        /// Query error context.
        ///
        /// Used by the code (via [`QueryContext::with_query_context`]) to provide some context
        /// as to the type of query that caused the error.
        context: String,

        /// Source of the query error.
        source: diesel::result::Error,

        /// [`Backtrace`](std::backtrace::Backtrace) indicating where the error occurred.
        ///
        /// Will only contain useful information if backtrace is enabled (see
        /// [`Backtrace::capture`](std::backtrace::Backtrace::capture)).
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// Error that occurred while writing to or removing from public image storage.
    #[error("storage error: {context}")]
    Storage {
        /// Storage error context.
        ///
        /// Provided via [`StorageContext::with_storage_context`].
        context: String,

        /// Source of the storage error.
        source: io::Error,

        /// [`Backtrace`](std::backtrace::Backtrace) indicating where the error occurred.
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },

    /// A task sent to the blocking thread pool (see [`actix_web::web::block`]) was canceled.
    #[error("blocking task canceled")]
    Blocking {
        /// Source of the blocking error.
        #[from]
        source: BlockingError,

        /// [`Backtrace`](std::backtrace::Backtrace) indicating where the error occurred.
        #[cfg(backtrace_support)]
        backtrace: std::backtrace::Backtrace,
    },
}

/// Error type used for errors related to environment variables.
///
/// This is our variant of [`VarError`], with additional variants for our specific use cases.
/// In particular, a [`From`] `impl` is provided to be able to convert a [`VarError`] to this type.
///
/// [`VarError`]: env::VarError
#[derive(Debug, thiserror::Error)]
pub enum EnvVarError {
    /// The environment variable did not exist.
    ///
    /// This is our equivalent for [`VarError::NotPresent`](env::VarError::NotPresent).
    #[error("variable not found in environment")]
    NotFound,

    /// The environment variable could not be parsed to a Rust string because it contains
    /// invalid Unicode characters.
    ///
    /// This is our equivalent for [`VarError::NotUnicode`](env::VarError::NotUnicode).
    #[error("variable contained invalid, non-Unicode characters")]
    NotUnicode(OsString),

    /// The environment variable was expected to contain an int value, but didn't.
    #[error("expected int value, found {value}")]
    IntExpected {
        /// The actual value found in the environment variable.
        value: String,

        /// The parsing error that occurred when we tried to parse the value as an int.
        source: ParseIntError,
    },
}

impl From<env::VarError> for EnvVarError {
    /// Converts an `std` [`VarError`] to our intermediate [`EnvVarError`] type.
    ///
    /// [`VarError`]: env::VarError
    fn from(value: env::VarError) -> Self {
        match value {
            env::VarError::NotPresent => Self::NotFound,
            env::VarError::NotUnicode(os_str) => Self::NotUnicode(os_str),
        }
    }
}

/// Helper trait to provide context for [`EnvVar`](Error::EnvVar) errors.
pub trait EnvVarContext {
    /// Type of output returned by [`with_env_var_context`](EnvVarContext::with_env_var_context).
    type Output;

    /// Provides context about the error that occurred.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::env;
    ///
    /// use pokemon_manager::error::EnvVarContext;
    ///
    /// # fn example() -> pokemon_manager::Result<()> {
    /// let db_url = env::var("DATABASE_URL")
    ///     .with_env_var_context(|| "DATABASE_URL environment variable should be set")?;
    /// #
    /// # Ok(())
    /// # }
    /// ```
    fn with_env_var_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<E> EnvVarContext for E
where
    E: Into<EnvVarError>,
{
    type Output = Error;

    fn with_env_var_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        Error::EnvVar {
            context: (context)().into(),
            source: self.into(),
            #[cfg(backtrace_support)]
            backtrace: std::backtrace::Backtrace::capture(),
        }
    }
}

impl<T, E> EnvVarContext for core::result::Result<T, E>
where
    E: EnvVarContext<Output = Error>,
{
    type Output = Result<T>;

    fn with_env_var_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.with_env_var_context(context))
    }
}

forward_from!(diesel_async::pooled_connection::PoolError => PoolError => Error);

impl<E> From<deadpool::managed::BuildError<E>> for Error
where
    E: Into<Error>,
{
    /// Converts a [`BuildError`](deadpool::managed::BuildError) into our [`Error`] type.
    ///
    /// This makes it possible to use `?` when building a connection pool.
    fn from(value: deadpool::managed::BuildError<E>) -> Self {
        match value {
            deadpool::managed::BuildError::Backend(err) => err.into(),
            deadpool::managed::BuildError::NoRuntimeSpecified(msg) => {
                panic!("Runtime should be specified in Cargo.toml: {}", msg);
            },
        }
    }
}

/// Helper trait to provide context for [`Query`](Error::Query) errors.
pub trait QueryContext {
    /// Type of output returned by [`with_query_context`](QueryContext::with_query_context).
    type Output;

    /// Provides context about the query performed when the error occurred.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use diesel::QueryDsl;
    /// use diesel_async::RunQueryDsl;
    /// use pokemon_manager::error::QueryContext;
    /// # use pokemon_manager::db::get_pool;
    /// use pokemon_manager::models::pokemon::Pokemon;
    /// use pokemon_manager::schema::pokemon;
    ///
    /// # async fn example(pokemon_id: i64) -> pokemon_manager::Result<()> {
    /// # let pool = get_pool()?;
    /// # let mut connection = pool.get().await?;
    /// #
    /// let found: Pokemon = pokemon::table
    ///     .find(pokemon_id)
    ///     .first(&mut connection)
    ///     .await
    ///     .with_query_context(|| format!("failed to fetch pokemon with id {}", pokemon_id))?;
    /// #
    /// # Ok(())
    /// # }
    /// ```
    fn with_query_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl QueryContext for diesel::result::Error {
    type Output = Error;

    fn with_query_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        Error::Query {
            context: (context)().into(),
            source: self,
            #[cfg(backtrace_support)]
            backtrace: std::backtrace::Backtrace::capture(),
        }
    }
}

impl<T, E> QueryContext for core::result::Result<T, E>
where
    E: QueryContext<Output = Error>,
{
    type Output = Result<T>;

    fn with_query_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.with_query_context(context))
    }
}

/// Helper trait to provide context for [`Storage`](Error::Storage) errors.
pub trait StorageContext {
    /// Type of output returned by [`with_storage_context`](StorageContext::with_storage_context).
    type Output;

    /// Provides context about the filesystem operation performed when the error occurred.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs;
    ///
    /// use pokemon_manager::error::StorageContext;
    ///
    /// # fn example() -> pokemon_manager::Result<()> {
    /// fs::create_dir_all("public/images")
    ///     .with_storage_context(|| "failed to create images directory")?;
    /// #
    /// # Ok(())
    /// # }
    /// ```
    fn with_storage_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl StorageContext for io::Error {
    type Output = Error;

    fn with_storage_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        Error::Storage {
            context: (context)().into(),
            source: self,
            #[cfg(backtrace_support)]
            backtrace: std::backtrace::Backtrace::capture(),
        }
    }
}

impl<T, E> StorageContext for core::result::Result<T, E>
where
    E: StorageContext<Output = Error>,
{
    type Output = Result<T>;

    fn with_storage_context<C, F>(self, context: F) -> Self::Output
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.with_storage_context(context))
    }
}
