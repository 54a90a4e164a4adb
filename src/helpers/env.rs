//! Environment variable readers returning typed [`EnvVarError`]s.

use std::env;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::error::EnvVarError;

/// Loads the `.env` file of the current directory (or a parent) if there is one.
///
/// Returns `Ok(false)` when no `.env` file exists; a file that exists but cannot be parsed is
/// an error.
pub fn load_optional_dotenv() -> dotenvy::Result<bool> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(true),
        Err(err) if err.not_found() => Ok(false),
        Err(err) => Err(err),
    }
}

/// Reads an environment variable that may be absent.
///
/// Absence gives `Ok(None)`; a value that is not valid unicode gives
/// [`EnvVarError::NotUnicode`].
pub fn optional_env_var(key: &str) -> Result<Option<String>, EnvVarError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Reads a required integer environment variable.
///
/// Absence gives [`EnvVarError::NotFound`] and a non-integer value gives
/// [`EnvVarError::IntExpected`], so callers can fall back to a default on the former only.
pub fn int_env_var<T>(key: &str) -> Result<T, EnvVarError>
where
    T: FromStr<Err = ParseIntError>,
{
    let value = optional_env_var(key)?.ok_or(EnvVarError::NotFound)?;

    value
        .parse()
        .map_err(|source| EnvVarError::IntExpected { value, source })
}
