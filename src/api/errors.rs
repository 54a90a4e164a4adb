//! Types and functions to implement proper error handling in the Pokemon manager endpoints.

use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TryFromInto};
use utoipa::{ToResponse, ToSchema};

use crate::helpers::error::recursive_error_message;
use crate::service_env::ServiceEnv;
use crate::Error;

impl ResponseError for Error {
    /// Returns the [`StatusCode`] to use for this [`Error`].
    ///
    /// This function does the actual mapping between our internal errors and the resulting
    /// external HTTP [`StatusCode`].
    fn status_code(&self) -> StatusCode {
        let status_code = match self {
            Error::Validation { .. } => Some(StatusCode::UNPROCESSABLE_ENTITY),
            Error::Input { source, .. } => Some(status_code_for_input_error(source)),
            Error::Multipart { .. } => Some(StatusCode::BAD_REQUEST),
            Error::Query { source, .. } => status_code_for_query_error(source),
            _ => None,
        };

        status_code.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns an appropriate [`HttpResponse`] to return when a REST API error occurs.
    ///
    /// Uses the context of this [`Error`] to craft the response (see [`ErrorResponse::from`]).
    fn error_response(&self) -> HttpResponse<BoxBody> {
        let error_response: ErrorResponse = self.into();
        HttpResponse::build(error_response.status_code).json(error_response)
    }
}

/// Helper function to get a [`StatusCode`] for an [input error](actix_web_validator::Error).
///
/// Requests that were parsed successfully but failed [validation](validator::Validate) are
/// `422 Unprocessable Entity`; anything else is a `400 Bad Request`.
pub fn status_code_for_input_error(error: &actix_web_validator::Error) -> StatusCode {
    match error {
        actix_web_validator::Error::Validate(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Helper function to get a [`StatusCode`] for a [query error](diesel::result::Error).
///
/// If the error is due to faulty user input (like [`NotFound`](diesel::result::Error::NotFound)),
/// this method will return `Some` with an appropriate HTTP status code (like [`NOT_FOUND`](StatusCode::NOT_FOUND)).
/// Otherwise, it will return `None` and the caller can decide what status code to use.
pub fn status_code_for_query_error(error: &diesel::result::Error) -> Option<StatusCode> {
    match error {
        diesel::result::Error::NotFound => Some(StatusCode::NOT_FOUND),
        diesel::result::Error::DatabaseError(kind, ..) => match kind {
            DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::CheckViolation => {
                Some(StatusCode::BAD_REQUEST)
            },
            _ => None,
        },
        _ => None,
    }
}

#[cfg_attr(
    doc,
    doc = r"
        Struct used to return error information as JSON in [`HttpResponse`]s.

        # Notes

        The [`internal_error`](ErrorResponse::internal_error) field will only
        be populated when running in a [`Development`] environment (see [`ErrorResponse::from`]).

        [`Development`]: ServiceEnv::Development
    "
)]
#[cfg_attr(not(doc), doc = "Pokemon manager error information")]
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, ToResponse)]
#[response(
    description = "Server error",
    example = json!({
        "status_code": 500,
        "error": "Internal Server Error"
    }),
)]
pub struct ErrorResponse {
    /// HTTP status code
    #[serde_as(as = "TryFromInto<u16>")]
    #[schema(
        value_type = u16,
        minimum = 100,
        maximum = 999,
    )]
    pub status_code: StatusCode,

    /// Error message
    pub error: String,

    /// More details, when appropriate (like for deserialization or validation errors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Names of the fields that failed validation, sorted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = json!(["image", "name"]))]
    pub invalid_fields: Option<Vec<String>>,

    #[cfg_attr(
        doc,
        doc = r"
            Description of the internal error

            Only present when server is running in a [`Development`] environment.

            [`Development`]: ServiceEnv::Development
        "
    )]
    #[cfg_attr(
        not(doc),
        doc = "Description of the internal error (when server is running in development)"
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_error: Option<String>,
}

impl From<&Error> for ErrorResponse {
    /// Creates an [`ErrorResponse`] for an internal [`Error`].
    ///
    /// This will be used to create the body of the [`HttpResponse`] returned when an error occurs
    /// during a REST API call.
    ///
    /// # Service environment
    ///
    /// Unless we run in a [`Development`] environment, this function will not include any actual
    /// information about the cause of the internal error, to maintain security. In [`Development`],
    /// the [`internal_error`](ErrorResponse#structfield.internal_error) field will include more information.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::env;
    ///
    /// use actix_web::http::StatusCode;
    /// use actix_web::{HttpResponse, ResponseError};
    /// use pokemon_manager::api::errors::ErrorResponse;
    /// use pokemon_manager::error::EnvVarContext;
    /// use pokemon_manager::Error;
    ///
    /// let error = env::var("NONEXISTENT_POKEMON_ENV_VAR")
    ///     .unwrap_err()
    ///     .with_env_var_context(|| "NONEXISTENT_POKEMON_ENV_VAR should be set");
    ///
    /// let error_response: ErrorResponse = (&error).into();
    /// let http_response = HttpResponse::build(error_response.status_code).json(error_response);
    ///
    /// assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, http_response.status());
    /// ```
    ///
    /// [`Development`]: ServiceEnv::Development
    fn from(value: &Error) -> Self {
        let status_code = value.status_code();

        Self {
            status_code,
            error: status_code
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .into(),
            details: Self::generate_details(value),
            invalid_fields: Self::generate_invalid_fields(value),
            internal_error: Self::generate_internal_error(value),
        }
    }
}

impl ErrorResponse {
    /// Returns the value to use for the [`details`](ErrorResponse::details) field.
    ///
    /// This will return a value for some types of errors, like deserialization or validation
    /// errors, so that user can have more information.
    fn generate_details(error: &Error) -> Option<String> {
        match error {
            Error::Input { source, .. } => Some(format!("{}", source)),
            Error::Multipart { source, .. } => Some(format!("{}", source)),
            Error::Validation { source, .. } => Some(format!("{}", source)),
            _ => None,
        }
    }

    /// Returns the value to use for the [`invalid_fields`](ErrorResponse::invalid_fields) field.
    fn generate_invalid_fields(error: &Error) -> Option<Vec<String>> {
        let validation_errors = match error {
            Error::Validation { source, .. } => source,
            Error::Input { source: actix_web_validator::Error::Validate(source), .. } => source,
            _ => return None,
        };

        let mut fields: Vec<_> = validation_errors
            .field_errors()
            .into_keys()
            .map(String::from)
            .collect();
        fields.sort_unstable();
        Some(fields)
    }

    /// Returns the value to use for the [`internal_error`](ErrorResponse::internal_error) field.
    ///
    /// This will return `None` except when running in [`Development`](ServiceEnv::Development)
    /// environment (see [`from`](ErrorResponse::from)).
    fn generate_internal_error(error: &Error) -> Option<String> {
        if ServiceEnv::current().exposes_internal_errors() {
            Some(recursive_error_message(error))
        } else {
            None
        }
    }
}

/// Generic error handler for `actix_web` extractor configs.
///
/// Accepts any error that can be turned into our [`Error`] type (path and JSON extractor errors,
/// [`MultipartError`]s, etc.) and turns it into an [`actix_web::error::Error`]. Since [`Error`]
/// implements [`ResponseError`], extractor failures are rendered by the same code as errors
/// returned by the endpoints themselves.
///
/// # Examples
///
/// ```no_run
/// use actix_multipart::form::MultipartFormConfig;
/// use actix_web_validator::{JsonConfig, PathConfig};
/// use pokemon_manager::api::errors::actix_error_handler;
///
/// let json_config = JsonConfig::default().error_handler(actix_error_handler);
/// let path_config = PathConfig::default().error_handler(actix_error_handler);
/// let multipart_config = MultipartFormConfig::default().error_handler(actix_error_handler);
/// ```
///
/// [`MultipartError`]: actix_multipart::MultipartError
pub fn actix_error_handler<E, R>(err: E, _req: &R) -> actix_web::error::Error
where
    E: Into<Error>,
{
    Into::<Error>::into(err).into()
}
