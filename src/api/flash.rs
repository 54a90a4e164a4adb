//! Flash messages: short-lived success messages shown once after a redirect.
//!
//! A mutating endpoint [redirects](redirect_with_flash) to the Pokemon listing and stores its
//! message in the [`FLASH_COOKIE`] cookie. The listing endpoint then [takes](take_flash) the
//! message and sends a [removal cookie](removal_cookie) so that it is only shown once.

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};

/// Name of the cookie storing the pending flash message.
pub const FLASH_COOKIE: &str = "pokemon_success";

/// Returns a `302 Found` response redirecting to `location`, with a pending flash `message`.
///
/// # Examples
///
/// ```
/// use actix_http::StatusCode;
/// use pokemon_manager::api::flash::{redirect_with_flash, FLASH_COOKIE};
///
/// let response = redirect_with_flash("/pokemon", "Pokemon created successfully.");
///
/// assert_eq!(StatusCode::FOUND, response.status());
/// assert_eq!(
///     Some("Pokemon created successfully.".to_string()),
///     response.cookies().find(|cookie| cookie.name() == FLASH_COOKIE).map(|cookie| cookie.value().to_string()),
/// );
/// ```
pub fn redirect_with_flash(location: &str, message: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(flash_cookie(message))
        .finish()
}

/// Returns the pending flash message sent with `request`, if any.
pub fn take_flash(request: &HttpRequest) -> Option<String> {
    request
        .cookie(FLASH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|message| !message.is_empty())
}

/// Returns a cookie that clears the pending flash message in the client.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = flash_cookie("");
    cookie.make_removal();
    cookie
}

fn flash_cookie(message: &str) -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, message.to_string())
        .path("/")
        .http_only(true)
        .finish()
}
