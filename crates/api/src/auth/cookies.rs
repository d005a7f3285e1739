//! Session cookies for browser clients.
//!
//! Tokens are mirrored into HttpOnly cookies so the web app never handles
//! them in script. API clients can ignore the cookies and use the JSON body.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

pub const ACCESS_COOKIE: &str = "saivd_access_token";
pub const REFRESH_COOKIE: &str = "saivd_refresh_token";

/// An HttpOnly, `SameSite=Lax` cookie scoped to the whole site.
pub fn session_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .secure(secure)
        .build()
}

/// Add both session cookies to `jar`.
pub fn set_session(
    jar: CookieJar,
    access_token: &str,
    access_max_age_secs: i64,
    refresh_token: &str,
    refresh_max_age_secs: i64,
    secure: bool,
) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_COOKIE,
        access_token.to_string(),
        access_max_age_secs,
        secure,
    ))
    .add(session_cookie(
        REFRESH_COOKIE,
        refresh_token.to_string(),
        refresh_max_age_secs,
        secure,
    ))
}

/// Expire both session cookies, whether or not the request carried them.
pub fn clear_session(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(removal_cookie(ACCESS_COOKIE, secure))
        .add(removal_cookie(REFRESH_COOKIE, secure))
}

fn removal_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new(), 0, secure);
    cookie.make_removal();
    cookie
}

/// A non-empty cookie value from the request.
pub fn read_cookie(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}
