use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::error::PortalError;

pub const SESSION_COOKIE: &str = "mb_session";

/// Logged-in user carried in an encrypted cookie.
///
/// As an extractor it gates protected routes: requests without a valid
/// session are redirected to `/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: i64,
    pub user_name: String,
}

impl SessionUser {
    pub fn from_jar(jar: &PrivateCookieJar) -> Option<Self> {
        let cookie = jar.get(SESSION_COOKIE)?;
        serde_json::from_str(cookie.value()).ok()
    }

    pub fn store(
        &self,
        jar: PrivateCookieJar,
        insecure_cookie: bool,
    ) -> Result<PrivateCookieJar, PortalError> {
        let value = serde_json::to_string(self)?;
        Ok(jar.add(build_cookie(value, insecure_cookie)))
    }

    pub fn clear(jar: PrivateCookieJar) -> PrivateCookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
    }
}

fn build_cookie(value: String, insecure_cookie: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(!insecure_cookie)
        .same_site(SameSite::Lax)
        .build()
}

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        SessionUser::from_jar(&jar).ok_or_else(|| Redirect::to("/login"))
    }
}
