use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::auth::session::{SessionKeys, SESSION_COOKIE};
use crate::state::AppState;

/// Extracts the session cookie and validates it, returning the username.
/// Routes that only display login state take `Option<SessionUser>`.
pub struct SessionUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or((StatusCode::UNAUTHORIZED, "not logged in".into()))?;

        let keys = SessionKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|_| {
            warn!("invalid or expired session");
            (
                StatusCode::UNAUTHORIZED,
                "invalid or expired session".to_string(),
            )
        })?;

        Ok(SessionUser(claims.sub))
    }
}
