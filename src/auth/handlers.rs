use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{HomeResponse, ListingsResponse, LoginRequest, MessageResponse, SignupRequest},
        extractors::SessionUser,
        services::is_valid_email,
        session::{SessionKeys, SESSION_COOKIE},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/listings", get(listings))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<Json<MessageResponse>, (axum::http::StatusCode, String)> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if payload.username.is_empty() || payload.username.len() > 50 {
        warn!("invalid username");
        return Err((
            axum::http::StatusCode::BAD_REQUEST,
            "Invalid username".into(),
        ));
    }

    if !is_valid_email(&payload.email) || payload.email.len() > 100 {
        warn!(email = %payload.email, "invalid email");
        return Err((axum::http::StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((
            axum::http::StatusCode::BAD_REQUEST,
            "Password too short".into(),
        ));
    }

    if !state
        .auth
        .register(&payload.username, &payload.password, &payload.email)
        .await
    {
        // One generic message no matter which constraint fired.
        return Err((
            axum::http::StatusCode::CONFLICT,
            "Signup failed, user may already exist".into(),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Signup successful".into(),
    }))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), (axum::http::StatusCode, String)> {
    payload.username = payload.username.trim().to_string();

    if !state.auth.validate(&payload.username, &payload.password).await {
        warn!(user = %payload.username, "login rejected");
        return Err((
            axum::http::StatusCode::UNAUTHORIZED,
            "Invalid credentials".into(),
        ));
    }

    let keys = SessionKeys::from_ref(&state);
    let token = match keys.issue(&payload.username) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "session issue failed");
            return Err((axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(keys.ttl.as_secs() as i64));

    info!(user = %payload.username, "user logged in");
    Ok((
        jar.add(cookie),
        Json(MessageResponse {
            message: "Login successful".into(),
        }),
    ))
}

#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    (
        jar.remove(cookie),
        Json(MessageResponse {
            message: "Logged out".into(),
        }),
    )
}

pub async fn home(user: Option<SessionUser>) -> Json<HomeResponse> {
    match user {
        Some(SessionUser(username)) => Json(HomeResponse {
            authenticated: true,
            username: Some(username),
        }),
        None => Json(HomeResponse {
            authenticated: false,
            username: None,
        }),
    }
}

pub async fn listings(SessionUser(username): SessionUser) -> Json<ListingsResponse> {
    Json(ListingsResponse {
        title: "Marketplace Listings".into(),
        greeting: format!("Hello {}, welcome to the Vault!", username),
    })
}
