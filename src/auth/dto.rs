use serde::{Deserialize, Serialize};

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Generic outcome message for signup/login/logout.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Login state shown on the home page.
#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// The protected marketplace listings page.
#[derive(Debug, Serialize)]
pub struct ListingsResponse {
    pub title: String,
    pub greeting: String,
}
