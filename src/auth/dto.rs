use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo::User;
use crate::glucose::Gender;

/// Request body for user registration. Biometrics are collected up front so
/// predictions can derive age and BMI later.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub gender: Gender,
    pub birth_year: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub gender: String,
    pub birth_year: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            gender: u.gender,
            birth_year: u.birth_year,
            height_cm: u.height_cm,
            weight_kg: u.weight_kg,
        }
    }
}
