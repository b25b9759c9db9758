use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::UserRole;

pub const AUTH_API_PATH: &str = "/auth-api/v1";

/// Signup request body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub user_type: UserRole,
}

/// Signin request body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub mobile: String,
    pub user_type: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Returned by signup and signin. The token authorizes subsequent requests
/// as a `Bearer` header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub token: String,
    pub profile: UserProfile,
}
