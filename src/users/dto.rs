use serde::{Deserialize, Serialize};

use super::repo_types::User;

/// Request body for `POST /users`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Request body for `PUT /users/:id`. Absent (or null) fields keep their
/// stored value.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UsersEnvelope {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub message: String,
}
