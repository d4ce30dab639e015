use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    error::AppError,
    extractors::{AppJson, IdParam},
    state::AppState,
    users::{
        dto::{CreateUserRequest, MessageEnvelope, UpdateUserRequest, UserEnvelope, UsersEnvelope},
        repo_types::User,
        validation::{validate_password_plaintext, validate_profile, validate_user},
    },
    validator::Validator,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(show_user).put(update_user).delete(delete_user))
}

/// Hashes `plain` onto `user` once its length is acceptable. A rejected
/// password is reported together with the other field errors, unhashed.
fn set_password(user: &mut User, plain: &str, state: &AppState) -> Result<(), AppError> {
    let mut v = Validator::new();
    validate_password_plaintext(&mut v, plain);
    if !v.is_empty() {
        validate_profile(&mut v, user);
        return Err(AppError::Validation(v.into_field_map()));
    }
    user.password.set(plain, &state.hasher)?;
    Ok(())
}

/// Validates a user carrying a freshly hashed credential, then drops the
/// plaintext whatever the outcome.
fn check_user(user: &mut User) -> Result<(), AppError> {
    let mut v = Validator::new();
    let outcome = validate_user(&mut v, user);
    user.password.clear_plaintext();
    outcome?;
    if !v.is_empty() {
        return Err(AppError::Validation(v.into_field_map()));
    }
    Ok(())
}

#[instrument(skip(state, input))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let mut user = User::new(input.email, input.username);
    set_password(&mut user, &input.password, &state)?;
    check_user(&mut user)?;

    let user = state.users.insert(user).await?;

    info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(UserEnvelope { user })))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersEnvelope>, AppError> {
    let users = state.users.get_all().await?;
    Ok(Json(UsersEnvelope { users }))
}

#[instrument(skip(state))]
pub async fn show_user(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Json<UserEnvelope>, AppError> {
    let user = state.users.get(id).await?;
    Ok(Json(UserEnvelope { user }))
}

#[instrument(skip(state, input))]
pub async fn update_user(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>, AppError> {
    let mut user = state.users.get(id).await?;

    if let Some(username) = input.username {
        user.username = username;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(role_id) = input.role_id {
        user.role_id = role_id;
    }
    if let Some(password) = input.password {
        set_password(&mut user, &password, &state)?;
    }
    check_user(&mut user)?;

    let user = state.users.update(user).await?;

    info!(user_id = user.id, "user updated");
    Ok(Json(UserEnvelope { user }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Json<MessageEnvelope>, AppError> {
    state.users.delete(id).await?;

    info!(user_id = id, "user deleted");
    Ok(Json(MessageEnvelope {
        message: "user successfully deleted".into(),
    }))
}
