use crate::{
    auth::error::AuthError,
    parere::{
        handlers::{valid_email, valid_password, SessionResponse, MIN_PASSWORD_LENGTH},
        Service,
    },
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserSignup {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/users/signup",
    request_body = UserSignup,
    responses(
        (status = 201, description = "Registration successful", body = [SessionResponse], content_type = "application/json"),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "User with the specified email already exists"),
    ),
    tag = "users"
)]
#[instrument(skip(service, payload))]
pub async fn signup(
    service: Extension<Service>,
    payload: Option<Json<UserSignup>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(user)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    if !valid_email(&user.email) {
        return Err(AuthError::Validation("Invalid email format".to_string()));
    }

    if !valid_password(&user.password) {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    let session = service
        .signup(user.first_name, user.last_name, user.email, user.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new("Registration successful", session)),
    ))
}
