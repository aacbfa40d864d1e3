use crate::{
    auth::error::AuthError,
    parere::{handlers::SessionResponse, Service},
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserLogin {
    email: String,
    password: String,
    otp: Option<String>,
}

// No shape validation on purpose: an address that never passed signup simply
// fails the lookup, and the response stays identical to a wrong password.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = UserLogin,
    responses(
        (status = 200, description = "Login successful", body = [SessionResponse], content_type = "application/json"),
        (status = 401, description = "Authentication failed"),
    ),
    tag = "users"
)]
#[instrument(skip(service, payload))]
pub async fn login(
    service: Extension<Service>,
    payload: Option<Json<UserLogin>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(user)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let session = service
        .login(&user.email, &user.password, user.otp.as_deref())
        .await?;

    Ok((
        StatusCode::OK,
        Json(SessionResponse::new("Login successful", session)),
    ))
}
