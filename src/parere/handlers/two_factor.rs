use crate::{auth::error::AuthError, parere::Service};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EnableTwoFactor {
    user_id: Uuid,
    /// Address the initial OTP is mailed to, best-effort.
    email: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct EnableTwoFactorResponse {
    message: String,
    #[serde(rename = "initialOTP")]
    initial_otp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DisableTwoFactor {
    user_id: Uuid,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeRequest {
    user_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/users/enable-2fa",
    request_body = EnableTwoFactor,
    responses(
        (status = 200, description = "2FA enabled", body = [EnableTwoFactorResponse], content_type = "application/json"),
        (status = 404, description = "User not found"),
    ),
    tag = "two-factor"
)]
#[instrument(skip(service, payload))]
pub async fn enable_two_factor(
    service: Extension<Service>,
    payload: Option<Json<EnableTwoFactor>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let initial_otp = service
        .enable_two_factor(request.user_id, &request.email)
        .await?;

    Ok((
        StatusCode::OK,
        Json(EnableTwoFactorResponse {
            message: "2FA enabled".to_string(),
            initial_otp,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/users/disable-2fa",
    request_body = DisableTwoFactor,
    responses(
        (status = 200, description = "2FA disabled"),
        (status = 404, description = "User not found"),
    ),
    tag = "two-factor"
)]
#[instrument(skip(service, payload))]
pub async fn disable_two_factor(
    service: Extension<Service>,
    payload: Option<Json<DisableTwoFactor>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    service.disable_two_factor(request.user_id).await?;

    Ok((StatusCode::OK, Json(json!({ "message": "2FA disabled" }))))
}

#[utoipa::path(
    post,
    path = "/users/qr-code",
    request_body = QrCodeRequest,
    responses(
        (status = 200, description = "Provisioning QR code as PNG data URL"),
        (status = 404, description = "User not found or 2FA not enabled"),
    ),
    tag = "two-factor"
)]
#[instrument(skip(service, payload))]
pub async fn qr_code(
    service: Extension<Service>,
    payload: Option<Json<QrCodeRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let qr = service.qr_code(request.user_id).await?;

    Ok((StatusCode::OK, Json(json!({ "qrCodeDataURL": qr }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_response_field_is_initial_otp_uppercased() {
        let body = serde_json::to_value(EnableTwoFactorResponse {
            message: "2FA enabled".to_string(),
            initial_otp: "123456".to_string(),
        })
        .unwrap();

        assert_eq!(body["initialOTP"], "123456");
        assert!(body.get("initial_otp").is_none());
    }

    #[test]
    fn test_requests_deserialize_camel_case() {
        let enable: EnableTwoFactor = serde_json::from_value(json!({
            "userId": "7f1c6e94-6f4e-4c6b-9e7b-0f2b3c4d5e6f",
            "email": "a@b.com"
        }))
        .unwrap();
        assert_eq!(enable.email, "a@b.com");

        let disable: Result<DisableTwoFactor, _> =
            serde_json::from_value(json!({ "user_id": "nope" }));
        assert!(disable.is_err());
    }
}
