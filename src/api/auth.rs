use crate::api::{ApiClient, ApiError, ApiRequest, ApiResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}

/// `POST /auth/login`
pub async fn login(
    client: &ApiClient,
    request: &LoginRequest,
) -> Result<ApiResponse<LoginResponse>, ApiError> {
    client
        .send(ApiRequest::post("auth/login").json(request)?)
        .await
}
