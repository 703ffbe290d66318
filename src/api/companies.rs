use crate::api::{ApiClient, ApiError, ApiRequest, ApiResponse};
use crate::model::{Company, CreateCompanyPayload};

/// `GET /companies`
pub async fn list(client: &ApiClient) -> Result<ApiResponse<Vec<Company>>, ApiError> {
    client.send(ApiRequest::get("companies")).await
}

/// `POST /companies`
pub async fn create(
    client: &ApiClient,
    payload: &CreateCompanyPayload,
) -> Result<ApiResponse<Company>, ApiError> {
    client
        .send(ApiRequest::post("companies").json(payload)?)
        .await
}
