use crate::api::{ApiClient, ApiError, ApiRequest, ApiResponse, Part};
use crate::model::Customer;
use serde::de::IgnoredAny;

/// `GET /customers`
pub async fn list(client: &ApiClient) -> Result<ApiResponse<Vec<Customer>>, ApiError> {
    client.send(ApiRequest::get("customers")).await
}

/// `POST /customers` as `multipart/form-data`.
pub async fn create(
    client: &ApiClient,
    parts: Vec<Part>,
) -> Result<ApiResponse<Customer>, ApiError> {
    client
        .send(ApiRequest::post("customers").multipart(parts))
        .await
}

/// `PATCH /customers/:id/status` flips the customer between active and inactive.
pub async fn toggle_status(
    client: &ApiClient,
    id: u64,
) -> Result<ApiResponse<IgnoredAny>, ApiError> {
    client
        .send(ApiRequest::patch(format!("customers/{id}/status")))
        .await
}

/// `DELETE /customers/:id`
pub async fn delete(client: &ApiClient, id: u64) -> Result<ApiResponse<IgnoredAny>, ApiError> {
    client
        .send(ApiRequest::delete(format!("customers/{id}")))
        .await
}
