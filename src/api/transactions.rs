use crate::api::{ApiClient, ApiError, ApiRequest, ApiResponse};
use crate::model::{CashbookData, CashbookParams, PartyRole, Slip, Transaction, TransactionPayload};
use serde::de::IgnoredAny;

/// `GET /transactions`
pub async fn list(client: &ApiClient) -> Result<ApiResponse<Vec<Transaction>>, ApiError> {
    client.send(ApiRequest::get("transactions")).await
}

/// `GET /transactions/:id`
pub async fn get(client: &ApiClient, id: u64) -> Result<ApiResponse<Transaction>, ApiError> {
    client
        .send(ApiRequest::get(format!("transactions/{id}")))
        .await
}

/// `POST /transactions`
pub async fn create(
    client: &ApiClient,
    payload: &TransactionPayload,
) -> Result<ApiResponse<IgnoredAny>, ApiError> {
    client
        .send(ApiRequest::post("transactions").json(payload)?)
        .await
}

/// `PATCH /transactions/:id`
pub async fn update(
    client: &ApiClient,
    id: u64,
    payload: &TransactionPayload,
) -> Result<ApiResponse<IgnoredAny>, ApiError> {
    client
        .send(ApiRequest::patch(format!("transactions/{id}")).json(payload)?)
        .await
}

/// `DELETE /transactions/:id`
pub async fn delete(client: &ApiClient, id: u64) -> Result<ApiResponse<IgnoredAny>, ApiError> {
    client
        .send(ApiRequest::delete(format!("transactions/{id}")))
        .await
}

/// `GET /transactions/:id/slip?type=lender|borrower`
pub async fn slip(
    client: &ApiClient,
    id: u64,
    role: PartyRole,
) -> Result<ApiResponse<Slip>, ApiError> {
    client
        .send(
            ApiRequest::get(format!("transactions/{id}/slip"))
                .query(vec![("type".to_string(), role.to_string())]),
        )
        .await
}

/// `GET /transactions/cashbook`. Filters that are not set are left out of the query.
pub async fn cashbook(
    client: &ApiClient,
    params: &CashbookParams,
) -> Result<ApiResponse<CashbookData>, ApiError> {
    client
        .send(ApiRequest::get("transactions/cashbook").query(params.query_pairs()))
        .await
}
