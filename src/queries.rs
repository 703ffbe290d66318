//! Cache-aware reads and writes.
//!
//! Reads are served from the `QueryCache` while fresh and retried once when they fail for a reason
//! other than a 401. Writes are never retried; when one succeeds, the cached families it affects
//! are invalidated so the next read goes back to the server.

use crate::api::{self, ApiClient, ApiError, ApiResponse, Part};
use crate::cache::{CacheStats, QueryCache, QueryKey};
use crate::model::{
    CashbookEntry, CashbookParams, Company, CreateCompanyPayload, Customer, PartyRole, Slip,
    Transaction, TransactionPayload,
};
use serde::de::IgnoredAny;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// How long a read stays fresh.
pub const STALE_TIME: Duration = Duration::from_secs(5 * 60);
/// The cashbook changes more often than the other lists.
pub const CASHBOOK_STALE_TIME: Duration = Duration::from_secs(30);
/// Extra attempts made for a failed read.
pub const QUERY_RETRIES: u32 = 1;

fn companies_key() -> QueryKey {
    QueryKey::new("companies")
}

fn customers_key() -> QueryKey {
    QueryKey::new("customers")
}

fn transactions_key() -> QueryKey {
    QueryKey::new("transactions")
}

fn cashbook_key() -> QueryKey {
    QueryKey::new("cashbook")
}

#[derive(Clone)]
pub struct Queries {
    client: ApiClient,
    cache: Arc<Mutex<QueryCache>>,
}

impl Queries {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            cache: Arc::new(Mutex::new(QueryCache::new())),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }

    /// Forgets every cached read.
    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }

    async fn query<T, F, Fut>(&self, key: QueryKey, stale_time: Duration, fetch: F) -> Result<T, ApiError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<ApiResponse<T>, ApiError>>,
    {
        let cached = self.cache.lock().await.get::<T>(&key);
        if let Some(value) = cached {
            debug!("Serving {key} from the cache");
            return Ok(value);
        }

        let mut attempt = 0;
        let value = loop {
            match fetch().await {
                Ok(response) => break response.data,
                Err(e) if attempt < QUERY_RETRIES && e.is_retryable() => {
                    attempt += 1;
                    warn!("Fetching {key} failed, retrying: {e}");
                }
                Err(e) => return Err(e),
            }
        };

        self.cache
            .lock()
            .await
            .insert(key, value.clone(), stale_time);
        Ok(value)
    }

    async fn mutate<T, Fut>(&self, request: Fut, invalidate: &[QueryKey]) -> Result<ApiResponse<T>, ApiError>
    where
        Fut: Future<Output = Result<ApiResponse<T>, ApiError>>,
    {
        let response = request.await?;
        let mut cache = self.cache.lock().await;
        for key in invalidate {
            let dropped = cache.invalidate(key);
            debug!("Invalidated {key} ({dropped} cached entries)");
        }
        Ok(response)
    }

    pub async fn companies(&self) -> Result<Vec<Company>, ApiError> {
        self.query(companies_key(), STALE_TIME, move || api::companies::list(&self.client))
            .await
    }

    pub async fn create_company(
        &self,
        payload: &CreateCompanyPayload,
    ) -> Result<ApiResponse<Company>, ApiError> {
        self.mutate(
            api::companies::create(&self.client, payload),
            &[companies_key()],
        )
        .await
    }

    pub async fn customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.query(customers_key(), STALE_TIME, move || api::customers::list(&self.client))
            .await
    }

    pub async fn create_customer(&self, parts: Vec<Part>) -> Result<ApiResponse<Customer>, ApiError> {
        self.mutate(
            api::customers::create(&self.client, parts),
            &[customers_key()],
        )
        .await
    }

    pub async fn toggle_customer_status(&self, id: u64) -> Result<ApiResponse<IgnoredAny>, ApiError> {
        self.mutate(
            api::customers::toggle_status(&self.client, id),
            &[customers_key()],
        )
        .await
    }

    pub async fn delete_customer(&self, id: u64) -> Result<ApiResponse<IgnoredAny>, ApiError> {
        self.mutate(api::customers::delete(&self.client, id), &[customers_key()])
            .await
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        self.query(transactions_key(), STALE_TIME, move || {
            api::transactions::list(&self.client)
        })
        .await
    }

    pub async fn transaction(&self, id: u64) -> Result<Transaction, ApiError> {
        self.query(transactions_key().with(id), STALE_TIME, move || {
            api::transactions::get(&self.client, id)
        })
        .await
    }

    /// Creating, updating or deleting a transaction also moves the cashbook.
    pub async fn create_transaction(
        &self,
        payload: &TransactionPayload,
    ) -> Result<ApiResponse<IgnoredAny>, ApiError> {
        self.mutate(
            api::transactions::create(&self.client, payload),
            &[transactions_key(), cashbook_key()],
        )
        .await
    }

    pub async fn update_transaction(
        &self,
        id: u64,
        payload: &TransactionPayload,
    ) -> Result<ApiResponse<IgnoredAny>, ApiError> {
        self.mutate(
            api::transactions::update(&self.client, id, payload),
            &[transactions_key(), transactions_key().with(id), cashbook_key()],
        )
        .await
    }

    pub async fn delete_transaction(&self, id: u64) -> Result<ApiResponse<IgnoredAny>, ApiError> {
        self.mutate(
            api::transactions::delete(&self.client, id),
            &[transactions_key(), cashbook_key()],
        )
        .await
    }

    pub async fn slip(&self, id: u64, role: PartyRole) -> Result<Slip, ApiError> {
        let key = transactions_key()
            .with("slip")
            .with(id)
            .with(role.to_string());
        self.query(key, STALE_TIME, move || {
            api::transactions::slip(&self.client, id, role)
        })
        .await
    }

    /// Each filter combination is cached separately.
    pub async fn cashbook(&self, params: &CashbookParams) -> Result<Vec<CashbookEntry>, ApiError> {
        let client = &self.client;
        let entries = self
            .query(params.cache_key(), CASHBOOK_STALE_TIME, move || async move {
                let response = api::transactions::cashbook(client, params).await?;
                Ok(ApiResponse {
                    success: response.success,
                    message: response.message,
                    data: response.data.into_entries(),
                })
            })
            .await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RawResponse;
    use crate::model::{ApStatus, Amount, TransactionType};
    use crate::router::Route;
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_reads_are_cached() {
        let env = TestEnv::new().await;
        let queries = env.queries();
        assert_eq!(queries.companies().await.unwrap().len(), 2);
        assert_eq!(queries.companies().await.unwrap().len(), 2);
        assert_eq!(env.server.count("companies").await, 1);
        assert_eq!(queries.cache_stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_create_company_invalidates_list() {
        let env = TestEnv::new().await;
        let queries = env.queries();
        queries.companies().await.unwrap();
        queries
            .create_company(&CreateCompanyPayload {
                company_name: "Coral Leasing".into(),
                company_desc: None,
            })
            .await
            .unwrap();
        let companies = queries.companies().await.unwrap();
        assert_eq!(companies.len(), 3);
        assert_eq!(env.server.count("companies").await, 3);
    }

    #[tokio::test]
    async fn test_toggle_invalidates_once_on_success() {
        let env = TestEnv::new().await;
        let queries = env.queries();
        queries.customers().await.unwrap();
        let before = queries.cache_stats().await.invalidations;

        queries.toggle_customer_status(2).await.unwrap();
        assert_eq!(queries.cache_stats().await.invalidations, before + 1);

        let customers = queries.customers().await.unwrap();
        assert!(!customers.iter().find(|c| c.id == 2).unwrap().is_active);
    }

    #[tokio::test]
    async fn test_failed_toggle_does_not_invalidate() {
        let env = TestEnv::new().await;
        let queries = env.queries();
        queries.customers().await.unwrap();
        let before = queries.cache_stats().await.invalidations;

        env.server
            .force_next(RawResponse::new(500, r#"{"message":"boom"}"#))
            .await;
        assert!(queries.toggle_customer_status(2).await.is_err());
        assert_eq!(queries.cache_stats().await.invalidations, before);

        // still served from the cache
        queries.customers().await.unwrap();
        assert_eq!(env.server.count("customers").await, 1);
    }

    #[tokio::test]
    async fn test_mutations_are_not_retried() {
        let env = TestEnv::new().await;
        env.server
            .force_next(RawResponse::new(503, "unavailable"))
            .await;
        assert!(env.queries().delete_customer(3).await.is_err());
        assert_eq!(env.server.count("customers/3").await, 1);
    }

    #[tokio::test]
    async fn test_reads_retry_once() {
        let env = TestEnv::new().await;
        env.server.force_next(RawResponse::new(502, "")).await;
        assert_eq!(env.queries().transactions().await.unwrap().len(), 2);
        assert_eq!(env.server.count("transactions").await, 2);

        env.queries().clear().await;
        env.server.force_next(RawResponse::new(502, "")).await;
        env.server.force_next(RawResponse::new(502, "")).await;
        let e = env.queries().transactions().await.unwrap_err();
        assert!(matches!(e, ApiError::Server { status: 502, .. }));
        assert_eq!(env.server.count("transactions").await, 4);
    }

    #[tokio::test]
    async fn test_401_is_not_retried_and_signs_out() {
        let env = TestEnv::new().await;
        env.server
            .force_next(RawResponse::new(401, r#"{"message":"Unauthorized"}"#))
            .await;
        let e = env.queries().customers().await.unwrap_err();
        assert!(e.is_unauthorized());
        assert_eq!(env.server.count("customers").await, 1);
        assert!(!env.context.session().is_signed_in().await);
        assert_eq!(env.context.navigator().current().await, Route::SignIn);
    }

    #[tokio::test]
    async fn test_transaction_update_invalidates_single_and_cashbook() {
        let env = TestEnv::new().await;
        let queries = env.queries();
        let tx = queries.transaction(1).await.unwrap();
        queries.cashbook(&CashbookParams::default()).await.unwrap();

        let payload = TransactionPayload {
            company_id: 1,
            transaction_type: TransactionType::M,
            transaction_number_type: 2,
            transaction_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            month: None,
            amount_in_thousands: Amount::from(120i64),
            a_p_status: ApStatus::Past,
            lender_ids: tx.lender_ids(),
            borrower_ids: tx.borrower_ids(),
            interest_recieved: None,
            interest_paid: None,
            comission_percentage: vec![],
            remarks: None,
        };
        queries.update_transaction(1, &payload).await.unwrap();

        let updated = queries.transaction(1).await.unwrap();
        assert_eq!(updated.transaction_type, TransactionType::M);
        assert_eq!(env.server.count("transactions/1").await, 3);
        queries.cashbook(&CashbookParams::default()).await.unwrap();
        assert_eq!(env.server.count("transactions/cashbook").await, 2);
    }

    #[tokio::test]
    async fn test_cashbook_filters_are_cached_separately() {
        let env = TestEnv::new().await;
        let queries = env.queries();
        let all = queries.cashbook(&CashbookParams::default()).await.unwrap();
        let acme = CashbookParams {
            company_id: Some(1),
            ..CashbookParams::default()
        };
        let filtered = queries.cashbook(&acme).await.unwrap();
        queries.cashbook(&acme).await.unwrap();
        assert!(filtered.len() < all.len());
        assert_eq!(env.server.count("transactions/cashbook").await, 2);
        let requests = env.server.requests().await;
        assert!(requests[0].query.is_empty());
        assert_eq!(requests[1].query, vec![("companyId".to_string(), "1".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cashbook_goes_stale_after_thirty_seconds() {
        let env = TestEnv::new().await;
        let queries = env.queries();
        queries.cashbook(&CashbookParams::default()).await.unwrap();
        tokio::time::advance(Duration::from_secs(20)).await;
        queries.cashbook(&CashbookParams::default()).await.unwrap();
        assert_eq!(env.server.count("transactions/cashbook").await, 1);

        tokio::time::advance(Duration::from_secs(11)).await;
        queries.cashbook(&CashbookParams::default()).await.unwrap();
        assert_eq!(env.server.count("transactions/cashbook").await, 2);

        // the company list is still fresh at this point
        queries.companies().await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        queries.companies().await.unwrap();
        assert_eq!(env.server.count("companies").await, 1);
    }
}
