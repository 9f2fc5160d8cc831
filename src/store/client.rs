use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::config;
use crate::contract::{Agent, Contract, Pitch, Team};
use crate::observability::store_metrics;
use crate::timeline::TimelineEvent;

use super::errors::StoreError;
use super::query::Query;
use super::records::{ContractPatch, ContractRow, RowPage};
use super::traits::ContractStore;

const PLACEHOLDER_TOKEN: &str = "your_token_here";

/// HTTP client for the hosted record store.
///
/// Reads are rate limited and list responses cached; single-record reads
/// always hit the store so mutations validate against fresh state. Writes
/// invalidate the affected list caches. There is no automatic retry: a
/// failed write surfaces to the operator, who retries manually.
#[derive(Debug)]
pub struct RecordStoreClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    workspace: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    cache: Cache<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    data: serde_json::Value,
    timestamp: u64,
}

impl RecordStoreClient {
    /// Build a client from the loaded configuration.
    pub fn new() -> Result<Self, StoreError> {
        let cfg = config().map_err(|e| StoreError::ConfigNotFound(e.to_string()))?;
        let token = Self::read_token(cfg.store.token.as_deref())?;
        if cfg.store.base_url.is_empty() {
            return Err(StoreError::ConfigNotFound(
                "Record store base URL is not configured".to_string(),
            ));
        }
        if cfg.store.workspace.is_empty() {
            return Err(StoreError::ConfigNotFound(
                "Workspace is not configured".to_string(),
            ));
        }
        Self::with_settings(
            &cfg.store.base_url,
            &token,
            &cfg.store.workspace,
            cfg.store.rate_limit.requests_per_second,
            cfg.store.rate_limit.burst_capacity,
            cfg.store.cache_ttl_seconds,
        )
    }

    /// Build a client against explicit settings; used by `init` and tests.
    pub fn from_parts(base_url: &str, token: &str, workspace: &str) -> Result<Self, StoreError> {
        Self::with_settings(base_url, token, workspace, 10, 20, 300)
    }

    pub fn with_settings(
        base_url: &str,
        token: &str,
        workspace: &str,
        requests_per_second: u32,
        burst_capacity: u32,
        cache_ttl_seconds: u64,
    ) -> Result<Self, StoreError> {
        let quota = Quota::per_second(NonZeroU32::new(requests_per_second.max(1)).unwrap())
            .allow_burst(NonZeroU32::new(burst_capacity.max(1)).unwrap());
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(cache_ttl_seconds))
            .build();

        let http = reqwest::Client::builder()
            .user_agent(concat!("dugout/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            workspace: workspace.to_string(),
            rate_limiter,
            cache,
        })
    }

    pub(crate) fn read_token(configured: Option<&str>) -> Result<String, StoreError> {
        if let Some(token) = configured {
            if !token.is_empty() && token != PLACEHOLDER_TOKEN {
                return Ok(token.to_string());
            }
        }
        if let Ok(token) = std::env::var("DUGOUT_STORE_TOKEN") {
            if !token.is_empty() && token != PLACEHOLDER_TOKEN {
                return Ok(token);
            }
        }
        Err(StoreError::TokenNotFound(
            "Record store token not found. Set DUGOUT_STORE_TOKEN or store.token in dugout.toml."
                .to_string(),
        ))
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/api/v1/workspaces/{}/{}",
            self.base_url, self.workspace, table
        )
    }

    fn row_url(&self, table: &str, id: Uuid) -> String {
        format!("{}/{}", self.table_url(table), id)
    }

    /// Liveness probe against the store, outside any workspace.
    pub async fn health(&self) -> Result<(), StoreError> {
        let url = format!("{}/api/v1/health", self.base_url);
        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn check(response: reqwest::Response) -> Result<serde_json::Value, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        if status.as_u16() == 429 {
            store_metrics().record_rate_limit_hit();
        }
        store_metrics().record_error();
        let body = response.text().await.unwrap_or_default();
        // Store errors come as {"error": "..."}; fall back to the raw body
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or(body);
        Err(StoreError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
        cache_key: Option<String>,
    ) -> Result<T, StoreError> {
        if let Some(key) = &cache_key {
            if let Some(entry) = self.cache.get(key).await {
                debug!(key = %key, "record store cache hit");
                store_metrics().record_cache_hit();
                if let Ok(value) = serde_json::from_value(entry.data) {
                    return Ok(value);
                }
            }
            store_metrics().record_cache_miss();
        }

        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;
        store_metrics().record_request();

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .await?;
        let value = Self::check(response).await?;

        if let Some(key) = cache_key {
            let entry = CacheEntry {
                data: value.clone(),
                timestamp: std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0),
            };
            self.cache.insert(key, entry).await;
        }

        Ok(serde_json::from_value(value)?)
    }

    async fn send_write<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;
        store_metrics().record_request();
        let response = request.send().await?;
        let value = Self::check(response).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Invalidate all cached entries whose key contains `pattern`.
    pub async fn invalidate_cache_pattern(&self, pattern: &str) {
        let keys_to_remove: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.contains(pattern))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        for key in keys_to_remove {
            self.cache.invalidate(&key).await;
        }

        debug!(pattern = %pattern, "invalidated cached list reads");
    }

    pub async fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    fn refine_missing(err: StoreError, table: &'static str, id: Uuid) -> StoreError {
        match err {
            StoreError::Http { status: 404, .. } => StoreError::NotFound {
                table,
                id: id.to_string(),
            },
            other => other,
        }
    }
}

#[async_trait]
impl ContractStore for RecordStoreClient {
    async fn fetch_contract(&self, id: Uuid) -> Result<Contract, StoreError> {
        let row: ContractRow = self
            .get_json(&self.row_url("contracts", id), &[], None)
            .await
            .map_err(|e| Self::refine_missing(e, "contracts", id))?;
        row.into_contract()
    }

    async fn insert_contract(&self, contract: &Contract) -> Result<Contract, StoreError> {
        let row = ContractRow::from_contract(contract);
        let created: ContractRow = self
            .send_write(
                self.http
                    .post(self.table_url("contracts"))
                    .bearer_auth(&self.token)
                    .json(&row),
            )
            .await?;
        self.invalidate_cache_pattern("list:contracts").await;
        created.into_contract()
    }

    async fn update_contract(
        &self,
        id: Uuid,
        patch: &ContractPatch,
    ) -> Result<Contract, StoreError> {
        let updated: ContractRow = self
            .send_write(
                self.http
                    .patch(self.row_url("contracts", id))
                    .bearer_auth(&self.token)
                    .json(patch),
            )
            .await
            .map_err(|e| Self::refine_missing(e, "contracts", id))?;
        self.invalidate_cache_pattern("list:contracts").await;
        updated.into_contract()
    }

    async fn list_contracts(&self, query: &Query) -> Result<Vec<Contract>, StoreError> {
        let page: RowPage<ContractRow> = self
            .get_json(
                &self.table_url("contracts"),
                &query.to_params(),
                Some(query.cache_key("contracts")),
            )
            .await?;
        page.rows.into_iter().map(ContractRow::into_contract).collect()
    }

    async fn fetch_pitch(&self, id: Uuid) -> Result<Pitch, StoreError> {
        self.get_json(&self.row_url("pitches", id), &[], None)
            .await
            .map_err(|e| Self::refine_missing(e, "pitches", id))
    }

    async fn list_pitches(&self, query: &Query) -> Result<Vec<Pitch>, StoreError> {
        let page: RowPage<Pitch> = self
            .get_json(
                &self.table_url("pitches"),
                &query.to_params(),
                Some(query.cache_key("pitches")),
            )
            .await?;
        Ok(page.rows)
    }

    async fn fetch_team(&self, id: Uuid) -> Result<Team, StoreError> {
        self.get_json(&self.row_url("teams", id), &[], None)
            .await
            .map_err(|e| Self::refine_missing(e, "teams", id))
    }

    async fn fetch_agent(&self, id: Uuid) -> Result<Agent, StoreError> {
        self.get_json(&self.row_url("agents", id), &[], None)
            .await
            .map_err(|e| Self::refine_missing(e, "agents", id))
    }

    async fn append_timeline_event(
        &self,
        event: &TimelineEvent,
    ) -> Result<TimelineEvent, StoreError> {
        let created: TimelineEvent = self
            .send_write(
                self.http
                    .post(self.table_url("timeline_events"))
                    .bearer_auth(&self.token)
                    .json(event),
            )
            .await?;
        self.invalidate_cache_pattern("list:timeline_events").await;
        Ok(created)
    }

    async fn list_timeline_events(&self, query: &Query) -> Result<Vec<TimelineEvent>, StoreError> {
        let page: RowPage<TimelineEvent> = self
            .get_json(
                &self.table_url("timeline_events"),
                &query.to_params(),
                Some(query.cache_key("timeline_events")),
            )
            .await?;
        Ok(page.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> RecordStoreClient {
        RecordStoreClient::from_parts("https://store.example/", "tok", "acme").unwrap()
    }

    #[test]
    fn test_urls_are_workspace_scoped() {
        let client = test_client();
        assert_eq!(
            client.table_url("contracts"),
            "https://store.example/api/v1/workspaces/acme/contracts"
        );
        let id = Uuid::nil();
        assert_eq!(
            client.row_url("contracts", id),
            format!("https://store.example/api/v1/workspaces/acme/contracts/{id}")
        );
    }

    #[test]
    fn test_refine_missing_maps_404_only() {
        let id = Uuid::new_v4();
        let missing = RecordStoreClient::refine_missing(
            StoreError::Http {
                status: 404,
                message: "row not found".to_string(),
            },
            "contracts",
            id,
        );
        assert!(matches!(missing, StoreError::NotFound { table: "contracts", .. }));

        let denied = RecordStoreClient::refine_missing(
            StoreError::Http {
                status: 403,
                message: "forbidden".to_string(),
            },
            "contracts",
            id,
        );
        assert!(matches!(denied, StoreError::Http { status: 403, .. }));
    }

    #[test]
    fn test_placeholder_token_is_rejected() {
        let err = RecordStoreClient::read_token(Some(PLACEHOLDER_TOKEN)).unwrap_err();
        assert!(matches!(err, StoreError::TokenNotFound(_)));
    }
}
