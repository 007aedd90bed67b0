//! # Record Store
//!
//! Hosted Postgres behind a PostgREST endpoint (Supabase style).
//!
//! ## Tables
//!
//! - `kocs`: one row per KOC registration
//! - `brands`: one row per Brand registration
//!
//! Both tables assign `id`, `created_at` and `updated_at` themselves and enforce
//! the `industry_type` / `sales_method` enums as column types.
//!
//! ## Requests
//!
//! - insert: `POST /rest/v1/{table}` with `Prefer: return=representation`
//! - listing: `GET /rest/v1/{table}?select=..&order=created_at.desc`
//!
//! No pagination, no retries, no timeouts beyond the HTTP client defaults.
//!
//! When no endpoint is configured the server falls back to [`MemoryStore`], which
//! behaves the same way but forgets everything on restart.
use std::{
    cmp::Reverse,
    collections::HashMap,
    future::Future,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{config::Config, models::Entity};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed store payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Unavailable(String),
}

impl StoreError {
    /// The remote error's own message, if it has a usable one.
    pub fn user_message(&self) -> Option<String> {
        let message = match self {
            StoreError::Transport(err) => err.to_string(),
            StoreError::Rejected { message, .. } => message.clone(),
            StoreError::Unavailable(message) => message.clone(),
            StoreError::Decode(_) => return None,
        };

        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

pub trait RecordStore: Send + Sync {
    /// Persists one record and returns the id the store assigned.
    fn insert<E: Entity>(
        &self,
        record: &E::New,
    ) -> impl Future<Output = Result<Uuid, StoreError>> + Send;

    /// Every row of the entity's projection, newest first.
    fn select<E: Entity>(&self) -> impl Future<Output = Result<Vec<E::Row>, StoreError>> + Send;
}

pub enum Store {
    Rest(RestStore),
    Memory(MemoryStore),
}

pub fn init_store(config: &Config) -> Result<Store, StoreError> {
    match (&config.store_url, &config.store_key) {
        (Some(url), Some(key)) => {
            info!("Using remote store at {url}");
            Ok(Store::Rest(RestStore::new(url, key)?))
        }
        (Some(url), None) => Err(StoreError::Unavailable(format!(
            "Store key missing for {url}"
        ))),
        (None, _) => {
            warn!("No store configured, registrations will be kept in memory");
            Ok(Store::Memory(MemoryStore::new()))
        }
    }
}

impl RecordStore for Store {
    async fn insert<E: Entity>(&self, record: &E::New) -> Result<Uuid, StoreError> {
        match self {
            Store::Rest(store) => store.insert::<E>(record).await,
            Store::Memory(store) => store.insert::<E>(record).await,
        }
    }

    async fn select<E: Entity>(&self) -> Result<Vec<E::Row>, StoreError> {
        match self {
            Store::Rest(store) => store.select::<E>().await,
            Store::Memory(store) => store.select::<E>().await,
        }
    }
}

pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct Created {
    id: Uuid,
}

#[derive(Deserialize, Default)]
struct RemoteError {
    message: Option<String>,
    details: Option<String>,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

async fn body_of(response: Response) -> Result<String, StoreError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    let remote: RemoteError = serde_json::from_str(&body).unwrap_or_default();
    let message = remote
        .message
        .or(remote.details)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());

    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

impl RecordStore for RestStore {
    async fn insert<E: Entity>(&self, record: &E::New) -> Result<Uuid, StoreError> {
        let response = self
            .request(Method::POST, E::TABLE)
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await?;

        let body = body_of(response).await?;
        let created: Vec<Created> = serde_json::from_str(&body)?;

        let id = created
            .into_iter()
            .next()
            .map(|created| created.id)
            .ok_or_else(|| StoreError::Unavailable("Store returned no record".to_string()))?;

        debug!("Inserted {} {id}", E::TABLE);
        Ok(id)
    }

    async fn select<E: Entity>(&self) -> Result<Vec<E::Row>, StoreError> {
        let response = self
            .request(Method::GET, E::TABLE)
            .query(&[
                ("select", E::PROJECTION.join(",")),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;

        let body = body_of(response).await?;

        Ok(serde_json::from_str(&body)?)
    }
}

/// In-process tables with the same contract as the remote store.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<&'static str, Vec<Map<String, Value>>>>,
    failure: Mutex<Option<String>>,
    inserts: AtomicUsize,
    selects: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request fails with `message` until [`MemoryStore::recover`].
    pub fn fail_with(&self, message: impl Into<String>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(message.into());
        }
    }

    pub fn recover(&self) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = None;
        }
    }

    /// Insert requests received, failed ones included.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    pub fn len(&self, table: &str) -> usize {
        self.tables
            .lock()
            .map(|tables| tables.get(table).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        let failure = self
            .failure
            .lock()
            .map_err(|_| StoreError::Unavailable("Store lock poisoned".to_string()))?;

        match failure.as_ref() {
            Some(message) => Err(StoreError::Rejected {
                status: 400,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn created_at(row: &Map<String, Value>) -> Option<DateTime<Utc>> {
    row.get("created_at")
        .and_then(Value::as_str)
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|value| value.with_timezone(&Utc))
}

impl RecordStore for MemoryStore {
    async fn insert<E: Entity>(&self, record: &E::New) -> Result<Uuid, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let Value::Object(mut row) = serde_json::to_value(record)? else {
            return Err(StoreError::Unavailable(format!(
                "{} record is not an object",
                E::TABLE
            )));
        };

        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        row.insert("id".to_string(), Value::String(id.to_string()));
        row.insert("created_at".to_string(), Value::String(now.clone()));
        row.insert("updated_at".to_string(), Value::String(now));

        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("Store lock poisoned".to_string()))?
            .entry(E::TABLE)
            .or_default()
            .push(row);

        Ok(id)
    }

    async fn select<E: Entity>(&self) -> Result<Vec<E::Row>, StoreError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut rows: Vec<Map<String, Value>> = self
            .tables
            .lock()
            .map_err(|_| StoreError::Unavailable("Store lock poisoned".to_string()))?
            .get(E::TABLE)
            .map(|rows| rows.iter().rev().cloned().collect())
            .unwrap_or_default();

        // stable, so equal timestamps keep newest-inserted first
        rows.sort_by_key(|row| Reverse(created_at(row)));

        rows.into_iter()
            .map(|row| {
                let projected: Map<String, Value> = E::PROJECTION
                    .iter()
                    .map(|column| {
                        let value = row.get(*column).cloned().unwrap_or(Value::Null);
                        (column.to_string(), value)
                    })
                    .collect();

                serde_json::from_value(Value::Object(projected)).map_err(StoreError::from)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use axum::{
        Json, Router,
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
    };
    use serde_json::{Value, json};
    use tokio::net::TcpListener;
    use uuid::Uuid;

    use super::{MemoryStore, RecordStore, RestStore, StoreError};
    use crate::{
        catalog::Industry,
        fixtures::{valid_brand, valid_koc},
        models::{Brand, Entity, Koc},
        schema::Form,
    };

    /// Serves `router` on a free local port and returns its base url.
    async fn stub(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{address}")
    }

    async fn rejected_insert(status: StatusCode, body: &'static str) -> StoreError {
        let router = Router::new().route(
            "/rest/v1/brands",
            post(move || async move { (status, body) }),
        );
        let store = RestStore::new(&stub(router).await, "key").unwrap();
        let record = valid_brand().validate().unwrap();

        store.insert::<Brand>(&record).await.unwrap_err()
    }

    #[tokio::test]
    async fn test_memory_insert_then_select() {
        let store = MemoryStore::new();
        let record = valid_koc().validate().unwrap();

        let id = store.insert::<Koc>(&record).await.unwrap();
        let rows = store.select::<Koc>().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].industries, vec![Industry::Fashion, Industry::Beauty]);
        assert_eq!(rows[0].short_description, None);
        assert_eq!(store.insert_count(), 1);
        assert_eq!(store.select_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_newest_first() {
        let store = MemoryStore::new();

        for name in ["First", "Second", "Third"] {
            let mut form = valid_brand();
            form.brand_name = name.to_string();
            store.insert::<Brand>(&form.validate().unwrap()).await.unwrap();
        }

        let names: Vec<String> = store
            .select::<Brand>()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.brand_name)
            .collect();

        assert_eq!(names, vec!["Third", "Second", "First"]);
        assert_eq!(store.len("brands"), 3);
        assert_eq!(store.len("kocs"), 0);
    }

    #[tokio::test]
    async fn test_memory_failure() {
        let store = MemoryStore::new();
        store.fail_with("duplicate key value violates unique constraint");

        let record = valid_brand().validate().unwrap();
        let err = store.insert::<Brand>(&record).await.unwrap_err();
        assert_eq!(
            err.user_message().as_deref(),
            Some("duplicate key value violates unique constraint")
        );
        assert_eq!(store.len("brands"), 0);
        assert_eq!(store.insert_count(), 1);

        store.recover();
        assert!(store.insert::<Brand>(&record).await.is_ok());
    }

    #[test]
    fn test_blank_messages_are_not_user_messages() {
        let err = StoreError::Rejected {
            status: 500,
            message: "  ".to_string(),
        };
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn test_table_url() {
        let store = RestStore::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(store.table_url("kocs"), "https://abc.supabase.co/rest/v1/kocs");
    }

    #[tokio::test]
    async fn test_rest_insert_request() {
        type Seen = Arc<Mutex<Option<(HeaderMap, Value)>>>;

        let id = Uuid::new_v4();
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route(
                "/rest/v1/kocs",
                post(
                    move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        *seen.lock().unwrap() = Some((headers, body));
                        (StatusCode::CREATED, Json(json!([{ "id": id }])))
                    },
                ),
            )
            .with_state(seen.clone());

        let store = RestStore::new(&stub(router).await, "anon-key").unwrap();
        let record = valid_koc().validate().unwrap();
        assert_eq!(store.insert::<Koc>(&record).await.unwrap(), id);

        let (headers, body) = seen.lock().unwrap().take().unwrap();
        assert_eq!(headers["prefer"], "return=representation");
        assert_eq!(headers["apikey"], "anon-key");
        assert_eq!(headers["authorization"], "Bearer anon-key");

        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["full_name"], "Nguyễn Văn A");
        assert_eq!(rows[0]["industries"], json!(["Thời trang", "Làm đẹp"]));
    }

    #[tokio::test]
    async fn test_rest_select_request() {
        type Seen = Arc<Mutex<HashMap<String, String>>>;

        let seen: Seen = Arc::default();
        let router = Router::new()
            .route(
                "/rest/v1/brands",
                get(
                    |State(seen): State<Seen>, Query(params): Query<HashMap<String, String>>| async move {
                        *seen.lock().unwrap() = params;
                        Json(json!([]))
                    },
                ),
            )
            .with_state(seen.clone());

        let store = RestStore::new(&stub(router).await, "key").unwrap();
        assert!(store.select::<Brand>().await.unwrap().is_empty());

        let params = seen.lock().unwrap().clone();
        assert_eq!(params["select"], Brand::PROJECTION.join(","));
        assert_eq!(params["order"], "created_at.desc");
    }

    #[tokio::test]
    async fn test_rest_error_message() {
        let err = rejected_insert(
            StatusCode::CONFLICT,
            r#"{"message":"duplicate key value violates unique constraint \"brands_email_key\""}"#,
        )
        .await;
        assert!(matches!(err, StoreError::Rejected { status: 409, .. }));
        assert_eq!(
            err.user_message().as_deref(),
            Some("duplicate key value violates unique constraint \"brands_email_key\"")
        );

        let err = rejected_insert(
            StatusCode::BAD_REQUEST,
            r#"{"details":"Failing row contains (...)"}"#,
        )
        .await;
        assert_eq!(err.user_message().as_deref(), Some("Failing row contains (...)"));

        let err = rejected_insert(StatusCode::SERVICE_UNAVAILABLE, "").await;
        assert_eq!(err.user_message().as_deref(), Some("Service Unavailable"));
    }

    #[tokio::test]
    async fn test_rest_insert_without_representation() {
        let err = rejected_insert(StatusCode::CREATED, "[]").await;
        assert_eq!(err.user_message().as_deref(), Some("Store returned no record"));
    }
}
