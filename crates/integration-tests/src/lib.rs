//! Integration tests for the variant picker.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p variant-picker-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_client` - HTTP client against a fake catalog endpoint
//! - `picker_flow` - Full picker sessions from open to confirm or cancel
//!
//! The fake endpoint is an `axum` server bound to an ephemeral port on
//! `127.0.0.1`; it records every request and answers through a caller-supplied
//! closure.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use variant_picker::config::{AppConfig, CatalogConfig};

/// Path the fake endpoint serves.
pub const SEARCH_PATH: &str = "/task/products/search";

/// API key the helpers configure clients with.
pub const TEST_API_KEY: &str = "k3y-9f8e7d";

/// How the fake endpoint answers one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with a JSON body.
    Json(serde_json::Value),
    /// Arbitrary status with a plain-text body.
    Status(u16, String),
    /// 200 with a body that is not valid JSON.
    Raw(String),
}

/// What the fake endpoint saw.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub api_key: Option<String>,
    pub params: HashMap<String, String>,
}

impl RecordedRequest {
    /// Value of query parameter `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

type Responder = dyn Fn(&HashMap<String, String>) -> Reply + Send + Sync;

struct Shared {
    respond: Box<Responder>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A running fake catalog endpoint. The server stops when this is dropped.
pub struct FakeCatalog {
    addr: SocketAddr,
    shared: Arc<Shared>,
    server: JoinHandle<()>,
}

impl FakeCatalog {
    /// Start a server that answers every search with `respond(params)`.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound.
    pub async fn start<F>(respond: F) -> std::io::Result<Self>
    where
        F: Fn(&HashMap<String, String>) -> Reply + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared {
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(SEARCH_PATH, get(search))
            .with_state(Arc::clone(&shared));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            // Only ends on I/O failure; tests then see connection errors.
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            shared,
            server,
        })
    }

    /// Start a server that always returns `body`.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound.
    pub async fn serving(body: serde_json::Value) -> std::io::Result<Self> {
        Self::start(move |_| Reply::Json(body.clone())).await
    }

    /// Full search URL.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}{SEARCH_PATH}", self.addr)
    }

    /// Catalog configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the endpoint is not a valid URL, which cannot happen for a
    /// bound socket address.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            endpoint: self.endpoint().parse().unwrap(),
            api_key: SecretString::from(TEST_API_KEY),
        }
    }

    /// Application configuration pointing at this server, with `extra`
    /// variables layered on top.
    ///
    /// # Panics
    ///
    /// Panics if `extra` contains an invalid value.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn app_config(&self, extra: &[(&str, &str)]) -> AppConfig {
        let mut vars: HashMap<String, String> = HashMap::from([
            ("CATALOG_ENDPOINT".to_string(), self.endpoint()),
            ("CATALOG_API_KEY".to_string(), TEST_API_KEY.to_string()),
        ]);
        vars.extend(extra.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));
        AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for FakeCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn search(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let api_key = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let reply = (shared.respond)(&params);
    shared
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest { api_key, params });

    match reply {
        Reply::Json(body) => Json(body).into_response(),
        Reply::Status(code, body) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        )
            .into_response(),
        Reply::Raw(body) => body.into_response(),
    }
}

/// A catalog product in wire format with one variant per `(size, price)`.
#[must_use]
pub fn wire_product(name: &str, variants: &[(&str, &str)]) -> serde_json::Value {
    let variants: Vec<serde_json::Value> = variants
        .iter()
        .map(|(size, price)| {
            serde_json::json!({
                "size": size,
                "color": "Black",
                "material": "Cotton",
                "available": 4,
                "price": price,
            })
        })
        .collect();
    serde_json::json!({ "name": name, "variants": variants })
}
