//! Ordered request/response transforms.
//!
//! Two independent FIFO lists. Every registered interceptor runs, in
//! registration order, on every request (or every successful response). An
//! interceptor can rewrite what it is given but cannot stop the flow, and
//! there is no way to remove one once added.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::request::{RequestConfig, TransportResponse};
use crate::token::{TokenStore, AUTH_TOKEN_KEY};

pub const AUTHORIZATION: &str = "Authorization";

#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn intercept(&self, config: RequestConfig) -> RequestConfig;
}

#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn intercept(&self, response: TransportResponse) -> TransportResponse;
}

#[async_trait]
impl<F> RequestInterceptor for F
where
    F: Fn(RequestConfig) -> RequestConfig + Send + Sync,
{
    async fn intercept(&self, config: RequestConfig) -> RequestConfig {
        self(config)
    }
}

#[async_trait]
impl<F> ResponseInterceptor for F
where
    F: Fn(TransportResponse) -> TransportResponse + Send + Sync,
{
    async fn intercept(&self, response: TransportResponse) -> TransportResponse {
        self(response)
    }
}

// ---------------------------------------------------------------------------
// InterceptorPipeline
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InterceptorPipeline {
    request: RwLock<Vec<Arc<dyn RequestInterceptor>>>,
    response: RwLock<Vec<Arc<dyn ResponseInterceptor>>>,
}

impl InterceptorPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_request(&self, interceptor: impl RequestInterceptor + 'static) {
        self.request
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(interceptor));
    }

    pub fn add_response(&self, interceptor: impl ResponseInterceptor + 'static) {
        self.response
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(interceptor));
    }

    pub fn request_len(&self) -> usize {
        self.request.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn response_len(&self) -> usize {
        self.response.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub async fn apply_request(&self, mut config: RequestConfig) -> RequestConfig {
        for interceptor in self.request_chain() {
            config = interceptor.intercept(config).await;
        }
        config
    }

    pub async fn apply_response(&self, mut response: TransportResponse) -> TransportResponse {
        for interceptor in self.response_chain() {
            response = interceptor.intercept(response).await;
        }
        response
    }

    // Snapshots, so no lock is held while an interceptor is awaited.
    fn request_chain(&self) -> Vec<Arc<dyn RequestInterceptor>> {
        self.request.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn response_chain(&self) -> Vec<Arc<dyn ResponseInterceptor>> {
        self.response.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

// ---------------------------------------------------------------------------
// Default interceptors
// ---------------------------------------------------------------------------

/// Attaches `Authorization: Bearer <token>` when the token store holds a
/// non-empty `authToken`. A missing token is not an error.
pub struct BearerAuth {
    store: Arc<dyn TokenStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestInterceptor for BearerAuth {
    async fn intercept(&self, mut config: RequestConfig) -> RequestConfig {
        if let Some(token) = self.store.get(AUTH_TOKEN_KEY).filter(|t| !t.is_empty()) {
            config
                .headers
                .insert(AUTHORIZATION.to_string(), format!("Bearer {token}"));
        }
        config
    }
}

/// Logs each successful response at debug level. Does nothing unless
/// `debug` is set.
pub struct ResponseLogger {
    debug: bool,
}

impl ResponseLogger {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

#[async_trait]
impl ResponseInterceptor for ResponseLogger {
    async fn intercept(&self, response: TransportResponse) -> TransportResponse {
        if self.debug {
            tracing::debug!(
                status = response.status,
                status_text = %response.status_text,
                data = %response.data,
                "api response"
            );
        }
        response
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::token::MemoryTokenStore;
    use serde_json::{json, Map};
    use std::collections::BTreeMap;

    fn config() -> RequestConfig {
        RequestConfig {
            endpoint: "/api/items".into(),
            method: "GET".into(),
            params: Map::new(),
            headers: BTreeMap::new(),
            context: ExecutionContext::new(),
        }
    }

    fn marker(tag: &'static str) -> impl Fn(RequestConfig) -> RequestConfig + Send + Sync {
        move |mut cfg: RequestConfig| {
            let trail = match cfg.headers.get("X-Trail") {
                Some(prev) => format!("{prev},{tag}"),
                None => tag.to_string(),
            };
            cfg.headers.insert("X-Trail".into(), trail);
            cfg
        }
    }

    #[tokio::test]
    async fn request_interceptors_run_in_registration_order() {
        let pipeline = InterceptorPipeline::new();
        pipeline.add_request(marker("A"));
        pipeline.add_request(marker("B"));
        let cfg = pipeline.apply_request(config()).await;
        assert_eq!(cfg.headers.get("X-Trail").unwrap(), "A,B");
    }

    #[tokio::test]
    async fn empty_pipeline_is_identity() {
        let pipeline = InterceptorPipeline::new();
        assert_eq!(pipeline.apply_request(config()).await, config());
    }

    #[tokio::test]
    async fn response_interceptors_chain_their_output() {
        let pipeline = InterceptorPipeline::new();
        pipeline.add_response(|mut r: TransportResponse| {
            r.data = json!({"wrapped": r.data});
            r
        });
        pipeline.add_response(|mut r: TransportResponse| {
            r.status_text = "seen".into();
            r
        });
        let resp = TransportResponse {
            data: json!(1),
            status: 200,
            status_text: "OK".into(),
            headers: BTreeMap::new(),
            ok: true,
        };
        let out = pipeline.apply_response(resp).await;
        assert_eq!(out.data, json!({"wrapped": 1}));
        assert_eq!(out.status_text, "seen");
        assert_eq!(pipeline.response_len(), 2);
    }

    #[tokio::test]
    async fn bearer_auth_attaches_token_when_present() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(AUTH_TOKEN_KEY, "t0k").unwrap();
        let cfg = BearerAuth::new(store).intercept(config()).await;
        assert_eq!(cfg.headers.get(AUTHORIZATION).unwrap(), "Bearer t0k");
    }

    #[tokio::test]
    async fn bearer_auth_skips_missing_or_empty_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let auth = BearerAuth::new(store.clone());
        assert!(auth.intercept(config()).await.headers.is_empty());

        store.set(AUTH_TOKEN_KEY, "").unwrap();
        assert!(auth.intercept(config()).await.headers.is_empty());
    }

    #[tokio::test]
    async fn response_logger_passes_response_through() {
        let resp = TransportResponse {
            data: json!({"a": 1}),
            status: 200,
            status_text: "OK".into(),
            headers: BTreeMap::new(),
            ok: true,
        };
        let out = ResponseLogger::new(true).intercept(resp.clone()).await;
        assert_eq!(out, resp);
    }
}
