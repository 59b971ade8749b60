//! Turning one action into one HTTP call.

use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::action::Action;
use crate::context::ExecutionContext;
use crate::error::{Result, TransportError};
use crate::interceptor::InterceptorPipeline;
use crate::transport::{PreparedRequest, RawResponse, Transport};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ---------------------------------------------------------------------------
// RequestConfig
// ---------------------------------------------------------------------------

/// The mutable request description that request interceptors see.
///
/// `context` travels with the config so interceptors can read it; it is never
/// sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestConfig {
    pub endpoint: String,
    pub method: String,
    pub params: Map<String, Value>,
    pub headers: BTreeMap<String, String>,
    #[serde(skip)]
    pub context: ExecutionContext,
}

impl RequestConfig {
    pub fn from_action(action: &Action, context: ExecutionContext) -> Self {
        Self {
            endpoint: action.endpoint.clone(),
            method: action.method.clone(),
            params: action.params.clone(),
            headers: action.headers.clone(),
            context,
        }
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// TransportResponse
// ---------------------------------------------------------------------------

/// A successful, decoded response. This is what response interceptors see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportResponse {
    pub data: Value,
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub ok: bool,
}

impl TransportResponse {
    /// Check the status and decode the body. An empty body decodes to `{}`.
    pub fn decode(raw: RawResponse) -> Result<Self> {
        if !raw.is_success() {
            return Err(TransportError::Status {
                status: raw.status,
                status_text: raw.status_text,
            });
        }
        let data = if raw.body.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Map::new())
        } else {
            serde_json::from_slice(&raw.body).map_err(|e| TransportError::Decode(e.to_string()))?
        };
        Ok(Self {
            data,
            status: raw.status,
            status_text: raw.status_text,
            headers: raw.headers,
            ok: true,
        })
    }
}

// ---------------------------------------------------------------------------
// RequestExecutor
// ---------------------------------------------------------------------------

/// Resolves endpoints, encodes params, sends through the [`Transport`] and
/// runs response interceptors over the decoded result.
#[derive(Clone)]
pub struct RequestExecutor {
    base_url: String,
    transport: Arc<dyn Transport>,
    interceptors: Arc<InterceptorPipeline>,
}

impl RequestExecutor {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        interceptors: Arc<InterceptorPipeline>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            interceptors,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute endpoints (anything starting with `http`) pass through;
    /// everything else is appended to the base URL.
    pub fn resolve_endpoint(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http") {
            return endpoint.to_string();
        }
        let base = if endpoint.starts_with('/') {
            self.base_url.trim_end_matches('/')
        } else {
            self.base_url.as_str()
        };
        format!("{base}{endpoint}")
    }

    /// Resolve the endpoint and add `Content-Type: application/json` unless a
    /// content type is already set.
    pub fn finalize(&self, mut config: RequestConfig) -> RequestConfig {
        config.endpoint = self.resolve_endpoint(&config.endpoint);
        if config.header(CONTENT_TYPE).is_none() {
            config
                .headers
                .insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
        }
        config
    }

    /// Build the wire request: params become the query string for GET and
    /// the JSON body for every other method. Empty params add neither.
    pub fn prepare(&self, config: &RequestConfig) -> Result<PreparedRequest> {
        let mut url = Url::parse(&config.endpoint).map_err(|e| {
            TransportError::InvalidRequest(format!("endpoint '{}': {e}", config.endpoint))
        })?;

        let mut body = None;
        if !config.params.is_empty() {
            if config.is_get() {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in &config.params {
                    pairs.append_pair(key, &query_value(value));
                }
            } else {
                body = Some(Value::Object(config.params.clone()));
            }
        }

        Ok(PreparedRequest {
            method: config.method.clone(),
            url: url.to_string(),
            headers: config.headers.clone(),
            body,
        })
    }

    /// Send `config` and return the intercepted response. Any non-2xx status
    /// becomes [`TransportError::Status`].
    pub async fn execute(&self, config: RequestConfig) -> Result<TransportResponse> {
        let prepared = self.prepare(&config)?;
        tracing::debug!(method = %prepared.method, url = %prepared.url, "sending request");
        let raw = self.transport.send(prepared).await?;
        let response = TransportResponse::decode(raw)?;
        Ok(self.interceptors.apply_response(response).await)
    }
}

/// Strings are sent bare; every other JSON value in its JSON text form.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<PreparedRequest>>,
        reply: Mutex<Option<RawResponse>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: PreparedRequest) -> Result<RawResponse> {
            self.sent.lock().unwrap().push(request);
            Ok(self
                .reply
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| RawResponse::json(&json!({"ok": true}))))
        }
    }

    fn executor(transport: Arc<Recorder>) -> RequestExecutor {
        RequestExecutor::new(
            "http://localhost:8080",
            transport,
            Arc::new(InterceptorPipeline::new()),
        )
    }

    fn config(method: &str, endpoint: &str, params: Value) -> RequestConfig {
        RequestConfig {
            endpoint: endpoint.into(),
            method: method.into(),
            params: params.as_object().cloned().unwrap_or_default(),
            headers: BTreeMap::new(),
            context: ExecutionContext::new(),
        }
    }

    #[test]
    fn relative_endpoint_is_joined_to_base_url() {
        let exec = executor(Arc::default());
        assert_eq!(
            exec.resolve_endpoint("/api/items"),
            "http://localhost:8080/api/items"
        );
    }

    #[test]
    fn absolute_endpoint_passes_through() {
        let exec = executor(Arc::default());
        assert_eq!(
            exec.resolve_endpoint("https://other.example/api"),
            "https://other.example/api"
        );
    }

    #[test]
    fn finalize_adds_json_content_type_unless_overridden() {
        let exec = executor(Arc::default());
        let cfg = exec.finalize(config("GET", "/a", json!({})));
        assert_eq!(cfg.header("content-type"), Some("application/json"));
        assert!(cfg.endpoint.starts_with("http://"));

        let mut custom = config("POST", "/a", json!({}));
        custom
            .headers
            .insert("content-type".into(), "text/plain".into());
        let cfg = exec.finalize(custom);
        assert_eq!(cfg.header("Content-Type"), Some("text/plain"));
        assert_eq!(cfg.headers.len(), 1);
    }

    #[test]
    fn get_params_become_query_string() {
        let exec = executor(Arc::default());
        let cfg = exec.finalize(config(
            "GET",
            "/api/table-data",
            json!({"page": 1, "q": "a b"}),
        ));
        let prepared = exec.prepare(&cfg).unwrap();
        assert_eq!(
            prepared.url,
            "http://localhost:8080/api/table-data?page=1&q=a+b"
        );
        assert!(prepared.body.is_none());
    }

    #[test]
    fn non_get_params_become_json_body() {
        let exec = executor(Arc::default());
        let cfg = exec.finalize(config("PUT", "/api/items/1", json!({"name": "x"})));
        let prepared = exec.prepare(&cfg).unwrap();
        assert_eq!(prepared.url, "http://localhost:8080/api/items/1");
        assert_eq!(prepared.body, Some(json!({"name": "x"})));
    }

    #[test]
    fn empty_params_send_no_query_and_no_body() {
        let exec = executor(Arc::default());
        let cfg = exec.finalize(config("POST", "/api/items", json!({})));
        let prepared = exec.prepare(&cfg).unwrap();
        assert!(!prepared.url.contains('?'));
        assert!(prepared.body.is_none());
    }

    #[test]
    fn unparseable_endpoint_is_invalid_request() {
        let exec = executor(Arc::default());
        let err = exec
            .prepare(&config("GET", "not a url", json!({})))
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn non_2xx_is_status_error() {
        let transport = Arc::new(Recorder::default());
        *transport.reply.lock().unwrap() = Some(RawResponse::status(404, "Not Found"));
        let exec = executor(transport);
        let cfg = exec.finalize(config("DELETE", "/api/x/2", json!({})));
        let err = exec.execute(cfg).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }

    #[tokio::test]
    async fn empty_body_decodes_to_empty_object() {
        let transport = Arc::new(Recorder::default());
        *transport.reply.lock().unwrap() = Some(RawResponse::status(204, "No Content"));
        let exec = executor(transport);
        let cfg = exec.finalize(config("DELETE", "/api/x/1", json!({})));
        let resp = exec.execute(cfg).await.unwrap();
        assert_eq!(resp.data, json!({}));
        assert_eq!(resp.status, 204);
        assert!(resp.ok);
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let transport = Arc::new(Recorder::default());
        let mut raw = RawResponse::status(200, "OK");
        raw.body = b"<html>".to_vec();
        *transport.reply.lock().unwrap() = Some(raw);
        let exec = executor(transport);
        let cfg = exec.finalize(config("GET", "/a", json!({})));
        assert!(matches!(
            exec.execute(cfg).await.unwrap_err(),
            TransportError::Decode(_)
        ));
    }

    #[tokio::test]
    async fn response_interceptors_run_on_success() {
        let transport = Arc::new(Recorder::default());
        let pipeline = Arc::new(InterceptorPipeline::new());
        pipeline.add_response(|mut resp: TransportResponse| {
            resp.data["seen"] = json!(true);
            resp
        });
        let exec = RequestExecutor::new("http://localhost:8080", transport.clone(), pipeline);
        let cfg = exec.finalize(config("GET", "/a", json!({})));
        let resp = exec.execute(cfg).await.unwrap();
        assert_eq!(resp.data, json!({"ok": true, "seen": true}));
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }
}
