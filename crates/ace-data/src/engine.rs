//! Single-action orchestration.
//!
//! ```text
//! Action + ExecutionContext
//!     │
//!     ├─ GET + cacheKey + fresh entry ──────────────▶ cached data
//!     ▼
//! RequestConfig ─▶ request interceptors ─▶ RequestExecutor ─▶ Transport
//!                                              │
//!                              response interceptors
//!                                              ▼
//!                      cache write (GET + cacheKey) ─▶ onSuccess ─▶ data
//!               (on failure: onError, then the TransportError is returned)
//! ```

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::action::Action;
use crate::cache::{CacheStore, MemoryCache};
use crate::config::EngineConfig;
use crate::context::ExecutionContext;
use crate::error::{ConfigError, Result};
use crate::handler::HandlerRegistry;
use crate::interceptor::{
    BearerAuth, InterceptorPipeline, RequestInterceptor, ResponseInterceptor, ResponseLogger,
};
use crate::request::{RequestConfig, RequestExecutor};
use crate::template::TemplateRegistry;
use crate::token::{FileTokenStore, TokenStore};
use crate::transport::{HttpTransport, Transport};

// ─── EngineBuilder ────────────────────────────────────────────────────────

/// Assembles a [`DataActionEngine`] from injected collaborators. Anything not
/// supplied gets a fresh default, so two engines built separately never
/// share a cache or interceptor list.
pub struct EngineBuilder {
    base_url: String,
    cache: Option<Arc<dyn CacheStore>>,
    interceptors: Option<Arc<InterceptorPipeline>>,
    transport: Option<Arc<dyn Transport>>,
    handlers: HandlerRegistry,
    templates: TemplateRegistry,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            base_url: EngineConfig::default().base_url,
            cache: None,
            interceptors: None,
            transport: None,
            handlers: HandlerRegistry::new(),
            templates: TemplateRegistry::builtin(),
        }
    }
}

impl EngineBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn interceptors(mut self, interceptors: Arc<InterceptorPipeline>) -> Self {
        self.interceptors = Some(interceptors);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    pub fn build(self) -> DataActionEngine {
        let interceptors = self.interceptors.unwrap_or_default();
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));
        DataActionEngine {
            cache: self.cache.unwrap_or_else(|| Arc::new(MemoryCache::new())),
            requests: RequestExecutor::new(self.base_url, transport, interceptors.clone()),
            interceptors,
            handlers: self.handlers,
            templates: self.templates,
        }
    }
}

// ─── DataActionEngine ─────────────────────────────────────────────────────

pub struct DataActionEngine {
    cache: Arc<dyn CacheStore>,
    interceptors: Arc<InterceptorPipeline>,
    requests: RequestExecutor,
    handlers: HandlerRegistry,
    templates: TemplateRegistry,
}

impl DataActionEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The production engine: reqwest transport, file-backed token store,
    /// built-in templates plus any configured catalogue, and both default
    /// interceptors registered.
    pub fn from_config(
        config: &EngineConfig,
        handlers: HandlerRegistry,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let mut templates = TemplateRegistry::builtin();
        if let Some(path) = &config.templates {
            templates.extend_from_file(path)?;
        }

        let token_store: Arc<dyn TokenStore> =
            Arc::new(FileTokenStore::new(config.token_store_path()?));

        let engine = Self::builder()
            .base_url(config.base_url.clone())
            .handlers(handlers)
            .templates(templates)
            .build();
        engine.install_default_interceptors(token_store, config.debug);
        Ok(engine)
    }

    /// Register the bearer-token request interceptor and the debug response
    /// logger.
    pub fn install_default_interceptors(&self, token_store: Arc<dyn TokenStore>, debug: bool) {
        self.interceptors.add_request(BearerAuth::new(token_store));
        self.interceptors.add_response(ResponseLogger::new(debug));
    }

    pub fn add_request_interceptor(&self, interceptor: impl RequestInterceptor + 'static) {
        self.interceptors.add_request(interceptor);
    }

    pub fn add_response_interceptor(&self, interceptor: impl ResponseInterceptor + 'static) {
        self.interceptors.add_response(interceptor);
    }

    pub fn base_url(&self) -> &str {
        self.requests.base_url()
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn interceptors(&self) -> &Arc<InterceptorPipeline> {
        &self.interceptors
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Drop one cache key, or everything when `key` is `None`.
    pub fn clear_cache(&self, key: Option<&str>) {
        match key {
            Some(k) => self.cache.delete(k),
            None => self.cache.clear(),
        }
    }

    pub fn evict_stale(&self, ttl: Duration) -> usize {
        self.cache.evict_stale(ttl)
    }

    pub fn action_templates(&self, component_type: &str) -> Vec<Action> {
        self.templates.templates(component_type)
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Run one action end to end and return the response data.
    ///
    /// A fresh cache hit returns without touching the network. Handler
    /// failures are logged and never change the outcome; on transport failure
    /// the `onError` handler runs and the original error is returned.
    pub async fn execute_action(
        &self,
        action: &Action,
        context: &ExecutionContext,
    ) -> Result<Value> {
        let cache_key = action.cache_key_for_get();

        if let Some(key) = cache_key {
            if let Some(entry) = self.cache.get(key) {
                if entry.is_fresh(action.cache_ttl()) {
                    tracing::debug!(cache_key = key, "cache hit");
                    return Ok(entry.data);
                }
                tracing::debug!(cache_key = key, "cache entry stale");
            }
        }

        let config = RequestConfig::from_action(action, context.clone());
        let config = self.interceptors.apply_request(config).await;
        let config = self.requests.finalize(config);

        match self.requests.execute(config).await {
            Ok(response) => {
                if let Some(key) = cache_key {
                    self.cache.set(key, response.data.clone());
                    tracing::debug!(cache_key = key, "cache write");
                }
                if let Some(name) = &action.on_success {
                    if let Err(e) = self.handlers.invoke_success(name, &response.data, context) {
                        tracing::warn!(handler = %name, error = %e, "success handler failed");
                    }
                }
                Ok(response.data)
            }
            Err(err) => {
                tracing::error!(
                    action_type = %action.action_type,
                    endpoint = %action.endpoint,
                    error = %err,
                    "data action failed"
                );
                if let Some(name) = &action.on_error {
                    if let Err(e) = self.handlers.invoke_error(name, &err, context) {
                        tracing::warn!(handler = %name, error = %e, "error handler failed");
                    }
                }
                Err(err)
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
