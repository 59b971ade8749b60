//! `ace-data`: the data action engine behind canvas components.
//!
//! Components declare what data they need as [`Action`]s. The engine turns
//! each action into an HTTP request, runs it through the interceptor
//! pipeline, caches successful GETs and dispatches named success/error
//! handlers.
//!
//! # Architecture
//!
//! ```text
//! ComponentBinding        ← when to run an element's dataActions
//!     │
//!     ▼
//! DataActionEngine        ← cache, handlers, batches, templates
//!     │
//!     ▼
//! InterceptorPipeline     ← ordered request/response transforms
//!     │
//!     ▼
//! RequestExecutor         ← URL + body building, status checks
//!     │
//!     ▼
//! Transport               ← reqwest in production, stubs in tests
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use ace_data::{Action, DataActionEngine, ExecutionContext, EngineConfig, HandlerRegistry};
//!
//! let engine = DataActionEngine::from_config(&EngineConfig::from_env(), HandlerRegistry::new())?;
//! let rows = engine
//!     .execute_action(
//!         &Action::new("fetch", "/api/table-data").with_cache("rows", 60_000),
//!         &ExecutionContext::new(),
//!     )
//!     .await?;
//! ```

pub mod action;
pub mod batch;
pub mod binding;
pub mod cache;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod handler;
pub mod interceptor;
pub mod request;
pub mod template;
pub mod token;
pub mod transport;

pub use action::{Action, ActionType};
pub use batch::BatchResult;
pub use binding::{BindingOptions, BindingState, ComponentBinding, Element};
pub use cache::{CacheEntry, CacheStore, MemoryCache};
pub use config::EngineConfig;
pub use context::ExecutionContext;
pub use engine::{DataActionEngine, EngineBuilder};
pub use error::{BindingError, ConfigError, HandlerError, Result, TokenStoreError, TransportError};
pub use handler::HandlerRegistry;
pub use interceptor::{
    BearerAuth, InterceptorPipeline, RequestInterceptor, ResponseInterceptor, ResponseLogger,
};
pub use request::{RequestConfig, RequestExecutor, TransportResponse};
pub use template::TemplateRegistry;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore, AUTH_TOKEN_KEY};
pub use transport::{HttpTransport, PreparedRequest, RawResponse, Transport};
