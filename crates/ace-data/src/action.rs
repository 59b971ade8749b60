//! Declarative data actions attached to canvas components.
//!
//! An `Action` describes one remote operation (fetch, create, update, delete,
//! search) as plain configuration. Components carry a list of them under
//! `dataActions`; the engine turns each into a single HTTP call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Default cache lifetime for GET actions with a `cacheKey`: 5 minutes.
pub const DEFAULT_CACHE_TTL_MS: u64 = 300_000;

/// The only endpoint placeholder the engine recognises.
pub const ID_PLACEHOLDER: &str = "{id}";

// ---------------------------------------------------------------------------
// ActionType
// ---------------------------------------------------------------------------

/// Kind of operation an action performs.
///
/// The set is open: unrecognised strings are kept verbatim in `Other` and
/// round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    Fetch,
    Create,
    Update,
    Delete,
    Search,
    Other(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Fetch => "fetch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Search => "search",
            Self::Other(s) => s,
        }
    }

    /// `create` and `update` are the actions a form submission runs.
    pub fn is_submit(&self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl From<String> for ActionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "fetch" => Self::Fetch,
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            "search" => Self::Search,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for ActionType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<ActionType> for String {
    fn from(t: ActionType) -> Self {
        match t {
            ActionType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One remote data operation, as configured on a component.
///
/// Field names follow the component JSON (`cacheKey`, `onSuccess`, ...).
/// `on_success` / `on_error` name handlers registered with the engine's
/// [`crate::handler::HandlerRegistry`]; they are never evaluated as code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default = "default_method")]
    pub method: String,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    #[serde(rename = "cacheTTL", default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub execute_on_mount: bool,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

impl Action {
    /// A GET action against `endpoint` with every other field defaulted.
    pub fn new(action_type: impl Into<ActionType>, endpoint: impl Into<String>) -> Self {
        Self {
            id: None,
            name: None,
            action_type: action_type.into(),
            method: default_method(),
            endpoint: endpoint.into(),
            params: Map::new(),
            headers: BTreeMap::new(),
            on_success: None,
            on_error: None,
            cache_key: None,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            execute_on_mount: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_cache(mut self, key: impl Into<String>, ttl_ms: u64) -> Self {
        self.cache_key = Some(key.into());
        self.cache_ttl_ms = ttl_ms;
        self
    }

    pub fn on_success(mut self, handler: impl Into<String>) -> Self {
        self.on_success = Some(handler.into());
        self
    }

    pub fn on_error(mut self, handler: impl Into<String>) -> Self {
        self.on_error = Some(handler.into());
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Cache key to consult, present only for GET actions that set one.
    pub fn cache_key_for_get(&self) -> Option<&str> {
        if self.is_get() {
            self.cache_key.as_deref()
        } else {
            None
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Copy of this action with the first `{id}` in the endpoint replaced by
    /// `item_id`.
    pub fn with_item_id(&self, item_id: &str) -> Self {
        let mut action = self.clone();
        action.endpoint = self.endpoint.replacen(ID_PLACEHOLDER, item_id, 1);
        action
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_component_json_with_defaults() {
        let action: Action = serde_json::from_str(
            r#"{"type": "fetch", "endpoint": "/api/items", "cacheKey": "items"}"#,
        )
        .unwrap();
        assert_eq!(action.action_type, ActionType::Fetch);
        assert_eq!(action.method, "GET");
        assert_eq!(action.cache_key.as_deref(), Some("items"));
        assert_eq!(action.cache_ttl_ms, 300_000);
        assert!(action.params.is_empty());
        assert!(!action.execute_on_mount);
    }

    #[test]
    fn unknown_type_is_passed_through() {
        let action: Action =
            serde_json::from_str(r#"{"type": "export", "endpoint": "/api/export"}"#).unwrap();
        assert_eq!(action.action_type, ActionType::Other("export".into()));
        let back = serde_json::to_value(&action).unwrap();
        assert_eq!(back["type"], "export");
    }

    #[test]
    fn camel_case_fields_are_read() {
        let action: Action = serde_json::from_str(
            r#"{
                "type": "delete",
                "method": "DELETE",
                "endpoint": "/api/x/{id}",
                "onSuccess": "table.refresh",
                "onError": "toast.error",
                "cacheTTL": 1000,
                "executeOnMount": true
            }"#,
        )
        .unwrap();
        assert_eq!(action.on_success.as_deref(), Some("table.refresh"));
        assert_eq!(action.on_error.as_deref(), Some("toast.error"));
        assert_eq!(action.cache_ttl(), Duration::from_millis(1000));
        assert!(action.execute_on_mount);
    }

    #[test]
    fn cache_key_only_applies_to_get() {
        let get = Action::new("fetch", "/a").with_cache("k", 10);
        let post = Action::new("create", "/a")
            .with_method("POST")
            .with_cache("k", 10);
        assert_eq!(get.cache_key_for_get(), Some("k"));
        assert_eq!(post.cache_key_for_get(), None);
        assert_eq!(Action::new("fetch", "/a").cache_key_for_get(), None);
    }

    #[test]
    fn item_id_replaces_placeholder_once() {
        let action = Action::new("delete", "/api/items/{id}");
        let resolved = action.with_item_id("42");
        assert_eq!(resolved.endpoint, "/api/items/42");
        assert!(!resolved.endpoint.contains("{id}"));
        // the original stays a template
        assert_eq!(action.endpoint, "/api/items/{id}");
    }

    #[test]
    fn item_id_without_placeholder_leaves_endpoint() {
        let action = Action::new("delete", "/api/items");
        assert_eq!(action.with_item_id("42").endpoint, "/api/items");
    }

    #[test]
    fn submit_types() {
        assert!(ActionType::Create.is_submit());
        assert!(ActionType::Update.is_submit());
        assert!(!ActionType::Fetch.is_submit());
        assert!(!ActionType::from("upsert").is_submit());
    }
}
