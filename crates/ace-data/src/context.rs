use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which the bound canvas element is exposed to handlers.
pub const ELEMENT_KEY: &str = "element";

/// Values forwarded to interceptors and handlers alongside an action.
///
/// A flat JSON object. Layers are merged shallowly with later layers
/// overriding earlier ones; merging never removes a key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext(Map<String, Value>);

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON object. Returns `None` for any other JSON value.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Build the three-layer context for one call: engine-wide values, then
    /// the per-call values, then `{ element }` when an element is bound.
    pub fn layered(base: &Self, call: &Self, element: Option<&Value>) -> Self {
        let mut merged = base.clone();
        merged.merge(call);
        if let Some(element) = element {
            merged.insert(ELEMENT_KEY, element.clone());
        }
        merged
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Overlay `other` onto `self`.
    pub fn merge(&mut self, other: &Self) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn element(&self) -> Option<&Value> {
        self.get(ELEMENT_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ExecutionContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_layers_override_earlier() {
        let base = ExecutionContext::new().with("user", "a").with("page", 1);
        let call = ExecutionContext::new().with("page", 2);
        let merged = ExecutionContext::layered(&base, &call, None);
        assert_eq!(merged.get("user"), Some(&json!("a")));
        assert_eq!(merged.get("page"), Some(&json!(2)));
    }

    #[test]
    fn element_layer_wins_over_call_values() {
        let call = ExecutionContext::new().with("element", "spoofed");
        let element = json!({"id": "el-1"});
        let merged = ExecutionContext::layered(&ExecutionContext::new(), &call, Some(&element));
        assert_eq!(merged.element(), Some(&element));
    }

    #[test]
    fn merge_is_shallow_and_keeps_keys() {
        let mut ctx = ExecutionContext::new().with("filter", json!({"a": 1, "b": 2}));
        ctx.merge(&ExecutionContext::new().with("filter", json!({"a": 3})));
        assert_eq!(ctx.get("filter"), Some(&json!({"a": 3})));

        let mut ctx = ExecutionContext::new().with("keep", true);
        ctx.merge(&ExecutionContext::new());
        assert_eq!(ctx.get("keep"), Some(&json!(true)));
    }

    #[test]
    fn from_value_accepts_only_objects() {
        assert!(ExecutionContext::from_value(json!({"x": 1})).is_some());
        assert!(ExecutionContext::from_value(json!([1, 2])).is_none());
    }
}
