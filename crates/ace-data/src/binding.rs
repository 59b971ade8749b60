//! Per-element adapter between a canvas component and the engine.
//!
//! A [`ComponentBinding`] decides *when* to run an element's `dataActions`
//! (on mount, on demand, on submit, on delete) and folds the outcomes into
//! component-local [`BindingState`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::action::{Action, ActionType};
use crate::batch::BatchResult;
use crate::context::ExecutionContext;
use crate::engine::DataActionEngine;
use crate::error::{BindingError, TransportError};

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// A canvas element as far as data actions are concerned. Every other field
/// is kept in `extra` and forwarded to handlers untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(default)]
    pub data_actions: Vec<Action>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Element {
    /// The element id as a cache key. Numeric ids are rendered as decimals.
    pub fn cache_key(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Options / state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BindingOptions {
    pub auto_execute: bool,
    pub execute_on_mount: bool,
    /// Engine-wide context layer, beneath per-call values.
    pub context: ExecutionContext,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            auto_execute: true,
            execute_on_mount: true,
            context: ExecutionContext::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingState {
    pub loading: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub action_results: Vec<BatchResult>,
}

// ---------------------------------------------------------------------------
// ComponentBinding
// ---------------------------------------------------------------------------

pub struct ComponentBinding {
    engine: Arc<DataActionEngine>,
    element: Element,
    element_value: Value,
    options: BindingOptions,
    state: BindingState,
    mounted: bool,
}

impl ComponentBinding {
    pub fn new(engine: Arc<DataActionEngine>, element: Element, options: BindingOptions) -> Self {
        let element_value = serde_json::to_value(&element).unwrap_or(Value::Null);
        Self {
            engine,
            element,
            element_value,
            options,
            state: BindingState::default(),
            mounted: false,
        }
    }

    pub fn state(&self) -> &BindingState {
        &self.state
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn has_actions(&self) -> bool {
        !self.element.data_actions.is_empty()
    }

    pub fn has_fetch_actions(&self) -> bool {
        self.any_action(|a| a.action_type == ActionType::Fetch)
    }

    pub fn has_submit_actions(&self) -> bool {
        self.any_action(|a| a.action_type.is_submit())
    }

    pub fn has_delete_actions(&self) -> bool {
        self.any_action(|a| a.action_type == ActionType::Delete)
    }

    /// Templates for this element's component type; empty when it has none.
    pub fn action_templates(&self) -> Vec<Action> {
        self.element
            .component_type
            .as_deref()
            .map(|t| self.engine.action_templates(t))
            .unwrap_or_default()
    }

    /// First-mount hook. Runs the `fetch` and `executeOnMount` actions
    /// sequentially, once per binding, when both `auto_execute` and
    /// `execute_on_mount` are set. Later calls return `None`.
    pub async fn mount(&mut self) -> Option<Vec<BatchResult>> {
        if self.mounted {
            return None;
        }
        self.mounted = true;

        if !(self.options.auto_execute && self.options.execute_on_mount) {
            return None;
        }
        let actions = self.actions_where(|a| a.action_type == ActionType::Fetch || a.execute_on_mount);
        if actions.is_empty() {
            return None;
        }
        Some(self.run_batch(&actions, false).await)
    }

    /// Run one action with `call_context` layered over the binding context.
    /// Fetch results replace `data`; failures set `error` and are returned.
    pub async fn execute_action(
        &mut self,
        action: &Action,
        call_context: &ExecutionContext,
    ) -> Result<Value, TransportError> {
        self.state.loading = true;
        self.state.error = None;

        let context = self.call_context(call_context);
        let outcome = self.engine.execute_action(action, &context).await;
        self.state.loading = false;

        match outcome {
            Ok(data) => {
                if action.action_type == ActionType::Fetch {
                    self.state.data = Some(data.clone());
                }
                Ok(data)
            }
            Err(e) => {
                self.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Run every action of the element as a batch.
    pub async fn execute_all_actions(&mut self, parallel: bool) -> Vec<BatchResult> {
        let actions = self.element.data_actions.clone();
        if actions.is_empty() {
            return Vec::new();
        }
        self.run_batch(&actions, parallel).await
    }

    /// Run the first action of `action_type`.
    pub async fn execute_action_by_type(
        &mut self,
        action_type: &ActionType,
        call_context: &ExecutionContext,
    ) -> Result<Value, BindingError> {
        let action = self
            .element
            .data_actions
            .iter()
            .find(|a| &a.action_type == action_type)
            .cloned()
            .ok_or_else(|| BindingError::NoActionOfType(action_type.to_string()))?;
        Ok(self.execute_action(&action, call_context).await?)
    }

    /// Re-run only the fetch actions, concurrently. One result becomes
    /// `data` directly, several become an array. Returns `Ok(None)` when the
    /// element has no fetch actions.
    pub async fn refresh_data(&mut self) -> Result<Option<Value>, TransportError> {
        let actions = self.actions_where(|a| a.action_type == ActionType::Fetch);
        if actions.is_empty() {
            return Ok(None);
        }

        self.state.loading = true;
        self.state.error = None;
        let context = self.call_context(&ExecutionContext::new());
        let outcomes = futures::future::join_all(
            actions
                .iter()
                .map(|action| self.engine.execute_action(action, &context)),
        )
        .await;
        self.state.loading = false;

        let collected: Result<Vec<Value>, TransportError> = outcomes.into_iter().collect();
        match collected {
            Ok(mut values) => {
                let data = if values.len() == 1 {
                    values.remove(0)
                } else {
                    Value::Array(values)
                };
                self.state.data = Some(data.clone());
                Ok(Some(data))
            }
            Err(e) => {
                self.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Run the create/update actions in order with `formData` in context.
    /// Returns `None` when the element has no submit actions.
    pub async fn handle_submit(&mut self, form_data: Value) -> Option<Vec<BatchResult>> {
        let actions = self.actions_where(|a| a.action_type.is_submit());
        if actions.is_empty() {
            tracing::warn!(element = ?self.element.id, "no submit actions configured for form");
            return None;
        }

        let context = ExecutionContext::new().with("formData", form_data);
        let mut results = Vec::with_capacity(actions.len());
        for action in &actions {
            results.push(self.execute_action(action, &context).await.into());
        }
        Some(results)
    }

    /// Run the delete actions for `item_id`, substituting it for `{id}` in
    /// each endpoint. Any success triggers [`Self::refresh_data`]; a failing
    /// refresh is logged and leaves the delete results intact.
    pub async fn handle_delete(&mut self, item_id: &str) -> Option<Vec<BatchResult>> {
        let actions = self.actions_where(|a| a.action_type == ActionType::Delete);
        if actions.is_empty() {
            tracing::warn!(element = ?self.element.id, "no delete actions configured");
            return None;
        }

        let context = ExecutionContext::new().with("itemId", item_id);
        let mut results: Vec<BatchResult> = Vec::with_capacity(actions.len());
        for action in &actions {
            let action = action.with_item_id(item_id);
            results.push(self.execute_action(&action, &context).await.into());
        }

        if results.iter().any(|r| r.success) {
            if let Err(e) = self.refresh_data().await {
                tracing::warn!(error = %e, "refresh after delete failed");
            }
        }
        Some(results)
    }

    /// Drop the cache entry keyed by this element's id.
    pub fn clear_cache(&self) {
        if let Some(key) = self.element.cache_key() {
            self.engine.clear_cache(Some(&key));
        }
    }

    // --- Component-specific shortcuts -------------------------------------

    /// Table, list and chart loading: the first fetch action.
    pub async fn load_data(&mut self) -> Result<Value, BindingError> {
        self.execute_action_by_type(&ActionType::Fetch, &ExecutionContext::new())
            .await
    }

    /// Form loading: the first fetch action with `{id}` substituted and `id`
    /// in context.
    pub async fn load_by_id(&mut self, id: &str) -> Result<Value, BindingError> {
        let action = self
            .element
            .data_actions
            .iter()
            .find(|a| a.action_type == ActionType::Fetch)
            .map(|a| a.with_item_id(id))
            .ok_or_else(|| BindingError::NoActionOfType(ActionType::Fetch.to_string()))?;
        let context = ExecutionContext::new().with("id", id);
        Ok(self.execute_action(&action, &context).await?)
    }

    /// Select/autocomplete search: the first search action with `query` in
    /// context.
    pub async fn search(&mut self, query: &str) -> Result<Value, BindingError> {
        let context = ExecutionContext::new().with("query", query);
        self.execute_action_by_type(&ActionType::Search, &context)
            .await
    }

    // --- Internal ---------------------------------------------------------

    async fn run_batch(&mut self, actions: &[Action], parallel: bool) -> Vec<BatchResult> {
        self.state.loading = true;
        self.state.error = None;

        let context = self.call_context(&ExecutionContext::new());
        let results = if parallel {
            self.engine.execute_actions_parallel(actions, &context).await
        } else {
            self.engine.execute_actions(actions, &context).await
        };
        self.state.loading = false;

        let mut fetched: Vec<Value> = actions
            .iter()
            .zip(&results)
            .filter(|(action, result)| result.success && action.action_type == ActionType::Fetch)
            .filter_map(|(_, result)| result.data.clone())
            .collect();
        if !fetched.is_empty() {
            self.state.data = Some(if fetched.len() == 1 {
                fetched.remove(0)
            } else {
                Value::Array(fetched)
            });
        }

        self.state.action_results = results.clone();
        results
    }

    fn call_context(&self, call: &ExecutionContext) -> ExecutionContext {
        ExecutionContext::layered(&self.options.context, call, Some(&self.element_value))
    }

    fn any_action(&self, pred: impl Fn(&Action) -> bool) -> bool {
        self.element.data_actions.iter().any(pred)
    }

    fn actions_where(&self, pred: impl Fn(&Action) -> bool) -> Vec<Action> {
        self.element
            .data_actions
            .iter()
            .filter(|a| pred(a))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
