//! Running several actions together.
//!
//! Both modes are total: every action yields exactly one [`BatchResult`] at
//! the same index as the action, and no error escapes the batch call.
//! Partial completion is the normal outcome; nothing is rolled back.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;
use crate::context::ExecutionContext;
use crate::engine::DataActionEngine;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl From<Result<Value>> for BatchResult {
    fn from(outcome: Result<Value>) -> Self {
        match outcome {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

impl DataActionEngine {
    /// Run `actions` one at a time. A failure is recorded and the next
    /// action still runs.
    pub async fn execute_actions(
        &self,
        actions: &[Action],
        context: &ExecutionContext,
    ) -> Vec<BatchResult> {
        let mut results = Vec::with_capacity(actions.len());
        for action in actions {
            results.push(self.execute_action(action, context).await.into());
        }
        results
    }

    /// Start every action at once and wait for all of them to settle.
    ///
    /// There is no concurrency cap and no cancellation: a batch of N actions
    /// may hold N requests in flight, and one failure never stops its
    /// siblings. Results follow input order, not completion order.
    pub async fn execute_actions_parallel(
        &self,
        actions: &[Action],
        context: &ExecutionContext,
    ) -> Vec<BatchResult> {
        join_all(
            actions
                .iter()
                .map(|action| self.execute_action(action, context)),
        )
        .await
        .into_iter()
        .map(BatchResult::from)
        .collect()
    }
}
