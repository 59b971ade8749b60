//! Named success/error callbacks.
//!
//! Actions refer to handlers by name (`onSuccess: "table.refresh"`). The
//! functions behind those names are registered in Rust when the engine is
//! built, so component configuration can never inject code.

use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::error::{HandlerError, TransportError};

pub type SuccessHandler =
    Arc<dyn Fn(&Value, &ExecutionContext) -> Result<(), HandlerError> + Send + Sync>;
pub type ErrorHandler =
    Arc<dyn Fn(&TransportError, &ExecutionContext) -> Result<(), HandlerError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    success: HashMap<String, SuccessHandler>,
    error: HashMap<String, ErrorHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_success<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&Value, &ExecutionContext) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.success.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn register_error<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&TransportError, &ExecutionContext) -> Result<(), HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.error.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn has_success(&self, name: &str) -> bool {
        self.success.contains_key(name)
    }

    pub fn has_error(&self, name: &str) -> bool {
        self.error.contains_key(name)
    }

    /// Run the success handler `name`. Panics inside the handler are caught
    /// and reported as [`HandlerError::Panicked`].
    pub fn invoke_success(
        &self,
        name: &str,
        data: &Value,
        context: &ExecutionContext,
    ) -> Result<(), HandlerError> {
        let handler = self
            .success
            .get(name)
            .ok_or_else(|| HandlerError::NotRegistered(name.to_string()))?;
        guarded(|| handler(data, context))
    }

    pub fn invoke_error(
        &self,
        name: &str,
        error: &TransportError,
        context: &ExecutionContext,
    ) -> Result<(), HandlerError> {
        let handler = self
            .error
            .get(name)
            .ok_or_else(|| HandlerError::NotRegistered(name.to_string()))?;
        guarded(|| handler(error, context))
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut success: Vec<_> = self.success.keys().collect();
        let mut error: Vec<_> = self.error.keys().collect();
        success.sort();
        error.sort();
        f.debug_struct("HandlerRegistry")
            .field("success", &success)
            .field("error", &error)
            .finish()
    }
}

fn guarded(f: impl FnOnce() -> Result<(), HandlerError>) -> Result<(), HandlerError> {
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(HandlerError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn success_handler_receives_data_and_context() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let mut registry = HandlerRegistry::new();
        registry.register_success("capture", move |data, ctx| {
            *sink.lock().unwrap() = Some((data.clone(), ctx.get("page").cloned()));
            Ok(())
        });

        let ctx = ExecutionContext::new().with("page", 3);
        registry
            .invoke_success("capture", &json!({"rows": 1}), &ctx)
            .unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            Some((json!({"rows": 1}), Some(json!(3))))
        );
    }

    #[test]
    fn unknown_name_is_not_registered() {
        let registry = HandlerRegistry::new();
        let err = registry
            .invoke_success("missing", &json!(null), &ExecutionContext::new())
            .unwrap_err();
        assert_eq!(err, HandlerError::NotRegistered("missing".into()));
    }

    #[test]
    fn failing_handler_reports_failure() {
        let mut registry = HandlerRegistry::new();
        registry.register_error("boom", |_, _| Err(HandlerError::Failed("nope".into())));
        let err = registry
            .invoke_error(
                "boom",
                &TransportError::Network("down".into()),
                &ExecutionContext::new(),
            )
            .unwrap_err();
        assert_eq!(err, HandlerError::Failed("nope".into()));
    }

    #[test]
    fn panicking_handler_is_contained() {
        let mut registry = HandlerRegistry::new();
        registry.register_success("panics", |_, _| panic!("handler exploded"));
        let err = registry
            .invoke_success("panics", &json!({}), &ExecutionContext::new())
            .unwrap_err();
        assert_eq!(err, HandlerError::Panicked("handler exploded".into()));
    }

    #[test]
    fn registration_is_queryable() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_success("a", |_, _| Ok(()))
            .register_error("b", |_, _| Ok(()));
        assert!(registry.has_success("a"));
        assert!(!registry.has_success("b"));
        assert!(registry.has_error("b"));
    }
}
