//! Default actions per component type.
//!
//! A registry is plain data owned by the engine. Callers extend it by
//! registering more templates (or loading a YAML catalogue) before the engine
//! is built; the engine itself never mutates it.

use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::action::{Action, ActionType};
use crate::error::ConfigError;

#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Vec<Action>>,
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The stock catalogue for table, form, list, select/autocomplete and
    /// chart components.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        registry
            .register(
                "table",
                Action::new(ActionType::Fetch, "/api/table-data")
                    .named("Fetch Table Data")
                    .with_param("page", 1)
                    .with_param("limit", 20)
                    .on_success("table.updateRows"),
            )
            .register(
                "table",
                Action::new(ActionType::Delete, "/api/table-data/{id}")
                    .named("Delete Row")
                    .with_method("DELETE")
                    .on_success("table.refresh"),
            );

        registry
            .register(
                "form",
                Action::new(ActionType::Create, "/api/form-submit")
                    .named("Submit Form")
                    .with_method("POST")
                    .on_success("form.showSuccess"),
            )
            .register(
                "form",
                Action::new(ActionType::Fetch, "/api/form-data/{id}")
                    .named("Load Form Data")
                    .on_success("form.populate"),
            );

        registry.register(
            "list",
            Action::new(ActionType::Fetch, "/api/list-items")
                .named("Fetch List Items")
                .with_param("category", "all")
                .on_success("list.updateItems"),
        );

        for select_like in ["select", "autocomplete"] {
            registry
                .register(
                    select_like,
                    Action::new(ActionType::Fetch, "/api/select-options")
                        .named("Load Options")
                        .on_success("select.setOptions"),
                )
                .register(
                    select_like,
                    Action::new(ActionType::Search, "/api/select-options/search")
                        .named("Search Options")
                        .on_success("select.setOptions"),
                );
        }

        registry.register(
            "chart",
            Action::new(ActionType::Fetch, "/api/chart-data")
                .named("Fetch Chart Data")
                .with_param("period", json!("7d"))
                .on_success("chart.updateSeries"),
        );

        registry
    }

    /// Append `action` to the templates of `component_type`.
    pub fn register(&mut self, component_type: &str, action: Action) -> &mut Self {
        self.templates
            .entry(component_type.to_lowercase())
            .or_default()
            .push(action);
        self
    }

    /// Templates for `component_type`, matched case-insensitively. Unknown
    /// types yield an empty list.
    pub fn templates(&self, component_type: &str) -> Vec<Action> {
        self.templates
            .get(&component_type.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    pub fn component_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Append templates from a YAML mapping of component type to action list.
    pub fn extend_from_yaml(&mut self, yaml: &str) -> Result<(), ConfigError> {
        let extra: BTreeMap<String, Vec<Action>> = serde_yaml::from_str(yaml)?;
        for (component_type, actions) in extra {
            for action in actions {
                self.register(&component_type, action);
            }
        }
        Ok(())
    }

    pub fn extend_from_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        self.extend_from_yaml(&yaml)
    }
}
