pub mod batch;
pub mod mount;
pub mod run;
pub mod templates;
pub mod token;

use ace_data::{DataActionEngine, EngineConfig, ExecutionContext, HandlerRegistry};
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Config file (if any) with environment overrides on top.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let mut config = match path {
        Some(p) => EngineConfig::load(p)
            .with_context(|| format!("failed to load config {}", p.display()))?,
        None => EngineConfig::default(),
    };
    config.apply_env();
    Ok(config)
}

pub fn build_engine(config: &EngineConfig) -> anyhow::Result<DataActionEngine> {
    DataActionEngine::from_config(config, HandlerRegistry::new()).context("invalid engine config")
}

/// Parse a JSON or YAML document. YAML is a superset of JSON, so one parser
/// covers both.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn parse_context(raw: Option<&str>) -> anyhow::Result<ExecutionContext> {
    let Some(raw) = raw else {
        return Ok(ExecutionContext::new());
    };
    let value: serde_json::Value =
        serde_json::from_str(raw).context("--context must be valid JSON")?;
    ExecutionContext::from_value(value).context("--context must be a JSON object")
}

pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start tokio runtime")
}
