use crate::cmd::{build_engine, load_config, read_document, runtime};
use crate::output::{cell, print_json};
use ace_data::{BindingOptions, ComponentBinding, Element};
use std::path::Path;
use std::sync::Arc;

pub fn run(config: Option<&Path>, file: &Path, no_auto: bool, json: bool) -> anyhow::Result<()> {
    let element: Element = read_document(file)?;
    let engine = Arc::new(build_engine(&load_config(config)?)?);
    let options = BindingOptions {
        auto_execute: !no_auto,
        ..Default::default()
    };
    let mut binding = ComponentBinding::new(engine, element, options);

    let ran = runtime()?.block_on(binding.mount()).is_some();
    let state = binding.state();

    if json {
        return print_json(state);
    }

    if !ran {
        println!("No actions ran on mount.");
        return Ok(());
    }
    let failed = state.action_results.iter().filter(|r| !r.success).count();
    println!(
        "Ran {} action(s) on mount, {} failed.",
        state.action_results.len(),
        failed
    );
    if let Some(data) = &state.data {
        println!("data: {}", cell(data));
    }
    for result in &state.action_results {
        if let Some(err) = &result.error {
            println!("error: {err}");
        }
    }
    Ok(())
}
