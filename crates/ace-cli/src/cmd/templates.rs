use crate::cmd::{build_engine, load_config};
use crate::output::{print_json, print_table};
use std::path::Path;

pub fn run(config: Option<&Path>, component_type: &str, json: bool) -> anyhow::Result<()> {
    let engine = build_engine(&load_config(config)?)?;
    let templates = engine.action_templates(component_type);

    if json {
        return print_json(&templates);
    }
    if templates.is_empty() {
        println!("No templates for component type '{component_type}'.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = templates
        .iter()
        .map(|a| {
            vec![
                a.name.clone().unwrap_or_default(),
                a.action_type.to_string(),
                a.method.clone(),
                a.endpoint.clone(),
                a.on_success.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["NAME", "TYPE", "METHOD", "ENDPOINT", "ON SUCCESS"], &rows);
    Ok(())
}
