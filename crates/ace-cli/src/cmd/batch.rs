use crate::cmd::{build_engine, load_config, parse_context, read_document, runtime};
use crate::output::{cell, print_json, print_table};
use ace_data::{Action, BatchResult};
use std::path::Path;

pub fn run(
    config: Option<&Path>,
    file: &Path,
    parallel: bool,
    context: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let actions: Vec<Action> = read_document(file)?;
    let context = parse_context(context)?;
    let engine = build_engine(&load_config(config)?)?;

    let results = runtime()?.block_on(async {
        if parallel {
            engine.execute_actions_parallel(&actions, &context).await
        } else {
            engine.execute_actions(&actions, &context).await
        }
    });

    if json {
        return print_json(&results);
    }
    print_table(&["#", "TYPE", "ENDPOINT", "STATUS", "RESULT"], &rows(&actions, &results));
    Ok(())
}

fn rows(actions: &[Action], results: &[BatchResult]) -> Vec<Vec<String>> {
    actions
        .iter()
        .zip(results)
        .enumerate()
        .map(|(i, (action, result))| {
            let (status, detail) = match (&result.data, &result.error) {
                (_, Some(err)) => ("failed", err.clone()),
                (Some(data), None) => ("ok", cell(data)),
                (None, None) => ("ok", String::new()),
            };
            vec![
                (i + 1).to_string(),
                action.action_type.to_string(),
                action.endpoint.clone(),
                status.to_string(),
                detail,
            ]
        })
        .collect()
}
