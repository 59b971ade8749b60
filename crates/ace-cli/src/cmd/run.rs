use crate::cmd::{build_engine, load_config, parse_context, read_document, runtime};
use crate::output::print_json;
use ace_data::Action;
use std::path::Path;

pub fn run(
    config: Option<&Path>,
    file: &Path,
    context: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let action: Action = read_document(file)?;
    let context = parse_context(context)?;
    let engine = build_engine(&load_config(config)?)?;

    let data = runtime()?.block_on(engine.execute_action(&action, &context))?;

    if json {
        print_json(&data)
    } else {
        println!("{}", serde_json::to_string(&data)?);
        Ok(())
    }
}
