use crate::cmd::load_config;
use crate::output::print_json;
use ace_data::{FileTokenStore, TokenStore, AUTH_TOKEN_KEY};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum TokenSubcommand {
    /// Store the bearer token sent with every request
    Set { value: String },
    /// Print the stored token
    Show,
    /// Remove the stored token
    Clear,
}

pub fn run(config: Option<&Path>, subcmd: TokenSubcommand, json: bool) -> anyhow::Result<()> {
    let path = load_config(config)?
        .token_store_path()
        .context("cannot locate token store")?;
    let store = FileTokenStore::new(&path);

    match subcmd {
        TokenSubcommand::Set { value } => {
            store
                .set(AUTH_TOKEN_KEY, &value)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Token saved to {}", path.display());
        }
        TokenSubcommand::Show => {
            let token = store.get(AUTH_TOKEN_KEY);
            if json {
                return print_json(&serde_json::json!({ AUTH_TOKEN_KEY: token }));
            }
            match token {
                Some(t) => println!("{t}"),
                None => println!("No token stored."),
            }
        }
        TokenSubcommand::Clear => {
            store
                .remove(AUTH_TOKEN_KEY)
                .with_context(|| format!("failed to update {}", path.display()))?;
            println!("Token cleared.");
        }
    }
    Ok(())
}
