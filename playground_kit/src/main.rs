//! # playground-cli
//!
//! Interactive client for a playground server. Lists the services found at the
//! discovery endpoint and calls them:
//!
//! ```text
//! playground-cli --url http://localhost:3030 messages create --data '{"text":"hi"}'
//! playground-cli describe users
//! playground-cli            # starts the REPL
//! ```

use anyhow::{Context, Result};

#[tokio::main]
async fn main() -> Result<()> {
    playground_kit::api_cli::run()
        .await
        .context("playground-cli failed")
}
