//! API CLI module for playground_kit
//!
//! A discovery-driven CLI client and REPL: the command tree is built from the
//! services a playground server reports at its discovery endpoint.

pub mod cli;
pub mod client;
pub mod completer;
pub mod error;
pub mod repl;

pub use error::Result;
pub use lib::{run, run_with_args};

mod lib {
    use clap::{Parser, Subcommand};
    use tracing_subscriber::EnvFilter;

    use crate::api_cli::cli::{build_cli_from_services, BIN_NAME};
    use crate::api_cli::error::Result;
    use crate::api_cli::repl;
    use playground_core::client::{DEFAULT_API_URL, DEFAULT_SERVICES_PATH};
    use playground_core::Dispatcher;

    /// A discovery-driven CLI client and REPL for playground servers.
    #[derive(Parser, Debug)]
    #[command(version, about, long_about = None)]
    struct Cli {
        /// The base URL of the server.
        #[arg(short, long, global = true, env = "PLAYGROUND_API_URL", default_value = DEFAULT_API_URL)]
        url: String,

        /// Path of the discovery endpoint on that server.
        #[arg(long, global = true, env = "PLAYGROUND_MOUNT_PATH", default_value = DEFAULT_SERVICES_PATH)]
        services_path: String,

        /// The command to execute, e.g. `messages find --query $limit=2`.
        /// If no command is provided, starts an interactive REPL session.
        #[command(subcommand)]
        command: Option<ApiCommand>,
    }

    #[derive(Subcommand, Debug)]
    enum ApiCommand {
        #[command(external_subcommand)]
        External(Vec<String>),
    }

    /// The main entry point of `playground-cli`.
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        execute(Cli::parse()).await
    }

    /// Runs the CLI with explicit arguments, program name excluded.
    pub async fn run_with_args(args: Vec<String>) -> Result<()> {
        let mut full_args = vec![BIN_NAME.to_string()];
        full_args.extend(args);
        execute(Cli::try_parse_from(full_args)?).await
    }

    async fn execute(cli: Cli) -> Result<()> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .try_init();

        let dispatcher = Dispatcher::new(cli.url);
        let services = dispatcher.services(&cli.services_path).await?;
        let mut full_cli = build_cli_from_services(&services);

        match cli.command {
            Some(ApiCommand::External(args)) => {
                let mut full_args = vec![BIN_NAME.to_string()];
                full_args.extend(args);
                let matches = full_cli.try_get_matches_from_mut(&full_args)?;
                repl::run_command(&dispatcher, &services, &matches).await?;
            }
            None => repl::start_repl(&dispatcher, &services).await?,
        }
        Ok(())
    }
}
