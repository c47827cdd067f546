mod cli;
mod client;
mod commands;
mod config;
mod context;
mod display;
mod error;
mod form;
mod locations;
mod notify;
mod output;
mod types;

#[cfg(test)]
mod testing;

use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use client::ApiClient;
use config::Config;
use context::UserContext;
use error::Result;
use std::error::Error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let verbose = std::env::args().any(|arg| arg == "--verbose" || arg == "-v");
    setup_tracing(verbose);

    if let Err(e) = run().await {
        if !e.already_reported() {
            eprintln!("Error: {e}");
        }

        // Show error chain if verbose flag was passed
        if verbose {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = std::error::Error::source(cause);
            }
        }

        std::process::exit(1);
    }
}

/// Logs go to stderr so table and JSON output on stdout stay clean.
/// `RUST_LOG` wins over the --verbose default.
fn setup_tracing(verbose: bool) {
    let default = if verbose { "usuarios=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    match cli.command {
        // Commands that don't require config
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "users", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run().await?;
        }
        command => {
            let config = Config::load()?;
            let locations = locations::install(config.locations_path().as_deref())?;

            match command {
                Commands::Regions => {
                    commands::locations::regions(locations);
                }
                Commands::Communes { region } => {
                    commands::locations::communes(locations, &region)?;
                }
                // Commands that require the API
                command => {
                    let client = ApiClient::new(config.api_url()?, config.api_token());
                    let ctx = UserContext::new(client);

                    match command {
                        Commands::List => {
                            commands::users::list(&ctx).await?;
                        }
                        Commands::Show { id } => {
                            commands::users::show(&ctx, &id).await?;
                        }
                        Commands::Create(args) => {
                            commands::users::create(&ctx, locations, args).await?;
                        }
                        Commands::Update(args) => {
                            commands::users::update(&ctx, locations, args).await?;
                        }
                        Commands::Regions
                        | Commands::Communes { .. }
                        | Commands::Completions { .. }
                        | Commands::Init => {
                            // Already handled above
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
