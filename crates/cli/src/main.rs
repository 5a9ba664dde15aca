use anyhow::Context;
use clap::{Parser, Subcommand};
use staybnb_app::{build_registry, store::Store};
use staybnb_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "staybnb")]
#[command(about = "Short-term rental marketplace API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Print the merged OpenAPI document
    Openapi {
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the resolved configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load Staybnb settings")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            staybnb_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "staybnb serve");

            tokio::runtime::Runtime::new()
                .context("failed to start tokio runtime")?
                .block_on(staybnb_app::run(settings))
        }
        Commands::Openapi { pretty } => {
            let registry = build_registry(&Store::new());
            let document = staybnb_http::router::openapi_document(&registry);
            let rendered = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{rendered}");
            Ok(())
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}
