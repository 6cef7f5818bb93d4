// bases/download_cli/src/main.rs
mod app;
mod args;
mod config;
mod output;
mod prompt;

use app::App;
use args::Args;
use clap::Parser;
use color_eyre::Result;
use config::Config;
use prompt::StdinPrompter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let config = Config::from_args(args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut app = App::new(config, StdinPrompter);

    if let Err(error) = app.run().await {
        app.print_error(&error);
        std::process::exit(1);
    }
    Ok(())
}
