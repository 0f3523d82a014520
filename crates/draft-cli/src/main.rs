//! Drafting script runner entry point

use std::process;

use clap::Parser;
use draft_cli::{Args, create_shared_config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let args = Args::parse();
    let config = create_shared_config(args.config.as_deref());

    let filter = config.read().config().log_filter.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&filter))
                .unwrap_or_else(|_| draft_cli::config::DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    config.read().log_source();
    tracing::info!("Running script {:?}", args.script);

    let stdout = std::io::stdout();
    if let Err(err) = draft_cli::run(&args, &config, &mut stdout.lock()) {
        tracing::error!("{}", err);
        eprintln!("error: {err}");
        process::exit(1);
    }
}
