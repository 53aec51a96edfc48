use clap::Parser;
use csrf_bootstrap::cache::token::Token;
use csrf_bootstrap::server;
use csrf_bootstrap::utils::config_loader;
use csrf_bootstrap::utils::logging;
use csrf_bootstrap::utils::logging::LogLevel;
use csrf_bootstrap::{PageSession, TokenBootstrapper, TokenState};
use anyhow::Result;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "csrf-bootstrap.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// write the fetched token to stdout
    #[arg(long)]
    print: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level.to_owned()).await?;

    // -------------------------------
    // 2. Metrics server (optional)
    // -------------------------------

    let settings = service_config.settings.clone();
    let http_server = tokio::spawn(async move { server::server::start(&settings).await });

    // -------------------------------
    // 3. Page ready -> bootstrap csrf token
    // -------------------------------

    let state = TokenState::new();
    let bootstrapper = TokenBootstrapper::new(&service_config.page, state.clone()).await?;
    let page = PageSession::new(bootstrapper);
    page.content_ready()?.await?;

    match state.snapshot().await {
        Token::Value(value) => {
            info!("csrf token available");
            if args.print {
                println!("{}", value);
            }
        }
        Token::Absent => warn!("csrf token endpoint answered without a token"),
        Token::Unset => warn!("csrf token unavailable"),
    }

    // -------------------------------
    // 4. Keep serving metrics until interrupted
    // -------------------------------

    if service_config.settings.metrics.is_enabled {
        info!("serving metrics, press ctrl-c to stop");
        tokio::select! {
            res = http_server => res??,
            _ = tokio::signal::ctrl_c() => info!("shutting down"),
        }
    }

    Ok(())
}
