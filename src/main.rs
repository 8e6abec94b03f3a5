use clap::Parser;
use surgewatch::cli::{Cli, Commands};
use surgewatch::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _guard = surgewatch::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("starting engine");
            args.execute(&config).await?;
        }
        Commands::Probe(args) => {
            tracing::info!("probing market data source");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Feed: {} ({})",
                config.feed.base_url, config.feed.quote_suffix
            );
            println!(
                "  Thresholds: step={}% sequence={:?}",
                config.thresholds.step_pct, config.thresholds.strong_sequence
            );
            println!(
                "  Alerting: cooldown={}s flood={}per{}s rank<=#{}",
                config.alert.cooldown_secs,
                config.alert.flood_max_per_window,
                config.alert.flood_window_secs,
                config.rank.max_rank
            );
            println!(
                "  Outcome: target={}% follow-up={}s",
                config.outcome.target_pct, config.outcome.follow_up_secs
            );
        }
    }

    Ok(())
}
