use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use saas_ipo_trends::config::{Cli, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    let now = Instant::now();
    let config = Config::from(cli);
    saas_ipo_trends::run(&config)?;

    info!("end processing elapsed: {:.2?}", now.elapsed());

    Ok(())
}
