use clap::Parser;
use oracle_relay::cli::{Cli, Commands};
use oracle_relay::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Run(args) => {
            oracle_relay::telemetry::init_telemetry(&config.telemetry)?;
            args.execute(config).await?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
