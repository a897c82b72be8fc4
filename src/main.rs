use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::time::Duration;
use xrate::core::log::init_logging;
use xrate::core::{CurrencyCode, CurrencyPair};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert, e.g. 100 or 1,250.50
        amount: String,
        /// Source currency code
        from: CurrencyCode,
        /// Target currency code
        to: CurrencyCode,
        /// Fee in percent (0-100) deducted from the converted amount
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        fee: f64,
    },
    /// Display current cross-rates
    Rates {
        /// Pairs to show, e.g. EUR/USD,USD/CNY (defaults to popular_pairs)
        #[arg(short, long, value_delimiter = ',')]
        pairs: Option<Vec<CurrencyPair>>,
    },
    /// Keep refreshing cross-rates with change indicators
    Watch {
        /// Pairs to show, e.g. EUR/USD,USD/CNY (defaults to popular_pairs)
        #[arg(short, long, value_delimiter = ',')]
        pairs: Option<Vec<CurrencyPair>>,
        /// Seconds between refreshes (defaults to refresh_interval_secs)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// List configured currencies
    Currencies,
}

impl From<Commands> for xrate::AppCommand {
    fn from(cmd: Commands) -> xrate::AppCommand {
        match cmd {
            Commands::Convert {
                amount,
                from,
                to,
                fee,
            } => xrate::AppCommand::Convert {
                amount,
                from,
                to,
                fee_percent: fee,
            },
            Commands::Rates { pairs } => xrate::AppCommand::Rates { pairs },
            Commands::Watch { pairs, interval } => xrate::AppCommand::Watch {
                pairs,
                interval: interval.map(Duration::from_secs),
            },
            Commands::Currencies => xrate::AppCommand::Currencies,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xrate::cli::setup::setup(),
        Some(cmd) => xrate::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_fee_reaches_validation() {
        let cli = Cli::try_parse_from(["xrate", "convert", "100", "EUR", "USD", "--fee", "-5"])
            .expect("negative fee should parse");
        match cli.command.map(xrate::AppCommand::from) {
            Some(xrate::AppCommand::Convert { fee_percent, .. }) => assert_eq!(fee_percent, -5.0),
            _ => panic!("Expected a convert command"),
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
