pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{CurrencyCode, CurrencyPair, RateProvider};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: String,
        from: CurrencyCode,
        to: CurrencyCode,
        fee_percent: f64,
    },
    Rates {
        pairs: Option<Vec<CurrencyPair>>,
    },
    Watch {
        pairs: Option<Vec<CurrencyPair>>,
        interval: Option<Duration>,
    },
    Currencies,
}

pub fn build_provider(config: &AppConfig) -> Result<Arc<dyn RateProvider>> {
    let provider_config = &config.providers.freecurrencyapi;
    let api_key = provider_config.resolve_api_key()?;
    let provider =
        providers::freecurrencyapi::FreeCurrencyApiProvider::new(&provider_config.base_url, &api_key)?;
    Ok(Arc::new(provider))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrate starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Currencies => {
            cli::currencies::run(&config);
            Ok(())
        }
        AppCommand::Convert {
            amount,
            from,
            to,
            fee_percent,
        } => {
            let provider = build_provider(&config)?;
            cli::convert::run(&config, provider.as_ref(), &amount, &from, &to, fee_percent).await
        }
        AppCommand::Rates { pairs } => {
            let provider = build_provider(&config)?;
            cli::rates::run(&config, provider.as_ref(), pairs).await
        }
        AppCommand::Watch { pairs, interval } => {
            let provider = build_provider(&config)?;
            cli::watch::run(&config, provider, pairs, interval).await
        }
    }
}
