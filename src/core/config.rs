use super::change::DeltaMode;
use super::currency::{CurrencyCode, CurrencyPair};
use crate::providers::freecurrencyapi;
use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Currency {
    pub code: CurrencyCode,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FreeCurrencyApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for FreeCurrencyApiConfig {
    fn default() -> Self {
        FreeCurrencyApiConfig {
            base_url: freecurrencyapi::DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl FreeCurrencyApiConfig {
    /// Key from the config file, falling back to the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(freecurrencyapi::API_KEY_ENV).ok())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured. Set providers.freecurrencyapi.api_key or {}",
                    freecurrencyapi::API_KEY_ENV
                )
            })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub freecurrencyapi: FreeCurrencyApiConfig,
}

fn default_base_currency() -> CurrencyCode {
    CurrencyCode::from_static("USD")
}

fn default_currencies() -> Vec<Currency> {
    [
        ("USD", "U.S. Dollar"),
        ("EUR", "Euro"),
        ("GBP", "British Pound"),
        ("CNY", "Chinese Yuan"),
        ("CHF", "Swiss Franc"),
        ("AUD", "Australian Dollar"),
        ("CAD", "Canadian Dollar"),
        ("PLN", "Polish Zloty"),
        ("CZK", "Czech Koruna"),
    ]
    .into_iter()
    .map(|(code, name)| Currency {
        code: CurrencyCode::from_static(code),
        name: name.to_string(),
    })
    .collect()
}

fn default_popular_pairs() -> Vec<CurrencyPair> {
    ["USD/EUR", "EUR/USD", "EUR/GBP", "GBP/EUR", "USD/CNY"]
        .into_iter()
        .filter_map(|p| p.parse().ok())
        .collect()
}

fn default_refresh_interval_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_base_currency")]
    pub base_currency: CurrencyCode,
    #[serde(default = "default_currencies")]
    pub currencies: Vec<Currency>,
    #[serde(default = "default_popular_pairs")]
    pub popular_pairs: Vec<CurrencyPair>,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub delta_mode: DeltaMode,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_currency: default_base_currency(),
            currencies: default_currencies(),
            popular_pairs: default_popular_pairs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            delta_mode: DeltaMode::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "xrate", "xrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be greater than zero");
        }
        Ok(())
    }

    /// Every code the feed should request: configured currencies plus pair legs.
    pub fn tracked_codes(&self) -> Vec<CurrencyCode> {
        let mut codes: Vec<CurrencyCode> = self
            .currencies
            .iter()
            .map(|c| c.code.clone())
            .chain(
                self.popular_pairs
                    .iter()
                    .flat_map(|p| [p.from.clone(), p.to.clone()]),
            )
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn currency_name(&self, code: &CurrencyCode) -> Option<&str> {
        self.currencies
            .iter()
            .find(|c| &c.code == code)
            .map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
base_currency: usd
currencies:
  - code: EUR
    name: Euro
  - code: uah
    name: Ukrainian Hryvnia
popular_pairs:
  - USD/UAH
  - UAH/EUR
refresh_interval_secs: 30
delta_mode: absolute
providers:
  freecurrencyapi:
    base_url: "http://example.com/rates"
    api_key: "secret"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.base_currency.as_str(), "USD");
        assert_eq!(config.currencies.len(), 2);
        assert_eq!(config.currencies[1].code.as_str(), "UAH");
        assert_eq!(config.popular_pairs[1].to_string(), "UAH/EUR");
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.delta_mode, DeltaMode::Absolute);
        assert_eq!(
            config.providers.freecurrencyapi.base_url,
            "http://example.com/rates"
        );
        assert_eq!(
            config.providers.freecurrencyapi.resolve_api_key().unwrap(),
            "secret"
        );

        let codes: Vec<_> = config.tracked_codes().iter().map(|c| c.to_string()).collect();
        assert_eq!(codes, vec!["EUR", "UAH", "USD"]);
        assert_eq!(
            config.currency_name(&CurrencyCode::new("uah").unwrap()),
            Some("Ukrainian Hryvnia")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.base_currency.as_str(), "USD");
        assert_eq!(config.currencies.len(), 9);
        assert_eq!(config.refresh_interval_secs, 60);
        assert_eq!(config.delta_mode, DeltaMode::Percent);
        assert_eq!(
            config.providers.freecurrencyapi.base_url,
            "https://api.freecurrencyapi.com"
        );
        assert!(!config.popular_pairs.is_empty());
    }

    #[test]
    fn test_invalid_codes_are_rejected() {
        let yaml_str = "currencies:\n  - code: EURO\n    name: Euro\n";
        assert!(serde_yaml::from_str::<AppConfig>(yaml_str).is_err());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "refresh_interval_secs: 0\n").unwrap();
        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }
}
