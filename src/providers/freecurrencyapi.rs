use crate::core::currency::{CurrencyCode, RateProvider};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.freecurrencyapi.com";
pub const API_KEY_ENV: &str = "FREECURRENCYAPI_KEY";

// FreeCurrencyApiProvider implementation for RateProvider
pub struct FreeCurrencyApiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl FreeCurrencyApiProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("xrate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn latest_url(&self, base: &CurrencyCode, codes: &[CurrencyCode]) -> Result<Url> {
        let currencies = codes
            .iter()
            .map(CurrencyCode::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let mut params = vec![
            ("apikey", self.api_key.as_str()),
            ("base_currency", base.as_str()),
        ];
        if !currencies.is_empty() {
            params.push(("currencies", currencies.as_str()));
        }
        Url::parse_with_params(&format!("{}/v1/latest", self.base_url), &params)
            .with_context(|| format!("Invalid rate provider URL: {}", self.base_url))
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    data: HashMap<String, f64>,
}

#[async_trait]
impl RateProvider for FreeCurrencyApiProvider {
    #[instrument(
        name = "FreeCurrencyApiFetch",
        skip_all,
        fields(base = %base, count = codes.len())
    )]
    async fn fetch_rates(
        &self,
        base: &CurrencyCode,
        codes: &[CurrencyCode],
    ) -> Result<HashMap<CurrencyCode, f64>> {
        let url = self.latest_url(base, codes)?;
        debug!(endpoint = %url.path(), "Requesting latest rates");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base currency: {}", e, base))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base
            ));
        }

        let text = response.text().await?;
        let data: LatestResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", base, e))?;

        if data.data.is_empty() {
            return Err(anyhow!("No rate data found for base currency: {}", base));
        }

        let rates = data
            .data
            .into_iter()
            .filter_map(|(code, rate)| match CurrencyCode::new(&code) {
                Ok(code) => Some((code, rate)),
                Err(e) => {
                    warn!(error = %e, "Skipping unknown currency in response");
                    None
                }
            })
            .collect();
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/latest"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("base_currency", "USD"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/latest"))
            .and(query_param("currencies", "EUR,GBP"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"data": {"EUR": 0.9, "GBP": 0.78}}"#),
            )
            .mount(&mock_server)
            .await;

        let provider = FreeCurrencyApiProvider::new(&mock_server.uri(), "test-key").unwrap();
        let rates = provider
            .fetch_rates(&code("USD"), &[code("EUR"), code("GBP")])
            .await
            .expect("Failed to get rates");
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[&code("EUR")], 0.9);
        assert_eq!(rates[&code("GBP")], 0.78);
    }

    #[tokio::test]
    async fn test_lower_case_codes_are_normalized() {
        let mock_server = create_mock_server(200, r#"{"data": {"eur": 0.9, "XX1": 2.0}}"#).await;
        let provider = FreeCurrencyApiProvider::new(&mock_server.uri(), "test-key").unwrap();

        let rates = provider.fetch_rates(&code("USD"), &[code("EUR")]).await.unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[&code("EUR")], 0.9);
    }

    #[tokio::test]
    async fn test_empty_rate_data() {
        let mock_server = create_mock_server(200, r#"{"data": {}}"#).await;
        let provider = FreeCurrencyApiProvider::new(&mock_server.uri(), "test-key").unwrap();

        let result = provider.fetch_rates(&code("USD"), &[code("EUR")]).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rate data found for base currency: USD"
        );
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = create_mock_server(401, r#"{"message": "Invalid authentication credentials"}"#).await;
        let provider = FreeCurrencyApiProvider::new(&mock_server.uri(), "test-key").unwrap();

        let result = provider.fetch_rates(&code("USD"), &[code("EUR")]).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 401 Unauthorized for base currency: USD"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server(200, r#"{"rates": {"EUR": 0.9}}"#).await;
        let provider = FreeCurrencyApiProvider::new(&mock_server.uri(), "test-key").unwrap();

        let result = provider.fetch_rates(&code("USD"), &[code("EUR")]).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for USD")
        );
    }
}
