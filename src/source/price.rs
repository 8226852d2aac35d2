//! Spot price lookup against a CoinGecko-style "simple price" endpoint.
//!
//! The endpoint answers `{ "<asset>": { "<currency>": <number> } }`; one
//! number is pulled out and rendered as `1 BTC = 95802 USD`.

use async_trait::async_trait;
use serde_json::Value;

use super::ContentProvider;
use crate::error::ProviderError;

pub struct PriceProvider {
    label: String,
    client: reqwest::Client,
    url: String,
    asset: String,
    currency: String,
    symbol: String,
}

impl PriceProvider {
    /// `symbol` is the ticker shown in the message; defaults to the
    /// upper-cased asset id.
    pub fn new(
        label: impl Into<String>,
        client: reqwest::Client,
        url: impl Into<String>,
        asset: impl Into<String>,
        currency: impl Into<String>,
        symbol: Option<&str>,
    ) -> Self {
        let asset = asset.into();
        let symbol = symbol
            .map(str::to_string)
            .unwrap_or_else(|| asset.to_uppercase());
        Self {
            label: label.into(),
            client,
            url: url.into(),
            asset,
            currency: currency.into(),
            symbol,
        }
    }
}

/// Extract `body[asset][currency]` and format the quote line.
pub fn format_price(
    body: &str,
    asset: &str,
    currency: &str,
    symbol: &str,
) -> Result<String, ProviderError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::Parse(format!("price response: {e}")))?;

    let price = json
        .get(asset)
        .and_then(|quotes| quotes.get(currency))
        .filter(|v| v.is_number())
        .ok_or_else(|| {
            ProviderError::Parse(format!("no numeric `{asset}.{currency}` in price response"))
        })?;

    Ok(format!("1 {symbol} = {price} {}", currency.to_uppercase()))
}

#[async_trait]
impl ContentProvider for PriceProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn produce(&self) -> Result<String, ProviderError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        tracing::debug!(provider = %self.label, %body, "price response");
        format_price(&body, &self.asset, &self.currency, &self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_integer_price() {
        let text = format_price(r#"{"bitcoin":{"usd":95802}}"#, "bitcoin", "usd", "BTC").unwrap();
        assert_eq!(text, "1 BTC = 95802 USD");
    }

    #[test]
    fn formats_fractional_price() {
        let body = r#"{"ethereum":{"eur":3120.55}}"#;
        let text = format_price(body, "ethereum", "eur", "ETH").unwrap();
        assert_eq!(text, "1 ETH = 3120.55 EUR");
    }

    #[test]
    fn missing_field_is_parse_error() {
        let err = format_price(r#"{"bitcoin":{"eur":1}}"#, "bitcoin", "usd", "BTC").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn non_numeric_field_is_parse_error() {
        let body = r#"{"bitcoin":{"usd":"lots"}}"#;
        let err = format_price(body, "bitcoin", "usd", "BTC").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = format_price("<html>rate limited</html>", "bitcoin", "usd", "BTC").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn symbol_defaults_to_upper_asset() {
        let p = PriceProvider::new("btc", reqwest::Client::new(), "http://x", "doge", "usd", None);
        assert_eq!(p.symbol, "DOGE");
    }
}
