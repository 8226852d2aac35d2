//! Daily exchange-rate table relayed as text.
//!
//! The Czech National Bank publishes a pipe-delimited table; the delimiter is
//! swapped for tabs so the columns line up in chat. No further parsing.

use async_trait::async_trait;

use super::ContentProvider;
use crate::error::ProviderError;

pub const DEFAULT_DELIMITER: char = '|';

pub struct ExchangeRateProvider {
    label: String,
    client: reqwest::Client,
    url: String,
    delimiter: char,
}

impl ExchangeRateProvider {
    pub fn new(label: impl Into<String>, client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            client,
            url: url.into(),
            delimiter: DEFAULT_DELIMITER,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

pub fn tabulate(raw: &str, delimiter: char) -> String {
    raw.replace(delimiter, "\t")
}

#[async_trait]
impl ContentProvider for ExchangeRateProvider {
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
        Ok(tabulate(&body, self.delimiter))
    }
}
