use crate::parser::parse_ecb_xml;
use log::debug;
use rates_model::DailyRate;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::fmt;
use thiserror::Error;

pub const ECB_HISTORY_URL: &str = "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-hist.xml";
pub const ECB_DAILY_URL: &str = "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-daily.xml";

const CLIENT_USER_AGENT: &str = concat!("ecb_rates/", env!("CARGO_PKG_VERSION"));

/// Which ECB reference-rate document to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// Every business day since 1999.
    History,
    /// The most recent business day only.
    Daily,
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Feed::History => write!(f, "history"),
            Feed::Daily => write!(f, "daily"),
        }
    }
}

pub struct EcbAPI {
    history_url: String,
    daily_url: String,
    client: reqwest::Client,
    headers: HeaderMap,
}

impl EcbAPI {
    pub fn new() -> Self {
        return EcbAPI::with_urls(ECB_HISTORY_URL, ECB_DAILY_URL);
    }

    pub fn with_urls(history_url: impl Into<String>, daily_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        return EcbAPI {
            history_url: history_url.into(),
            daily_url: daily_url.into(),
            client: reqwest::Client::new(),
            headers,
        };
    }

    pub fn url_for(&self, feed: Feed) -> &str {
        match feed {
            Feed::History => &self.history_url,
            Feed::Daily => &self.daily_url,
        }
    }

    pub async fn get_rates(&self, feed: Feed) -> Result<Vec<DailyRate>, EcbError> {
        let xml = self.fetch_xml(feed).await?;
        let rates = parse_ecb_xml(&xml);
        debug!("get_rates | feed: {} | records: {}", feed, rates.len());
        Ok(rates)
    }

    pub async fn fetch_xml(&self, feed: Feed) -> Result<String, EcbError> {
        let url = self.url_for(feed);

        debug!("fetch_xml | url: {}", url);

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EcbError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.text().await?)
    }
}

impl Default for EcbAPI {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum EcbError {
    #[error("Fetch failed: {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
