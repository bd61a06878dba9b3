use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    Error, Result,
    config::{FeedConfig, RetryPolicy},
    models::{ChartEnvelope, PricePoint},
};

lazy_static::lazy_static! {
    static ref DEFAULT_HEADERS: HeaderMap = {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers
    };
}

/// Anything that can produce the current intraday series.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<PricePoint>>;
}

pub fn build_request(config: &FeedConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .default_headers(DEFAULT_HEADERS.clone())
        .user_agent(crate::UA)
        .timeout(config.request_timeout)
        .gzip(true)
        .build()?;
    Ok(client)
}

/// Client for the `v8/finance/chart` endpoint.
#[derive(Debug, Clone)]
pub struct ChartClient {
    http: reqwest::Client,
    config: FeedConfig,
}

impl ChartClient {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let http = build_request(&config)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn chart_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", self.config.symbol.as_str()]);
        url.query_pairs_mut()
            .append_pair("interval", &self.config.interval.to_string())
            .append_pair("range", &self.config.range.to_string());
        Ok(url)
    }

    #[tracing::instrument(skip(self), fields(symbol = %self.config.symbol))]
    pub async fn fetch_once(&self) -> Result<Vec<PricePoint>> {
        let url = self.chart_url()?;
        info!("Sending request to: {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        // Error responses still carry a chart envelope with an `error` object.
        let envelope: ChartEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(Error::HttpStatus(status.as_u16())),
            Err(e) => return Err(e.into()),
        };
        let result = envelope.into_result()?;
        debug!("chart meta: {:?}", result.meta);
        let points = result.price_points()?;
        debug!(
            "received {} bars, {} with a close",
            result.timestamp.len(),
            points.len()
        );
        Ok(points)
    }

    async fn fetch_with_retry(&self, policy: RetryPolicy) -> Result<Vec<PricePoint>> {
        backoff::future::retry_notify(
            exponential_backoff(policy),
            || async {
                self.fetch_once().await.map_err(|e| {
                    if is_transient(&e) {
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            },
            |err, wait| warn!("quote request failed, retrying in {:?}: {}", wait, err),
        )
        .await
    }
}

/// Network failures and server-side statuses are worth another attempt.
/// Anything the API answered deliberately (unknown symbol, bad payload) is not.
pub fn is_transient(error: &Error) -> bool {
    match error {
        Error::RequestError(e) => !e.is_builder() && !e.is_redirect(),
        Error::HttpStatus(status) => *status >= 500 || *status == 429,
        _ => false,
    }
}

fn exponential_backoff(policy: RetryPolicy) -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(policy.initial_interval)
        .with_max_interval(policy.max_interval)
        .with_max_elapsed_time(Some(policy.max_elapsed))
        .build()
}

#[async_trait]
impl QuoteSource for ChartClient {
    async fn fetch(&self) -> Result<Vec<PricePoint>> {
        match self.config.retry {
            Some(policy) => self.fetch_with_retry(policy).await,
            None => self.fetch_once().await,
        }
    }
}
