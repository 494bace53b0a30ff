use chrono::NaiveDate;
use log::{debug, info};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{Result, StreamerError};
use crate::kline::{date_to_millis, select_range, Kline, DAY_MILLIS};

/// Bybit max per request
pub const MAX_KLINES_PER_REQUEST: usize = 1000;

/// Pause between pages to stay under the public rate limit.
const PAGE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(rename = "retCode")]
    pub ret_code: i32,
    #[serde(rename = "retMsg")]
    pub ret_msg: String,
    pub result: T,
}

#[derive(Debug, Deserialize)]
pub struct KlineResult {
    #[serde(default)]
    pub list: Vec<Vec<String>>,
}

/// End cursor for the next (older) page, `None` once the range start is covered.
///
/// Bybit returns bars newest first, so the next request ends one day before
/// the oldest bar of the current page.
pub fn next_page_end(page: &[Kline], range_start_ms: i64, limit: usize) -> Option<i64> {
    let oldest = page.iter().map(|k| k.start_ms).min()?;
    if page.len() < limit || oldest <= range_start_ms {
        None
    } else {
        Some(oldest - DAY_MILLIS)
    }
}

pub struct BybitClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for BybitClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BybitClient {
    pub fn new() -> Self {
        Self::with_base_url("https://api.bybit.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// One page of daily bars between `start_ms` and `end_ms`, newest first.
    pub async fn get_kline_page(
        &self,
        category: &str,
        symbol: &str,
        start_ms: i64,
        end_ms: i64,
        limit: usize,
    ) -> Result<Vec<Kline>> {
        let url = format!("{}/v5/market/kline", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("category", category.to_string()),
                ("symbol", symbol.to_string()),
                ("interval", "D".to_string()),
                ("start", start_ms.to_string()),
                ("end", end_ms.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let api_response: ApiResponse<KlineResult> = response.json().await?;
        if api_response.ret_code != 0 {
            return Err(StreamerError::Api {
                code: api_response.ret_code,
                message: api_response.ret_msg,
            });
        }

        api_response
            .result
            .list
            .iter()
            .map(|fields| Kline::from_fields(fields))
            .collect()
    }

    /// Daily bars for `symbol` over the inclusive range `[start, end]`,
    /// sorted ascending with one bar per day.
    ///
    /// Fails with [`StreamerError::NoData`] when the exchange has nothing for
    /// the range, so callers never hand an empty series to the backtest.
    pub async fn get_daily_klines(
        &self,
        category: &str,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Kline>> {
        if start > end {
            return Err(StreamerError::InvalidRange { start, end });
        }

        let start_ms = date_to_millis(start);
        let mut end_ms = date_to_millis(end);
        let mut collected = Vec::new();
        let mut pages = 0;

        loop {
            let page = self
                .get_kline_page(category, symbol, start_ms, end_ms, MAX_KLINES_PER_REQUEST)
                .await?;
            pages += 1;
            debug!("{} page {}: {} bars", symbol, pages, page.len());

            let next = next_page_end(&page, start_ms, MAX_KLINES_PER_REQUEST);
            collected.extend(page);

            match next {
                Some(cursor) => {
                    end_ms = cursor;
                    tokio::time::sleep(PAGE_DELAY).await;
                }
                None => break,
            }
        }

        let klines = select_range(&collected, start, end);
        if klines.is_empty() {
            return Err(StreamerError::NoData {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }

        info!(
            "Fetched {} daily bars for {} in {} request(s)",
            klines.len(),
            symbol,
            pages
        );
        Ok(klines)
    }
}
