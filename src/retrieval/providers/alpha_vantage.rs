// src/retrieval/providers/alpha_vantage.rs
//
// Alpha Vantage NEWS_SENTIMENT adapter. The API reports rate limiting via a
// "Note"/"Information" field in an otherwise-200 body, and bad requests via
// "Error Message"; both get mapped onto the canonical error kinds here so
// the coordinator stays provider-agnostic.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use metrics::histogram;
use serde::Deserialize;

use crate::retrieval::normalize_description;
use crate::retrieval::types::{FetchError, Query, Record, ResultSet, SourceAdapter};

pub const NAME: &str = "alpha-vantage";
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Timestamps come back as `20250824T133000`.
const TIME_PUBLISHED_FORMAT: &str = "%Y%m%dT%H%M%S";

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(default)]
    feed: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    title: Option<String>,
    summary: Option<String>,
    url: Option<String>,
    source: Option<String>,
    time_published: Option<String>,
}

fn parse_time_published(ts: &str) -> u64 {
    NaiveDateTime::parse_from_str(ts, TIME_PUBLISHED_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

pub struct AlphaVantageAdapter {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        base_url: String,
        api_key: Option<String>,
        client: reqwest::Client,
    },
}

impl AlphaVantageAdapter {
    /// Fixture mode: parse a canned JSON body, no HTTP.
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn new(base_url: Option<&str>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("grounding-retriever/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .expect("reqwest client");
        Self {
            mode: Mode::Http {
                base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
                api_key,
                client,
            },
        }
    }

    fn parse_body(body: &str) -> Result<Vec<Record>, FetchError> {
        let t0 = std::time::Instant::now();
        let payload: Payload = serde_json::from_str(body)
            .map_err(|e| FetchError::Malformed(format!("alpha vantage json: {e}")))?;

        if let Some(msg) = payload.error_message {
            return Err(FetchError::Malformed(format!("alpha vantage: {msg}")));
        }
        if let Some(note) = payload.note.or(payload.information) {
            return Err(FetchError::RateLimited(format!("alpha vantage: {note}")));
        }

        let mut out = Vec::with_capacity(payload.feed.len());
        for item in payload.feed {
            out.push(Record {
                title: item.title.unwrap_or_else(|| "No title".to_string()),
                description: normalize_description(item.summary.as_deref().unwrap_or_default()),
                published_at: item
                    .time_published
                    .as_deref()
                    .map(parse_time_published)
                    .unwrap_or(0),
                source: item.source.unwrap_or_else(|| "Unknown source".to_string()),
                url: item.url.unwrap_or_default(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("retrieval_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for AlphaVantageAdapter {
    async fn fetch(&self, query: &Query) -> Result<ResultSet, FetchError> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body).map(|r| ResultSet::new(NAME, r)),

            Mode::Http {
                base_url,
                api_key,
                client,
            } => {
                let key = api_key
                    .as_deref()
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| {
                        FetchError::Unauthorized("alpha vantage api key is not configured".into())
                    })?;

                let mut req = client.get(base_url).query(&[
                    ("function", "NEWS_SENTIMENT"),
                    ("tickers", query.text.as_str()),
                    ("apikey", key),
                ]);
                if let Some(cap) = query.max_results {
                    req = req.query(&[("limit", cap.to_string())]);
                }
                if let Some(lookback) = query.lookback {
                    let from = chrono::Utc::now()
                        - chrono::Duration::seconds(lookback.as_secs() as i64);
                    req = req.query(&[("time_from", from.format("%Y%m%dT%H%M").to_string())]);
                }

                let resp = req
                    .send()
                    .await
                    .map_err(|e| FetchError::Unreachable(format!("alpha vantage: {e}")))?;

                let status = resp.status();
                if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN
                {
                    return Err(FetchError::Unauthorized(format!("alpha vantage: {status}")));
                }
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(FetchError::RateLimited(format!("alpha vantage: {status}")));
                }
                if !status.is_success() {
                    return Err(FetchError::Unreachable(format!("alpha vantage: {status}")));
                }

                let body = resp
                    .text()
                    .await
                    .map_err(|e| FetchError::Unreachable(format!("alpha vantage body: {e}")))?;
                Self::parse_body(&body).map(|r| ResultSet::new(NAME, r))
            }
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_published_parses_compact_format() {
        assert_eq!(parse_time_published("20250824T133000"), 1_756_042_200);
        assert_eq!(parse_time_published("not a date"), 0);
    }

    #[test]
    fn note_maps_to_rate_limited() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."}"#;
        let err = AlphaVantageAdapter::parse_body(body).unwrap_err();
        assert_eq!(err.kind(), crate::retrieval::types::FetchErrorKind::RateLimited);
    }

    #[test]
    fn error_message_maps_to_malformed() {
        let body = r#"{"Error Message": "Invalid API call."}"#;
        let err = AlphaVantageAdapter::parse_body(body).unwrap_err();
        assert_eq!(err.kind(), crate::retrieval::types::FetchErrorKind::Malformed);
    }

    #[test]
    fn empty_feed_is_a_success() {
        let body = r#"{"items": "0", "feed": []}"#;
        let records = AlphaVantageAdapter::parse_body(body).unwrap();
        assert!(records.is_empty());
    }
}
