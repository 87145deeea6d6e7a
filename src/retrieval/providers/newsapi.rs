// src/retrieval/providers/newsapi.rs
//
// NewsAPI /v2/everything adapter, the fallback market-news source. NewsAPI
// signals failures through a {"status":"error","code":...} envelope, mapped
// onto the canonical kinds below.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use metrics::histogram;
use serde::Deserialize;

use crate::retrieval::normalize_description;
use crate::retrieval::types::{FetchError, Query, Record, ResultSet, SourceAdapter};

pub const NAME: &str = "newsapi";
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Deserialize)]
struct Payload {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<ArticleSource>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

fn parse_rfc3339_to_unix(ts: &str) -> u64 {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

pub struct NewsApiAdapter {
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

impl NewsApiAdapter {
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
            .map_err(|e| FetchError::Malformed(format!("newsapi json: {e}")))?;

        if payload.status == "error" {
            let message = payload.message.unwrap_or_else(|| "unknown error".to_string());
            return Err(match payload.code.as_deref() {
                Some("apiKeyMissing" | "apiKeyInvalid" | "apiKeyDisabled" | "unauthorized") => {
                    FetchError::Unauthorized(format!("newsapi: {message}"))
                }
                Some("rateLimited") => FetchError::RateLimited(format!("newsapi: {message}")),
                _ => FetchError::Malformed(format!("newsapi: {message}")),
            });
        }

        let mut out = Vec::with_capacity(payload.articles.len());
        for a in payload.articles {
            out.push(Record {
                title: a.title.unwrap_or_else(|| "No title".to_string()),
                description: normalize_description(a.description.as_deref().unwrap_or_default()),
                published_at: a
                    .published_at
                    .as_deref()
                    .map(parse_rfc3339_to_unix)
                    .unwrap_or(0),
                source: a
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "Unknown source".to_string()),
                url: a.url.unwrap_or_default(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("retrieval_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for NewsApiAdapter {
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
                        FetchError::Unauthorized("newsapi api key is not configured".into())
                    })?;

                let mut req = client.get(base_url).query(&[
                    ("q", query.text.as_str()),
                    ("sortBy", "publishedAt"),
                    ("apiKey", key),
                ]);
                if let Some(cap) = query.max_results {
                    req = req.query(&[("pageSize", cap.to_string())]);
                }
                if let Some(lookback) = query.lookback {
                    let from = chrono::Utc::now()
                        - chrono::Duration::seconds(lookback.as_secs() as i64);
                    req = req.query(&[("from", from.to_rfc3339())]);
                }

                let resp = req
                    .send()
                    .await
                    .map_err(|e| FetchError::Unreachable(format!("newsapi: {e}")))?;

                let status = resp.status();
                if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN
                {
                    return Err(FetchError::Unauthorized(format!("newsapi: {status}")));
                }
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(FetchError::RateLimited(format!("newsapi: {status}")));
                }

                // NewsAPI also puts error details in 4xx/5xx bodies; keep the
                // body and let the envelope mapping decide the kind.
                let body = resp
                    .text()
                    .await
                    .map_err(|e| FetchError::Unreachable(format!("newsapi body: {e}")))?;
                if !status.is_success() && serde_json::from_str::<Payload>(&body).is_err() {
                    return Err(FetchError::Unreachable(format!("newsapi: {status}")));
                }
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
    use crate::retrieval::types::FetchErrorKind;

    #[test]
    fn rfc3339_parses() {
        assert_eq!(parse_rfc3339_to_unix("2025-08-24T13:30:00Z"), 1_756_042_200);
        assert_eq!(parse_rfc3339_to_unix("yesterday"), 0);
    }

    #[test]
    fn api_key_error_codes_map_to_unauthorized() {
        for code in ["apiKeyMissing", "apiKeyInvalid", "apiKeyDisabled"] {
            let body =
                format!(r#"{{"status":"error","code":"{code}","message":"bad key"}}"#);
            let err = NewsApiAdapter::parse_body(&body).unwrap_err();
            assert_eq!(err.kind(), FetchErrorKind::Unauthorized, "code {code}");
        }
    }

    #[test]
    fn rate_limited_code_maps_to_rate_limited() {
        let body = r#"{"status":"error","code":"rateLimited","message":"too many requests"}"#;
        let err = NewsApiAdapter::parse_body(body).unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::RateLimited);
    }

    #[test]
    fn unknown_error_code_maps_to_malformed() {
        let body = r#"{"status":"error","code":"parametersMissing","message":"q required"}"#;
        let err = NewsApiAdapter::parse_body(body).unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Malformed);
    }
}
