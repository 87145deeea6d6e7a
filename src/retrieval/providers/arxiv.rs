// src/retrieval/providers/arxiv.rs
//
// arXiv export API adapter for the scientific chain. The export API is an
// Atom feed and needs no credential; failures are transport-level or
// malformed XML only.

use std::time::Duration;

use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime, UtcOffset};

use crate::retrieval::normalize_description;
use crate::retrieval::types::{FetchError, Query, Record, ResultSet, SourceAdapter};

pub const NAME: &str = "arxiv";
pub const DEFAULT_BASE_URL: &str = "http://export.arxiv.org/api/query";

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<String>,
    summary: Option<String>,
    id: Option<String>,
    published: Option<String>,
}

fn parse_rfc3339_to_unix(ts: &str) -> u64 {
    OffsetDateTime::parse(ts, &Rfc3339)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

pub struct ArxivAdapter {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        base_url: String,
        client: reqwest::Client,
    },
}

impl ArxivAdapter {
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn new(base_url: Option<&str>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("grounding-retriever/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .expect("reqwest client");
        Self {
            mode: Mode::Http {
                base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
                client,
            },
        }
    }

    fn parse_body(body: &str) -> Result<Vec<Record>, FetchError> {
        let t0 = std::time::Instant::now();
        let feed: Feed =
            from_str(body).map_err(|e| FetchError::Malformed(format!("arxiv atom: {e}")))?;

        let mut out = Vec::with_capacity(feed.entry.len());
        for e in feed.entry {
            let title = normalize_description(e.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            out.push(Record {
                title,
                description: normalize_description(e.summary.as_deref().unwrap_or_default()),
                published_at: e
                    .published
                    .as_deref()
                    .map(parse_rfc3339_to_unix)
                    .unwrap_or(0),
                source: "arXiv".to_string(),
                url: e.id.unwrap_or_default(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("retrieval_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for ArxivAdapter {
    async fn fetch(&self, query: &Query) -> Result<ResultSet, FetchError> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body).map(|r| ResultSet::new(NAME, r)),

            Mode::Http { base_url, client } => {
                let search = format!("all:{}", query.text);
                let mut req = client.get(base_url).query(&[
                    ("search_query", search.as_str()),
                    ("start", "0"),
                    ("sortBy", "submittedDate"),
                    ("sortOrder", "descending"),
                ]);
                if let Some(cap) = query.max_results {
                    req = req.query(&[("max_results", cap.to_string())]);
                }

                let resp = req
                    .send()
                    .await
                    .map_err(|e| FetchError::Unreachable(format!("arxiv: {e}")))?;

                let status = resp.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(FetchError::RateLimited(format!("arxiv: {status}")));
                }
                if !status.is_success() {
                    return Err(FetchError::Unreachable(format!("arxiv: {status}")));
                }

                let body = resp
                    .text()
                    .await
                    .map_err(|e| FetchError::Unreachable(format!("arxiv body: {e}")))?;
                Self::parse_body(&body).map(|r| ResultSet::new(NAME, r))
            }
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
