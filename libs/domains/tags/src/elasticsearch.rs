//! Elasticsearch-backed [`TagIndex`] over the REST API.
//!
//! Documents live in a single index keyed by tag ID with the body
//! `{"tag_id": .., "name": ..}`. Searching combines a `match_phrase_prefix`
//! on `name` (relevance) with a case-insensitive `prefix` filter on the
//! dynamic `name.keyword` sub-field, which anchors matches at the start of
//! the name.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::IndexError;
use crate::index::TagIndex;
use crate::models::Tag;

/// Value of the `refresh` parameter sent with each document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Refresh immediately; the document is searchable once the write returns
    #[default]
    Immediate,
    WaitFor,
    Disabled,
}

impl RefreshPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshPolicy::Immediate => "true",
            RefreshPolicy::WaitFor => "wait_for",
            RefreshPolicy::Disabled => "false",
        }
    }
}

impl fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "true" | "" => Ok(RefreshPolicy::Immediate),
            "wait_for" => Ok(RefreshPolicy::WaitFor),
            "false" => Ok(RefreshPolicy::Disabled),
            other => Err(format!(
                "expected one of true, wait_for, false; got '{}'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    pub url: String,
    pub index: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
    pub refresh: RefreshPolicy,
    pub max_expansions: u32,
    pub max_results: u32,
}

impl ElasticsearchConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index: "tags".to_string(),
            username: None,
            password: None,
            timeout: Duration::from_secs(5),
            refresh: RefreshPolicy::default(),
            max_expansions: 50,
            max_results: 50,
        }
    }
}

impl FromEnv for ElasticsearchConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            url: env_or_default("ELASTICSEARCH_URL", &defaults.url),
            index: env_or_default("ELASTICSEARCH_INDEX", &defaults.index),
            username: std::env::var("ELASTICSEARCH_USERNAME").ok(),
            password: std::env::var("ELASTICSEARCH_PASSWORD").ok(),
            timeout: Duration::from_secs(env_parse_or(
                "ELASTICSEARCH_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            refresh: env_parse_or("ELASTICSEARCH_REFRESH", defaults.refresh)?,
            max_expansions: env_parse_or("ELASTICSEARCH_MAX_EXPANSIONS", defaults.max_expansions)?,
            max_results: env_parse_or("ELASTICSEARCH_MAX_RESULTS", defaults.max_results)?,
        })
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Tag,
}

#[derive(Clone)]
pub struct ElasticsearchIndex {
    client: Client,
    config: ElasticsearchConfig,
}

impl ElasticsearchIndex {
    pub fn new(config: ElasticsearchConfig) -> Result<Self, IndexError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.username {
            Some(user) => request.basic_auth(user, self.config.password.as_deref()),
            None => request,
        }
    }

    fn search_body(&self, keyword: &str) -> serde_json::Value {
        json!({
            "size": self.config.max_results,
            "query": {
                "bool": {
                    "must": {
                        "match_phrase_prefix": {
                            "name": {
                                "query": keyword,
                                "max_expansions": self.config.max_expansions,
                                // Keywords like "#" analyze to no terms; the prefix filter decides then
                                "zero_terms_query": "all",
                            }
                        }
                    },
                    "filter": {
                        "prefix": {
                            "name.keyword": {
                                "value": keyword,
                                "case_insensitive": true,
                            }
                        }
                    }
                }
            }
        })
    }
}

async fn status_error(response: reqwest::Response) -> IndexError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    IndexError::Status { status, body }
}

#[async_trait]
impl TagIndex for ElasticsearchIndex {
    #[instrument(skip(self, name))]
    async fn upsert_tag_document(&self, tag_id: i64, name: &str) -> Result<(), IndexError> {
        let url = format!("{}/{}/_doc/{}", self.base_url(), self.config.index, tag_id);

        let response = self
            .authorized(self.client.put(&url))
            .query(&[("refresh", self.config.refresh.as_str())])
            .json(&Tag::new(tag_id, name))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        debug!("Indexed tag document");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn prefix_search(&self, keyword: &str) -> Result<Vec<Tag>, IndexError> {
        let url = format!("{}/{}/_search", self.base_url(), self.config.index);

        let response = self
            .authorized(self.client.post(&url))
            .json(&self.search_body(keyword))
            .send()
            .await?;

        // Nothing has been published yet, so the index does not exist
        if response.status() == StatusCode::NOT_FOUND {
            debug!(index = %self.config.index, "Search index missing, returning no matches");
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Decode(e.to_string()))?;

        let matches: Vec<Tag> = parsed.hits.hits.into_iter().map(|h| h.source).collect();
        debug!(count = matches.len(), "Prefix search completed");
        Ok(matches)
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), IndexError> {
        let response = self
            .authorized(self.client.get(self.base_url()))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }
}
