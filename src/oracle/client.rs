//! HTTPS-backed classification oracle client (C3).

use crate::catalog::CategoryCatalog;
use crate::model::Classification;
use crate::oracle::backend::OracleBackend;
use crate::oracle::config::OracleConfig;
use crate::oracle::keyword::local_keyword;
use crate::oracle::metrics::OracleMetrics;
use crate::oracle::ratelimit::RateBucket;
use crate::oracle::retry::{backoff_delay, is_retryable_status};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

const MAX_KEYWORD_LEN: usize = 100;

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    keyword: String,
    category_id: i32,
}

enum Attempt {
    Resolved(Classification),
    Retry,
    Permanent,
}

pub struct OracleClient {
    http: Client,
    config: OracleConfig,
    api_key: String,
    catalog: Arc<CategoryCatalog>,
    bucket: RateBucket,
    metrics: Arc<OracleMetrics>,
}

impl OracleClient {
    pub fn new(config: OracleConfig, catalog: Arc<CategoryCatalog>, metrics: Arc<OracleMetrics>) -> crate::error::AppResult<Self> {
        let api_key = config.api_key()?;
        let http = Client::builder().timeout(config.request_timeout()).build()?;
        let bucket = RateBucket::new(config.requests_per_minute, config.min_interval());
        Ok(Self { http, config, api_key, catalog, bucket, metrics })
    }

    /// One HTTP round trip, already rate-limited. Returns how the overall
    /// retry loop should proceed.
    async fn try_once(&self, text: &str) -> Attempt {
        self.bucket.acquire().await;
        self.metrics.inc_requests();

        let body = ClassifyRequest { text, model: &self.config.model_id };
        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "oracle transport error");
                self.metrics.inc_retryable_errors();
                return Attempt::Retry;
            }
        };

        let status = response.status();
        if status.is_success() {
            let text_body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ClassifyResponse>(&text_body) {
                Ok(parsed) => Attempt::Resolved(self.postprocess(text, parsed)),
                Err(e) => {
                    tracing::warn!(error = %e, "oracle response malformed");
                    self.metrics.inc_malformed_responses();
                    Attempt::Retry
                }
            }
        } else if is_retryable_status(status) {
            self.metrics.inc_retryable_errors();
            Attempt::Retry
        } else {
            tracing::warn!(%status, "oracle permanent HTTP error");
            self.metrics.inc_permanent_errors();
            Attempt::Permanent
        }
    }

    /// Post-processing per §4.3: strip/reject, substitute an overlong or
    /// identity keyword with the local extractor, remap unknown categories.
    fn postprocess(&self, input_text: &str, parsed: ClassifyResponse) -> Classification {
        let trimmed = parsed.keyword.trim().to_string();

        let keyword = if trimmed.is_empty() || trimmed == input_text || trimmed.chars().count() > MAX_KEYWORD_LEN {
            local_keyword(input_text)
        } else {
            trimmed
        };

        let category_id = self.catalog.normalize(parsed.category_id);

        Classification { keyword, category_id, is_fallback: false }
    }

    fn fallback(&self, input_text: &str) -> Classification {
        self.metrics.inc_fallbacks();
        Classification {
            keyword: local_keyword(input_text),
            category_id: self.catalog.fallback_id(),
            is_fallback: true,
        }
    }
}

#[async_trait]
impl OracleBackend for OracleClient {
    async fn classify(&self, text: &str) -> Classification {
        let started = Instant::now();

        for attempt in 1..=self.config.max_retries {
            match self.try_once(text).await {
                Attempt::Resolved(classification) => {
                    self.metrics.observe_latency(started.elapsed().as_secs_f64());
                    return classification;
                }
                Attempt::Permanent => {
                    self.metrics.observe_latency(started.elapsed().as_secs_f64());
                    return self.fallback(text);
                }
                Attempt::Retry => {
                    if attempt < self.config.max_retries {
                        let delay = backoff_delay(self.config.base_backoff(), attempt);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        self.metrics.observe_latency(started.elapsed().as_secs_f64());
        self.fallback(text)
    }
}
