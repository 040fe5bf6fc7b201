//! Thin fetch glue over NewsAPI. One query per tracked company, bounded by
//! the configured lookback window, with the shared retry/backoff policy and
//! a jittered delay between companies to avoid rate limiting.

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::api_types::NewsApiResponse;
use crate::config::{EntityRule, SearchConfig};
use crate::models::Candidate;
use crate::retry::{with_backoff, Backoff};

pub struct NewsApiClient {
    client: Client,
    api_key: String,
    cfg: SearchConfig,
}

impl NewsApiClient {
    pub fn new(api_key: String, cfg: SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            api_key,
            cfg,
        })
    }

    /// Fetch raw candidates for one company. Items missing both title and
    /// description are dropped here; relevance filtering happens later.
    pub async fn fetch_company(&self, rule: &EntityRule) -> Result<Vec<Candidate>> {
        let from_date = (Utc::now() - ChronoDuration::days(self.cfg.days_back))
            .format("%Y-%m-%d")
            .to_string();
        let start = std::time::Instant::now();

        debug!("Fetching news - company={}, from={}", rule.name, from_date);

        let policy = Backoff::new(
            self.cfg.max_attempts,
            Duration::from_secs(self.cfg.base_delay_secs),
        );
        let page_size = self.cfg.page_size.to_string();
        let resp: NewsApiResponse = with_backoff(&format!("newsapi:{}", rule.name), policy, || {
            let req = self
                .client
                .get("https://newsapi.org/v2/everything")
                .query(&[
                    ("q", rule.name.as_str()),
                    ("language", self.cfg.language.as_str()),
                    ("from", from_date.as_str()),
                    ("sortBy", "publishedAt"),
                    ("pageSize", page_size.as_str()),
                    ("apiKey", self.api_key.as_str()),
                ]);
            async move {
                let resp = req.send().await.context("request failed")?;
                let resp = resp.error_for_status().context("HTTP error")?;
                resp.json::<NewsApiResponse>().await.context("decoding JSON")
            }
        })
        .await?;

        let candidates: Vec<Candidate> = resp
            .articles
            .into_iter()
            .filter_map(|a| {
                let title = a.title.unwrap_or_default();
                let description = a.description.unwrap_or_default();
                if title.trim().is_empty() && description.trim().is_empty() {
                    return None;
                }
                Some(Candidate {
                    company: rule.name.clone(),
                    title,
                    description,
                    url: a.url.unwrap_or_default(),
                    date: a.published_at.unwrap_or_default(),
                    source: "NewsAPI".to_string(),
                })
            })
            .collect();

        info!(
            "Fetch completed - company={}, duration={:.2}s, total={}, usable={}",
            rule.name,
            start.elapsed().as_secs_f32(),
            resp.total_results,
            candidates.len()
        );
        Ok(candidates)
    }

    /// Jittered pause between company queries. Not backpressure, just manners.
    pub async fn inter_request_delay(&self) {
        let (lo, hi) = jitter_bounds(self.cfg.delay_secs.0, self.cfg.delay_secs.1);
        let secs = rand::thread_rng().gen_range(lo..=hi);
        debug!("Inter-request delay - secs={:.1}", secs);
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }
}

/// Sanitize configured delay bounds: never negative (a negative duration
/// would panic), and the upper bound never below the lower.
fn jitter_bounds(lo: f64, hi: f64) -> (f64, f64) {
    let lo = lo.max(0.0);
    (lo, hi.max(lo))
}
