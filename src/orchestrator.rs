//! Sequential batch pipeline: fetch → relevance filter → ledger update →
//! topic extraction → overlap computation → render. One pass per
//! invocation; a failure for one company is logged and skipped, never fatal
//! for the batch.

use anyhow::{Context, Result};
use chrono::Local;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::fetch::NewsApiClient;
use crate::ledger::Ledger;
use crate::models::{Candidate, CloudInputs, CompanyReport, TopicSet};
use crate::overlap::{compute_regions, summarize_regions};
use crate::relevance::is_relevant;
use crate::render::{render_report, write_outputs};
use crate::reviews::reviews_for;
use crate::topics::{build_exclusions, extract_topics, to_topic_set, top_topics};

pub struct RunOptions {
    pub output_dir: PathBuf,
    pub ledger_path: PathBuf,
    pub offline: bool,
    pub api_key: Option<String>,
}

pub async fn run(cfg: &AppConfig, opts: &RunOptions) -> Result<()> {
    let pipeline_start = std::time::Instant::now();
    info!(
        "Pipeline started - companies={}, ledger={}, offline={}",
        cfg.companies.len(),
        opts.ledger_path.display(),
        opts.offline
    );

    let mut ledger = Ledger::load(&opts.ledger_path)?;

    // 1) fetch + filter, best effort per company
    let mut retained: Vec<Candidate> = Vec::new();
    if !opts.offline {
        let api_key = opts
            .api_key
            .clone()
            .context("NEWS_API_KEY is required unless running --offline")?;
        let client = NewsApiClient::new(api_key, cfg.search.clone())?;

        for (i, rule) in cfg.companies.iter().enumerate() {
            if i > 0 {
                client.inter_request_delay().await;
            }
            match client.fetch_company(rule).await {
                Ok(candidates) => {
                    let before = candidates.len();
                    let kept: Vec<Candidate> = candidates
                        .into_iter()
                        .filter(|c| is_relevant(rule, &c.title, &c.description))
                        .collect();
                    info!(
                        "Relevance filter - company={}, fetched={}, kept={}",
                        rule.name,
                        before,
                        kept.len()
                    );
                    retained.extend(kept);
                }
                Err(e) => {
                    // skipped for this run; the report section will be thin
                    error!("Fetch failed, skipping company - company={}, err={:#}", rule.name, e);
                }
            }
        }
    } else {
        debug!("Offline run - rebuilding report from the ledger alone");
    }

    // 2) ledger update: dedup by normalized title, stable IDs, atomic rewrite
    let added = ledger.append(&retained, &cfg.known_good_domains);
    ledger.save()?;
    info!("Ledger updated - new_rows={}, total_rows={}", added, ledger.len());

    // Descriptions are not persisted; keep this run's for the topic corpus.
    let mut fresh_descriptions: HashMap<String, Vec<String>> = HashMap::new();
    for c in &retained {
        if !c.description.trim().is_empty() {
            fresh_descriptions
                .entry(c.company.clone())
                .or_default()
                .push(c.description.clone());
        }
    }

    // 3) topics per company
    let exclusions = build_exclusions(cfg);
    let mut reports: Vec<CompanyReport> = Vec::new();
    let mut topic_sets: Vec<TopicSet> = Vec::new();
    let mut clouds = CloudInputs::new();

    for rule in &cfg.companies {
        let articles = ledger.rows_for(&rule.name);
        let mut corpus: Vec<String> = articles.iter().map(|r| r.title.clone()).collect();
        if let Some(descs) = fresh_descriptions.get(&rule.name) {
            corpus.extend(descs.iter().cloned());
        }
        let text = corpus.join(" ");

        let freqs = extract_topics(&text, &exclusions, cfg.topics.min_word_len);
        let topics = top_topics(freqs, cfg.topics.top_n, cfg.topics.min_count);
        if topics.is_empty() {
            warn!("No topics extracted - company={}, articles={}", rule.name, articles.len());
        } else {
            debug!(
                "Topics - company={}, top={:?}",
                rule.name,
                topics.iter().map(|(w, _)| w.as_str()).collect::<Vec<_>>()
            );
        }

        topic_sets.push(to_topic_set(&topics));
        clouds.insert(rule.name.clone(), topics.clone());
        reports.push(CompanyReport {
            company: rule.name.clone(),
            articles,
            topics,
            reviews: reviews_for(&rule.name),
        });
    }

    // 4) overlap regions over the fixed three-company universe
    let regions = compute_regions(&topic_sets[0], &topic_sets[1], &topic_sets[2]);
    let names = [
        cfg.companies[0].name.as_str(),
        cfg.companies[1].name.as_str(),
        cfg.companies[2].name.as_str(),
    ];
    let summaries = summarize_regions(&regions, names, cfg.topics.region_preview);
    for s in &summaries {
        debug!("Region - code={}, len={}", s.region.code(), s.len);
    }

    // 5) render
    let generated_at = Local::now().format("%d/%m/%Y %H:%M").to_string();
    let html = render_report(&reports, &summaries, &generated_at);
    write_outputs(&opts.output_dir, &html, &summaries, &clouds)?;

    info!(
        "Pipeline completed - duration={:.2}s, rows={}, output={}",
        pipeline_start.elapsed().as_secs_f32(),
        ledger.len(),
        opts.output_dir.display()
    );
    Ok(())
}
