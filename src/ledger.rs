//! The durable article ledger: a semicolon-delimited table mapping every
//! retained article to a stable, monotonically assigned ID and a canonical
//! display URL. Deduplication is keyed by normalized title; the lowest ID
//! for a title is the canonical survivor and later duplicates never get a
//! row. The file is rewritten in full on every append (temp file + rename),
//! so an interrupted run leaves the last complete state behind.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{Candidate, LedgerRow, UrlSource};
use crate::urlclean::{clean_url, on_allowlist, strip_aggregator_suffix};

pub const LEDGER_HEADER: [&str; 8] = [
    "ID",
    "Company",
    "Article Title",
    "Original URL",
    "Valid?",
    "Human Validated URL",
    "Master URL for HTML",
    "Source",
];

/// Case-insensitive sentinel in the human column meaning "explicitly
/// rejected, do not use".
fn is_rejected_sentinel(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("no")
}

static ELLIPSIS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*(\.{3,}|…)\s*$").unwrap());
static SUBTITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+[-–—|]\s+.*$").unwrap());

/// Derive the dedup key for a title: lowercase, smart punctuation unified,
/// accents folded, trailing ellipses and subtitle suffixes dropped,
/// remaining punctuation stripped, whitespace collapsed.
pub fn normalize_title(title: &str) -> String {
    let mut t = title.to_lowercase();
    t = t
        .replace(['\u{201c}', '\u{201d}', '\u{201e}'], "\"")
        .replace(['\u{2018}', '\u{2019}', '`'], "'");
    // fold composed accents to their base letters
    t = t.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    t = ELLIPSIS_RE.replace(&t, "").into_owned();
    t = SUBTITLE_RE.replace(&t, "").into_owned();
    t = t
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    t.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    rows: Vec<LedgerRow>,
    seen_titles: HashSet<String>,
    last_id: u64,
}

impl Ledger {
    /// Parse the persisted ledger. A missing file is an empty ledger, not an
    /// error. Reads tolerate a legacy single-byte encoding; writes are UTF-8.
    pub fn load(path: &Path) -> Result<Self> {
        let mut ledger = Ledger {
            path: path.to_path_buf(),
            rows: Vec::new(),
            seen_titles: HashSet::new(),
            last_id: 0,
        };

        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Ledger not found, starting empty - path={}", path.display());
                return Ok(ledger);
            }
            Err(e) => return Err(e).with_context(|| format!("reading ledger {}", path.display())),
        };

        let content = match std::str::from_utf8(&bytes) {
            Ok(s) => s.to_string(),
            Err(_) => {
                warn!(
                    "Ledger is not valid UTF-8, falling back to Windows-1252 - path={}",
                    path.display()
                );
                let (cow, _had_errors) =
                    encoding_rs::WINDOWS_1252.decode_without_bom_handling(&bytes);
                cow.into_owned()
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut parsed = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    warn!("Skipping malformed ledger row - line={}, err={}", line + 2, e);
                    continue;
                }
            };
            match parse_row(&record) {
                Some(row) => parsed.push(row),
                None => warn!("Skipping incomplete ledger row - line={}", line + 2),
            }
        }

        // Collapse rows sharing a normalized title to the one with the
        // lowest ID. Two passes: pick the survivor per title, then admit.
        let mut canonical: HashMap<String, u64> = HashMap::new();
        for row in &parsed {
            let key = normalize_title(&row.title);
            if key.is_empty() {
                continue;
            }
            canonical
                .entry(key)
                .and_modify(|id| *id = (*id).min(row.id))
                .or_insert(row.id);
        }
        let mut dropped = 0usize;
        for row in parsed {
            // dropped IDs still count toward last_id so they are never reused
            ledger.last_id = ledger.last_id.max(row.id);
            let key = normalize_title(&row.title);
            if !key.is_empty() && canonical.get(&key) != Some(&row.id) {
                dropped += 1;
                continue;
            }
            ledger.admit_loaded(row);
        }
        if dropped > 0 {
            warn!("Collapsed duplicate ledger titles - removed={}", dropped);
        }

        info!(
            "Ledger loaded - path={}, rows={}, last_id={}",
            path.display(),
            ledger.rows.len(),
            ledger.last_id
        );
        Ok(ledger)
    }

    fn admit_loaded(&mut self, mut row: LedgerRow) {
        let key = normalize_title(&row.title);
        if !key.is_empty() && self.seen_titles.contains(&key) {
            warn!("Skipping duplicate ledger title - id={}", row.id);
            return;
        }
        // Honor a human-validated URL supplied out of band since the last run.
        if !row.human_url.trim().is_empty()
            && !is_rejected_sentinel(&row.human_url)
            && row.master_url != row.human_url
        {
            row.master_url = row.human_url.clone();
            row.source = UrlSource::Human;
        }
        self.last_id = self.last_id.max(row.id);
        self.seen_titles.insert(key);
        self.rows.push(row);
    }

    /// Insert candidates not already present by normalized title, assigning
    /// IDs in order of first appearance. Existing rows are never touched.
    /// Returns how many rows were added.
    pub fn append(&mut self, candidates: &[Candidate], allowlist: &[String]) -> usize {
        let mut added = 0usize;
        for cand in candidates {
            let key = normalize_title(&cand.title);
            if key.is_empty() || self.seen_titles.contains(&key) {
                continue;
            }

            // New titles never have a human-validated URL yet; overrides only
            // apply to loaded rows, where admit_loaded resolves them.
            let original_url = strip_aggregator_suffix(&cand.url).to_string();
            let master_url = clean_url(&original_url);

            self.last_id += 1;
            self.rows.push(LedgerRow {
                id: self.last_id,
                company: cand.company.clone(),
                title: cand.title.clone(),
                validated: on_allowlist(&original_url, allowlist),
                original_url,
                human_url: String::new(),
                master_url,
                source: UrlSource::Auto,
            });
            self.seen_titles.insert(key);
            added += 1;
        }
        if added > 0 {
            info!("Ledger append - new_rows={}, last_id={}", added, self.last_id);
        } else {
            debug!("Ledger append - no new rows");
        }
        added
    }

    /// Rewrite the whole ledger atomically: serialize next to the target,
    /// then rename over it.
    pub fn save(&self) -> Result<()> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(b';')
                .from_path(&tmp)
                .with_context(|| format!("creating {}", tmp.display()))?;
            writer.write_record(LEDGER_HEADER)?;
            for row in &self.rows {
                writer.write_record([
                    row.id.to_string().as_str(),
                    &row.company,
                    &row.title,
                    &row.original_url,
                    if row.validated { "Yes" } else { "No" },
                    &row.human_url,
                    &row.master_url,
                    row.source.as_str(),
                ])?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing ledger {}", self.path.display()))?;
        debug!("Ledger saved - path={}, rows={}", self.path.display(), self.rows.len());
        Ok(())
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn rows_for(&self, company: &str) -> Vec<LedgerRow> {
        self.rows
            .iter()
            .filter(|r| r.company == company)
            .cloned()
            .collect()
    }

    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_row(record: &csv::StringRecord) -> Option<LedgerRow> {
    if record.len() < 8 {
        return None;
    }
    let id: u64 = record.get(0)?.trim().parse().ok()?;
    Some(LedgerRow {
        id,
        company: record.get(1)?.to_string(),
        title: record.get(2)?.to_string(),
        original_url: record.get(3)?.to_string(),
        validated: record.get(4)?.trim().eq_ignore_ascii_case("yes"),
        human_url: record.get(5)?.to_string(),
        master_url: record.get(6)?.to_string(),
        source: match record.get(7)?.trim() {
            "Human" => UrlSource::Human,
            _ => UrlSource::Auto,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(company: &str, title: &str, url: &str) -> Candidate {
        Candidate {
            company: company.to_string(),
            title: title.to_string(),
            description: String::new(),
            url: url.to_string(),
            date: String::new(),
            source: "Test".to_string(),
        }
    }

    fn allow() -> Vec<String> {
        vec!["assinews.it".to_string()]
    }

    #[test]
    fn normalize_title_folds_case_accents_and_ellipses() {
        assert_eq!(
            normalize_title("Sanità integrativa, nuove polizze..."),
            "sanita integrativa nuove polizze"
        );
        assert_eq!(
            normalize_title("SANITÀ integrativa, nuove polizze…"),
            "sanita integrativa nuove polizze"
        );
    }

    #[test]
    fn normalize_title_drops_subtitles_and_smart_quotes() {
        assert_eq!(
            normalize_title("Polizze “smart” in crescita - Il Sole 24 Ore"),
            "polizze smart in crescita"
        );
        assert_eq!(
            normalize_title("Polizze \"smart\" in crescita | AssiNews"),
            "polizze smart in crescita"
        );
    }

    #[test]
    fn missing_file_is_an_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::load(&dir.path().join("absent.csv")).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.last_id(), 0);
    }

    #[test]
    fn append_is_idempotent_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let cands = vec![
            cand("Unidea Assicurazioni", "Unidea cresce", "https://www.assinews.it/a"),
            cand("Unidea Assicurazioni", "Nuova rete agenti", "https://www.assinews.it/b"),
        ];

        let mut ledger = Ledger::load(&path).unwrap();
        assert_eq!(ledger.append(&cands, &allow()), 2);
        ledger.save().unwrap();
        let first_pass = std::fs::read_to_string(&path).unwrap();

        let mut ledger = Ledger::load(&path).unwrap();
        assert_eq!(ledger.append(&cands, &allow()), 0);
        ledger.save().unwrap();
        let second_pass = std::fs::read_to_string(&path).unwrap();

        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");

        let mut ledger = Ledger::load(&path).unwrap();
        ledger.append(&[cand("A", "Primo titolo", "https://www.assinews.it/1")], &allow());
        ledger.append(&[cand("A", "Secondo titolo", "https://www.assinews.it/2")], &allow());
        ledger.save().unwrap();

        let mut ledger = Ledger::load(&path).unwrap();
        assert_eq!(ledger.last_id(), 2);
        ledger.append(&[cand("A", "Terzo titolo", "https://www.assinews.it/3")], &allow());

        let ids: Vec<u64> = ledger.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn equivalent_titles_create_one_row_with_lowest_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let mut ledger = Ledger::load(&path).unwrap();
        let added = ledger.append(
            &[
                cand("A", "Sanità e welfare in crescita", "https://www.assinews.it/1"),
                cand("A", "SANITA e welfare in crescita...", "https://www.assinews.it/2"),
                cand("A", "Sanità e welfare in crescita…", "https://www.assinews.it/3"),
            ],
            &allow(),
        );
        assert_eq!(added, 1);
        assert_eq!(ledger.rows()[0].id, 1);
        assert_eq!(ledger.rows()[0].original_url, "https://www.assinews.it/1");
    }

    #[test]
    fn load_collapses_duplicate_titles_to_lowest_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        // id 3 is an equivalent retelling of id 1 and must not survive the
        // load, regardless of file order
        std::fs::write(
            &path,
            "ID;Company;Article Title;Original URL;Valid?;Human Validated URL;Master URL for HTML;Source\n\
             3;A;Sanità e welfare in crescita...;https://x.it/c;Yes;;https://x.it/c;Auto\n\
             1;A;Sanita e welfare in crescita;https://x.it/a;Yes;;https://x.it/a;Auto\n\
             2;B;Altro titolo;https://x.it/b;Yes;;https://x.it/b;Auto\n",
        )
        .unwrap();

        let mut ledger = Ledger::load(&path).unwrap();
        assert_eq!(ledger.len(), 2);
        let survivor = ledger.rows().iter().find(|r| r.company == "A").unwrap();
        assert_eq!(survivor.id, 1);
        assert_eq!(survivor.original_url, "https://x.it/a");

        // the dropped ID stays burned: new rows continue after it
        assert_eq!(ledger.last_id(), 3);
        ledger.append(&[cand("C", "Titolo inedito", "https://www.assinews.it/n")], &allow());
        assert_eq!(ledger.rows().last().unwrap().id, 4);

        ledger.save().unwrap();
        let reloaded = Ledger::load(&path).unwrap();
        assert_eq!(reloaded.len(), 3);
    }

    #[test]
    fn human_override_is_honored_and_sentinel_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        std::fs::write(
            &path,
            "ID;Company;Article Title;Original URL;Valid?;Human Validated URL;Master URL for HTML;Source\n\
             1;A;Titolo uno;https://x.it/a?utm_source=t;Yes;https://curated.example/a;https://x.it/a;Auto\n\
             2;A;Titolo due;https://x.it/b;Yes;no;https://x.it/b;Auto\n",
        )
        .unwrap();

        let ledger = Ledger::load(&path).unwrap();
        assert_eq!(ledger.rows()[0].master_url, "https://curated.example/a");
        assert_eq!(ledger.rows()[0].source, UrlSource::Human);
        // sentinel "no": the automatic URL stays
        assert_eq!(ledger.rows()[1].master_url, "https://x.it/b");
        assert_eq!(ledger.rows()[1].source, UrlSource::Auto);
    }

    #[test]
    fn legacy_single_byte_encoding_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        // "Sanità" encoded as Windows-1252 (0xE0 for à) is invalid UTF-8
        let mut bytes = Vec::new();
        bytes.extend_from_slice(
            b"ID;Company;Article Title;Original URL;Valid?;Human Validated URL;Master URL for HTML;Source\n",
        );
        bytes.extend_from_slice(b"1;A;Sanit\xE0 in crescita;https://x.it/a;Yes;;https://x.it/a;Auto\n");
        std::fs::write(&path, &bytes).unwrap();

        let mut ledger = Ledger::load(&path).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.rows()[0].title, "Sanità in crescita");
        // the same title arriving in UTF-8 dedups against the legacy row
        let added = ledger.append(&[cand("A", "Sanità in crescita", "https://x.it/b")], &allow());
        assert_eq!(added, 0);
    }

    #[test]
    fn appended_rows_get_cleaned_master_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let mut ledger = Ledger::load(&path).unwrap();
        ledger.append(
            &[cand(
                "A",
                "Titolo con tracking",
                "https://www.assinews.it/articolo?utm_source=gn&utm_medium=rss#top",
            )],
            &allow(),
        );
        let row = &ledger.rows()[0];
        assert_eq!(row.master_url, "https://www.assinews.it/articolo");
        assert!(row.validated);
        assert_eq!(row.source, UrlSource::Auto);
    }
}
