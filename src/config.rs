use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Disambiguation rules for one tracked company. The classifier is one
/// generic engine over these records; adding a company is configuration,
/// not code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRule {
    /// Display name, also the ledger `Company` value.
    pub name: String,
    /// Exact multi-word name forms that accept on their own (lowercase).
    pub exact_names: Vec<String>,
    /// Short/ambiguous name fragments that need corroboration (lowercase).
    #[serde(default)]
    pub short_names: Vec<String>,
    /// Known spelling variations, used for search queries and topic exclusions.
    #[serde(default)]
    pub variations: Vec<String>,
    /// Insurance-domain corroboration vocabulary.
    #[serde(default)]
    pub corroboration_terms: Vec<String>,
    /// How many distinct corroboration terms a short-name match needs.
    #[serde(default = "default_min_corroboration")]
    pub min_corroboration: usize,
    /// How many distinct corroboration terms an exact-name match needs.
    /// Zero for unambiguous names; the insurer whose name is an ordinary
    /// word pair still needs domain context even on an exact match.
    #[serde(default)]
    pub exact_min_corroboration: usize,
    /// Reject immediately when any of these appear alongside a short-name match.
    #[serde(default)]
    pub deny_terms: Vec<String>,
    /// Company-context vocabulary (agency, consultant, branch...). When
    /// non-empty, a short-name match must also hit at least one of these.
    #[serde(default)]
    pub context_terms: Vec<String>,
    /// Confounding phrases that reject unconditionally (e.g. the reversed
    /// word pair that means something else entirely).
    #[serde(default)]
    pub confounders: Vec<String>,
    /// Canonical domain substrings that accept on their own.
    #[serde(default)]
    pub canonical_domains: Vec<String>,
}

fn default_min_corroboration() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    #[serde(default = "default_min_word_len")]
    pub min_word_len: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// A word must recur this often across the corpus to count as a topic.
    #[serde(default = "default_min_count")]
    pub min_count: u32,
    #[serde(default = "default_preview")]
    pub region_preview: usize,
    /// Extra exclusion vocabulary on top of company names and variations.
    #[serde(default)]
    pub exclusions: Vec<String>,
}

fn default_min_word_len() -> usize {
    4
}
fn default_top_n() -> usize {
    10
}
fn default_min_count() -> u32 {
    2
}
fn default_preview() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_days_back")]
    pub days_back: i64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Inter-request delay bounds in seconds, jittered.
    #[serde(default = "default_delay")]
    pub delay_secs: (f64, f64),
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,
}

fn default_language() -> String {
    "it".to_string()
}
fn default_days_back() -> i64 {
    180
}
fn default_page_size() -> u32 {
    100
}
fn default_delay() -> (f64, f64) {
    (2.0, 5.0)
}
fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub companies: Vec<EntityRule>,
    #[serde(default = "TopicConfig::default")]
    pub topics: TopicConfig,
    #[serde(default = "SearchConfig::default")]
    pub search: SearchConfig,
    /// Domains trusted without a live check when filling the `Valid?` column.
    #[serde(default = "default_known_good_domains")]
    pub known_good_domains: Vec<String>,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            min_word_len: default_min_word_len(),
            top_n: default_top_n(),
            min_count: default_min_count(),
            region_preview: default_preview(),
            exclusions: default_topic_exclusions(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            days_back: default_days_back(),
            page_size: default_page_size(),
            delay_secs: default_delay(),
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, or fall back to the built-in three-company
    /// configuration when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                let cfg: AppConfig = toml::from_str(&content)
                    .with_context(|| format!("parsing config {}", p.display()))?;
                if cfg.companies.len() != 3 {
                    anyhow::bail!(
                        "exactly 3 tracked companies are required for the overlap diagram, got {}",
                        cfg.companies.len()
                    );
                }
                Ok(cfg)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn rule_for(&self, company: &str) -> Option<&EntityRule> {
        self.companies.iter().find(|r| r.name == company)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            companies: default_companies(),
            topics: TopicConfig::default(),
            search: SearchConfig::default(),
            known_good_domains: default_known_good_domains(),
        }
    }
}

fn svec(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

const INSURANCE_TERMS: &[&str] = &[
    "assicurazioni",
    "assicurazione",
    "polizza",
    "broker",
    "compagnia assicurativa",
    "previdenza",
    "risparmio",
    "investimento",
];

fn default_companies() -> Vec<EntityRule> {
    vec![
        EntityRule {
            name: "Alleanza Assicurazioni".to_string(),
            exact_names: svec(&["alleanza assicurazioni"]),
            short_names: svec(&["alleanza"]),
            variations: svec(&["Alleanza", "Alleanza Ass.", "Alleanza Assicurazioni S.p.A."]),
            corroboration_terms: {
                let mut v = svec(INSURANCE_TERMS);
                v.push("generali".to_string());
                v
            },
            // "alleanza" alone means "alliance"; a bare short-name match needs
            // two insurance terms plus a company-context term.
            min_corroboration: 2,
            exact_min_corroboration: 0,
            deny_terms: svec(&[
                "nato",
                "militare",
                "politica",
                "governo",
                "stati",
                "paesi",
                "accordo",
                "patto",
                "coalizione",
                "partnership",
                "collaborazione",
                "intesa",
                "cooperazione",
                "trattato",
                "unione",
            ]),
            context_terms: svec(&[
                "agenzia",
                "agente",
                "consulente",
                "filiale",
                "sede",
                "assicuratore",
                "gruppo generali",
                "compagnia",
            ]),
            confounders: vec![],
            canonical_domains: svec(&["alleanza.it"]),
        },
        EntityRule {
            name: "Unidea Assicurazioni".to_string(),
            exact_names: svec(&["unidea assicurazioni"]),
            short_names: svec(&["unidea"]),
            variations: svec(&["Unidea", "Unidea Ass.", "Unidea Assicurazioni S.p.A."]),
            corroboration_terms: svec(INSURANCE_TERMS),
            min_corroboration: 1,
            exact_min_corroboration: 0,
            deny_terms: vec![],
            context_terms: vec![],
            confounders: vec![],
            canonical_domains: svec(&["unideaassicurazioni.it"]),
        },
        EntityRule {
            name: "Vita Nuova".to_string(),
            exact_names: svec(&["vita nuova assicurazioni", "vita nuova"]),
            short_names: vec![],
            variations: svec(&["VitaNuova", "Vita-Nuova", "Vita Nuova Assicurazioni"]),
            corroboration_terms: svec(INSURANCE_TERMS),
            min_corroboration: 1,
            exact_min_corroboration: 1,
            deny_terms: vec![],
            context_terms: vec![],
            // "nuova vita" reads as "new life" and is never about the insurer.
            confounders: svec(&["nuova vita"]),
            canonical_domains: svec(&["vitanuova.it"]),
        },
    ]
}

fn default_topic_exclusions() -> Vec<String> {
    svec(&[
        // Italian stop words
        "il", "lo", "la", "gli", "le", "un", "uno", "una", "di", "da", "in",
        "con", "su", "per", "tra", "fra", "ed", "ma", "che", "chi", "cui",
        "non", "come", "dove", "quando", "perché", "della", "delle", "degli",
        "dell", "dal", "dalla", "del", "alla", "alle", "nella", "nelle",
        "sulla", "sulle", "dopo", "prima", "durante", "oltre", "verso", "fino",
        // generic insurance vocabulary shared by every article in the domain
        "assicurazioni", "assicurazione", "assicurativa", "assicurative",
        "assicurativi", "assicurativo", "polizza", "polizze", "agenzia",
        "agenzie", "broker", "compagnia", "compagnie", "spa", "srl",
        "mercato", "settore", "gruppo", "società",
    ])
}

fn default_known_good_domains() -> Vec<String> {
    svec(&[
        "assinews.it",
        "insurancetrade.it",
        "intermediachannel.it",
        "ansa.it",
        "ilsole24ore.com",
        "repubblica.it",
        "alleanza.it",
        "vitanuova.it",
        "polesine24.it",
        "news.google.com",
    ])
}
