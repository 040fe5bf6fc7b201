//! Naive lexicon polarity for the report meta line. Scores land in
//! [-1.0, 1.0]; zero means neutral or no lexicon hits.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static POSITIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "crescita", "ottima", "ottimo", "eccellente", "successo", "positivo",
        "positiva", "premio", "innovazione", "leader", "solidità", "utile",
        "record", "migliore", "vantaggio", "professionale", "efficiente",
        "soddisfazione", "qualità", "rapida", "rapido",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "perdita", "perdite", "crisi", "calo", "truffa", "sanzione", "multa",
        "negativo", "negativa", "problema", "problemi", "ritardo", "reclamo",
        "reclami", "fallimento", "rischio", "peggiore", "scandalo", "debito",
    ]
    .into_iter()
    .collect()
});

pub fn polarity(text: &str) -> f32 {
    let mut pos = 0i32;
    let mut neg = 0i32;
    let mut total = 0i32;
    for raw in text.to_lowercase().split_whitespace() {
        let word: String = raw.chars().filter(|c| c.is_alphabetic()).collect();
        if word.is_empty() {
            continue;
        }
        total += 1;
        if POSITIVE.contains(word.as_str()) {
            pos += 1;
        } else if NEGATIVE.contains(word.as_str()) {
            neg += 1;
        }
    }
    if total == 0 || pos + neg == 0 {
        return 0.0;
    }
    ((pos - neg) as f32 / (pos + neg) as f32).clamp(-1.0, 1.0)
}
