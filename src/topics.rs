//! Topic extraction over the accumulated text of one company's retained
//! articles. The exclusion list (generic insurance vocabulary, company-name
//! fragments, stop words) exists so the Venn diagram shows differentiating
//! topics rather than boilerplate shared by every article in the domain.

use std::collections::{HashMap, HashSet};

use crate::config::AppConfig;
use crate::models::{TopicList, TopicSet};

/// Word frequencies in first-encountered order. Tokens are lowercased,
/// reduced to their alphabetic characters, length-filtered, and dropped when
/// equal to or containing any exclusion entry.
pub fn extract_topics(text: &str, exclusions: &HashSet<String>, min_word_len: usize) -> TopicList {
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for raw in text.to_lowercase().split_whitespace() {
        let word: String = raw.chars().filter(|c| c.is_alphabetic()).collect();
        if word.chars().count() < min_word_len {
            continue;
        }
        if exclusions.contains(&word) || exclusions.iter().any(|e| word.contains(e.as_str())) {
            continue;
        }
        match counts.get_mut(&word) {
            Some(c) => *c += 1,
            None => {
                counts.insert(word.clone(), 1);
                order.push(word);
            }
        }
    }

    order
        .into_iter()
        .map(|w| {
            let c = counts[&w];
            (w, c)
        })
        .collect()
}

/// Rank by frequency and truncate. The input is in first-encountered order
/// and the sort is stable, so ties keep that order. Words seen fewer than
/// `min_count` times are not topics.
pub fn top_topics(mut freqs: TopicList, top_n: usize, min_count: u32) -> TopicList {
    freqs.retain(|(_, c)| *c >= min_count);
    freqs.sort_by_key(|(_, c)| std::cmp::Reverse(*c));
    freqs.truncate(top_n);
    freqs
}

pub fn to_topic_set(topics: &TopicList) -> TopicSet {
    topics.iter().map(|(w, _)| w.clone()).collect()
}

/// The full exclusion set for a run: configured vocabulary plus every word
/// of every tracked company name and its variations.
pub fn build_exclusions(cfg: &AppConfig) -> HashSet<String> {
    let mut set: HashSet<String> = cfg
        .topics
        .exclusions
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    for rule in &cfg.companies {
        for name in std::iter::once(&rule.name).chain(rule.variations.iter()) {
            for word in name.split_whitespace() {
                let w: String = word
                    .to_lowercase()
                    .chars()
                    .filter(|c| c.is_alphabetic())
                    .collect();
                if !w.is_empty() {
                    set.insert(w);
                }
            }
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn excl(words: &[&str]) -> HashSet<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn counts_keep_first_encountered_order() {
        let freqs = extract_topics(
            "salute mercato salute welfare mercato welfare",
            &HashSet::new(),
            4,
        );
        assert_eq!(
            freqs,
            vec![
                ("salute".to_string(), 2),
                ("mercato".to_string(), 2),
                ("welfare".to_string(), 2),
            ]
        );
    }

    #[test]
    fn short_and_nonalphabetic_tokens_are_dropped() {
        let freqs = extract_topics("via 2024 l'app semplice!", &HashSet::new(), 4);
        // "via" too short, "2024" non-alphabetic, "l'app" reduces to "lapp",
        // "semplice!" reduces to "semplice"
        let words: Vec<&str> = freqs.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["lapp", "semplice"]);
    }

    #[test]
    fn exclusions_match_by_equality_and_containment() {
        let ex = excl(&["polizza", "vita"]);
        let freqs = extract_topics("polizza polizze vitalizio benessere", &ex, 4);
        // "polizze" contains "polizza"? no, but "vitalizio" contains "vita".
        let words: Vec<&str> = freqs.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["polizze", "benessere"]);
    }

    #[test]
    fn top_topics_is_stable_under_ties() {
        let freqs = vec![
            ("alpha".to_string(), 2),
            ("beta".to_string(), 3),
            ("gamma".to_string(), 2),
        ];
        let top = top_topics(freqs, 2, 2);
        assert_eq!(
            top,
            vec![("beta".to_string(), 3), ("alpha".to_string(), 2)]
        );
    }

    #[test]
    fn min_count_filters_singletons() {
        let freqs = vec![("alpha".to_string(), 1), ("beta".to_string(), 2)];
        let top = top_topics(freqs, 10, 2);
        assert_eq!(top, vec![("beta".to_string(), 2)]);
    }

    #[test]
    fn company_fragments_are_excluded_from_topics() {
        let cfg = crate::config::AppConfig::default();
        let ex = build_exclusions(&cfg);
        assert!(ex.contains("alleanza"));
        assert!(ex.contains("unidea"));
        assert!(ex.contains("vitanuova"));
        assert!(ex.contains("nuova"));
        let freqs = extract_topics("alleanza welfare welfare", &ex, 4);
        let words: Vec<&str> = freqs.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["welfare"]);
    }
}
