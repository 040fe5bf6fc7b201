//! Per-company relevance filtering. Short insurer names collide with common
//! Italian words ("alleanza" is also "alliance", "vita nuova" reversed is
//! "new life"), so each tracked entity carries a declarative rule record and
//! one generic engine evaluates them all: confounder reject, then exact-name
//! accept, then deny-list reject, then corroborated short-name accept.

use tracing::debug;

use crate::config::EntityRule;

/// Decide whether a fetched (title, description) pair genuinely concerns the
/// company described by `rule`. Missing fields are treated as empty strings;
/// empty text can never match.
pub fn is_relevant(rule: &EntityRule, title: &str, description: &str) -> bool {
    let text = format!("{} {}", title.trim(), description.trim())
        .trim()
        .to_lowercase();
    if text.is_empty() {
        return false;
    }

    // 1) Confounding phrases reject unconditionally.
    if rule.confounders.iter().any(|c| text.contains(c.as_str())) {
        debug!("Rejected on confounder - company={}, title={:?}", rule.name, title);
        return false;
    }

    let corroboration = count_distinct(&text, &rule.corroboration_terms);

    // 2) A known canonical domain in the text/URL is as good as the name.
    if rule
        .canonical_domains
        .iter()
        .any(|d| text.contains(d.as_str()))
    {
        return true;
    }

    // 3) Exact full-name evidence accepts on its own (or with the small
    //    per-entity corroboration floor).
    if rule.exact_names.iter().any(|n| text.contains(n.as_str())) {
        return corroboration >= rule.exact_min_corroboration;
    }

    // 4) Short-name evidence needs corroboration and a clean context.
    if !rule.short_names.iter().any(|n| text.contains(n.as_str())) {
        return false;
    }
    if rule.deny_terms.iter().any(|t| text.contains(t.as_str())) {
        debug!("Rejected on deny term - company={}, title={:?}", rule.name, title);
        return false;
    }
    if corroboration < rule.min_corroboration {
        return false;
    }
    if !rule.context_terms.is_empty()
        && !rule.context_terms.iter().any(|t| text.contains(t.as_str()))
    {
        return false;
    }
    true
}

fn count_distinct(text: &str, terms: &[String]) -> usize {
    terms.iter().filter(|t| text.contains(t.as_str())).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn rule(cfg: &AppConfig, name: &str) -> EntityRule {
        cfg.rule_for(name).unwrap().clone()
    }

    #[test]
    fn empty_text_never_matches() {
        let cfg = AppConfig::default();
        for r in &cfg.companies {
            assert!(!is_relevant(r, "", ""));
            assert!(!is_relevant(r, "   ", "  "));
        }
    }

    #[test]
    fn alliance_meaning_is_rejected() {
        let cfg = AppConfig::default();
        let r = rule(&cfg, "Alleanza Assicurazioni");
        assert!(!is_relevant(
            &r,
            "Nuova alleanza militare tra i paesi NATO",
            "Il patto rafforza la coalizione dei governi europei",
        ));
    }

    #[test]
    fn exact_name_accepts_despite_deny_terms_elsewhere() {
        let cfg = AppConfig::default();
        let r = rule(&cfg, "Alleanza Assicurazioni");
        assert!(is_relevant(
            &r,
            "Alleanza Assicurazioni firma un accordo con il governo",
            "La compagnia amplia l'offerta di polizze",
        ));
    }

    #[test]
    fn short_name_needs_two_terms_and_company_context() {
        let cfg = AppConfig::default();
        let r = rule(&cfg, "Alleanza Assicurazioni");
        // one insurance term only: rejected
        assert!(!is_relevant(
            &r,
            "Alleanza lancia una polizza",
            "Nuove offerte per i clienti",
        ));
        // two insurance terms but no agency/consultant context: rejected
        assert!(!is_relevant(
            &r,
            "Alleanza punta su polizza e previdenza",
            "Crescono le soluzioni per il futuro",
        ));
        // two insurance terms plus company context: accepted
        assert!(is_relevant(
            &r,
            "Alleanza punta su polizza e previdenza",
            "L'agenzia di Milano amplia la rete di consulenti",
        ));
    }

    #[test]
    fn new_life_bigram_rejects_unconditionally() {
        let cfg = AppConfig::default();
        let r = rule(&cfg, "Vita Nuova");
        assert!(!is_relevant(
            &r,
            "Una nuova vita per il borgo",
            "Vita Nuova Assicurazioni sponsorizza il restauro con una polizza dedicata",
        ));
    }

    #[test]
    fn life_insurer_needs_exact_name_plus_insurance_term() {
        let cfg = AppConfig::default();
        let r = rule(&cfg, "Vita Nuova");
        // exact name without any insurance vocabulary: rejected
        assert!(!is_relevant(
            &r,
            "Vita nuova per il centro storico",
            "Il quartiere rinasce dopo i lavori",
        ));
        // exact name plus insurance term: accepted
        assert!(is_relevant(
            &r,
            "Vita Nuova Assicurazioni presenta la polizza famiglia",
            "",
        ));
    }

    #[test]
    fn canonical_domain_accepts() {
        let cfg = AppConfig::default();
        let r = rule(&cfg, "Vita Nuova");
        assert!(is_relevant(
            &r,
            "Comunicato stampa",
            "Dettagli su https://www.vitanuova.it/comunicati/2025",
        ));
    }

    #[test]
    fn unidea_requires_insurance_context() {
        let cfg = AppConfig::default();
        let r = rule(&cfg, "Unidea Assicurazioni");
        assert!(is_relevant(
            &r,
            "Unidea amplia la rete",
            "La compagnia propone una nuova polizza previdenziale",
        ));
        assert!(!is_relevant(&r, "Unidea vince il torneo di calcetto", ""));
    }

    #[test]
    fn missing_description_is_treated_as_empty() {
        let cfg = AppConfig::default();
        let r = rule(&cfg, "Unidea Assicurazioni");
        assert!(is_relevant(&r, "Unidea Assicurazioni, nuova polizza vita", ""));
    }
}
