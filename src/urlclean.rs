//! Canonical URL derivation for ledger rows: tracking parameters and
//! fragments are stripped, trailing slashes normalized, and a small table of
//! domain-specific fixups applied for sites whose canonical form is unusual.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use url::Url;

static TRACKING_PARAMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "utm_source", "utm_medium", "utm_campaign", "utm_term", "utm_content",
        "fbclid", "gclid", "ved", "usg", "oc", "hl", "gl", "ceid", "ref",
    ]
    .into_iter()
    .collect()
});

/// Domains that must carry a `www.` host prefix in their canonical form.
static FORCE_WWW: &[&str] = &["alleanza.it", "vitanuova.it", "ilsole24ore.com"];

/// Reduce an as-fetched URL to the form used as `Master URL for HTML`.
/// Unparseable inputs are returned unchanged rather than dropped.
pub fn clean_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let mut u = match Url::parse(raw) {
        Ok(u) => u,
        Err(_) => return raw.to_string(),
    };

    u.set_fragment(None);

    // Keep only non-tracking query parameters.
    let kept: Vec<(String, String)> = u
        .query_pairs()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        u.set_query(None);
    } else {
        let q = kept
            .iter()
            .map(|(k, v)| {
                if v.is_empty() {
                    k.clone()
                } else {
                    format!("{}={}", k, v)
                }
            })
            .collect::<Vec<_>>()
            .join("&");
        u.set_query(Some(&q));
    }

    apply_domain_fixups(&mut u);

    let mut out = u.to_string();
    // Normalize trailing slash on bare paths, but never touch a query form.
    if out.ends_with('/') && u.path() != "/" && u.query().is_none() {
        out.pop();
    }
    out
}

fn apply_domain_fixups(u: &mut Url) {
    let Some(host) = u.host_str().map(str::to_string) else {
        return;
    };

    if FORCE_WWW.contains(&host.as_str()) {
        let _ = u.set_host(Some(&format!("www.{}", host)));
    }

    // polesine24.it serves its canonical article view only with ?id=0.
    if host.ends_with("polesine24.it") && u.query().is_none() {
        u.set_query(Some("id=0"));
    }
}

/// Aggregator links append tracking after an `&`; everything past the first
/// one belongs to the aggregator, not the article.
pub fn strip_aggregator_suffix(raw: &str) -> &str {
    match raw.find('&') {
        Some(idx) if !raw[..idx].contains('?') => &raw[..idx],
        _ => raw,
    }
}

/// `Valid?` column check: the URL's host is on the known-good allowlist.
pub fn on_allowlist(raw: &str, allowlist: &[String]) -> bool {
    let Ok(u) = Url::parse(raw) else { return false };
    let Some(host) = u.host_str() else { return false };
    let host = host.trim_start_matches("www.");
    allowlist
        .iter()
        .any(|d| host == d || host.ends_with(&format!(".{}", d)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_params_and_fragment_reduce_to_bare_url() {
        let cleaned = clean_url(
            "https://example.com/news/story?utm_source=x&utm_campaign=y&fbclid=abc#section",
        );
        assert_eq!(cleaned, clean_url("https://example.com/news/story"));
        assert_eq!(cleaned, "https://example.com/news/story");
    }

    #[test]
    fn non_tracking_query_params_survive() {
        assert_eq!(
            clean_url("https://example.com/search?q=polizza&utm_source=news"),
            "https://example.com/search?q=polizza"
        );
    }

    #[test]
    fn fixup_table_forces_www_prefix() {
        assert_eq!(
            clean_url("https://alleanza.it/contenuti/sala-stampa"),
            "https://www.alleanza.it/contenuti/sala-stampa"
        );
    }

    #[test]
    fn fixup_table_appends_required_query() {
        assert_eq!(
            clean_url("https://www.polesine24.it/economia/articolo-123"),
            "https://www.polesine24.it/economia/articolo-123?id=0"
        );
    }

    #[test]
    fn trailing_slash_is_normalized() {
        assert_eq!(
            clean_url("https://example.com/news/story/"),
            "https://example.com/news/story"
        );
        // root path keeps its slash
        assert_eq!(clean_url("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn unparseable_urls_pass_through() {
        assert_eq!(clean_url("not a url"), "not a url");
        assert_eq!(clean_url(""), "");
    }

    #[test]
    fn aggregator_suffix_is_stripped() {
        assert_eq!(
            strip_aggregator_suffix("https://news.example.com/articles/x&ved=2ahUKE"),
            "https://news.example.com/articles/x"
        );
        // a real query string is not an aggregator suffix
        assert_eq!(
            strip_aggregator_suffix("https://example.com/a?b=1&c=2"),
            "https://example.com/a?b=1&c=2"
        );
    }

    #[test]
    fn allowlist_matches_host_and_subdomains() {
        let allow = vec!["assinews.it".to_string()];
        assert!(on_allowlist("https://www.assinews.it/articolo", &allow));
        assert!(on_allowlist("https://feed.assinews.it/x", &allow));
        assert!(!on_allowlist("https://notassinews.it/x", &allow));
        assert!(!on_allowlist("garbage", &allow));
    }
}
