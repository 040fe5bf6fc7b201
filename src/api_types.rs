use serde::Deserialize;

/// NewsAPI `/v2/everything` response shape. Every article field may be null
/// or absent; absent fields become empty strings downstream rather than
/// crashing the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default, rename = "totalResults")]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_missing_fields_deserialize() {
        let body = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"title": "Solo titolo", "description": null},
                {"url": "https://example.com/a"}
            ]
        }"#;
        let resp: NewsApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.articles.len(), 2);
        assert_eq!(resp.articles[0].title.as_deref(), Some("Solo titolo"));
        assert!(resp.articles[0].description.is_none());
        assert!(resp.articles[1].title.is_none());
    }

    #[test]
    fn empty_articles_list_is_fine() {
        let resp: NewsApiResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(resp.total_results, 0);
        assert!(resp.articles.is_empty());
    }
}
