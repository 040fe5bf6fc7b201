//! Report assembly. The HTML document references sibling raster images by a
//! fixed naming contract (`wordcloud_<Company_With_Underscores>.png`,
//! `venn_diagram.png`) that the external image renderer fills in; the region
//! and word-frequency JSON files are its inputs.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::models::{CloudInputs, CompanyReport};
use crate::overlap::RegionSummary;
use crate::sentiment::polarity;

pub const REPORT_FILE: &str = "sentiment_report.html";
pub const VENN_IMAGE: &str = "venn_diagram.png";

pub fn wordcloud_image_name(company: &str) -> String {
    format!("wordcloud_{}.png", company.replace(' ', "_"))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_report(
    reports: &[CompanyReport],
    regions: &[RegionSummary],
    generated_at: &str,
) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"it\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Analisi News Aziendali</title>\n");
    html.push_str(
        "<style>\n\
         body { font-family: \"Helvetica Neue\", Arial, sans-serif; margin: 0; color: #1B1B1B; }\n\
         .header { padding: 2rem; text-align: center; border-bottom: 1px solid #E0E0E0; }\n\
         .company-section, .analysis-section { max-width: 1200px; margin: 2rem auto; padding: 2rem; }\n\
         .news-item { border: 1px solid #E0E0E0; padding: 1rem; margin: 1rem 0; }\n\
         .news-meta { color: #404040; font-size: 0.85rem; margin-top: 0.5rem; }\n\
         .topic-tag { display: inline-block; background: #F5F5F5; padding: 0.25rem 0.6rem; margin: 0.15rem; }\n\
         .review-item { background: #F5F5F5; padding: 1rem; margin: 0.5rem 0; }\n\
         img { max-width: 100%; height: auto; }\n\
         </style>\n</head>\n<body>\n",
    );

    html.push_str("<div class=\"header\">\n<h1>Analisi News Aziendali</h1>\n");
    html.push_str(&format!(
        "<div class=\"timestamp\">Generato il: {}</div>\n</div>\n",
        escape(generated_at)
    ));

    for report in reports {
        render_company_section(&mut html, report);
    }

    html.push_str("<section class=\"analysis-section\">\n<h2>Analisi dei Topic</h2>\n");
    html.push_str(&format!(
        "<div class=\"venn-container\"><img src=\"{}\" alt=\"Venn Diagram\"></div>\n",
        VENN_IMAGE
    ));
    for region in regions {
        if region.len == 0 {
            continue;
        }
        html.push_str(&format!(
            "<div class=\"overlap-section\"><strong>{}</strong> ({} topics): {}</div>\n",
            escape(&region.label),
            region.len,
            escape(&region.preview.join(", "))
        ));
    }
    html.push_str("</section>\n</body>\n</html>\n");
    html
}

fn render_company_section(html: &mut String, report: &CompanyReport) {
    html.push_str(&format!(
        "<section class=\"company-section\" data-company=\"{}\">\n",
        escape(&report.company.to_lowercase())
    ));
    html.push_str(&format!(
        "<h2>{}</h2>\n<span class=\"article-count\">{} articoli</span>\n",
        escape(&report.company),
        report.articles.len()
    ));

    html.push_str(&format!(
        "<div class=\"wordcloud-container\"><img src=\"{}\" alt=\"Word Cloud\"></div>\n",
        wordcloud_image_name(&report.company)
    ));

    if !report.topics.is_empty() {
        html.push_str("<div class=\"topics\">");
        for (topic, count) in &report.topics {
            html.push_str(&format!(
                "<span class=\"topic-tag\">{} ({})</span>",
                escape(topic),
                count
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str("<div class=\"news-grid\" data-content=\"articles\">\n");
    for row in report.articles.iter().take(5) {
        let sentiment = polarity(&row.title);
        html.push_str("<article class=\"news-item\">\n");
        html.push_str(&format!("<h3>{}</h3>\n", escape(&row.title)));
        html.push_str(&format!(
            "<div class=\"news-meta\"><div>Fonte: {}</div><div>Sentiment: {:.2}</div></div>\n",
            escape(row.source.as_str()),
            sentiment
        ));
        html.push_str(&format!(
            "<a href=\"{}\" class=\"read-more\" target=\"_blank\">Leggi di più →</a>\n",
            escape(&row.master_url)
        ));
        html.push_str("</article>\n");
    }
    html.push_str("</div>\n");

    if !report.reviews.platforms.is_empty() {
        html.push_str("<div class=\"reviews-section\">\n<h3>Recensioni dei Clienti</h3>\n");
        for platform in &report.reviews.platforms {
            html.push_str(&format!(
                "<div class=\"review-item\"><strong>{}</strong> — {} ({} recensioni)\n",
                escape(&platform.platform),
                escape(&platform.rating),
                platform.count
            ));
            for sample in &platform.sample_reviews {
                html.push_str(&format!(
                    "<p>\u{201c}{}\u{201d} — {}, {}</p>\n",
                    escape(&sample.text),
                    escape(&sample.author),
                    escape(&sample.date)
                ));
            }
            html.push_str("</div>\n");
        }
        html.push_str("</div>\n");
    }

    html.push_str("</section>\n");
}

/// Write the report plus the JSON files the external image renderer consumes.
pub fn write_outputs(
    out_dir: &Path,
    html: &str,
    regions: &[RegionSummary],
    clouds: &CloudInputs,
) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;

    let report_path = out_dir.join(REPORT_FILE);
    fs::write(&report_path, html).with_context(|| format!("write {}", report_path.display()))?;

    write_json(out_dir.join("venn_regions.json"), &regions)?;
    write_json(out_dir.join("wordcloud_inputs.json"), &clouds)?;

    info!("Report written - path={}", report_path.display());
    Ok(())
}

fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path.as_ref(), json)
        .with_context(|| format!("write {}", path.as_ref().display()))?;
    Ok(())
}
