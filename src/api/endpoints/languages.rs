//! Supported UI languages.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Serialize)]
pub struct LanguagesResponse {
    pub success: bool,
    pub languages: Vec<Language>,
}

const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("hi", "हिंदी (Hindi)"),
    ("mr", "मराठी (Marathi)"),
    ("te", "తెలుగు (Telugu)"),
    ("ta", "தமிழ் (Tamil)"),
    ("bn", "বাংলা (Bengali)"),
];

/// `GET /api/languages` — static list of languages the frontend can offer.
pub async fn list() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        success: true,
        languages: LANGUAGES
            .iter()
            .map(|(code, name)| Language { code, name })
            .collect(),
    })
}
