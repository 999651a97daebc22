//! Free-text lookup against the static knowledge base.
//!
//! Matching is deliberately coarse: a disease key matches when it is a
//! substring of the lower-cased input or the input is a substring of the key.
//! Crops and diseases are scanned in table order, first match wins, so
//! ambiguous text resolves to whichever entry is registered first.
//!
//! Every miss returns a structured result with a reason code and a non-empty
//! generic advice list — the caller always has something to show the farmer.

use serde::Serialize;
use thiserror::Error;

use crate::knowledge::{
    self, CalendarEntry, ADDITIONAL_TIPS, BEST_PRACTICES, CALENDAR_FALLBACK_GUIDELINES,
    CROP_CALENDAR, CROP_FALLBACK_SUGGESTIONS, DISEASE_FALLBACK_TIPS, REMEDIES, SEASONAL_ADVICE,
    YIELD_FALLBACK_TIPS, YIELD_TIPS,
};

// ═══════════════════════════════════════════════════════════
// Result types — serialised to the REST layer
// ═══════════════════════════════════════════════════════════

/// One advice category (or cultivation topic) with its ordered entries.
#[derive(Debug, Clone, Serialize)]
pub struct AdviceList {
    pub category: String,
    pub items: Vec<String>,
}

/// Successful remedy lookup for a `(crop, disease)` pair.
#[derive(Debug, Clone, Serialize)]
pub struct RemedySet {
    pub crop: String,
    /// The free text the caller asked about, echoed back.
    pub disease: String,
    /// The canonical key that matched.
    pub disease_key: String,
    pub remedies: Vec<AdviceList>,
    pub additional_tips: Vec<String>,
}

/// Successful yield-tip lookup for a crop.
#[derive(Debug, Clone, Serialize)]
pub struct TipSet {
    pub crop: String,
    pub tips: Vec<AdviceList>,
    pub best_practices: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonRange {
    pub season: String,
    pub months: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDetail {
    pub sowing_time: Vec<SeasonRange>,
    pub harvest_time: Vec<SeasonRange>,
    pub growth_duration: String,
    pub spacing: String,
    pub seed_rate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonalAdvice {
    pub season: String,
    pub advice: String,
}

/// Successful calendar lookup for a crop and location.
#[derive(Debug, Clone, Serialize)]
pub struct Calendar {
    pub crop: String,
    /// Location the caller asked for (may differ from the resolved entry
    /// when the `"india"` fallback kicked in).
    pub location: String,
    pub calendar: CalendarDetail,
    pub seasonal_advice: Vec<SeasonalAdvice>,
}

/// Lookup misses. Each carries a generic, non-empty fallback list.
#[derive(Debug, Clone, Error)]
pub enum LookupMiss {
    #[error("Crop not found in database")]
    CropNotFound { suggestions: Vec<String> },

    #[error("Disease not found in database")]
    DiseaseNotFound { crop: String, general_tips: Vec<String> },

    #[error("Crop calendar not available")]
    CalendarNotFound { general_guidelines: Vec<String> },
}

impl LookupMiss {
    /// Stable reason code for API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            LookupMiss::CropNotFound { .. } => "CROP_NOT_FOUND",
            LookupMiss::DiseaseNotFound { .. } => "DISEASE_NOT_FOUND",
            LookupMiss::CalendarNotFound { .. } => "CALENDAR_NOT_FOUND",
        }
    }

    /// The fallback advice carried by this miss. Never empty.
    pub fn fallback(&self) -> &[String] {
        match self {
            LookupMiss::CropNotFound { suggestions } => suggestions,
            LookupMiss::DiseaseNotFound { general_tips, .. } => general_tips,
            LookupMiss::CalendarNotFound { general_guidelines } => general_guidelines,
        }
    }

    /// JSON body for the REST layer. Misses still serve the farmer advice,
    /// so they ship as 200 responses with the fallback list under the key
    /// matching the miss kind.
    pub fn payload(&self) -> serde_json::Value {
        let key = match self {
            LookupMiss::CropNotFound { .. } => "suggestions",
            LookupMiss::DiseaseNotFound { .. } => "general_tips",
            LookupMiss::CalendarNotFound { .. } => "general_guidelines",
        };
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
            (key): self.fallback(),
        });
        if let LookupMiss::DiseaseNotFound { crop, .. } = self {
            body["crop"] = serde_json::Value::String(crop.clone());
        }
        body
    }
}

// ═══════════════════════════════════════════════════════════
// Matching
// ═══════════════════════════════════════════════════════════

/// Bidirectional substring test between a canonical key and normalized input.
fn keys_match(key: &str, input: &str) -> bool {
    input.contains(key) || key.contains(input)
}

/// Lower-case and join whitespace runs with underscores, so spoken forms
/// like "tomato early blight" line up with canonical keys ("early_blight").
fn normalize_text(free_text: &str) -> String {
    free_text
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Resolve free text to a crop by scanning every `(crop, disease)` pair in
/// registration order. Blank input never matches.
pub fn find_crop(free_text: &str) -> Option<&'static str> {
    let input = normalize_text(free_text);
    if input.is_empty() {
        return None;
    }

    for crop in REMEDIES {
        for disease in crop.diseases {
            if keys_match(disease.key, &input) {
                return Some(crop.crop);
            }
        }
    }
    None
}

/// Resolve free text to a disease key within one crop's disease set.
pub fn find_disease(free_text: &str, crop_key: &str) -> Option<&'static str> {
    let input = normalize_text(free_text);
    if input.is_empty() {
        return None;
    }

    let crop = REMEDIES.iter().find(|c| c.crop == crop_key)?;
    crop.diseases
        .iter()
        .find(|d| keys_match(d.key, &input))
        .map(|d| d.key)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════
// Lookups
// ═══════════════════════════════════════════════════════════

/// Look up the remedy table for a disease described in free text.
///
/// When `crop_text` is empty the crop is resolved from the disease text.
/// A provided crop must match a registered crop key exactly (lower-cased).
pub fn lookup_remedies(disease_text: &str, crop_text: &str) -> Result<RemedySet, LookupMiss> {
    let crop_key = if crop_text.trim().is_empty() {
        find_crop(disease_text)
    } else {
        let wanted = crop_text.trim().to_lowercase();
        REMEDIES.iter().map(|c| c.crop).find(|c| *c == wanted)
    };

    let Some(crop_key) = crop_key else {
        return Err(LookupMiss::CropNotFound {
            suggestions: to_strings(CROP_FALLBACK_SUGGESTIONS),
        });
    };

    let Some(disease_key) = find_disease(disease_text, crop_key) else {
        return Err(LookupMiss::DiseaseNotFound {
            crop: crop_key.to_string(),
            general_tips: to_strings(DISEASE_FALLBACK_TIPS),
        });
    };

    // Both keys came from the table above, so the entry exists.
    let entry = REMEDIES
        .iter()
        .find(|c| c.crop == crop_key)
        .and_then(|c| c.diseases.iter().find(|d| d.key == disease_key))
        .ok_or_else(|| LookupMiss::CropNotFound {
            suggestions: to_strings(CROP_FALLBACK_SUGGESTIONS),
        })?;

    Ok(RemedySet {
        crop: crop_key.to_string(),
        disease: disease_text.to_string(),
        disease_key: disease_key.to_string(),
        remedies: entry
            .advice
            .iter()
            .map(|set| AdviceList {
                category: set.category.to_string(),
                items: to_strings(set.items),
            })
            .collect(),
        additional_tips: to_strings(ADDITIONAL_TIPS),
    })
}

/// Look up yield-improvement tips for a crop.
pub fn lookup_yield_tips(crop_key: &str) -> Result<TipSet, LookupMiss> {
    let wanted = crop_key.trim().to_lowercase();
    let Some(entry) = YIELD_TIPS.iter().find(|e| e.crop == wanted) else {
        return Err(LookupMiss::CropNotFound {
            suggestions: to_strings(YIELD_FALLBACK_TIPS),
        });
    };

    Ok(TipSet {
        crop: entry.crop.to_string(),
        tips: entry
            .sections
            .iter()
            .map(|s| AdviceList {
                category: s.topic.to_string(),
                items: to_strings(s.items),
            })
            .collect(),
        best_practices: to_strings(BEST_PRACTICES),
    })
}

/// Look up the crop calendar for a crop and location.
///
/// Unknown locations fall back to the `"india"` sub-record; only a missing
/// crop is a miss.
pub fn lookup_calendar(crop_key: &str, location: &str) -> Result<Calendar, LookupMiss> {
    let wanted_crop = crop_key.trim().to_lowercase();
    let Some(cal) = CROP_CALENDAR.iter().find(|c| c.crop == wanted_crop) else {
        return Err(LookupMiss::CalendarNotFound {
            general_guidelines: to_strings(CALENDAR_FALLBACK_GUIDELINES),
        });
    };

    let wanted_loc = location.trim().to_lowercase();
    let entry = resolve_location(cal.locations, &wanted_loc);

    let seasons = |windows: &[knowledge::SeasonWindow]| {
        windows
            .iter()
            .map(|w| SeasonRange {
                season: w.season.to_string(),
                months: w.months.to_string(),
            })
            .collect()
    };

    Ok(Calendar {
        crop: cal.crop.to_string(),
        location: wanted_loc,
        calendar: CalendarDetail {
            sowing_time: seasons(entry.sowing_time),
            harvest_time: seasons(entry.harvest_time),
            growth_duration: entry.growth_duration.to_string(),
            spacing: entry.spacing.to_string(),
            seed_rate: entry.seed_rate.to_string(),
        },
        seasonal_advice: SEASONAL_ADVICE
            .iter()
            .map(|(season, advice)| SeasonalAdvice {
                season: season.to_string(),
                advice: advice.to_string(),
            })
            .collect(),
    })
}

fn resolve_location<'a>(locations: &'a [CalendarEntry], wanted: &str) -> &'a CalendarEntry {
    locations
        .iter()
        .find(|l| l.location == wanted)
        .or_else(|| locations.iter().find(|l| l.location == "india"))
        // Every calendar carries an "india" entry (tested in knowledge.rs),
        // so this only fires for a table editing mistake.
        .unwrap_or(&locations[0])
}
