//! Disease classification over prepared image tensors.
//!
//! The `Classifier` trait is the seam where a trained model plugs in; the
//! shipped implementation is a demo mock that samples a label from the fixed
//! crop/disease table. Nothing else in the pipeline knows the difference.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::preprocess::Tensor;

// ═══════════════════════════════════════════════════════════
// Label table
// ═══════════════════════════════════════════════════════════

/// Supported crops and their detectable conditions: `(key, display label)`.
/// Keys are lowercase underscore tokens, matchable by the lookup module.
pub const CROP_DISEASES: &[(&str, &[(&str, &str)])] = &[
    (
        "tomato",
        &[
            ("healthy", "Healthy Tomato"),
            ("early_blight", "Tomato Early Blight"),
            ("late_blight", "Tomato Late Blight"),
            ("leaf_mold", "Tomato Leaf Mold"),
            ("septoria_leaf_spot", "Tomato Septoria Leaf Spot"),
            ("spider_mites", "Tomato Spider Mites"),
            ("target_spot", "Tomato Target Spot"),
            ("yellow_leaf_curl_virus", "Tomato Yellow Leaf Curl Virus"),
            ("mosaic_virus", "Tomato Mosaic Virus"),
        ],
    ),
    (
        "potato",
        &[
            ("healthy", "Healthy Potato"),
            ("early_blight", "Potato Early Blight"),
            ("late_blight", "Potato Late Blight"),
        ],
    ),
    (
        "corn",
        &[
            ("healthy", "Healthy Corn"),
            ("gray_leaf_spot", "Corn Gray Leaf Spot"),
            ("common_rust", "Corn Common Rust"),
            ("northern_leaf_blight", "Corn Northern Leaf Blight"),
        ],
    ),
    (
        "apple",
        &[
            ("healthy", "Healthy Apple"),
            ("apple_scab", "Apple Scab"),
            ("black_rot", "Apple Black Rot"),
            ("cedar_apple_rust", "Apple Cedar Rust"),
        ],
    ),
    (
        "grape",
        &[
            ("healthy", "Healthy Grape"),
            ("black_rot", "Grape Black Rot"),
            ("esca", "Grape Esca"),
            ("leaf_blight", "Grape Leaf Blight"),
        ],
    ),
];

/// Disease descriptions shown alongside a detection.
const DESCRIPTIONS: &[(&str, &str, &str)] = &[
    ("tomato", "healthy", "Your tomato plant appears to be healthy with no visible signs of disease."),
    ("tomato", "early_blight", "Early blight is a common fungal disease that causes dark brown spots with concentric rings on lower leaves."),
    ("tomato", "late_blight", "Late blight is a serious disease that can quickly kill plants. Look for water-soaked lesions on leaves."),
    ("tomato", "leaf_mold", "Leaf mold causes yellow spots on upper leaf surfaces and olive-green spores on undersides."),
    ("tomato", "septoria_leaf_spot", "Small, circular spots with gray centers and dark borders on leaves."),
    ("tomato", "spider_mites", "Tiny pests that cause stippling and yellowing of leaves."),
    ("tomato", "target_spot", "Target-shaped lesions with dark brown centers and lighter edges."),
    ("tomato", "yellow_leaf_curl_virus", "Virus that causes leaves to curl upward and turn yellow."),
    ("tomato", "mosaic_virus", "Virus causing mottled, distorted leaves with yellow and green patches."),
];

const GENERIC_DESCRIPTION: &str = "Disease detected in crop.";

/// Description for a detected `(crop, disease)` pair, generic when unknown.
pub fn disease_description(crop: &str, disease_key: &str) -> &'static str {
    DESCRIPTIONS
        .iter()
        .find(|(c, d, _)| *c == crop && *d == disease_key)
        .map(|(_, _, text)| *text)
        .unwrap_or(GENERIC_DESCRIPTION)
}

/// List of crops the classifier can label.
pub fn supported_crops() -> Vec<&'static str> {
    CROP_DISEASES.iter().map(|(crop, _)| *crop).collect()
}

// ═══════════════════════════════════════════════════════════
// Results
// ═══════════════════════════════════════════════════════════

/// Coarse severity bucket derived from detection confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Fixed thresholds: above 0.9 High, above 0.7 Medium, else Low.
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence > 0.9 {
            Severity::High
        } else if confidence > 0.7 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// Outcome of a disease detection, constructed per request and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub crop_type: String,
    /// Display label, e.g. "Tomato Early Blight".
    pub disease: String,
    /// Canonical key for remedy lookups, e.g. "early_blight".
    pub disease_key: String,
    /// In [0, 1].
    pub confidence: f32,
    pub description: String,
    pub severity: Severity,
}

// ═══════════════════════════════════════════════════════════
// Classifier seam
// ═══════════════════════════════════════════════════════════

/// Turns a prepared `(1, 224, 224, 3)` tensor into an analysis result.
///
/// A trained model implements this without touching the image preparer;
/// the REST layer only ever sees the trait object.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &Tensor) -> AnalysisResult;
}

/// Demo classifier: uniform random crop and disease, confidence in
/// [0.7, 0.95). Stands in until a real model is wired up.
pub struct MockClassifier;

impl Classifier for MockClassifier {
    fn classify(&self, _input: &Tensor) -> AnalysisResult {
        let mut rng = rand::thread_rng();

        // The table is non-empty by construction.
        let (crop, diseases) = CROP_DISEASES.choose(&mut rng).expect("label table is empty");
        let (key, label) = diseases.choose(&mut rng).expect("disease list is empty");
        let confidence: f32 = rng.gen_range(0.7..0.95);

        AnalysisResult {
            crop_type: crop.to_string(),
            disease: label.to_string(),
            disease_key: key.to_string(),
            confidence,
            description: disease_description(crop, key).to_string(),
            severity: Severity::from_confidence(confidence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::preprocess::Tensor;

    fn empty_tensor() -> Tensor {
        Tensor::zeros((1, 224, 224, 3))
    }

    #[test]
    fn severity_thresholds() {
        assert_eq!(Severity::from_confidence(0.95), Severity::High);
        assert_eq!(Severity::from_confidence(0.9), Severity::Medium);
        assert_eq!(Severity::from_confidence(0.75), Severity::Medium);
        assert_eq!(Severity::from_confidence(0.7), Severity::Low);
        assert_eq!(Severity::from_confidence(0.1), Severity::Low);
    }

    #[test]
    fn mock_returns_known_label() {
        let result = MockClassifier.classify(&empty_tensor());

        let crop_entry = CROP_DISEASES
            .iter()
            .find(|(crop, _)| *crop == result.crop_type)
            .expect("crop from table");
        assert!(crop_entry
            .1
            .iter()
            .any(|(key, label)| *key == result.disease_key && *label == result.disease));
    }

    #[test]
    fn mock_confidence_in_demo_range() {
        for _ in 0..50 {
            let result = MockClassifier.classify(&empty_tensor());
            assert!((0.7..0.95).contains(&result.confidence));
            assert_eq!(result.severity, Severity::from_confidence(result.confidence));
        }
    }

    #[test]
    fn tomato_description_is_specific() {
        let text = disease_description("tomato", "early_blight");
        assert!(text.contains("Early blight"));
    }

    #[test]
    fn unknown_pair_gets_generic_description() {
        assert_eq!(disease_description("corn", "common_rust"), GENERIC_DESCRIPTION);
        assert_eq!(disease_description("banana", "rot"), GENERIC_DESCRIPTION);
    }

    #[test]
    fn supported_crops_follow_table_order() {
        let crops = supported_crops();
        assert_eq!(crops, vec!["tomato", "potato", "corn", "apple", "grape"]);
    }

    #[test]
    fn table_keys_are_lowercase_tokens() {
        for (crop, diseases) in CROP_DISEASES {
            assert!(crop.chars().all(|c| c.is_ascii_lowercase()));
            for (key, _) in *diseases {
                assert!(key.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
            }
        }
    }
}
