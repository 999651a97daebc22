//! Static agronomy knowledge base: remedies, yield tips and crop calendars.
//!
//! All tables are process-wide constants, read-only for the process lifetime.
//! Ordering matters: the lookup matcher scans crops and diseases in table
//! order and resolves ambiguous free text to the first match, so entries are
//! listed in registration priority (tomato before potato).
//!
//! Invariant: every disease key is a lowercase, underscore-separated token so
//! it can be matched by substring against lower-cased user input.

/// One advice category for a disease (`organic`, `chemical`, `preventive`
/// or `maintenance`) with its ordered advice strings.
pub struct AdviceSet {
    pub category: &'static str,
    pub items: &'static [&'static str],
}

/// A disease known for a crop, keyed for substring matching.
pub struct DiseaseEntry {
    pub key: &'static str,
    pub advice: &'static [AdviceSet],
}

/// A crop with its registered diseases.
pub struct CropEntry {
    pub crop: &'static str,
    pub diseases: &'static [DiseaseEntry],
}

/// Remedies table: crop → disease → category → advice.
pub const REMEDIES: &[CropEntry] = &[
    CropEntry {
        crop: "tomato",
        diseases: &[
            DiseaseEntry {
                key: "early_blight",
                advice: &[
                    AdviceSet {
                        category: "organic",
                        items: &[
                            "Remove and destroy infected leaves",
                            "Improve air circulation by spacing plants properly",
                            "Apply neem oil spray (2-3 tablespoons per gallon of water)",
                            "Use copper-based fungicides as preventive measure",
                            "Mulch around plants to prevent soil splash",
                        ],
                    },
                    AdviceSet {
                        category: "chemical",
                        items: &[
                            "Apply chlorothalonil (Bravo) at first sign of disease",
                            "Use mancozeb-based fungicides",
                            "Apply copper sulfate solution",
                            "Use systemic fungicides like azoxystrobin",
                        ],
                    },
                    AdviceSet {
                        category: "preventive",
                        items: &[
                            "Plant resistant varieties",
                            "Avoid overhead watering",
                            "Rotate crops every 3-4 years",
                            "Maintain proper plant spacing",
                            "Remove plant debris after harvest",
                        ],
                    },
                ],
            },
            DiseaseEntry {
                key: "late_blight",
                advice: &[
                    AdviceSet {
                        category: "organic",
                        items: &[
                            "Remove infected plants immediately",
                            "Apply copper sulfate solution",
                            "Use baking soda spray (1 tablespoon per gallon)",
                            "Improve drainage and air circulation",
                            "Apply compost tea to boost plant immunity",
                        ],
                    },
                    AdviceSet {
                        category: "chemical",
                        items: &[
                            "Apply chlorothalonil immediately",
                            "Use metalaxyl-based fungicides",
                            "Apply copper hydroxide",
                            "Use systemic fungicides",
                        ],
                    },
                    AdviceSet {
                        category: "preventive",
                        items: &[
                            "Plant resistant varieties",
                            "Avoid overhead irrigation",
                            "Monitor weather conditions",
                            "Apply preventive fungicides before rain",
                        ],
                    },
                ],
            },
            DiseaseEntry {
                key: "healthy",
                advice: &[AdviceSet {
                    category: "maintenance",
                    items: &[
                        "Regular watering (1-2 inches per week)",
                        "Fertilize with balanced NPK (10-10-10)",
                        "Prune suckers regularly",
                        "Support plants with cages or stakes",
                        "Monitor for pests and diseases",
                    ],
                }],
            },
        ],
    },
    CropEntry {
        crop: "potato",
        diseases: &[DiseaseEntry {
            key: "early_blight",
            advice: &[
                AdviceSet {
                    category: "organic",
                    items: &[
                        "Remove infected leaves",
                        "Apply neem oil spray",
                        "Use copper-based fungicides",
                        "Improve soil drainage",
                        "Apply compost tea",
                    ],
                },
                AdviceSet {
                    category: "chemical",
                    items: &[
                        "Apply chlorothalonil",
                        "Use mancozeb fungicides",
                        "Apply copper sulfate",
                    ],
                },
                AdviceSet {
                    category: "preventive",
                    items: &[
                        "Plant certified disease-free seed",
                        "Rotate crops",
                        "Avoid overhead watering",
                        "Remove plant debris",
                    ],
                },
            ],
        }],
    },
];

// ═══════════════════════════════════════════════════════════
// Yield tips
// ═══════════════════════════════════════════════════════════

/// One cultivation topic (soil preparation, planting, ...) with its tips.
pub struct TipSection {
    pub topic: &'static str,
    pub items: &'static [&'static str],
}

pub struct YieldEntry {
    pub crop: &'static str,
    pub sections: &'static [TipSection],
}

pub const YIELD_TIPS: &[YieldEntry] = &[
    YieldEntry {
        crop: "tomato",
        sections: &[
            TipSection {
                topic: "soil_preparation",
                items: &[
                    "Test soil pH (6.0-6.8 is ideal)",
                    "Add organic matter (compost, manure)",
                    "Ensure good drainage",
                    "Apply balanced fertilizer before planting",
                ],
            },
            TipSection {
                topic: "planting",
                items: &[
                    "Plant after last frost date",
                    "Space plants 2-3 feet apart",
                    "Plant deep (up to first true leaves)",
                    "Use supports or cages",
                ],
            },
            TipSection {
                topic: "watering",
                items: &[
                    "Water deeply 1-2 times per week",
                    "Avoid overhead watering",
                    "Water at base of plants",
                    "Mulch to retain moisture",
                ],
            },
            TipSection {
                topic: "fertilization",
                items: &[
                    "Apply balanced fertilizer at planting",
                    "Side-dress with nitrogen when fruits form",
                    "Use calcium nitrate to prevent blossom end rot",
                    "Apply foliar feed monthly",
                ],
            },
            TipSection {
                topic: "pest_management",
                items: &[
                    "Monitor for hornworms and aphids",
                    "Use neem oil for organic control",
                    "Plant marigolds as companion plants",
                    "Hand-pick large pests",
                ],
            },
        ],
    },
    YieldEntry {
        crop: "potato",
        sections: &[
            TipSection {
                topic: "soil_preparation",
                items: &[
                    "Loose, well-draining soil",
                    "pH 5.0-6.5",
                    "Add compost and aged manure",
                    "Remove rocks and debris",
                ],
            },
            TipSection {
                topic: "planting",
                items: &[
                    "Plant in early spring",
                    "Cut seed potatoes into pieces with 2-3 eyes",
                    "Plant 4-6 inches deep",
                    "Space 12-15 inches apart",
                ],
            },
            TipSection {
                topic: "watering",
                items: &[
                    "Keep soil consistently moist",
                    "Water deeply once per week",
                    "Reduce watering when plants flower",
                    "Stop watering 2 weeks before harvest",
                ],
            },
            TipSection {
                topic: "fertilization",
                items: &[
                    "Apply balanced fertilizer at planting",
                    "Side-dress when plants are 6 inches tall",
                    "Use high-potassium fertilizer for tuber development",
                ],
            },
        ],
    },
];

// ═══════════════════════════════════════════════════════════
// Crop calendars
// ═══════════════════════════════════════════════════════════

/// Sowing or harvest window for one cropping season (kharif/rabi/zaid).
pub struct SeasonWindow {
    pub season: &'static str,
    pub months: &'static str,
}

/// Calendar sub-record for one location.
pub struct CalendarEntry {
    pub location: &'static str,
    pub sowing_time: &'static [SeasonWindow],
    pub harvest_time: &'static [SeasonWindow],
    pub growth_duration: &'static str,
    pub spacing: &'static str,
    pub seed_rate: &'static str,
}

pub struct CropCalendar {
    pub crop: &'static str,
    pub locations: &'static [CalendarEntry],
}

pub const CROP_CALENDAR: &[CropCalendar] = &[
    CropCalendar {
        crop: "tomato",
        locations: &[CalendarEntry {
            location: "india",
            sowing_time: &[
                SeasonWindow { season: "kharif", months: "June-July" },
                SeasonWindow { season: "rabi", months: "October-November" },
                SeasonWindow { season: "zaid", months: "January-February" },
            ],
            harvest_time: &[
                SeasonWindow { season: "kharif", months: "September-October" },
                SeasonWindow { season: "rabi", months: "January-March" },
                SeasonWindow { season: "zaid", months: "April-May" },
            ],
            growth_duration: "90-120 days",
            spacing: "60x45 cm",
            seed_rate: "400-500 g/ha",
        }],
    },
    CropCalendar {
        crop: "potato",
        locations: &[CalendarEntry {
            location: "india",
            sowing_time: &[
                SeasonWindow { season: "kharif", months: "June-July" },
                SeasonWindow { season: "rabi", months: "October-November" },
            ],
            harvest_time: &[
                SeasonWindow { season: "kharif", months: "September-October" },
                SeasonWindow { season: "rabi", months: "January-March" },
            ],
            growth_duration: "90-110 days",
            spacing: "60x20 cm",
            seed_rate: "2.5-3.0 tonnes/ha",
        }],
    },
];

// ═══════════════════════════════════════════════════════════
// Fixed advice lists — appended to hits, substituted on misses
// ═══════════════════════════════════════════════════════════

/// Substituted when free text resolves to no known crop.
pub const CROP_FALLBACK_SUGGESTIONS: &[&str] = &[
    "Ensure proper plant spacing for air circulation",
    "Avoid overhead watering",
    "Remove infected plant parts",
    "Apply organic fungicides like neem oil",
    "Consult local agricultural extension office",
];

/// Substituted when the crop is known but the disease is not.
pub const DISEASE_FALLBACK_TIPS: &[&str] = &[
    "Maintain good plant hygiene",
    "Ensure proper spacing",
    "Use disease-resistant varieties",
    "Practice crop rotation",
    "Monitor plants regularly",
];

/// Substituted when a crop has no yield-tip entry.
pub const YIELD_FALLBACK_TIPS: &[&str] = &[
    "Test soil before planting",
    "Use quality seeds/seedlings",
    "Maintain proper spacing",
    "Water regularly and deeply",
    "Fertilize appropriately",
    "Control pests and diseases",
    "Harvest at optimal time",
];

/// Substituted when a crop has no calendar.
pub const CALENDAR_FALLBACK_GUIDELINES: &[&str] = &[
    "Plant during appropriate season for your region",
    "Consider local climate and rainfall patterns",
    "Follow local agricultural calendar",
    "Consult local extension office for specific dates",
];

/// Appended to every successful remedy lookup.
pub const ADDITIONAL_TIPS: &[&str] = &[
    "Always follow safety precautions when using chemicals",
    "Test treatments on small area first",
    "Keep records of treatments applied",
    "Monitor effectiveness of treatments",
    "Consider integrated pest management (IPM) approach",
];

/// Appended to every successful yield-tip lookup.
pub const BEST_PRACTICES: &[&str] = &[
    "Use certified seeds or healthy seedlings",
    "Practice crop rotation to prevent disease buildup",
    "Maintain soil health with organic matter",
    "Monitor plants regularly for early detection",
    "Use appropriate irrigation methods",
    "Harvest at optimal maturity for best quality",
];

/// Static seasonal advice, independent of location or date.
pub const SEASONAL_ADVICE: &[(&str, &str)] = &[
    ("spring", "Prepare soil and start early season crops"),
    ("summer", "Monitor for pests and ensure adequate irrigation"),
    ("autumn", "Harvest and prepare for winter crops"),
    ("winter", "Plan for next season and maintain soil health"),
];
