//! Mandi (wholesale market) prices, Agmarknet with demo fallback.
//!
//! Same two-branch shape as the weather gateway: one timed attempt against
//! the data.gov.in Agmarknet resource, demo dataset on any failure.

use chrono::{Duration, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::GatewayError;
use crate::config;

const DEMO_SOURCE: &str = "Demo Data";
const LIVE_SOURCE: &str = "Agmarknet API";
const DEMO_NOTE: &str = "Using demo data. Connect to Agmarknet API for real-time prices.";

/// Agmarknet daily-prices resource on data.gov.in.
const AGMARKNET_RESOURCE_URL: &str =
    "https://api.data.gov.in/resource/9ef84268-d588-465a-a308-a864a43d0070";

// ═══════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════

/// One market quote for a crop.
#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    pub market: String,
    pub price: f64,
    pub unit: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commodity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Price listing with provenance: live API or demo substitution.
#[derive(Debug, Clone, Serialize)]
pub struct PriceReport {
    pub crop: String,
    pub prices: Vec<PriceQuote>,
    pub source: &'static str,
    pub last_updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

/// One point of a mock price trend.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub price: f64,
    pub change: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceTrends {
    pub crop: String,
    pub trends: Vec<TrendPoint>,
    pub period: String,
}

// ═══════════════════════════════════════════════════════════
// Agmarknet response shapes
// ═══════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct AgmarknetResponse {
    #[serde(default)]
    records: Vec<AgmarknetRecord>,
}

#[derive(Deserialize)]
struct AgmarknetRecord {
    #[serde(default)]
    market: Option<String>,
    #[serde(default)]
    modal_price: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    commodity: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

// ═══════════════════════════════════════════════════════════
// Gateway
// ═══════════════════════════════════════════════════════════

/// Agmarknet client with fixed demo fallback.
pub struct MarketGateway {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl MarketGateway {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Production gateway against the data.gov.in Agmarknet resource.
    pub fn from_env() -> Self {
        Self::new(
            AGMARKNET_RESOURCE_URL,
            &config::agmarknet_api_key(),
            config::GATEWAY_TIMEOUT_SECS,
        )
    }

    /// Prices for a crop, optionally narrowed to one market (`"all"` keeps
    /// everything). Total: live data when the provider answers, demo data
    /// otherwise.
    pub async fn prices(&self, crop: &str, market: &str) -> PriceReport {
        match self.fetch(crop, market).await {
            // An empty record set is treated like a miss so callers always
            // see usable numbers.
            Ok(prices) if !prices.is_empty() => PriceReport {
                crop: crop.to_string(),
                prices,
                source: LIVE_SOURCE,
                last_updated: Local::now().to_rfc3339(),
                note: None,
            },
            Ok(_) => {
                debug!(crop, market, "Provider returned no records, serving demo data");
                fallback_report(crop, market)
            }
            Err(e) => {
                debug!(crop, market, error = %e, "Price fetch failed, serving demo data");
                fallback_report(crop, market)
            }
        }
    }

    async fn fetch(&self, crop: &str, market: &str) -> Result<Vec<PriceQuote>, GatewayError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("api-key", &self.api_key),
            ("format", "json"),
            ("filters[commodity]", crop),
            ("limit", "10"),
        ];
        if market != "all" {
            query.push(("filters[market]", market));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, &self.base_url, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::BadStatus(status.as_u16()));
        }

        let parsed: AgmarknetResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::ResponseParsing(e.to_string()))?;

        Ok(parsed
            .records
            .into_iter()
            .map(|r| PriceQuote {
                market: r.market.unwrap_or_else(|| "Unknown".to_string()),
                price: r
                    .modal_price
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(0.0),
                unit: r.unit.unwrap_or_else(|| "kg".to_string()),
                date: r.date.unwrap_or_default(),
                commodity: r.commodity,
                state: r.state,
            })
            .collect())
    }

    /// Mock 7-day price trend: a random walk of ±2 around the demo base
    /// price, oldest day first. Historical Agmarknet data needs a separate
    /// resource subscription, so the demo serves synthetic history.
    pub fn price_trends(&self, crop: &str, days: usize) -> PriceTrends {
        let base_price = demo_prices(crop)
            .first()
            .map(|q| q.price)
            .unwrap_or(20.0);

        let mut rng = rand::thread_rng();
        let mut trends: Vec<TrendPoint> = (0..days)
            .map(|i| {
                let date = Local::now() - Duration::days(i as i64);
                TrendPoint {
                    date: date.format("%Y-%m-%d").to_string(),
                    price: round2(base_price + rng.gen_range(-2.0..2.0)),
                    change: round2(rng.gen_range(-5.0..5.0)),
                }
            })
            .collect();
        trends.reverse();

        PriceTrends {
            crop: crop.to_string(),
            trends,
            period: format!("{days} days"),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ═══════════════════════════════════════════════════════════
// Demo dataset
// ═══════════════════════════════════════════════════════════

/// Demo quotes per crop: `(market, price per kg)` on a fixed sample date.
const DEMO_QUOTES: &[(&str, &[(&str, f64)])] = &[
    ("tomato", &[
        ("Mumbai APMC", 24.50),
        ("Delhi Azadpur", 22.00),
        ("Bangalore APMC", 26.75),
        ("Chennai Koyambedu", 25.30),
        ("Kolkata APMC", 23.80),
    ]),
    ("potato", &[
        ("Mumbai APMC", 12.50),
        ("Delhi Azadpur", 10.75),
        ("Bangalore APMC", 14.20),
        ("Chennai Koyambedu", 13.90),
        ("Kolkata APMC", 11.60),
    ]),
    ("onion", &[
        ("Mumbai APMC", 18.75),
        ("Delhi Azadpur", 16.50),
        ("Bangalore APMC", 20.30),
        ("Chennai Koyambedu", 19.80),
        ("Kolkata APMC", 17.40),
    ]),
    ("brinjal", &[
        ("Mumbai APMC", 15.20),
        ("Delhi Azadpur", 13.80),
        ("Bangalore APMC", 17.50),
        ("Chennai Koyambedu", 16.90),
        ("Kolkata APMC", 14.60),
    ]),
    ("cauliflower", &[
        ("Mumbai APMC", 8.50),
        ("Delhi Azadpur", 7.25),
        ("Bangalore APMC", 9.80),
        ("Chennai Koyambedu", 9.40),
        ("Kolkata APMC", 8.10),
    ]),
];

const DEMO_DATE: &str = "2024-01-15";

/// Crops present in the demo dataset.
pub fn supported_crops() -> Vec<&'static str> {
    DEMO_QUOTES.iter().map(|(crop, _)| *crop).collect()
}

/// Distinct markets across the demo dataset, in first-seen order.
pub fn supported_markets() -> Vec<&'static str> {
    let mut markets: Vec<&'static str> = Vec::new();
    for (_, quotes) in DEMO_QUOTES {
        for (market, _) in *quotes {
            if !markets.contains(market) {
                markets.push(market);
            }
        }
    }
    markets
}

fn demo_prices(crop: &str) -> Vec<PriceQuote> {
    let wanted = crop.to_lowercase();
    DEMO_QUOTES
        .iter()
        .find(|(c, _)| *c == wanted)
        .map(|(_, quotes)| {
            quotes
                .iter()
                .map(|(market, price)| PriceQuote {
                    market: market.to_string(),
                    price: *price,
                    unit: "kg".to_string(),
                    date: DEMO_DATE.to_string(),
                    commodity: None,
                    state: None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn fallback_report(crop: &str, market: &str) -> PriceReport {
    let mut prices = demo_prices(crop);
    if market != "all" {
        let wanted = market.to_lowercase();
        prices.retain(|q| q.market.to_lowercase().contains(&wanted));
    }

    PriceReport {
        crop: crop.to_string(),
        prices,
        source: DEMO_SOURCE,
        last_updated: Local::now().to_rfc3339(),
        note: Some(DEMO_NOTE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gateway pointed at a closed local port, forcing the fallback branch.
    fn offline_gateway() -> MarketGateway {
        MarketGateway::new("http://127.0.0.1:1", "demo_key", 1)
    }

    #[tokio::test]
    async fn prices_fall_back_to_demo_data() {
        let report = offline_gateway().prices("tomato", "all").await;
        assert_eq!(report.source, DEMO_SOURCE);
        assert!(report.note.is_some());
        assert_eq!(report.prices.len(), 5);
    }

    #[tokio::test]
    async fn market_filter_narrows_demo_quotes() {
        let report = offline_gateway().prices("potato", "mumbai").await;
        assert_eq!(report.prices.len(), 1);
        assert_eq!(report.prices[0].market, "Mumbai APMC");
        assert_eq!(report.prices[0].price, 12.50);
    }

    #[tokio::test]
    async fn unknown_crop_yields_empty_demo_list() {
        let report = offline_gateway().prices("durian", "all").await;
        assert!(report.prices.is_empty());
        assert_eq!(report.source, DEMO_SOURCE);
    }

    #[test]
    fn trends_cover_requested_period_oldest_first() {
        let trends = offline_gateway().price_trends("tomato", 7);
        assert_eq!(trends.trends.len(), 7);
        assert_eq!(trends.period, "7 days");
        // Oldest first.
        assert!(trends.trends[0].date < trends.trends[6].date);
        for point in &trends.trends {
            assert!((22.5..=26.5).contains(&point.price));
        }
    }

    #[test]
    fn supported_markets_deduplicated() {
        let markets = supported_markets();
        assert_eq!(markets.len(), 5);
        assert!(markets.contains(&"Mumbai APMC"));
    }
}
