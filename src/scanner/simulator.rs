use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::{Builder, Uuid};

use super::catalog::{BottleCategory, BottleTemplate, BOTTLE_CATALOG};

pub const MIN_SIMULATED_FILL: f64 = 0.15;
pub const MAX_SIMULATED_FILL: f64 = 0.85;
pub const TEMPERATURE_JITTER_C: f64 = 2.0;

/// One scanner reading. Replaced wholesale by the next scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectedBottle {
    pub scan_id: Uuid,
    pub product_id: String,
    pub label: String,
    pub sku: String,
    pub origin_region: String,
    pub base_temperature: f64,
    pub category: BottleCategory,
    /// Fraction of liquid left, in [0, 1]
    pub fill_level: f64,
    pub temperature: f64,
    pub observed_at: DateTime<Utc>,
}

impl DetectedBottle {
    pub fn fill_percent(&self) -> u32 {
        (self.fill_level * 100.0).round() as u32
    }
}

/// Stands in for the trolley camera: draws a random catalog product with jittered readings.
pub struct BottleScanner<R: Rng = StdRng> {
    rng: R,
    catalog: &'static [BottleTemplate],
}

impl BottleScanner<StdRng> {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Same seed, same sequence of products and readings.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> BottleScanner<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            catalog: &BOTTLE_CATALOG,
        }
    }

    pub fn scan(&mut self) -> DetectedBottle {
        self.scan_at(Utc::now())
    }

    pub fn scan_at(&mut self, observed_at: DateTime<Utc>) -> DetectedBottle {
        let template = self.catalog[self.rng.gen_range(0..self.catalog.len())];
        let fill_level = round_to(
            self.rng.gen_range(MIN_SIMULATED_FILL..=MAX_SIMULATED_FILL),
            2,
        );
        let drift = round_to(
            self.rng.gen_range(-TEMPERATURE_JITTER_C..=TEMPERATURE_JITTER_C),
            1,
        );
        let scan_id = Builder::from_random_bytes(self.rng.gen()).into_uuid();

        DetectedBottle {
            scan_id,
            product_id: template.product_id.to_string(),
            label: template.label.to_string(),
            sku: template.sku.to_string(),
            origin_region: template.origin_region.to_string(),
            base_temperature: template.base_temperature,
            category: template.category,
            fill_level,
            temperature: round_to(template.base_temperature + drift, 1),
            observed_at,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
