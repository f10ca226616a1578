use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BottleCategory {
    Spirit,
    Wine,
}

impl BottleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BottleCategory::Spirit => "spirit",
            BottleCategory::Wine => "wine",
        }
    }
}

/// Static description of a product the scanner can recognise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BottleTemplate {
    pub product_id: &'static str,
    pub label: &'static str,
    pub sku: &'static str,
    pub origin_region: &'static str,
    /// Expected cabin temperature in °C
    pub base_temperature: f64,
    pub category: BottleCategory,
}

pub const BOTTLE_CATALOG: [BottleTemplate; 5] = [
    BottleTemplate {
        product_id: "tequila",
        label: "Tequila Añejo Reserva",
        sku: "TEQ-ANJ-750",
        origin_region: "Jalisco, MX",
        base_temperature: 20.0,
        category: BottleCategory::Spirit,
    },
    BottleTemplate {
        product_id: "whisky",
        label: "Whisky Highland 12",
        sku: "WHI-H12-700",
        origin_region: "Speyside, UK",
        base_temperature: 18.0,
        category: BottleCategory::Spirit,
    },
    BottleTemplate {
        product_id: "vodka",
        label: "Vodka Ártico",
        sku: "VDK-ARC-1000",
        origin_region: "Reykjavík, IS",
        base_temperature: 16.0,
        category: BottleCategory::Spirit,
    },
    BottleTemplate {
        product_id: "mezcal",
        label: "Mezcal Espadín Selecto",
        sku: "MEZ-ESP-750",
        origin_region: "Oaxaca, MX",
        base_temperature: 22.0,
        category: BottleCategory::Spirit,
    },
    BottleTemplate {
        product_id: "wine",
        label: "Vino Tinto Reserva",
        sku: "VIN-ROB-750",
        origin_region: "Valle de Guadalupe, MX",
        base_temperature: 18.0,
        category: BottleCategory::Wine,
    },
];

pub fn find_template(product_id: &str) -> Option<&'static BottleTemplate> {
    BOTTLE_CATALOG.iter().find(|t| t.product_id == product_id)
}
