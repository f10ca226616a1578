//! Required trolley contents as served by `GET /api/trolleys/{id}/required-contents/`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrolleyProduct {
    pub product_id: i64,
    pub product_name: String,
    pub sku: String,
    #[serde(default)]
    pub category: String,
    pub required_quantity: u32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentsByLevel {
    pub level_number: u8,
    #[serde(default)]
    pub level_display: String,
    #[serde(default)]
    pub products: Vec<TrolleyProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentsByDrawer {
    pub drawer_id: String,
    #[serde(default)]
    pub drawer_level: String,
    #[serde(default)]
    pub products: Vec<TrolleyProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrolleySpecification {
    pub spec_id: String,
    pub spec_name: String,
    #[serde(default)]
    pub spec_description: String,
    #[serde(default)]
    pub total_items_count: u32,
    #[serde(default)]
    pub total_quantity: u32,
    #[serde(default)]
    pub by_level: Vec<ContentsByLevel>,
    #[serde(default)]
    pub by_drawer: Vec<ContentsByDrawer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrolleyRequiredContents {
    pub trolley_id: i64,
    pub trolley_name: String,
    pub airline: String,
    #[serde(default)]
    pub total_specs: u32,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_quantity: u32,
    #[serde(default)]
    pub specifications: Vec<TrolleySpecification>,
}

impl TrolleyRequiredContents {
    /// Products for one level, across every specification on the trolley.
    pub fn products_for_level(&self, level_number: u8) -> Vec<&TrolleyProduct> {
        self.specifications
            .iter()
            .filter_map(|spec| spec.by_level.iter().find(|l| l.level_number == level_number))
            .flat_map(|level| level.products.iter())
            .collect()
    }

    pub fn products_for_drawer(&self, drawer_id: &str) -> Vec<&TrolleyProduct> {
        self.specifications
            .iter()
            .filter_map(|spec| spec.by_drawer.iter().find(|d| d.drawer_id == drawer_id))
            .flat_map(|drawer| drawer.products.iter())
            .collect()
    }

    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    pub fn total_quantity(&self) -> u32 {
        self.total_quantity
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::REQUIRED_CONTENTS;
    use super::*;

    #[test]
    fn level_products_span_specifications() {
        let contents: TrolleyRequiredContents = serde_json::from_str(REQUIRED_CONTENTS).unwrap();
        let names: Vec<_> = contents
            .products_for_level(1)
            .iter()
            .map(|p| p.product_name.as_str())
            .collect();
        assert_eq!(names, ["Cola", "Water", "Chips"]);
        assert!(contents.products_for_level(2).is_empty());
        assert!(contents.products_for_level(3).is_empty());
    }

    #[test]
    fn drawer_products_and_totals() {
        let contents: TrolleyRequiredContents = serde_json::from_str(REQUIRED_CONTENTS).unwrap();
        assert_eq!(contents.products_for_drawer("D1").len(), 1);
        assert!(contents.products_for_drawer("D9").is_empty());
        assert_eq!(contents.total_items(), 3);
        assert_eq!(contents.total_quantity(), 30);
    }
}
