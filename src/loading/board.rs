use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::feed::TrolleyRequiredContents;

pub const DEFAULT_SLOT_COUNT: usize = 12;
const SLOTS_PER_ROW: usize = 3;
/// Rows are lettered A..Z.
pub const MAX_SLOT_COUNT: usize = 26 * SLOTS_PER_ROW;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Empty,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrolleySlot {
    pub id: u32,
    /// Grid label: row letter plus column, e.g. "B3"
    pub position: String,
    pub status: SlotStatus,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub placed_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadItem {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub target_slot: u32,
    pub quantity: u32,
    pub placed: u32,
}

impl LoadItem {
    pub fn new(product_id: &str, name: &str, category: &str, target_slot: u32, quantity: u32) -> Self {
        Self {
            product_id: product_id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            target_slot,
            quantity,
            placed: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.placed >= self.quantity
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    UnknownSlot,
    /// Every product has been loaded.
    BoardComplete,
    /// The slot already holds a different product.
    SlotOccupied,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum Placement {
    Placed {
        slot_id: u32,
        correct: bool,
        product_completed: bool,
    },
    Rejected {
        reason: RejectReason,
    },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadingProgress {
    pub completed_products: usize,
    pub total_products: usize,
    pub correct_slots: usize,
    pub incorrect_slots: usize,
    pub percent: f64,
}

/// Compartment grid for one trolley level, filled one product at a time.
#[derive(Debug, Clone)]
pub struct LoadingBoard {
    slots: Vec<TrolleySlot>,
    items: Vec<LoadItem>,
    current: usize,
    initial_items: Vec<LoadItem>,
}

impl LoadingBoard {
    pub fn new(items: Vec<LoadItem>) -> Result<Self> {
        for item in &items {
            let slot = item.target_slot as usize;
            if slot == 0 || slot > MAX_SLOT_COUNT {
                bail!(
                    "product '{}' targets slot {slot}; slots run 1..={MAX_SLOT_COUNT}",
                    item.product_id
                );
            }
        }

        let slot_count = items
            .iter()
            .map(|item| item.target_slot as usize)
            .max()
            .unwrap_or(0)
            .max(DEFAULT_SLOT_COUNT);
        Ok(Self::with_slots(items, slot_count))
    }

    /// Queue for one level of the trolley; products go to slots in listed order.
    pub fn from_contents(contents: &TrolleyRequiredContents, level_number: u8) -> Result<Self> {
        let items = contents
            .products_for_level(level_number)
            .into_iter()
            .enumerate()
            .map(|(index, product)| {
                LoadItem::new(
                    &product.product_id.to_string(),
                    &product.product_name,
                    &product.category,
                    index as u32 + 1,
                    product.required_quantity,
                )
            })
            .collect();
        Self::new(items)
    }

    pub fn demo() -> Self {
        let items = DEMO_ITEMS
            .iter()
            .enumerate()
            .map(|(index, (id, name, category, quantity))| {
                LoadItem::new(id, name, category, index as u32 + 1, *quantity)
            })
            .collect();
        Self::with_slots(items, DEFAULT_SLOT_COUNT)
    }

    fn with_slots(items: Vec<LoadItem>, slot_count: usize) -> Self {
        let mut board = Self {
            slots: empty_slots(slot_count),
            items: items.clone(),
            current: 0,
            initial_items: items,
        };
        board.skip_completed();
        board
    }

    /// Moves past products that need no more placements, including zero-quantity ones.
    fn skip_completed(&mut self) {
        while self.items.get(self.current).is_some_and(LoadItem::is_complete) {
            self.current += 1;
        }
    }

    pub fn slots(&self) -> &[TrolleySlot] {
        &self.slots
    }

    pub fn items(&self) -> &[LoadItem] {
        &self.items
    }

    /// Product the operator is holding, `None` once everything is loaded.
    pub fn current_item(&self) -> Option<&LoadItem> {
        self.items.get(self.current)
    }

    pub fn place(&mut self, slot_id: u32) -> Placement {
        let Some(item) = self.items.get(self.current) else {
            return Placement::Rejected {
                reason: RejectReason::BoardComplete,
            };
        };
        let Some(slot) = self.slots.iter_mut().find(|s| s.id == slot_id) else {
            return Placement::Rejected {
                reason: RejectReason::UnknownSlot,
            };
        };

        let correct = match slot.status {
            SlotStatus::Empty => {
                let correct = item.target_slot == slot_id;
                slot.status = if correct {
                    SlotStatus::Correct
                } else {
                    SlotStatus::Incorrect
                };
                slot.product_id = Some(item.product_id.clone());
                slot.product_name = Some(item.name.clone());
                correct
            }
            _ if slot.product_id.as_deref() == Some(item.product_id.as_str()) => {
                slot.status == SlotStatus::Correct
            }
            _ => {
                return Placement::Rejected {
                    reason: RejectReason::SlotOccupied,
                }
            }
        };
        slot.placed_count += 1;

        let item = &mut self.items[self.current];
        item.placed += 1;
        let product_completed = item.is_complete();
        self.skip_completed();

        Placement::Placed {
            slot_id,
            correct,
            product_completed,
        }
    }

    pub fn progress(&self) -> LoadingProgress {
        let completed_products = self.items.iter().filter(|i| i.is_complete()).count();
        let total_products = self.items.len();
        let count_status = |status| self.slots.iter().filter(|s| s.status == status).count();

        LoadingProgress {
            completed_products,
            total_products,
            correct_slots: count_status(SlotStatus::Correct),
            incorrect_slots: count_status(SlotStatus::Incorrect),
            percent: if total_products == 0 {
                0.0
            } else {
                completed_products as f64 / total_products as f64 * 100.0
            },
        }
    }

    pub fn reset(&mut self) {
        self.slots = empty_slots(self.slots.len());
        self.items = self.initial_items.clone();
        self.current = 0;
        self.skip_completed();
    }
}

fn empty_slots(count: usize) -> Vec<TrolleySlot> {
    (0..count)
        .map(|i| TrolleySlot {
            id: i as u32 + 1,
            position: slot_position(i),
            status: SlotStatus::Empty,
            product_id: None,
            product_name: None,
            placed_count: 0,
        })
        .collect()
}

fn slot_position(index: usize) -> String {
    let row = (b'A' + (index / SLOTS_PER_ROW) as u8) as char;
    format!("{row}{}", index % SLOTS_PER_ROW + 1)
}

const DEMO_ITEMS: [(&str, &str, &str, u32); 12] = [
    ("P001", "Cola", "Drinks", 12),
    ("P002", "Mineral Water", "Drinks", 15),
    ("P003", "Orange Juice", "Drinks", 10),
    ("P004", "Coffee", "Hot", 20),
    ("P005", "Tea", "Hot", 15),
    ("P006", "Potato Chips", "Snacks", 18),
    ("P007", "Cookies", "Snacks", 20),
    ("P008", "Chocolate", "Snacks", 15),
    ("P009", "Peanuts", "Snacks", 12),
    ("P010", "Napkins", "Utensils", 30),
    ("P011", "Cups", "Utensils", 25),
    ("P012", "Cutlery", "Utensils", 30),
];
