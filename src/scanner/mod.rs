pub mod catalog;
pub mod controller;
pub mod simulator;

pub use catalog::{BottleCategory, BottleTemplate, BOTTLE_CATALOG};
pub use controller::ScanController;
pub use simulator::{BottleScanner, DetectedBottle};
