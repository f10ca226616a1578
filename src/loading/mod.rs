pub mod board;

pub use board::{LoadItem, LoadingBoard, LoadingProgress, Placement, RejectReason, SlotStatus, TrolleySlot};
