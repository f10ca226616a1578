pub mod api;
pub mod contents;
pub mod messages;
pub mod reconnect;

pub use api::{ApiEndpoints, ApiFailure};
pub use contents::{TrolleyProduct, TrolleyRequiredContents};
pub use messages::{ClientCommand, FeedMessage, NewQrScan, QrScanRecord, ScanLog};
pub use reconnect::{connect_with_retry, FeedStatus, ReconnectPolicy};
