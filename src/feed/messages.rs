//! QR scan records and the WebSocket messages that carry them.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body for `POST /api/qr-data/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewQrScan {
    pub station_id: String,
    pub flight_number: String,
    pub customer_name: String,
    pub drawer_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrolleySummary {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub airline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QrScanRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub station_id: String,
    #[serde(default)]
    pub flight_number: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub drawer_id: String,
    #[serde(default)]
    pub trolley_ids: Vec<i64>,
    #[serde(default)]
    pub trolleys: Vec<TrolleySummary>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl QrScanRecord {
    /// Trolleys this scan refers to. Older servers leave `trolley_ids` empty and
    /// put the trolley in `drawer_id` or in the nested `trolleys` list.
    pub fn resolved_trolley_ids(&self) -> Vec<i64> {
        if !self.trolley_ids.is_empty() {
            return self.trolley_ids.clone();
        }
        if let Some(id) = leading_integer(&self.drawer_id) {
            return vec![id];
        }
        self.trolleys.iter().map(|t| t.id).collect()
    }
}

/// Integer prefix of a drawer label, so "12A" still names trolley 12.
fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let sign_len = usize::from(raw.starts_with(['-', '+']));
    let digits = raw[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    raw[..sign_len + digits].parse().ok()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany {
    Many(Vec<QrScanRecord>),
    One(Box<QrScanRecord>),
}

impl OneOrMany {
    pub fn first(&self) -> Option<&QrScanRecord> {
        match self {
            OneOrMany::Many(records) => records.first(),
            OneOrMany::One(record) => Some(record),
        }
    }
}

/// Server-pushed messages, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    QrDataCreated {
        data: QrScanRecord,
    },
    LatestQr {
        data: OneOrMany,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    ConnectionStatus {
        #[serde(default)]
        message: Option<String>,
    },
}

impl FeedMessage {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("unrecognised feed message")
    }
}

/// Client-to-server requests, tagged by `action`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    GetLatest,
}

impl ClientCommand {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to encode client command")
    }
}

/// Scans seen on the live feed, newest first.
#[derive(Debug, Clone, Default)]
pub struct ScanLog {
    records: Vec<QrScanRecord>,
    total_count: usize,
    last_update: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl ScanLog {
    pub fn apply(&mut self, message: FeedMessage, received_at: DateTime<Utc>) {
        match message {
            FeedMessage::QrDataCreated { data } => {
                self.records.insert(0, data);
                self.total_count += 1;
                self.last_update = Some(received_at);
            }
            FeedMessage::LatestQr { data } => {
                if let Some(latest) = data.first() {
                    self.records = vec![latest.clone()];
                    self.total_count = 1;
                    self.last_update = Some(received_at);
                }
            }
            FeedMessage::Error { message } => {
                self.last_error = Some(message.unwrap_or_else(|| "unknown server error".into()));
            }
            FeedMessage::ConnectionStatus { .. } => {}
        }
    }

    pub fn latest(&self) -> Option<&QrScanRecord> {
        self.records.first()
    }

    pub fn records(&self) -> &[QrScanRecord] {
        &self.records
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
