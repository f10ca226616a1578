use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// Disposition given to ground crew for an opened bottle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Reuse,
    Combine,
    Replace,
    Discard,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Reuse,
        ActionKind::Combine,
        ActionKind::Replace,
        ActionKind::Discard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Reuse => "reuse",
            ActionKind::Combine => "combine",
            ActionKind::Replace => "replace",
            ActionKind::Discard => "discard",
        }
    }

    /// Hands-on steps shown under the recommendation.
    pub fn instruction(&self) -> &'static str {
        match self {
            ActionKind::Discard => {
                "Drop the bottle in the red bag, report the loss and break the seal before disposal."
            }
            ActionKind::Replace => {
                "Seal the current bottle, take it to the ramp and load the chilled labelled spare for the next service."
            }
            ActionKind::Combine => {
                "Pair the bottle with another half-full one of the same SKU; place them together on the same tray without mixing liquid."
            }
            ActionKind::Reuse => {
                "Clean the spout, fit a new thermal seal and return the bottle to the trolley for the current leg."
            }
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reuse" => Ok(ActionKind::Reuse),
            "combine" => Ok(ActionKind::Combine),
            "replace" => Ok(ActionKind::Replace),
            "discard" => Ok(ActionKind::Discard),
            other => Err(anyhow!("unknown action kind {other}")),
        }
    }
}
