use std::path::PathBuf;
use std::time::Duration;

use log::warn;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws/qr-data/";
pub const DEFAULT_AIRLINE_KEY: &str = "aeromexico";
pub const DEFAULT_SCAN_DELAY_MS: u64 = 900;

/// Runtime settings for the operator console core.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// REST base, without the `/api` prefix.
    pub api_base: String,
    pub ws_url: String,

    /// Policy key used when the selected airline has no table of its own
    pub default_airline: String,

    /// Debounce between pressing "scan" and the bottle reading appearing
    pub scan_delay: Duration,

    /// Where the operation selection file lives
    pub data_dir: PathBuf,

    /// Optional JSON policy table replacing the built-in one
    pub policy_file: Option<PathBuf>,

    /// Fixed scanner seed for reproducible demo runs
    pub scan_seed: Option<u64>,

    pub debug: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            ws_url: DEFAULT_WS_URL.into(),
            default_airline: DEFAULT_AIRLINE_KEY.into(),
            scan_delay: Duration::from_millis(DEFAULT_SCAN_DELAY_MS),
            data_dir: PathBuf::from("."),
            policy_file: None,
            scan_seed: None,
            debug: false,
        }
    }
}

impl GateConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let scan_delay = match non_empty("GATE_SCAN_DELAY_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    warn!("GATE_SCAN_DELAY_MS={raw} is not a number of milliseconds; using default");
                    defaults.scan_delay
                }
            },
            None => defaults.scan_delay,
        };

        let scan_seed = non_empty("GATE_SEED").and_then(|raw| match raw.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warn!("GATE_SEED={raw} is not an unsigned integer; scans will be random");
                None
            }
        });

        let debug = non_empty("GATE_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.debug);

        Self {
            api_base: non_empty("GATE_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            ws_url: non_empty("GATE_WS_URL").unwrap_or(defaults.ws_url),
            default_airline: non_empty("GATE_DEFAULT_AIRLINE")
                .map(|key| crate::policy::normalize_airline(&key))
                .unwrap_or(defaults.default_airline),
            scan_delay,
            data_dir: non_empty("GATE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            policy_file: non_empty("GATE_POLICY_FILE").map(PathBuf::from),
            scan_seed,
            debug,
        }
    }
}
