pub mod config;
pub mod feed;
pub mod loading;
pub mod operation;
pub mod policy;
pub mod scanner;
mod utils;

use std::fs;

use anyhow::{Context, Result};
use log::info;

use config::GateConfig;
use feed::ApiEndpoints;
use operation::{OperationInfo, OperationStore, OPERATION_FILE_NAME};
use policy::{PolicyTable, ResolvedRecommendation};
use scanner::{BottleScanner, ScanController};

/// Everything the operator console needs for one station.
pub struct GateApp {
    config: GateConfig,
    policies: PolicyTable,
    operation: OperationStore,
    scanner: ScanController,
}

impl GateApp {
    pub fn new(config: GateConfig) -> Result<Self> {
        let policies = load_policies(&config)?;

        let operation = OperationStore::open(config.data_dir.join(OPERATION_FILE_NAME));

        let bottle_scanner = match config.scan_seed {
            Some(seed) => BottleScanner::seeded(seed),
            None => BottleScanner::from_entropy(),
        };
        let scanner = ScanController::new(bottle_scanner, config.scan_delay);

        Ok(Self {
            config,
            policies,
            operation,
            scanner,
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    pub fn endpoints(&self) -> ApiEndpoints {
        ApiEndpoints::from_config(&self.config)
    }

    pub fn scanner(&self) -> &ScanController {
        &self.scanner
    }

    pub fn operation(&self) -> OperationInfo {
        self.operation.current()
    }

    pub fn select_operation(&self, airline: Option<&str>, flight: Option<&str>) -> OperationInfo {
        let info = self
            .operation
            .select(OperationInfo::from_params(airline, flight));
        info!("operation set to {}", info.label());
        info
    }

    pub async fn scan_bottle(&self) -> Result<()> {
        self.scanner.trigger().await
    }

    /// Recommendation for the last scanned bottle under the selected airline.
    pub fn recommendation(&self) -> Option<ResolvedRecommendation> {
        let operation = self.operation.current();
        self.scanner.recommendation(&self.policies, &operation.airline)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.scanner.shutdown().await
    }
}

fn load_policies(config: &GateConfig) -> Result<PolicyTable> {
    let table = match &config.policy_file {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read policy table {}", path.display()))?;
            let table = PolicyTable::from_json(&raw)
                .with_context(|| format!("invalid policy table {}", path.display()))?;
            info!("loaded policy table from {}", path.display());
            table
        }
        None => PolicyTable::builtin(),
    };

    if table.contains(&config.default_airline) {
        table.with_default_airline(&config.default_airline)
    } else {
        log::warn!(
            "default airline '{}' has no policy; keeping '{}'",
            config.default_airline,
            table.default_airline()
        );
        Ok(table)
    }
}

/// Reads `RUST_LOG`, defaulting to info (debug with `GATE_DEBUG`).
pub fn init_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// One debounced scan for the selected (or given) operation, logged to the console.
pub async fn run(airline: Option<String>, flight: Option<String>) -> Result<()> {
    let config = GateConfig::from_env();
    init_logging(config.debug);

    info!("GateEfficiency starting up...");

    let app = GateApp::new(config)?;
    if airline.is_some() || flight.is_some() {
        app.select_operation(airline.as_deref(), flight.as_deref());
    }

    let operation = app.operation();
    let policy = app.policies().policy_for(&operation.airline);
    info!(
        "{}: {} policy ({} default) - {}",
        operation.label(),
        policy.identifier,
        policy.default_action,
        policy.summary
    );

    let mut updates = app.scanner().subscribe();
    app.scan_bottle().await?;
    updates
        .changed()
        .await
        .context("scanner stopped before publishing a reading")?;

    if let (Some(bottle), Some(recommendation)) = (app.scanner().latest(), app.recommendation()) {
        info!(
            "{} [{}] {}% fill, {:.1} °C",
            bottle.label,
            bottle.sku,
            bottle.fill_percent(),
            bottle.temperature
        );
        info!(
            "{} ({}): {}",
            recommendation.action, recommendation.context_label, recommendation.detail
        );
        info!("{}", recommendation.instruction());
    }

    app.shutdown().await
}
