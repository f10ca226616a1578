use log::warn;
use serde::{Deserialize, Serialize};

use super::{
    action::ActionKind,
    table::{PolicyRule, PolicyTable},
};
use crate::scanner::{BottleCategory, DetectedBottle};

pub const LOW_FILL_DISCARD_BELOW: f64 = 0.25;
pub const REUSE_REQUIRES_ABOVE: f64 = 0.70;

pub const WINE_DISCARD_DETAIL: &str = "all opened wine is discarded at flight close";
pub const LOW_FILL_DISCARD_DETAIL: &str =
    "under 25% is reported as loss and sent to controlled destruction";
pub const REUSE_TOO_LOW_DETAIL: &str = "reuse requires more than 70% remaining liquid";
pub const HIGH_FILL_REUSE_DETAIL: &str =
    "more than 70% is reused immediately after cleaning the spout and resealing";

pub const POST_FLIGHT_CONTEXT: &str = "post-flight rule";

/// What the crew should do with the bottle in hand. Derived on every scan, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRecommendation {
    pub action: ActionKind,
    pub detail: String,
    pub context_label: String,
}

impl ResolvedRecommendation {
    pub fn instruction(&self) -> &'static str {
        self.action.instruction()
    }
}

/// Resolves a scanned bottle against the active airline's policy.
pub fn resolve(table: &PolicyTable, airline: &str, bottle: &DetectedBottle) -> ResolvedRecommendation {
    resolve_reading(table, airline, bottle.category, bottle.fill_level)
}

/// Guards run in precedence order and return early:
/// wine, low fill, airline table, then the high/low fill correction on the table outcome.
pub fn resolve_reading(
    table: &PolicyTable,
    airline: &str,
    category: BottleCategory,
    fill_level: f64,
) -> ResolvedRecommendation {
    let fill_level = clamp_fill(fill_level);

    if category == BottleCategory::Wine {
        return post_flight(WINE_DISCARD_DETAIL);
    }

    if fill_level < LOW_FILL_DISCARD_BELOW {
        return post_flight(LOW_FILL_DISCARD_DETAIL);
    }

    let policy = table.policy_for(airline);
    let rule = correct_for_fill(policy.rule_for(fill_level), fill_level);

    ResolvedRecommendation {
        action: rule.action,
        detail: rule.detail,
        context_label: format!("{} policy", policy.identifier),
    }
}

fn correct_for_fill(rule: &PolicyRule, fill_level: f64) -> PolicyRule {
    if rule.action == ActionKind::Reuse && fill_level <= REUSE_REQUIRES_ABOVE {
        return PolicyRule::fallback(ActionKind::Replace, REUSE_TOO_LOW_DETAIL);
    }
    if fill_level > REUSE_REQUIRES_ABOVE && rule.action != ActionKind::Discard {
        return PolicyRule::fallback(ActionKind::Reuse, HIGH_FILL_REUSE_DETAIL);
    }
    rule.clone()
}

fn post_flight(detail: &str) -> ResolvedRecommendation {
    ResolvedRecommendation {
        action: ActionKind::Discard,
        detail: detail.to_string(),
        context_label: POST_FLIGHT_CONTEXT.to_string(),
    }
}

fn clamp_fill(fill_level: f64) -> f64 {
    if fill_level.is_nan() {
        warn!("fill level is NaN; treating as empty");
        return 0.0;
    }
    if !(0.0..=1.0).contains(&fill_level) {
        warn!("fill level {fill_level} outside [0, 1]; clamping");
    }
    fill_level.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spirit(table: &PolicyTable, airline: &str, fill: f64) -> ResolvedRecommendation {
        resolve_reading(table, airline, BottleCategory::Spirit, fill)
    }

    #[test]
    fn aeromexico_low_band_replaces() {
        let table = PolicyTable::builtin();
        let rec = spirit(&table, "AeroMexico", 0.30);
        assert_eq!(rec.action, ActionKind::Replace);
        assert_eq!(rec.context_label, "AeroMexico policy");
        assert!(rec.detail.starts_with("Between 25% and 45%"));
    }

    #[test]
    fn aeromexico_high_fill_reuses() {
        let table = PolicyTable::builtin();
        let rec = spirit(&table, "AeroMexico", 0.80);
        assert_eq!(rec.action, ActionKind::Reuse);
        assert_eq!(rec.detail, HIGH_FILL_REUSE_DETAIL);
    }

    #[test]
    fn volaris_mid_band_combines() {
        let table = PolicyTable::builtin();
        assert_eq!(spirit(&table, "Volaris", 0.50).action, ActionKind::Combine);
    }

    #[test]
    fn unknown_carrier_uses_default_table() {
        let table = PolicyTable::builtin();
        let rec = spirit(&table, "unknown-carrier", 0.60);
        assert_eq!(rec.action, ActionKind::Combine);
        assert_eq!(rec.context_label, "AeroMexico policy");
    }

    #[test]
    fn wine_is_discarded_even_when_full() {
        let table = PolicyTable::builtin();
        let rec = resolve_reading(&table, "Interjet", BottleCategory::Wine, 0.90);
        assert_eq!(rec.action, ActionKind::Discard);
        assert_eq!(rec.detail, WINE_DISCARD_DETAIL);
        assert_eq!(rec.context_label, POST_FLIGHT_CONTEXT);
    }

    #[test]
    fn low_fill_is_discarded_before_table() {
        let table = PolicyTable::builtin();
        let rec = spirit(&table, "Volaris", 0.249);
        assert_eq!(rec.action, ActionKind::Discard);
        assert_eq!(rec.detail, LOW_FILL_DISCARD_DETAIL);
        // exactly 25% reaches the table
        assert_eq!(spirit(&table, "Volaris", 0.25).action, ActionKind::Replace);
    }

    #[test]
    fn table_reuse_below_threshold_becomes_replace() {
        let table = PolicyTable::builtin();
        let rec = spirit(&table, "VivaAerobus", 0.70);
        assert_eq!(rec.action, ActionKind::Replace);
        assert_eq!(rec.detail, REUSE_TOO_LOW_DETAIL);
    }

    #[test]
    fn table_discard_survives_high_fill() {
        let mut table_json = serde_json::to_value(PolicyTable::builtin()).unwrap();
        table_json["airlines"]["interjet"]["fallback"]["action"] = "discard".into();
        let table = PolicyTable::from_json(&table_json.to_string()).unwrap();
        let rec = spirit(&table, "Interjet", 0.95);
        assert_eq!(rec.action, ActionKind::Discard);
    }

    #[test]
    fn interjet_combine_band_is_bypassed_above_seventy() {
        let table = PolicyTable::builtin();
        assert_eq!(spirit(&table, "Interjet", 0.72).action, ActionKind::Reuse);
        assert_eq!(spirit(&table, "Interjet", 0.60).action, ActionKind::Combine);
    }

    #[test]
    fn out_of_range_fill_is_clamped() {
        let table = PolicyTable::builtin();
        assert_eq!(spirit(&table, "Volaris", 1.4).action, ActionKind::Reuse);
        assert_eq!(spirit(&table, "Volaris", -0.2).action, ActionKind::Discard);
        assert_eq!(spirit(&table, "Volaris", f64::NAN).action, ActionKind::Discard);
    }
}
