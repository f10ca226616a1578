//! Per-airline bottle policies.
//!
//! Each airline lists threshold rules in ascending order plus a catch-all fallback.
//! Tables loaded from JSON are validated here so the resolver can stay total.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::action::ActionKind;
use crate::config::DEFAULT_AIRLINE_KEY;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    /// Inclusive upper bound on the fill level; `None` marks the fallback rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fill_threshold: Option<f64>,
    pub action: ActionKind,
    pub detail: String,
}

impl PolicyRule {
    pub fn bounded(max_fill_threshold: f64, action: ActionKind, detail: &str) -> Self {
        Self {
            max_fill_threshold: Some(max_fill_threshold),
            action,
            detail: detail.to_string(),
        }
    }

    pub fn fallback(action: ActionKind, detail: &str) -> Self {
        Self {
            max_fill_threshold: None,
            action,
            detail: detail.to_string(),
        }
    }

    pub fn matches(&self, fill_level: f64) -> bool {
        matches!(self.max_fill_threshold, Some(max) if fill_level <= max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AirlinePolicy {
    /// Display code, e.g. "AeroMexico".
    pub identifier: String,
    pub default_action: ActionKind,
    pub summary: String,
    pub rules: Vec<PolicyRule>,
    pub fallback: PolicyRule,
}

impl AirlinePolicy {
    /// First rule whose threshold covers `fill_level`, else the fallback.
    pub fn rule_for(&self, fill_level: f64) -> &PolicyRule {
        self.rules
            .iter()
            .find(|rule| rule.matches(fill_level))
            .unwrap_or(&self.fallback)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyTable {
    default_airline: String,
    airlines: BTreeMap<String, AirlinePolicy>,
}

impl PolicyTable {
    /// Parses and validates a table; keys are normalized the same way lookups are.
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: PolicyTable =
            serde_json::from_str(raw).context("failed to parse policy table")?;
        Self::new(parsed.default_airline, parsed.airlines)
    }

    pub fn new(default_airline: String, airlines: BTreeMap<String, AirlinePolicy>) -> Result<Self> {
        let mut normalized = BTreeMap::new();
        for (key, policy) in airlines {
            if normalized.insert(super::normalize_airline(&key), policy).is_some() {
                bail!("airline '{key}' is listed more than once");
            }
        }
        let table = Self {
            default_airline: super::normalize_airline(&default_airline),
            airlines: normalized,
        };
        validation::validate_table(&table)?;
        Ok(table)
    }

    pub fn builtin() -> Self {
        let mut airlines = BTreeMap::new();

        airlines.insert(
            "aeromexico".to_string(),
            AirlinePolicy {
                identifier: "AeroMexico".into(),
                default_action: ActionKind::Replace,
                summary: "Premier cabin renews bottles at the end of every flight; nothing opened goes up for first service.".into(),
                rules: vec![
                    PolicyRule::bounded(0.45, ActionKind::Replace, "Between 25% and 45% goes down to the ramp and a chilled spare comes up."),
                    PolicyRule::bounded(0.65, ActionKind::Combine, "From 45% to 65% bottles are paired without mixing and logged as a double set in the aft galley."),
                ],
                fallback: PolicyRule::fallback(ActionKind::Reuse, "Over 65% is reused after sanitizing the spout and refitting the shrink seal."),
            },
        );

        airlines.insert(
            "volaris".to_string(),
            AirlinePolicy {
                identifier: "Volaris".into(),
                default_action: ActionKind::Reuse,
                summary: "Point-to-point model favours controlled reuse while the inner seal holds.".into(),
                rules: vec![
                    PolicyRule::bounded(0.40, ActionKind::Reuse, "From 25% to 40% stays on the trolley and is flagged for economy service."),
                    PolicyRule::bounded(0.60, ActionKind::Combine, "From 40% to 60% is paired with another bottle of the same SKU and both fly on the next leg."),
                ],
                fallback: PolicyRule::fallback(ActionKind::Replace, "Over 60% moves to premium stock and is swapped for a new bottle for a uniform look."),
            },
        );

        airlines.insert(
            "vivaaerobus".to_string(),
            AirlinePolicy {
                identifier: "VivaAerobus".into(),
                default_action: ActionKind::Combine,
                summary: "Minimizes waste by pairing compatible bottles without mixing liquids.".into(),
                rules: vec![
                    PolicyRule::bounded(0.50, ActionKind::Combine, "Between 25% and 50% is tagged as a pair and placed next to another half-full bottle."),
                    PolicyRule::bounded(0.70, ActionKind::Reuse, "From 50% to 70% is reused right away on consecutive legs."),
                ],
                fallback: PolicyRule::fallback(ActionKind::Replace, "Over 70% is swapped so first rounds get a full presentation."),
            },
        );

        airlines.insert(
            "interjet".to_string(),
            AirlinePolicy {
                identifier: "Interjet".into(),
                default_action: ActionKind::Discard,
                summary: "Legacy protocols discard early to keep a business feel in the mixed cabin.".into(),
                rules: vec![
                    PolicyRule::bounded(0.35, ActionKind::Discard, "From 25% to 35% is declared a loss and destroyed on the ramp before doors close."),
                    PolicyRule::bounded(0.55, ActionKind::Replace, "From 35% to 55% is swapped for a labelled spare for the next shift."),
                    PolicyRule::bounded(0.75, ActionKind::Combine, "From 55% to 75% is paired without mixing; both go on the same tray for economy service."),
                ],
                fallback: PolicyRule::fallback(ActionKind::Reuse, "Over 75% stays on the current rotation after cleaning the pourer and fitting a new seal."),
            },
        );

        Self {
            default_airline: DEFAULT_AIRLINE_KEY.to_string(),
            airlines,
        }
    }

    /// Policy for a free-text airline name; unknown names get the default airline's policy.
    pub fn policy_for(&self, airline: &str) -> &AirlinePolicy {
        let key = super::normalize_airline(airline);
        self.airlines
            .get(&key)
            .unwrap_or_else(|| self.default_policy())
    }

    pub fn contains(&self, airline: &str) -> bool {
        self.airlines.contains_key(&super::normalize_airline(airline))
    }

    pub fn default_airline(&self) -> &str {
        &self.default_airline
    }

    /// Switches the default airline; the key must already be in the table.
    pub fn with_default_airline(mut self, airline: &str) -> Result<Self> {
        self.default_airline = super::normalize_airline(airline);
        validation::validate_table(&self)?;
        Ok(self)
    }

    pub fn airlines(&self) -> impl Iterator<Item = (&str, &AirlinePolicy)> {
        self.airlines.iter().map(|(key, policy)| (key.as_str(), policy))
    }

    fn default_policy(&self) -> &AirlinePolicy {
        // Validation guarantees the default key is present.
        &self.airlines[&self.default_airline]
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Boundary checks for policy data
pub mod validation {
    use super::{AirlinePolicy, PolicyTable};
    use anyhow::{bail, Result};

    pub fn validate_table(table: &PolicyTable) -> Result<()> {
        if table.airlines.is_empty() {
            bail!("policy table has no airlines");
        }
        if !table.airlines.contains_key(&table.default_airline) {
            bail!(
                "default airline '{}' has no policy in the table",
                table.default_airline
            );
        }
        for (key, policy) in &table.airlines {
            if key.is_empty() {
                bail!("policy table contains an empty airline key");
            }
            validate_policy(key, policy)?;
        }
        Ok(())
    }

    pub fn validate_policy(key: &str, policy: &AirlinePolicy) -> Result<()> {
        if policy.fallback.max_fill_threshold.is_some() {
            bail!("airline '{key}': fallback rule must not carry a threshold");
        }

        let mut previous: Option<f64> = None;
        for (index, rule) in policy.rules.iter().enumerate() {
            let Some(threshold) = rule.max_fill_threshold else {
                bail!("airline '{key}': rule {index} has no threshold; only the fallback may omit it");
            };
            validate_fill_level(threshold)
                .map_err(|err| err.context(format!("airline '{key}': rule {index}")))?;
            if let Some(prev) = previous {
                if threshold <= prev {
                    bail!(
                        "airline '{key}': rule {index} threshold {threshold} must be greater than {prev}"
                    );
                }
            }
            previous = Some(threshold);
        }
        Ok(())
    }

    pub fn validate_fill_level(value: f64) -> Result<()> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            bail!("fill level {value} is outside [0, 1]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        let table = PolicyTable::builtin();
        validation::validate_table(&table).unwrap();
        assert_eq!(table.airlines().count(), 4);
        assert_eq!(table.default_airline(), "aeromexico");
    }

    #[test]
    fn lookup_normalizes_identifier() {
        let table = PolicyTable::builtin();
        assert_eq!(table.policy_for(" Viva Aerobus ").identifier, "VivaAerobus");
        assert_eq!(table.policy_for("INTERJET").identifier, "Interjet");
        assert!(table.contains("Aero Mexico"));
    }

    #[test]
    fn unknown_airline_uses_default_policy() {
        let table = PolicyTable::builtin();
        assert_eq!(table.policy_for("unknown-carrier").identifier, "AeroMexico");
        assert_eq!(table.policy_for("").identifier, "AeroMexico");
    }

    #[test]
    fn rule_for_picks_first_covering_threshold() {
        let table = PolicyTable::builtin();
        let interjet = table.policy_for("interjet");
        assert_eq!(interjet.rule_for(0.35).action, ActionKind::Discard);
        assert_eq!(interjet.rule_for(0.36).action, ActionKind::Replace);
        assert_eq!(interjet.rule_for(0.75).action, ActionKind::Combine);
        assert_eq!(interjet.rule_for(0.76).action, ActionKind::Reuse);
    }

    #[test]
    fn empty_rules_always_fall_back() {
        let policy = AirlinePolicy {
            identifier: "Solo".into(),
            default_action: ActionKind::Combine,
            summary: String::new(),
            rules: Vec::new(),
            fallback: PolicyRule::fallback(ActionKind::Combine, "always pair"),
        };
        assert_eq!(policy.rule_for(0.0).action, ActionKind::Combine);
        assert_eq!(policy.rule_for(1.0).action, ActionKind::Combine);
    }

    #[test]
    fn json_table_is_loaded_and_keys_normalized() {
        let raw = r#"{
            "defaultAirline": "Test Air",
            "airlines": {
                "Test Air": {
                    "identifier": "TestAir",
                    "defaultAction": "combine",
                    "summary": "test",
                    "rules": [
                        { "maxFillThreshold": 0.5, "action": "replace", "detail": "low" }
                    ],
                    "fallback": { "action": "reuse", "detail": "high" }
                }
            }
        }"#;
        let table = PolicyTable::from_json(raw).unwrap();
        assert_eq!(table.default_airline(), "testair");
        assert_eq!(table.policy_for("anything").identifier, "TestAir");
    }

    #[test]
    fn keys_colliding_after_normalization_are_rejected() {
        let raw = r#"{
            "defaultAirline": "aerox",
            "airlines": {
                "Aero X": {
                    "identifier": "First", "defaultAction": "reuse", "summary": "",
                    "rules": [], "fallback": { "action": "reuse", "detail": "" }
                },
                "aerox": {
                    "identifier": "Second", "defaultAction": "discard", "summary": "",
                    "rules": [], "fallback": { "action": "discard", "detail": "" }
                }
            }
        }"#;
        let err = PolicyTable::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("listed more than once"), "{err:#}");
    }

    #[test]
    fn descending_thresholds_are_rejected() {
        let raw = r#"{
            "defaultAirline": "a",
            "airlines": { "a": {
                "identifier": "A", "defaultAction": "reuse", "summary": "",
                "rules": [
                    { "maxFillThreshold": 0.6, "action": "combine", "detail": "" },
                    { "maxFillThreshold": 0.4, "action": "replace", "detail": "" }
                ],
                "fallback": { "action": "reuse", "detail": "" }
            } }
        }"#;
        let err = PolicyTable::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("must be greater"));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut airlines = BTreeMap::new();
        airlines.insert(
            "a".to_string(),
            AirlinePolicy {
                identifier: "A".into(),
                default_action: ActionKind::Reuse,
                summary: String::new(),
                rules: vec![PolicyRule::bounded(1.5, ActionKind::Combine, "")],
                fallback: PolicyRule::fallback(ActionKind::Reuse, ""),
            },
        );
        assert!(PolicyTable::new("a".into(), airlines).is_err());
    }

    #[test]
    fn bounded_fallback_is_rejected() {
        let mut airlines = BTreeMap::new();
        airlines.insert(
            "a".to_string(),
            AirlinePolicy {
                identifier: "A".into(),
                default_action: ActionKind::Reuse,
                summary: String::new(),
                rules: Vec::new(),
                fallback: PolicyRule::bounded(0.9, ActionKind::Reuse, ""),
            },
        );
        assert!(PolicyTable::new("a".into(), airlines).is_err());
    }

    #[test]
    fn missing_default_airline_is_rejected() {
        assert!(PolicyTable::builtin().with_default_airline("nowhere").is_err());
        let table = PolicyTable::builtin().with_default_airline("Volaris").unwrap();
        assert_eq!(table.policy_for("unknown").identifier, "Volaris");
    }

    #[test]
    fn unknown_action_in_data_is_rejected() {
        let raw = r#"{
            "defaultAirline": "a",
            "airlines": { "a": {
                "identifier": "A", "defaultAction": "recycle", "summary": "",
                "rules": [], "fallback": { "action": "reuse", "detail": "" }
            } }
        }"#;
        assert!(PolicyTable::from_json(raw).is_err());
    }
}
