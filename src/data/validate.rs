use std::collections::HashSet;
use std::fmt;

use crate::data::scenario::{ScenarioConfig, ShipGroup};

/// Largest hull a blueprint may carry.
pub const MAX_HULL: u32 = 64;
/// Largest count of one weapon class, or of rift cannons, on a single ship.
pub const MAX_WEAPONS_PER_CLASS: u32 = 16;
/// Largest per-round regeneration.
pub const MAX_HEAL: u32 = 64;
/// Largest number of ships a single group may expand into.
pub const MAX_QUANTITY: u32 = 64;
/// Computers and shields must stay within this many points of zero.
pub const MAX_MODIFIER: i32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for diag in &self.diagnostics {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{diag}")?;
            first = false;
        }
        Ok(())
    }
}

/// Checks what the combat core takes on trust: fleet count, names, iteration
/// count and the range of every blueprint stat.
pub fn validate_scenario(scenario: &ScenarioConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if scenario.fleets.len() < 2 {
        report.push(
            ValidationSeverity::Error,
            "fleets",
            format!(
                "a gauntlet needs at least 2 fleets, found {}",
                scenario.fleets.len()
            ),
        );
    }
    if scenario.iterations == Some(0) {
        report.push(
            ValidationSeverity::Error,
            "iterations",
            "iteration count must be at least 1",
        );
    }

    let mut seen_names = HashSet::new();
    for (index, fleet) in scenario.fleets.iter().enumerate() {
        let context = format!("fleets[{index}]");
        if fleet.name.trim().is_empty() {
            report.push(ValidationSeverity::Error, &context, "fleet name is empty");
        } else if !seen_names.insert(fleet.name.as_str()) {
            report.push(
                ValidationSeverity::Info,
                &context,
                format!("duplicate fleet name '{}' merges its results", fleet.name),
            );
        }

        if fleet.ships.iter().all(|group| group.quantity == 0) {
            report.push(
                ValidationSeverity::Warning,
                &context,
                "fleet has no ships and loses its first bout",
            );
        }

        for (group_index, group) in fleet.ships.iter().enumerate() {
            let group_context = format!("{context}.ships[{group_index}]");
            if group.quantity == 0 {
                report.push(
                    ValidationSeverity::Warning,
                    &group_context,
                    "quantity 0 adds no ships",
                );
            }
            check_blueprint(&mut report, &group_context, group);
        }
    }

    report
}

/// Rejects stats the combat core would overflow on or that would expand into
/// unbounded work.
fn check_blueprint(report: &mut ValidationReport, context: &str, group: &ShipGroup) {
    let config = &group.config;
    let mut limit = |field: &str, value: u32, max: u32| {
        if value > max {
            report.push(
                ValidationSeverity::Error,
                context,
                format!("{field} {value} exceeds {max}"),
            );
        }
    };
    limit("quantity", group.quantity, MAX_QUANTITY);
    limit("hull", config.hull, MAX_HULL);
    limit("heal", config.heal, MAX_HEAL);
    limit("rift", config.rift, MAX_WEAPONS_PER_CLASS);
    for (prefix, loadout) in [("cannons", &config.cannons), ("missiles", &config.missiles)] {
        for (weapon, count) in loadout.counts() {
            limit(
                &format!("{prefix}.{}", weapon.as_str()),
                count,
                MAX_WEAPONS_PER_CLASS,
            );
        }
    }

    for (field, value) in [("computers", config.computers), ("shields", config.shields)] {
        if value.unsigned_abs() > MAX_MODIFIER.unsigned_abs() {
            report.push(
                ValidationSeverity::Error,
                context,
                format!("{field} {value} is outside -{MAX_MODIFIER}..={MAX_MODIFIER}"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::scenario::FleetConfig;
    use crate::combat::{ShipConfig, ShipType};

    fn fleet(name: &str, quantity: u32, hull: u32) -> FleetConfig {
        FleetConfig {
            name: name.to_string(),
            antimatter_splitter: false,
            ships: vec![ShipGroup {
                ship_type: ShipType::Cruiser,
                quantity,
                config: ShipConfig {
                    hull,
                    ..ShipConfig::default()
                },
            }],
        }
    }

    #[test]
    fn clean_scenario_has_no_diagnostics() {
        let scenario = ScenarioConfig {
            iterations: Some(10),
            seed: None,
            fleets: vec![fleet("a", 1, 1), fleet("b", 2, 3)],
        };
        assert!(validate_scenario(&scenario).diagnostics.is_empty());
    }

    #[test]
    fn single_fleet_and_zero_iterations_are_errors() {
        let scenario = ScenarioConfig {
            iterations: Some(0),
            seed: None,
            fleets: vec![fleet("a", 1, 1)],
        };
        let report = validate_scenario(&scenario);
        assert!(report.has_errors());
        assert_eq!(report.count(ValidationSeverity::Error), 2);
    }

    #[test]
    fn suspicious_values_only_warn() {
        let scenario = ScenarioConfig {
            iterations: None,
            seed: None,
            fleets: vec![fleet("a", 0, 1), fleet("a", 1, 9)],
        };
        let report = validate_scenario(&scenario);
        assert!(!report.has_errors());
        assert_eq!(report.count(ValidationSeverity::Warning), 2);
        assert_eq!(report.count(ValidationSeverity::Info), 1);
    }

    #[test]
    fn out_of_range_stats_are_errors() {
        let mut huge = fleet("huge", MAX_QUANTITY + 1, u32::MAX);
        let config = &mut huge.ships[0].config;
        config.rift = MAX_WEAPONS_PER_CLASS + 1;
        config.heal = MAX_HEAL + 1;
        config.cannons.antimatter = u32::MAX;
        config.missiles.ion = MAX_WEAPONS_PER_CLASS + 1;
        config.computers = i32::MAX;
        config.shields = i32::MIN;
        let scenario = ScenarioConfig {
            iterations: None,
            seed: None,
            fleets: vec![huge, fleet("b", MAX_QUANTITY, MAX_HULL)],
        };

        let report = validate_scenario(&scenario);
        assert_eq!(report.count(ValidationSeverity::Error), 8);
        assert!(report
            .diagnostics
            .iter()
            .all(|diag| diag.context == "fleets[0].ships[0]"));
        let text = report.to_string();
        assert!(text.contains("hull 4294967295 exceeds 64"));
        assert!(text.contains("cannons.antimatter"));
        assert!(text.contains("shields -2147483648 is outside"));
    }

    #[test]
    fn blank_name_is_an_error() {
        let scenario = ScenarioConfig {
            iterations: None,
            seed: None,
            fleets: vec![fleet(" ", 1, 1), fleet("b", 1, 1)],
        };
        let report = validate_scenario(&scenario);
        assert!(report.has_errors());
        assert!(report.to_string().contains("fleets[0]"));
    }
}
