//! Scenario files: the fleets to pit against each other plus optional run settings.
//!
//! JSON by default; `.yaml` / `.yml` files go through serde_yaml. Every ship field
//! except `type` is optional and zero-defaulted, `quantity` defaults to 1.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::rng::mix_seed;
use crate::combat::{Fleet, Ship, ShipConfig, ShipType};
use crate::data::validate::{validate_scenario, ValidationReport};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unable to read scenario '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid scenario json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid scenario yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("scenario rejected: {0}")]
    Invalid(ValidationReport),
    #[error("unsupported scenario format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub fleets: Vec<FleetConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetConfig {
    pub name: String,
    #[serde(default)]
    pub antimatter_splitter: bool,
    #[serde(default)]
    pub ships: Vec<ShipGroup>,
}

/// `quantity` identical ships sharing one blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipGroup {
    #[serde(rename = "type")]
    pub ship_type: ShipType,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(flatten)]
    pub config: ShipConfig,
}

fn default_quantity() -> u32 {
    1
}

impl ScenarioConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&raw),
            Some("json") | None => Self::from_json_str(&raw),
            Some(other) => Err(ScenarioError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn validate(&self) -> ValidationReport {
        validate_scenario(self)
    }

    /// Validates and fails on any error-level diagnostic.
    pub fn validated(self) -> Result<Self, ScenarioError> {
        let report = self.validate();
        if report.has_errors() {
            return Err(ScenarioError::Invalid(report));
        }
        Ok(self)
    }

    /// Fresh fleet graph with every die derived from `seed`.
    pub fn build_fleets(&self, seed: u64) -> Vec<Fleet> {
        self.fleets.iter().map(|fleet| fleet.build(seed)).collect()
    }
}

impl FleetConfig {
    /// Expands ship groups into ships. Each ship rolls its own stream, mixed from
    /// `seed`, the fleet name, the ship type and its ordinal in the fleet.
    pub fn build(&self, seed: u64) -> Fleet {
        let mut ships = Vec::new();
        let mut ordinal = 0u64;
        for group in &self.ships {
            for _ in 0..group.quantity {
                let ship_seed = mix_seed(seed, &[&self.name, group.ship_type.as_str()], ordinal);
                ships.push(Ship::seeded(group.ship_type, group.config, ship_seed));
                ordinal += 1;
            }
        }
        Fleet::new(self.name.clone(), ships, self.antimatter_splitter)
    }

    pub fn ship_count(&self) -> u32 {
        self.ships.iter().map(|group| group.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "iterations": 200,
        "seed": 7,
        "fleets": [
            {
                "name": "Terrans",
                "antimatter_splitter": true,
                "ships": [
                    { "type": "Cruiser", "quantity": 2, "hull": 1, "initiative": 2,
                      "cannons": { "ion": 1 } },
                    { "type": "Dreadnaught", "cannons": { "antimatter": 1 } }
                ]
            },
            {
                "name": "Ancients",
                "ships": [ { "type": "Ancient", "hull": 1, "computers": 1, "cannons": { "ion": 2 } } ]
            }
        ]
    }"#;

    #[test]
    fn json_scenario_defaults_missing_fields() {
        let scenario = ScenarioConfig::from_json_str(JSON).expect("sample scenario parses");
        assert_eq!(scenario.iterations, Some(200));
        assert_eq!(scenario.fleets.len(), 2);
        let terrans = &scenario.fleets[0];
        assert!(terrans.antimatter_splitter);
        assert_eq!(terrans.ship_count(), 3);
        assert_eq!(terrans.ships[1].quantity, 1);
        assert_eq!(terrans.ships[1].config.hull, 0);
        assert_eq!(terrans.ships[1].config.cannons.antimatter, 1);
        assert!(!scenario.fleets[1].antimatter_splitter);
    }

    #[test]
    fn yaml_scenario_matches_json_shape() {
        let yaml = "
fleets:
  - name: Red
    ships:
      - type: Interceptor
        quantity: 3
        cannons:
          plasma: 1
  - name: Guardians
    ships:
      - type: GCDS
        hull: 7
";
        let scenario = ScenarioConfig::from_yaml_str(yaml).expect("yaml scenario parses");
        assert_eq!(scenario.iterations, None);
        assert_eq!(scenario.fleets[0].ship_count(), 3);
        assert_eq!(scenario.fleets[1].ships[0].ship_type, ShipType::Gcds);
        assert_eq!(scenario.fleets[1].ships[0].config.hull, 7);
    }

    #[test]
    fn unknown_ship_type_is_rejected() {
        let raw = r#"{ "fleets": [ { "name": "x", "ships": [ { "type": "Frigate" } ] } ] }"#;
        assert!(matches!(
            ScenarioConfig::from_json_str(raw),
            Err(ScenarioError::Json(_))
        ));
    }

    #[test]
    fn build_expands_quantities_and_picks_planner() {
        let scenario = ScenarioConfig::from_json_str(JSON).expect("sample scenario parses");
        let fleets = scenario.build_fleets(7);
        assert_eq!(fleets[0].ships().len(), 3);
        assert!(fleets[0].antimatter_splitter());
        assert_eq!(fleets[0].ships()[0].hull, 1);
        assert_eq!(fleets[1].damage_type(), crate::combat::DamageType::Npc);
    }

    #[test]
    fn same_seed_rolls_the_same_dice() {
        let scenario = ScenarioConfig::from_json_str(JSON).expect("sample scenario parses");
        let roll_all = |seed| {
            let mut fleets = scenario.build_fleets(seed);
            (0..20)
                .map(|_| fleets[0].shoot_cannons_for_initiative(2).len())
                .collect::<Vec<_>>()
        };
        assert_eq!(roll_all(11), roll_all(11));
    }

    #[test]
    fn invalid_scenario_is_refused() {
        let raw = r#"{ "fleets": [ { "name": "lonely", "ships": [ { "type": "Cruiser" } ] } ] }"#;
        let result = ScenarioConfig::from_json_str(raw).and_then(ScenarioConfig::validated);
        assert!(matches!(result, Err(ScenarioError::Invalid(report)) if report.has_errors()));
    }

    #[test]
    fn unsupported_extension_is_reported() {
        let dir = std::env::temp_dir().join(format!("broadside-scenario-{}", std::process::id()));
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("fleet.toml");
        let _ = fs::write(&path, "fleets = []");
        assert!(matches!(
            ScenarioConfig::load(&path),
            Err(ScenarioError::UnsupportedFormat(ext)) if ext == "toml"
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
