pub mod scenario;
pub mod validate;

pub use scenario::{FleetConfig, ScenarioConfig, ScenarioError, ShipGroup};
pub use validate::{
    validate_scenario, ValidationDiagnostic, ValidationReport, ValidationSeverity,
};
