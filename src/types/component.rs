use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{DakError, Result};

/// The nine fixed DAK component categories. The set is closed: every DAK has
/// exactly one slot per variant, and the `dak.json` property mapping below is
/// total by exhaustive match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ComponentType {
    #[serde(rename = "healthInterventions")]
    HealthInterventions,
    #[serde(rename = "personas")]
    Personas,
    #[serde(rename = "userScenarios")]
    UserScenarios,
    #[serde(rename = "businessProcesses")]
    BusinessProcesses,
    #[serde(rename = "dataElements")]
    DataElements,
    #[serde(rename = "decisionLogic")]
    DecisionLogic,
    #[serde(rename = "indicators")]
    Indicators,
    #[serde(rename = "requirements")]
    Requirements,
    #[serde(rename = "testScenarios")]
    TestScenarios,
}

impl ComponentType {
    /// All nine component types, in the canonical DAK ordering.
    pub fn all() -> &'static [ComponentType] {
        &[
            ComponentType::HealthInterventions,
            ComponentType::Personas,
            ComponentType::UserScenarios,
            ComponentType::BusinessProcesses,
            ComponentType::DataElements,
            ComponentType::DecisionLogic,
            ComponentType::Indicators,
            ComponentType::Requirements,
            ComponentType::TestScenarios,
        ]
    }

    /// The `dak.json` property holding this component's source array.
    pub fn property_name(&self) -> &'static str {
        match self {
            ComponentType::HealthInterventions => "healthInterventions",
            ComponentType::Personas => "personas",
            ComponentType::UserScenarios => "userScenarios",
            ComponentType::BusinessProcesses => "businessProcesses",
            ComponentType::DataElements => "dataElements",
            ComponentType::DecisionLogic => "decisionLogic",
            ComponentType::Indicators => "indicators",
            ComponentType::Requirements => "requirements",
            ComponentType::TestScenarios => "testScenarios",
        }
    }

    /// Structural check for one instance of this component's data.
    ///
    /// The base rule for every type is a non-empty string `id`. Individual
    /// types layer stricter requirements on top; personas must carry a
    /// non-empty `responsibilities` array.
    pub fn validate_payload(&self, data: &Value) -> Result<()> {
        let id = data
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty());
        if id.is_none() {
            return Err(DakError::invalid_source(format!(
                "{self} instance is missing a non-empty `id` field"
            )));
        }

        match self {
            ComponentType::Personas => {
                let responsibilities = data
                    .get("responsibilities")
                    .and_then(Value::as_array)
                    .filter(|list| !list.is_empty());
                if responsibilities.is_none() {
                    return Err(DakError::invalid_source(
                        "persona instance requires a non-empty `responsibilities` list",
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.property_name())
    }
}
