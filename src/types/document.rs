use serde::{Deserialize, Serialize};

use super::{ComponentType, DakMetadata, SourceDescriptor};

/// The persisted `dak.json` shape: DAK metadata plus one source array per
/// component type.
///
/// All nine arrays are always emitted, even when empty, so consumers see a
/// predictable schema; on input each array defaults to empty when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DakDocument {
    #[serde(flatten)]
    pub metadata: DakMetadata,

    #[serde(rename = "healthInterventions", default)]
    pub health_interventions: Vec<SourceDescriptor>,
    #[serde(rename = "personas", default)]
    pub personas: Vec<SourceDescriptor>,
    #[serde(rename = "userScenarios", default)]
    pub user_scenarios: Vec<SourceDescriptor>,
    #[serde(rename = "businessProcesses", default)]
    pub business_processes: Vec<SourceDescriptor>,
    #[serde(rename = "dataElements", default)]
    pub data_elements: Vec<SourceDescriptor>,
    #[serde(rename = "decisionLogic", default)]
    pub decision_logic: Vec<SourceDescriptor>,
    #[serde(rename = "indicators", default)]
    pub indicators: Vec<SourceDescriptor>,
    #[serde(rename = "requirements", default)]
    pub requirements: Vec<SourceDescriptor>,
    #[serde(rename = "testScenarios", default)]
    pub test_scenarios: Vec<SourceDescriptor>,
}

impl DakDocument {
    pub fn new(metadata: DakMetadata) -> Self {
        Self {
            metadata,
            ..Default::default()
        }
    }

    pub fn sources(&self, component_type: ComponentType) -> &[SourceDescriptor] {
        match component_type {
            ComponentType::HealthInterventions => &self.health_interventions,
            ComponentType::Personas => &self.personas,
            ComponentType::UserScenarios => &self.user_scenarios,
            ComponentType::BusinessProcesses => &self.business_processes,
            ComponentType::DataElements => &self.data_elements,
            ComponentType::DecisionLogic => &self.decision_logic,
            ComponentType::Indicators => &self.indicators,
            ComponentType::Requirements => &self.requirements,
            ComponentType::TestScenarios => &self.test_scenarios,
        }
    }

    pub fn set_sources(&mut self, component_type: ComponentType, sources: Vec<SourceDescriptor>) {
        let slot = match component_type {
            ComponentType::HealthInterventions => &mut self.health_interventions,
            ComponentType::Personas => &mut self.personas,
            ComponentType::UserScenarios => &mut self.user_scenarios,
            ComponentType::BusinessProcesses => &mut self.business_processes,
            ComponentType::DataElements => &mut self.data_elements,
            ComponentType::DecisionLogic => &mut self.decision_logic,
            ComponentType::Indicators => &mut self.indicators,
            ComponentType::Requirements => &mut self.requirements,
            ComponentType::TestScenarios => &mut self.test_scenarios,
        };
        *slot = sources;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_emits_all_nine_arrays() {
        let document = DakDocument::new(DakMetadata {
            id: "smart.who.int.immunizations".to_string(),
            ..Default::default()
        });
        let value = serde_json::to_value(&document).unwrap();

        for component_type in ComponentType::all() {
            assert_eq!(
                value.get(component_type.property_name()),
                Some(&json!([])),
                "missing array for {component_type}"
            );
        }
        assert_eq!(value.get("id"), Some(&json!("smart.who.int.immunizations")));
    }

    #[test]
    fn test_absent_arrays_default_to_empty() {
        let document: DakDocument =
            serde_json::from_value(json!({"id": "x", "status": "draft"})).unwrap();
        for component_type in ComponentType::all() {
            assert!(document.sources(*component_type).is_empty());
        }
    }

    #[test]
    fn test_set_sources_replaces_one_slot() {
        let mut document = DakDocument::default();
        document.set_sources(
            ComponentType::Personas,
            vec![crate::types::SourceDescriptor::relative_url(
                "fsh/actors/Nurse.fsh",
            )],
        );
        assert_eq!(document.sources(ComponentType::Personas).len(), 1);
        assert!(document.sources(ComponentType::Indicators).is_empty());
    }
}
