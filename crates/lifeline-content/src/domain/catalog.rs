//! The scenario catalog.

use std::sync::Arc;

use lifeline_core::ids::{ResourceId, ScenarioId};
use lifeline_dialogue::domain::scenario::Scenario;
use serde::{Deserialize, Serialize};

/// A referral resource the player can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource identifier, also its display name.
    pub id: ResourceId,
    /// What the resource offers.
    pub description: String,
}

/// Every scenario, in unlock order, plus the referral resources.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    version: String,
    tutorial_id: ScenarioId,
    scenarios: Vec<Arc<Scenario>>,
    resources: Vec<ResourceDefinition>,
}

impl ScenarioCatalog {
    /// Builds a catalog. Callers are expected to have validated the parts;
    /// see `command_handlers::ingest_catalog`.
    #[must_use]
    pub fn new(
        version: String,
        tutorial_id: ScenarioId,
        scenarios: Vec<Scenario>,
        resources: Vec<ResourceDefinition>,
    ) -> Self {
        Self {
            version,
            tutorial_id,
            scenarios: scenarios.into_iter().map(Arc::new).collect(),
            resources,
        }
    }

    /// Content version (SHA-256 of the source asset, hex encoded).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The scenario that is always unlocked.
    #[must_use]
    pub fn tutorial_id(&self) -> &ScenarioId {
        &self.tutorial_id
    }

    /// Scenarios in catalog order.
    #[must_use]
    pub fn scenarios(&self) -> &[Arc<Scenario>] {
        &self.scenarios
    }

    /// Looks up a scenario by id.
    #[must_use]
    pub fn get(&self, id: &ScenarioId) -> Option<Arc<Scenario>> {
        self.scenarios
            .iter()
            .find(|scenario| &scenario.id == id)
            .cloned()
    }

    /// Position of a scenario in catalog order.
    #[must_use]
    pub fn position(&self, id: &ScenarioId) -> Option<usize> {
        self.scenarios.iter().position(|scenario| &scenario.id == id)
    }

    /// The referral resources offered at gated nodes.
    #[must_use]
    pub fn resources(&self) -> &[ResourceDefinition] {
        &self.resources
    }

    /// Whether `id` names a known referral resource.
    #[must_use]
    pub fn is_known_resource(&self, id: &ResourceId) -> bool {
        self.resources.iter().any(|resource| &resource.id == id)
    }
}
