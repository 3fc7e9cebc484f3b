//! Command handlers for the Content context.
//!
//! Ingesting an asset parses it, fingerprints it and runs the authoring
//! checks. Structural problems that would make the catalog ambiguous are
//! errors; authoring gaps inside a scenario are only logged.

use std::collections::BTreeSet;

use lifeline_core::error::DomainError;
use lifeline_core::ids::{ResourceId, ScenarioId};
use lifeline_dialogue::domain::scenario::Scenario;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::domain::catalog::{ResourceDefinition, ScenarioCatalog};
use crate::domain::validation::{AuthoringIssue, validate_prerequisites, validate_scenario};

/// The scenario asset shipped with the trainer.
pub const BUILTIN_ASSET: &str = include_str!("../../content/scenarios.yaml");

/// On-disk shape of a scenario asset.
#[derive(Debug, Deserialize)]
struct CatalogAsset {
    tutorial: ScenarioId,
    #[serde(default)]
    resources: Vec<ResourceDefinition>,
    scenarios: Vec<Scenario>,
}

/// Result of ingesting an asset.
#[derive(Debug)]
pub struct IngestResult {
    /// The loaded catalog.
    pub catalog: ScenarioCatalog,
    /// Authoring issues found; the catalog is usable regardless.
    pub issues: Vec<AuthoringIssue>,
}

/// Parses and checks a YAML scenario asset.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the YAML is malformed, the catalog is
/// empty, a scenario id is duplicated, or the tutorial is missing.
pub fn ingest_catalog(source: &str) -> Result<IngestResult, DomainError> {
    let asset: CatalogAsset = serde_yaml::from_str(source)
        .map_err(|e| DomainError::Validation(format!("scenario asset is malformed: {e}")))?;

    if asset.scenarios.is_empty() {
        return Err(DomainError::Validation(
            "scenario asset contains no scenarios".to_owned(),
        ));
    }

    let mut seen = BTreeSet::new();
    for scenario in &asset.scenarios {
        if !seen.insert(&scenario.id) {
            return Err(DomainError::Validation(format!(
                "duplicate scenario id: {}",
                scenario.id
            )));
        }
    }
    if !seen.contains(&asset.tutorial) {
        return Err(DomainError::Validation(format!(
            "tutorial scenario '{}' is not in the asset",
            asset.tutorial
        )));
    }

    let resource_ids: Vec<ResourceId> = asset
        .resources
        .iter()
        .map(|resource| resource.id.clone())
        .collect();
    let scenario_ids: Vec<ScenarioId> = asset
        .scenarios
        .iter()
        .map(|scenario| scenario.id.clone())
        .collect();

    let issues: Vec<AuthoringIssue> = asset
        .scenarios
        .iter()
        .flat_map(|scenario| {
            let mut found = validate_scenario(scenario, &resource_ids);
            found.extend(validate_prerequisites(scenario, &scenario_ids));
            found
        })
        .collect();
    for issue in &issues {
        warn!(%issue, "authoring issue in scenario asset");
    }

    let version = fingerprint(source);
    info!(
        version = %version,
        scenarios = asset.scenarios.len(),
        resources = asset.resources.len(),
        "scenario catalog ingested"
    );

    Ok(IngestResult {
        catalog: ScenarioCatalog::new(version, asset.tutorial, asset.scenarios, asset.resources),
        issues,
    })
}

/// Loads the built-in asset.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the embedded asset is broken.
pub fn builtin_catalog() -> Result<ScenarioCatalog, DomainError> {
    ingest_catalog(BUILTIN_ASSET).map(|result| result.catalog)
}

fn fingerprint(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}
