//! Identifier eligibility classification
//!
//! Determines whether an identifier denotes a collection-level resource
//! or a single archival object, then classifies every candidate record
//! as eligible (resolvable) or ineligible (absent). Classification is
//! partial-failure tolerant: one unresolvable candidate never aborts
//! the rest.

use adit_common::{AditError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::client::RepositoryClient;
use crate::model::CatalogRecord;
use crate::store::ObjectStore;

/// What an identifier turned out to denote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierLevel {
    Resource,
    ArchivalObject,
}

/// Workflow the identifier arrived from. Only the metadata workflow
/// accepts resource-level identifiers; every other workflow treats the
/// identifier as a single archival object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowTarget {
    Metadata,
    Publication,
    Files,
}

impl FromStr for WorkflowTarget {
    type Err = AditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "metadata" => Ok(WorkflowTarget::Metadata),
            "publication" => Ok(WorkflowTarget::Publication),
            "files" => Ok(WorkflowTarget::Files),
            other => Err(AditError::config(format!(
                "unknown workflow target '{other}' (expected metadata, publication, or files)"
            ))),
        }
    }
}

impl fmt::Display for WorkflowTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowTarget::Metadata => write!(f, "metadata"),
            WorkflowTarget::Publication => write!(f, "publication"),
            WorkflowTarget::Files => write!(f, "files"),
        }
    }
}

/// Outcome of classifying one identifier
#[derive(Debug, Serialize)]
pub struct EligibilityReport {
    pub identifier_level: IdentifierLevel,

    /// Component id -> fully resolved record, ordered by id
    pub eligible: BTreeMap<String, CatalogRecord>,

    /// Component ids that did not resolve to a record
    pub ineligible: Vec<String>,
}

impl EligibilityReport {
    fn new(identifier_level: IdentifierLevel) -> Self {
        Self {
            identifier_level,
            eligible: BTreeMap::new(),
            ineligible: Vec::new(),
        }
    }
}

/// Classify an identifier for a workflow.
///
/// For the metadata workflow the identifier may denote a resource: it
/// does when exactly one resource carries it as its public identifier
/// AND no archival object carries it as a component id (an identifier
/// matching both is always treated as the more specific item match).
/// A resource's candidate set is the items published under it in the
/// object store; each is classified individually.
pub async fn classify(
    repo: &RepositoryClient,
    store: &ObjectStore,
    identifier: &str,
    target: WorkflowTarget,
) -> Result<EligibilityReport> {
    if target == WorkflowTarget::Metadata {
        let resource_matches = repo.count_resource_matches(identifier).await?;
        let item_matches = repo.count_archival_object_matches(identifier).await?;
        debug!(identifier, resource_matches, item_matches, "disambiguating identifier");

        if resource_matches == 1 && item_matches == 0 {
            let mut report = EligibilityReport::new(IdentifierLevel::Resource);
            for component_id in store.published_component_ids(identifier).await? {
                classify_component(repo, &component_id, &mut report).await?;
            }
            info!(
                identifier,
                eligible = report.eligible.len(),
                ineligible = report.ineligible.len(),
                "resource identifier classified"
            );
            return Ok(report);
        }
    }

    let mut report = EligibilityReport::new(IdentifierLevel::ArchivalObject);
    classify_component(repo, identifier, &mut report).await?;
    Ok(report)
}

/// Classify one candidate component id, recording absence as
/// ineligibility. Ambiguity (multiple matches) stays fatal.
pub(crate) async fn classify_component(
    repo: &RepositoryClient,
    component_id: &str,
    report: &mut EligibilityReport,
) -> Result<()> {
    match repo.find_archival_object(component_id).await {
        Ok(record) => {
            report.eligible.insert(component_id.to_string(), record);
        },
        Err(AditError::RecordNotFound(_)) => {
            debug!(component_id, "candidate not found, recording as ineligible");
            report.ineligible.push(component_id.to_string());
        },
        Err(other) => return Err(other),
    }
    Ok(())
}
