//! Digital-object file-version reconciliation
//!
//! Merges newly produced file references into a record's digital
//! object without losing or duplicating anything: new versions win on
//! URI collision, unmatched existing versions survive demoted.

use adit_common::{AditError, Result};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::client::RepositoryClient;
use crate::model::{CatalogRecord, DigitalObject, FileVersion, Instance, ResolvedRef};

/// Merge newly produced file versions with a digital object's existing
/// list.
///
/// The result is unique by file URI: new entries first in input order
/// (later duplicates within the new set replace earlier ones in
/// place), then every existing entry whose URI the new set did not
/// touch, in original order, demoted to unpublished and
/// non-representative.
pub fn merge_file_versions(
    new_versions: Vec<FileVersion>,
    existing: &[FileVersion],
) -> Vec<FileVersion> {
    let mut merged: Vec<FileVersion> = Vec::with_capacity(new_versions.len() + existing.len());
    let mut by_uri: HashMap<String, usize> = HashMap::new();

    for version in new_versions {
        match by_uri.get(&version.file_uri) {
            Some(&slot) => merged[slot] = version,
            None => {
                by_uri.insert(version.file_uri.clone(), merged.len());
                merged.push(version);
            },
        }
    }

    for version in existing {
        if by_uri.contains_key(&version.file_uri) {
            continue;
        }
        let mut demoted = version.clone();
        demoted.publish = false;
        demoted.is_representative = false;
        by_uri.insert(demoted.file_uri.clone(), merged.len());
        merged.push(demoted);
    }

    merged
}

/// The record's single linked digital object.
///
/// Zero links and more than one are both loud failures; a silent no-op
/// on zero would swallow the caller's update, and picking one of many
/// would guess at which object the files belong to.
fn linked_digital_object(record: &CatalogRecord) -> Result<&ResolvedRef<DigitalObject>> {
    let mut links = record.digital_object_links();
    match (links.next(), links.next()) {
        (None, _) => Err(AditError::NoDigitalObject(record.component_id.clone())),
        (Some(link), None) => Ok(link),
        (Some(_), Some(_)) => Err(AditError::MultipleDigitalObjects(
            record.component_id.clone(),
        )),
    }
}

/// Replace the digital object's file versions with the merged set,
/// publish it, and write it back. A rejected write propagates the
/// underlying HTTP error.
pub async fn reconcile_file_versions(
    repo: &RepositoryClient,
    record: &CatalogRecord,
    new_versions: Vec<FileVersion>,
) -> Result<DigitalObject> {
    let link = linked_digital_object(record)?;
    let Some(resolved) = &link.resolved else {
        return Err(AditError::repository(format!(
            "digital object {} was not resolved on fetch",
            link.reference
        )));
    };
    let Some(uri) = resolved.uri.clone() else {
        return Err(AditError::repository(
            "resolved digital object carries no uri",
        ));
    };

    let mut digital_object = resolved.clone();
    digital_object.file_versions = merge_file_versions(new_versions, &resolved.file_versions);
    digital_object.publish = true;

    let outcome = repo
        .post_json(&uri, &serde_json::to_value(&digital_object)?)
        .await?;
    debug!(%uri, response = %outcome, "digital object updated");

    Ok(digital_object)
}

/// Create a minimal digital object for a record and link it.
///
/// Created digital objects are left unpublished. On success the record
/// is re-fetched so the returned copy carries the new instance; the
/// caller must treat it as authoritative and discard any prior copy.
pub async fn create_digital_object(
    repo: &RepositoryClient,
    record: CatalogRecord,
    digital_object_type: Option<&str>,
) -> Result<(String, CatalogRecord)> {
    let mut payload = serde_json::json!({
        "digital_object_id": record.component_id.as_str(),
        "title": record.display_title(),
    });
    if let Some(kind) = digital_object_type {
        payload["digital_object_type"] = Value::String(kind.to_string());
    }

    let path = format!("/repositories/{}/digital_objects", repo.repository_id());
    let outcome = repo.post_for_outcome(&path, &payload).await?;

    if let Some(error) = outcome.get("error") {
        if duplicate_identifier(error) {
            return Err(AditError::DuplicateDigitalObject(record.component_id));
        }
        return Err(AditError::repository(error.to_string()));
    }

    let uri = outcome
        .get("uri")
        .and_then(Value::as_str)
        .ok_or_else(|| AditError::repository(format!("create response carried no uri: {outcome}")))?
        .to_string();
    info!(digital_object = %uri, component_id = %record.component_id, "digital object created");

    let mut record = record;
    record.instances.push(Instance::digital_object_ref(&uri));
    repo.update_record(&record).await?;

    // Fetch again so the returned record includes the new instance.
    let refreshed = repo.find_archival_object(&record.component_id).await?;
    Ok((uri, refreshed))
}

fn duplicate_identifier(error: &Value) -> bool {
    error
        .get("digital_object_id")
        .and_then(Value::as_array)
        .is_some_and(|messages| {
            messages
                .iter()
                .any(|message| message.as_str() == Some("Must be unique"))
        })
}
