//! Flattened arrangement view of a record's ancestry
//!
//! Derived and read-only; recomputed for every resolved record rather
//! than stored.

use serde::Serialize;

use crate::model::CatalogRecord;

/// One field set per arrangement level above a record, plus the
/// record's own level and titles.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Arrangement {
    pub repository_name: Option<String>,
    pub repository_code: Option<String>,

    pub record_display_string: String,
    pub record_level: String,
    pub record_title: Option<String>,

    pub collection_title: Option<String>,
    pub collection_id: Option<String>,
    pub collection_uri: Option<String>,

    pub series_display_string: Option<String>,
    pub series_id: Option<String>,
    pub series_title: Option<String>,
    pub series_uri: Option<String>,

    pub subseries_display_string: Option<String>,
    pub subseries_id: Option<String>,
    pub subseries_title: Option<String>,
    pub subseries_uri: Option<String>,

    pub file_display_string: Option<String>,
    pub file_id: Option<String>,
    pub file_title: Option<String>,
    pub file_uri: Option<String>,
}

impl Arrangement {
    /// Flatten a record's resolved ancestry into one view.
    ///
    /// Ancestors without resolved data, and levels outside the
    /// collection/series/subseries/file hierarchy, are skipped.
    pub fn derive(record: &CatalogRecord) -> Self {
        let mut arrangement = Self {
            record_display_string: record.display_string.clone(),
            record_level: record.level.clone(),
            record_title: record.title.clone(),
            ..Self::default()
        };

        if let Some(info) = record.repository.as_ref().and_then(|r| r.resolved.as_ref()) {
            arrangement.repository_name = Some(info.name.clone());
            arrangement.repository_code = Some(info.repo_code.clone());
        }

        for ancestor in &record.ancestors {
            let Some(detail) = &ancestor.resolved else {
                continue;
            };
            match ancestor.level.as_str() {
                "collection" => {
                    arrangement.collection_title = detail.title.clone();
                    arrangement.collection_id = detail.id_0.clone();
                    arrangement.collection_uri = Some(ancestor.reference.clone());
                },
                "series" => {
                    arrangement.series_display_string = detail.display_string.clone();
                    arrangement.series_id = detail.component_id.clone();
                    arrangement.series_title = detail.title.clone();
                    arrangement.series_uri = Some(ancestor.reference.clone());
                },
                "subseries" => {
                    arrangement.subseries_display_string = detail.display_string.clone();
                    arrangement.subseries_id = detail.component_id.clone();
                    arrangement.subseries_title = detail.title.clone();
                    arrangement.subseries_uri = Some(ancestor.reference.clone());
                },
                "file" => {
                    arrangement.file_display_string = detail.display_string.clone();
                    arrangement.file_id = detail.component_id.clone();
                    arrangement.file_title = detail.title.clone();
                    arrangement.file_uri = Some(ancestor.reference.clone());
                },
                _ => {},
            }
        }

        arrangement
    }
}
