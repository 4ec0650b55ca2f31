use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::RunConfig;
use crate::domain::{Indicator, IndicatorCatalog, IndicatorGroupMeta, OrgUnitId};
use crate::error::Dhis2Error;

const ID_COLUMN: &str = "id";

/// Everything the batch needs, loaded once per run and read-only after.
#[derive(Debug, Clone)]
pub struct MetadataBundle {
    pub org_unit_ids: Vec<OrgUnitId>,
    pub indicator_ids: Vec<String>,
    pub org_units: OrgUnitTable,
    pub catalog: IndicatorCatalog,
}

/// The organisation unit table as read, headers plus rows. Only the `id`
/// column feeds the batch; the rest is kept for reporting.
#[derive(Debug, Clone, Default)]
pub struct OrgUnitTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct IndicatorDocument {
    #[serde(rename = "indicatorGroups")]
    indicator_groups: Vec<IndicatorGroupDoc>,
}

#[derive(Debug, Deserialize)]
struct IndicatorGroupDoc {
    name: String,
    indicators: Vec<IndicatorDoc>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct IndicatorDoc {
    id: String,
    name: String,
    #[serde(default)]
    numerator: Option<String>,
    #[serde(default)]
    denominator: Option<String>,
}

pub fn load_data(config: &RunConfig) -> Result<MetadataBundle, Dhis2Error> {
    let (org_unit_ids, org_units) = load_org_units(&config.org_units_path())?;
    let catalog = load_catalog(&config.indicators_dir())?;
    let indicator_ids = catalog.indicator_ids();

    debug!(
        org_units = org_unit_ids.len(),
        indicators = indicator_ids.len(),
        "metadata loaded"
    );

    Ok(MetadataBundle {
        org_unit_ids,
        indicator_ids,
        org_units,
        catalog,
    })
}

/// Reads the organisation unit table and extracts the `id` column, in file
/// order.
pub fn load_org_units(path: &Utf8Path) -> Result<(Vec<OrgUnitId>, OrgUnitTable), Dhis2Error> {
    let mut reader = csv::Reader::from_path(path.as_std_path())
        .map_err(|_| Dhis2Error::OrgUnitRead(path.to_owned()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|err| Dhis2Error::OrgUnitParse {
            path: path.to_owned(),
            message: err.to_string(),
        })?
        .iter()
        .map(str::to_string)
        .collect();
    let id_index = headers
        .iter()
        .position(|header| header == ID_COLUMN)
        .ok_or_else(|| Dhis2Error::MissingIdColumn {
            path: path.to_owned(),
            column: ID_COLUMN.to_string(),
        })?;

    let mut ids = Vec::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| Dhis2Error::OrgUnitParse {
            path: path.to_owned(),
            message: err.to_string(),
        })?;
        let value = record.get(id_index).ok_or_else(|| Dhis2Error::OrgUnitParse {
            path: path.to_owned(),
            message: format!("row {} is missing the id field", ids.len() + 2),
        })?;
        ids.push(OrgUnitId::new(value));
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok((ids, OrgUnitTable { headers, rows }))
}

/// Flattens every indicator-group document in the directory into a single
/// name-keyed catalog. Documents are visited in path order so duplicate
/// resolution is deterministic.
pub fn load_catalog(dir: &Utf8Path) -> Result<IndicatorCatalog, Dhis2Error> {
    let mut paths = Vec::new();
    let entries = fs::read_dir(dir.as_std_path())
        .map_err(|_| Dhis2Error::IndicatorDirRead(dir.to_owned()))?;
    for entry in entries {
        let entry = entry.map_err(|err| Dhis2Error::Filesystem(err.to_string()))?;
        let path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|path| Dhis2Error::Filesystem(format!("non-utf8 path: {}", path.display())))?;
        if path.extension() == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut catalog = IndicatorCatalog::default();
    for path in &paths {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| Dhis2Error::Filesystem(format!("read {path}: {err}")))?;
        let document: IndicatorDocument =
            serde_json::from_str(&content).map_err(|err| Dhis2Error::CatalogParse {
                path: path.clone(),
                message: err.to_string(),
            })?;

        for group in document.indicator_groups {
            let meta = IndicatorGroupMeta {
                name: group.name,
                extra: group.extra,
            };
            for indicator in group.indicators {
                catalog.insert(
                    indicator.name,
                    Indicator {
                        id: indicator.id,
                        numerator: indicator.numerator,
                        denominator: indicator.denominator,
                        group: meta.clone(),
                    },
                );
            }
        }
        debug!(path = %path, "indicator document loaded");
    }
    Ok(catalog)
}
