use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    pub fn accept_header(self) -> &'static str {
        match self {
            OutputFormat::Csv => "text/csv",
            OutputFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Fetch strategy selector. Only the native HTTP client exists; shelling out
/// to curl is not offered because it would put credentials in a process
/// argument list, visible to other users on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueryMethod {
    Http,
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryMethod::Http => f.write_str("http"),
        }
    }
}

/// Opaque DHIS2 organisation unit identifier (UID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgUnitId(String);

impl OrgUnitId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One indicator flattened out of its group document. Group metadata is kept
/// informationally; nothing downstream consumes it beyond the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,
    #[serde(default)]
    pub numerator: Option<String>,
    #[serde(default)]
    pub denominator: Option<String>,
    pub group: IndicatorGroupMeta,
}

/// All fields of the owning group except its indicator list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorGroupMeta {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Name-keyed indicator catalog. Duplicate names across source documents
/// resolve last-write-wins; the name's first-seen position fixes its place
/// in the id ordering.
#[derive(Debug, Clone, Default)]
pub struct IndicatorCatalog {
    names: Vec<String>,
    entries: HashMap<String, Indicator>,
}

impl IndicatorCatalog {
    pub fn insert(&mut self, name: String, indicator: Indicator) {
        if !self.entries.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.entries.insert(name, indicator);
    }

    pub fn get(&self, name: &str) -> Option<&Indicator> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Indicator)> {
        self.names
            .iter()
            .map(|name| (name.as_str(), &self.entries[name]))
    }

    /// Indicator identifiers in catalog order.
    pub fn indicator_ids(&self) -> Vec<String> {
        self.iter().map(|(_, ind)| ind.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(id: &str) -> Indicator {
        Indicator {
            id: id.to_string(),
            numerator: None,
            denominator: None,
            group: IndicatorGroupMeta {
                name: "Family Planning".to_string(),
                extra: Map::new(),
            },
        }
    }

    #[test]
    fn catalog_duplicate_name_last_write_wins() {
        let mut catalog = IndicatorCatalog::default();
        catalog.insert("CYP".to_string(), indicator("aaa"));
        catalog.insert("IUD insertions".to_string(), indicator("bbb"));
        catalog.insert("CYP".to_string(), indicator("ccc"));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("CYP").unwrap().id, "ccc");
        assert_eq!(catalog.indicator_ids(), vec!["ccc", "bbb"]);
    }
}
