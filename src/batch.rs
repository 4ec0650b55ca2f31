use serde::Serialize;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::dhis2::{AnalyticsClient, FetchOutcome};
use crate::domain::OrgUnitId;
use crate::error::Dhis2Error;
use crate::query::build_analytics_query;
use crate::store::OutputStore;

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Per-run accumulator: one entry per organisation unit, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub units: Vec<UnitOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitOutcome {
    pub org_unit: String,
    pub query: String,
    pub file: Option<String>,
    pub diagnostics: Option<String>,
}

impl BatchReport {
    pub fn saved_files(&self) -> Vec<&str> {
        self.units
            .iter()
            .filter_map(|unit| unit.file.as_deref())
            .collect()
    }

    pub fn failure_count(&self) -> usize {
        self.units
            .iter()
            .filter(|unit| unit.diagnostics.is_some())
            .count()
    }
}

pub struct BatchRunner<'a, C: AnalyticsClient> {
    config: &'a RunConfig,
    client: C,
    store: OutputStore,
}

impl<'a, C: AnalyticsClient> BatchRunner<'a, C> {
    pub fn new(config: &'a RunConfig, client: C, store: OutputStore) -> Self {
        Self {
            config,
            client,
            store,
        }
    }

    /// Runs the whole batch: for every organisation unit, in input order,
    /// build query, fetch, save. A failed fetch still saves whatever body
    /// came back and never stops the remaining units; only a write failure
    /// aborts the run.
    pub fn run(
        &self,
        org_unit_ids: &[OrgUnitId],
        indicator_ids: &[String],
        sink: &dyn ProgressSink,
    ) -> Result<BatchReport, Dhis2Error> {
        let endpoint = self.config.endpoint();
        let total = org_unit_ids.len();
        let a_tenth = total as f64 / 10.0;
        let mut next_tenth = a_tenth;

        sink.event(ProgressEvent {
            message: "Querying API and saving files...".to_string(),
        });

        let mut report = BatchReport::default();
        for (i, org_unit) in org_unit_ids.iter().enumerate() {
            let query =
                build_analytics_query(&endpoint, org_unit, indicator_ids, self.config.format)?;
            debug!(org_unit = %org_unit, "querying analytics");

            let unit = if self.config.dry_run {
                UnitOutcome {
                    org_unit: org_unit.to_string(),
                    query,
                    file: None,
                    diagnostics: None,
                }
            } else {
                let outcome = match self.client.fetch(&query) {
                    Ok(outcome) => outcome,
                    // A per-unit request failure is recorded, not fatal.
                    Err(err) => FetchOutcome {
                        body: Vec::new(),
                        diagnostics: err.to_string(),
                    },
                };

                // Save unconditionally, even an empty failed-fetch body.
                let path = self.store.save(&outcome.body)?;
                UnitOutcome {
                    org_unit: org_unit.to_string(),
                    query,
                    file: Some(path.to_string()),
                    diagnostics: outcome.is_failure().then_some(outcome.diagnostics),
                }
            };
            report.units.push(unit);

            // Progress fires at approximate decile thresholds, not exact ones.
            if i as f64 > next_tenth {
                sink.event(ProgressEvent {
                    message: format!("{}% complete.", i * 100 / total),
                });
                next_tenth += a_tenth;
            }
        }

        sink.event(ProgressEvent {
            message: "Complete.".to_string(),
        });
        info!(
            units = total,
            failures = report.failure_count(),
            "batch finished"
        );
        Ok(report)
    }
}
