use std::io::{self, Write};

use crate::batch::{BatchReport, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Console,
    Json,
}

/// Prints progress lines to stdout as they happen.
pub struct ConsoleOutput;

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        println!("{}", event.message);
    }
}

impl ConsoleOutput {
    pub fn print_report(result: &BatchReport) {
        for unit in &result.units {
            if let Some(diagnostics) = &unit.diagnostics {
                eprintln!("{}: {diagnostics}", unit.org_unit);
            }
        }
        if result.failure_count() > 0 {
            eprintln!(
                "{} of {} units reported fetch diagnostics.",
                result.failure_count(),
                result.units.len()
            );
        }
    }
}

/// Machine-readable surface: progress is suppressed, the report is one JSON
/// document on stdout.
pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(result: &BatchReport) -> io::Result<()> {
        let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}
