use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use dhis2_analytics_fetch::batch::BatchRunner;
use dhis2_analytics_fetch::config::{Credentials, DEFAULT_API_VERSION, DEFAULT_SERVER, RunConfig};
use dhis2_analytics_fetch::dhis2;
use dhis2_analytics_fetch::domain::{OutputFormat, QueryMethod};
use dhis2_analytics_fetch::error::Dhis2Error;
use dhis2_analytics_fetch::metadata;
use dhis2_analytics_fetch::output::{ConsoleOutput, JsonOutput, OutputMode};
use dhis2_analytics_fetch::store::OutputStore;

#[derive(Parser)]
#[command(name = "dhis2-fetch")]
#[command(about = "Pull DHIS2 analytics per organisation unit into timestamped CSV files")]
#[command(version, author)]
struct Cli {
    /// Directory holding organisationUnits/ and indicators/ metadata.
    #[arg(long, default_value = "source_data")]
    data_dir: Utf8PathBuf,

    /// Directory the response files are written into.
    #[arg(long, default_value = "output")]
    output_dir: Utf8PathBuf,

    /// DHIS2 server base URL.
    #[arg(long, default_value = DEFAULT_SERVER)]
    server: String,

    /// Web API version segment of the analytics endpoint.
    #[arg(long, default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// Requested analytics representation.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Fetch strategy for the analytics call.
    #[arg(long, value_enum, default_value_t = QueryMethod::Http)]
    query_method: QueryMethod,

    /// Build the queries without fetching or saving anything.
    #[arg(long)]
    dry_run: bool,

    /// Emit the run report as JSON instead of console progress.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<Dhis2Error>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &Dhis2Error) -> u8 {
    match error {
        Dhis2Error::MissingCredential(_) => 2,
        Dhis2Error::OrgUnitRead(_)
        | Dhis2Error::MissingIdColumn { .. }
        | Dhis2Error::OrgUnitParse { .. }
        | Dhis2Error::IndicatorDirRead(_)
        | Dhis2Error::CatalogParse { .. } => 2,
        Dhis2Error::Persistence { .. } | Dhis2Error::Filesystem(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Console
    };

    let config = RunConfig {
        server: cli.server,
        api_version: cli.api_version,
        format: cli.format,
        query_method: cli.query_method,
        data_dir: cli.data_dir,
        output_dir: cli.output_dir,
        dry_run: cli.dry_run,
    };

    // A metadata failure aborts here, before any unit is processed, and is
    // reported with a non-zero exit. It is never swallowed.
    let bundle = metadata::load_data(&config).into_diagnostic()?;

    let credentials = if config.dry_run {
        Credentials {
            username: String::new(),
            password: String::new(),
        }
    } else {
        Credentials::from_env().into_diagnostic()?
    };

    let client = dhis2::client_for(config.query_method, credentials, config.format)
        .into_diagnostic()?;
    let store = OutputStore::new(config.output_dir.clone(), config.format);
    if !config.dry_run {
        store.ensure_output_dir().into_diagnostic()?;
    }

    let runner = BatchRunner::new(&config, client, store);
    match output_mode {
        OutputMode::Console => {
            let report = runner
                .run(&bundle.org_unit_ids, &bundle.indicator_ids, &ConsoleOutput)
                .into_diagnostic()?;
            ConsoleOutput::print_report(&report);
        }
        OutputMode::Json => {
            let report = runner
                .run(&bundle.org_unit_ids, &bundle.indicator_ids, &JsonOutput)
                .into_diagnostic()?;
            JsonOutput::print_report(&report).into_diagnostic()?;
        }
    }

    Ok(())
}
