use crate::{
    commands::{Commands, EndpointArgs, ScanArgs, WriteArgs, export_fields, import_fields},
    env::EnvManager,
    error::CliError,
    exit::ExitCode,
};
use clap::Parser;
use connectors::{
    file::jsonl::{JsonlReader, JsonlWriter},
    search::SearchClient,
    solr::client::SolrClient,
};
use engine_core::{error::PagingError, iterator::IterationHandle};
use engine_processing::{
    exporter::{BulkExporter, ExportOptions},
    importer::{BulkImporter, ImportOptions},
    report::TransferReport,
};
use model::search::query::Query;
use std::io::Write;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod exit;
mod output;

#[derive(Parser)]
#[command(
    name = "docshift",
    version,
    about = "Bulk export and import of search index documents as NDJSON"
)]
struct Cli {
    #[arg(long, global = true, help = "Load SOLR_* settings from this KEY=VALUE file")]
    env_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> std::process::ExitCode {
    // Logs go to stderr so stdout stays free for exported documents.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::Success.into(),
        Err(err) => {
            error!("{err}");
            ExitCode::from(&err).into()
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }

    match cli.command {
        Commands::Export {
            scan,
            fields,
            dest,
            fallback_to_offset,
            report,
        } => {
            let client = SolrClient::new(env.solr_settings(scan.url.as_deref(), &scan.endpoint)?)?;
            let query = build_query(&scan).with_fields(export_fields(fields.as_deref()));
            let options = ExportOptions {
                mode: scan.paging,
                fallback_to_offset,
                ..ExportOptions::default()
            };
            info!(url = %client.settings().select_url(), dest = %dest, "Exporting");

            let summary = if dest == "-" {
                export(&client, &query, options, JsonlWriter::new(std::io::stdout().lock()))?
            } else {
                export(&client, &query, options, JsonlWriter::create(&dest)?)?
            };
            output::emit_report(&summary, report.as_deref())?;
        }
        Commands::Import {
            docs,
            dest,
            write,
            endpoint,
            report,
        } => {
            let client = SolrClient::new(env.solr_settings(dest.as_deref(), &endpoint)?)?;
            info!(url = %client.settings().update_url(), docs = %docs, "Importing");

            let reader = JsonlReader::open(&docs)?;
            let summary = importer(&write).import(reader, &client)?;
            output::emit_report(&summary, report.as_deref())?;
        }
        Commands::Copy {
            scan,
            dest,
            write,
            report,
        } => {
            let source = SolrClient::new(env.solr_settings(scan.url.as_deref(), &scan.endpoint)?)?;
            let target = SolrClient::new(env.solr_settings(Some(&dest), &scan.endpoint)?)?;
            info!(
                from = %source.settings().select_url(),
                to = %target.settings().update_url(),
                "Copying"
            );

            let handle = IterationHandle::start(&source, build_query(&scan), scan.paging)?;
            let total_hits = handle.total_hits();
            let mut summary = importer(&write).copy(handle, &target)?;
            summary.mode = Some(scan.paging);
            summary.total_hits = Some(total_hits);
            output::emit_report(&summary, report.as_deref())?;
        }
        Commands::Count {
            url,
            query,
            params,
            endpoint,
        } => {
            println!("{}", count(&env, url.as_deref(), &query, params, &endpoint)?);
        }
    }

    Ok(())
}

fn build_query(scan: &ScanArgs) -> Query {
    scan.params.iter().fold(
        Query::new(scan.query.clone(), scan.rows).with_sort(scan.sort.clone()),
        |query, (key, value)| query.with_param(key.clone(), value.clone()),
    )
}

fn importer(write: &WriteArgs) -> BulkImporter {
    BulkImporter::new(ImportOptions {
        batch_size: write.batch_size,
        strip_version: write.trim,
        fields: import_fields(write.fields.as_deref()),
        ..ImportOptions::default()
    })
}

fn export<C: SearchClient, W: Write>(
    client: &C,
    query: &Query,
    options: ExportOptions,
    mut writer: JsonlWriter<W>,
) -> Result<TransferReport, CliError> {
    let result = BulkExporter::new(options).export(client, query, &mut writer);
    // Flush what was written even when the scan failed part way; the scan error wins.
    match (result, writer.finish()) {
        (Err(err), Err(flush)) => {
            warn!(error = %flush, "Failed to flush export output");
            Err(err.into())
        }
        (result, flushed) => {
            flushed?;
            Ok(result?)
        }
    }
}

fn count(
    env: &EnvManager,
    url: Option<&str>,
    q: &str,
    params: Vec<(String, String)>,
    endpoint: &EndpointArgs,
) -> Result<u64, CliError> {
    let client = SolrClient::new(env.solr_settings(url, endpoint)?)?;
    count_hits(&client, q, params)
}

fn count_hits<C: SearchClient>(
    client: &C,
    q: &str,
    params: Vec<(String, String)>,
) -> Result<u64, CliError> {
    let query = params
        .into_iter()
        .fold(Query::new(q, 1), |query, (key, value)| {
            query.with_param(key, value)
        });
    query.validate().map_err(PagingError::from)?;

    let probe = client.probe(&query).map_err(PagingError::from_client)?;
    let hits = probe
        .num_found
        .ok_or_else(|| PagingError::Protocol("probe response is missing the hit count".into()))?;
    Ok(hits)
}
