use clap::{ArgAction, Args, Subcommand};
use engine_core::paging::PagingMode;
use engine_processing::importer::DEFAULT_BATCH_SIZE;
use model::search::query::MATCH_ALL;

pub const DEFAULT_SORT: &str = "id desc";
pub const DEFAULT_ROWS: usize = 500;

#[derive(Subcommand)]
pub enum Commands {
    /// Export every document matching a query to NDJSON
    Export {
        #[command(flatten)]
        scan: ScanArgs,

        #[arg(long, help = "Whitespace-separated list of fields to export")]
        fields: Option<String>,

        #[arg(
            long,
            default_value = "-",
            help = "Output file, or '-' to write to stdout"
        )]
        dest: String,

        #[arg(
            long,
            help = "Redo the export with offset paging if the server rejects cursor paging"
        )]
        fallback_to_offset: bool,

        #[arg(long, help = "If specified, writes the JSON transfer report to this file")]
        report: Option<String>,
    },
    /// Index the documents of an NDJSON file
    Import {
        #[arg(help = "NDJSON file to import")]
        docs: String,

        #[arg(long, help = "Collection URL to import into (defaults to SOLR_URL)")]
        dest: Option<String>,

        #[command(flatten)]
        write: WriteArgs,

        #[command(flatten)]
        endpoint: EndpointArgs,

        #[arg(long, help = "If specified, writes the JSON transfer report to this file")]
        report: Option<String>,
    },
    /// Copy documents from one collection straight into another
    Copy {
        #[command(flatten)]
        scan: ScanArgs,

        #[arg(long, help = "Collection URL to copy into")]
        dest: String,

        #[command(flatten)]
        write: WriteArgs,

        #[arg(long, help = "If specified, writes the JSON transfer report to this file")]
        report: Option<String>,
    },
    /// Print the number of documents matching a query
    Count {
        #[arg(long, help = "Collection URL (defaults to SOLR_URL)")]
        url: Option<String>,

        #[arg(long, default_value = MATCH_ALL)]
        query: String,

        #[arg(long = "param", value_parser = parse_param, help = "Extra request parameter as key=value (repeatable)")]
        params: Vec<(String, String)>,

        #[command(flatten)]
        endpoint: EndpointArgs,
    },
}

/// Where and how to read from the source collection.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[arg(long, help = "Source collection URL (defaults to SOLR_URL)")]
    pub url: Option<String>,

    #[arg(long, default_value = MATCH_ALL)]
    pub query: String,

    #[arg(long, default_value = DEFAULT_SORT, help = "Sort clause; cursor paging needs it to end on the unique key")]
    pub sort: String,

    #[arg(long, default_value_t = DEFAULT_ROWS, help = "Documents per page")]
    pub rows: usize,

    #[arg(long, default_value_t = PagingMode::Cursor, help = "Paging strategy: cursor or offset")]
    pub paging: PagingMode,

    #[arg(long = "param", value_parser = parse_param, help = "Extra request parameter as key=value (repeatable)")]
    pub params: Vec<(String, String)>,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}

/// How documents are prepared and committed on the way in.
#[derive(Args, Debug, Clone)]
pub struct WriteArgs {
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, help = "Documents per committed batch")]
    pub batch_size: usize,

    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        help = "Strip the _version_ field before indexing"
    )]
    pub trim: bool,

    #[arg(long, help = "Comma-separated list of fields to keep")]
    pub fields: Option<String>,
}

/// Handler paths and timeouts; unset values fall back to the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    #[arg(long, help = "Search handler path (defaults to SOLR_SELECT_PATH or 'select')")]
    pub select_path: Option<String>,

    #[arg(long, help = "Update handler path (defaults to SOLR_UPDATE_PATH or 'update')")]
    pub update_path: Option<String>,

    #[arg(long, help = "Request timeout in seconds (defaults to SOLR_TIMEOUT_SECS or 60)")]
    pub timeout_secs: Option<u64>,
}

pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

/// Export field lists are whitespace-separated.
pub fn export_fields(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Import field lists are comma-separated. `None` keeps every field.
pub fn import_fields(raw: Option<&str>) -> Option<Vec<String>> {
    let fields: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    (!fields.is_empty()).then_some(fields)
}
