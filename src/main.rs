//! CLI entry point for the greenhouse-gas emissions dashboard.
//!
//! Every subcommand fetches the configured indicator for all configured
//! countries once, then derives the requested view from that data.

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ghg_emissions::{
    aggregator::Aggregator,
    config::{DashboardConfig, INDICATOR_INCLUDING_LULUCF},
    dashboard::{Dashboard, DashboardView},
    fetch::BasicClient,
    filter::{FilterState, parse_period},
    output::{render_table, write_json, write_records},
    stats::coverage,
    views::{ChartKind, ChartView, SortColumn, SortOrder, TableView},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ghg_emissions")]
#[command(about = "Fetch, filter and chart greenhouse gas emissions by country", long_about = None)]
struct Cli {
    /// JSON config file (defaults are used for missing keys)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Request the indicator that includes land use, land-use change and forestry
    #[arg(long, global = true, default_value_t = false)]
    include_lulucf: bool,

    /// Override the configured country codes (comma separated)
    #[arg(long, global = true, value_delimiter = ',')]
    countries: Vec<String>,

    /// Per-request deadline in seconds (0 = none)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every country and write the flat record sequence as CSV
    Fetch {
        /// CSV file to write
        #[arg(short, long, default_value = "emissions.csv")]
        output: String,
    },
    /// Print one page of the sortable emissions table
    Table {
        #[command(flatten)]
        filter: FilterArgs,

        /// Column to sort by (applied like a header click)
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Force the sort direction
        #[arg(long, value_enum)]
        order: Option<OrderArg>,

        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page
        #[arg(long, default_value_t = 10)]
        rows_per_page: usize,
    },
    /// Build a chart view and print or save it as JSON
    Chart {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, value_enum, default_value_t = KindArg::Line)]
        kind: KindArg,

        /// Write the chart JSON here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Log per-country coverage and fetch failures
    Summary,
}

#[derive(Args)]
struct FilterArgs {
    /// First year to include
    #[arg(long, value_parser = parse_period)]
    start: Option<i32>,

    /// Last year to include
    #[arg(long, value_parser = parse_period)]
    end: Option<i32>,

    /// Only include these country codes (comma separated, empty = all)
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,
}

impl FilterArgs {
    fn to_state(&self, config: &DashboardConfig) -> FilterState {
        let mut state = config.default_filter().with_entities(self.select.iter().cloned());
        if let Some(start) = self.start {
            state.set_period_start(start);
        }
        if let Some(end) = self.end {
            state.set_period_end(end);
        }
        state
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Period,
    Value,
}

impl From<SortArg> for SortColumn {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Period => SortColumn::Period,
            SortArg::Value => SortColumn::Value,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Line,
    Heatmap,
    StackedArea,
}

impl From<KindArg> for ChartKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Line => ChartKind::Line,
            KindArg::Heatmap => ChartKind::Heatmap,
            KindArg::StackedArea => ChartKind::StackedArea,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ghg_emissions.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ghg_emissions.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    info!(
        indicator = %config.indicator,
        countries = config.entity_codes.len(),
        timeout_secs = config.request_timeout_secs,
        "Fetching emissions data"
    );

    let client = BasicClient::with_timeout(config.request_timeout())?;
    let aggregator = Aggregator::new(client, config.base_url.clone(), config.indicator.clone());
    let aggregate = aggregator.fetch_all(&config.entity_codes).await;

    match cli.command {
        Commands::Fetch { output } => {
            let dashboard = Dashboard::new(aggregate);
            ensure_data(&dashboard)?;

            write_records(&output, dashboard.records())?;
            info!(path = %output, rows = dashboard.records().len(), "Records written");
        }
        Commands::Table {
            filter,
            sort,
            order,
            page,
            rows_per_page,
        } => {
            let mut dashboard = Dashboard::with_filter(aggregate, filter.to_state(&config));
            ensure_data(&dashboard)?;

            if let Some(sort) = sort {
                dashboard.sort_table(sort.into());
            }
            if let Some(order) = order {
                let column = dashboard.table_state().order_by();
                dashboard.table_state_mut().set_sort(column, order.into());
            }
            dashboard.set_rows_per_page(rows_per_page)?;
            dashboard.set_page(page.saturating_sub(1));

            match dashboard.table_state().render(&dashboard.filtered()) {
                TableView::Page(page) => println!("{}", render_table(&page)),
                TableView::NoData { message } => warn!("{message}"),
            }
        }
        Commands::Chart {
            filter,
            kind,
            output,
        } => {
            let dashboard = Dashboard::with_filter(aggregate, filter.to_state(&config));
            ensure_data(&dashboard)?;

            let view = dashboard.chart(kind.into());
            if let DashboardView::Chart(ChartView::NoData { message }) = &view {
                warn!("{message}");
            }

            match output {
                Some(path) => {
                    write_json(&path, &view)?;
                    info!(path = %path, "Chart view written");
                }
                None => println!("{}", serde_json::to_string_pretty(&view)?),
            }
        }
        Commands::Summary => {
            let dashboard = Dashboard::new(aggregate);

            for failure in dashboard.aggregate().failures() {
                warn!(
                    entity_code = %failure.entity_code,
                    error = %failure.error,
                    "Country fetch failed"
                );
            }
            ensure_data(&dashboard)?;

            for stats in coverage(dashboard.records()) {
                info!(
                    entity_code = %stats.entity_code,
                    entity_name = %stats.entity_name,
                    observations = stats.observations,
                    missing = stats.missing,
                    coverage_pct = stats.coverage_pct(),
                    first_year = ?stats.first_year,
                    last_year = ?stats.last_year,
                    "Coverage"
                );
            }

            info!(
                countries = dashboard.available_entities().len(),
                records = dashboard.records().len(),
                failed = dashboard.aggregate().failures().len(),
                "Summary"
            );
        }
    }

    Ok(())
}

/// Reads the optional config file and applies command-line overrides.
fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };

    if cli.include_lulucf {
        config.indicator = INDICATOR_INCLUDING_LULUCF.to_string();
    }
    if !cli.countries.is_empty() {
        config.entity_codes = cli.countries.clone();
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.request_timeout_secs = timeout_secs;
    }

    config.validate()?;
    Ok(config)
}

/// Turns the dashboard's no-data error state into a command failure.
fn ensure_data(dashboard: &Dashboard) -> Result<()> {
    if let Some(message) = dashboard.error() {
        error!(failed = dashboard.aggregate().failures().len(), "{message}");
        bail!(message);
    }
    Ok(())
}
