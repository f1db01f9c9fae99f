// Terminal front end for the permission metrics pipeline.
//
// A menu loop in the spirit of the web dashboard:
// - Option [1] loads the CSV through the session cache.
// - Options [2]-[7] render one dashboard panel each.
// - Option [8] exports the grouped reports and summary.
// Every pipeline failure is caught here and rendered by kind.
use clap::Parser;
use permit_dashboard::config::Config;
use permit_dashboard::output;
use permit_dashboard::reports::{self, explorer_title};
use permit_dashboard::types::{Dataset, DistrictFilter, MetricKind};
use permit_dashboard::util::format_int;
use permit_dashboard::{logging, CorrelationError, DataLoadError, DatasetCache, OutputError};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};

/// State for one dashboard run: the load cache and the dataset in view.
struct Session {
    config: Config,
    cache: DatasetCache,
    data: Option<Arc<Dataset>>,
}

impl Session {
    fn new(config: Config) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            data: None,
        }
    }

    /// The loaded dataset, or a hint to load first.
    fn data(&self) -> Option<Arc<Dataset>> {
        if self.data.is_none() {
            println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        }
        self.data.clone()
    }
}

/// Read a single line of input after printing `prompt`; `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn heading(title: &str) {
    println!("{}", title);
    println!("{}\n", "-".repeat(title.chars().count()));
}

fn render_load_error(e: &DataLoadError) {
    error!(error = %e, "load failed");
    match e {
        DataLoadError::Io { path, .. } => {
            println!("Could not open '{}'.", path.display());
            println!("Make sure the dataset file exists (see --data / PERMIT_DATA).\n");
        }
        DataLoadError::MissingColumns(cols) => {
            println!("The dataset is missing required column(s):");
            for c in cols {
                println!("  - {}", c);
            }
            println!();
        }
        DataLoadError::MissingValue { .. } | DataLoadError::InvalidValue { .. } => {
            println!("The dataset has a bad value: {}", e);
            println!("No data was loaded; fix the row and load again.\n");
        }
        DataLoadError::Csv { .. } => {
            println!("The file is not valid CSV: {}\n", e);
        }
    }
}

fn render_correlation_error(e: &CorrelationError) {
    match e {
        CorrelationError::InsufficientData { rows } => println!(
            "(matrix left blank: {} row(s) loaded, at least 2 are needed)\n",
            rows
        ),
        CorrelationError::DegenerateInput { column } => println!(
            "(matrix left blank: every row has the same '{}', so correlation is undefined)\n",
            column
        ),
    }
}

fn render_output_error(e: &OutputError) {
    error!(error = %e, "export failed");
    println!("Export failed: {}\n", e);
}

/// Handle option [1]: load the CSV through the session cache.
fn handle_load(session: &mut Session) {
    let path = session.config.data_path.clone();
    let cached = session.cache.contains(&path);
    match session.cache.get_or_load(&path) {
        Ok(data) => {
            info!(path = %path.display(), rows = data.len(), cached, "dataset ready");
            println!(
                "Processing dataset... ({} rows loaded{})\n",
                format_int(data.len()),
                if cached { ", from cache" } else { "" }
            );
            session.data = Some(data);
        }
        Err(e) => render_load_error(&e),
    }
}

fn handle_overview(session: &Session) {
    let Some(data) = session.data() else { return };
    heading("Key Metrics Overview");
    let summary = reports::summarize(&data);
    println!("{}\n", output::render_table(&output::summary_rows(&summary), usize::MAX));
}

fn handle_by_district(session: &Session) {
    let Some(data) = session.data() else { return };
    heading("Applications by District");
    let rows = output::district_rows(&reports::by_district(&data));
    println!("{}\n", output::render_table(&rows, session.config.preview_rows));
}

fn handle_sla(session: &Session) {
    let Some(data) = session.data() else { return };
    heading("SLA Compliance Distribution");
    let compliance = reports::sla_compliance(&reports::summarize(&data));
    println!("{}\n", output::render_table(&output::compliance_rows(&compliance), 2));
    heading("SLA Compliance by Mandal");
    let pairs = reports::sla_by_mandal(&data);
    println!("{}\n", output::render_table(&pairs, session.config.preview_rows));
}

fn handle_by_mandal(session: &Session) {
    let Some(data) = session.data() else { return };
    heading("Applications by Mandal");
    let rows = output::mandal_rows(&reports::by_mandal(&data));
    println!("{}\n", output::render_table(&rows, session.config.preview_rows));
}

fn handle_correlation(session: &Session) {
    let Some(data) = session.data() else { return };
    heading("Correlation Matrix of Key Metrics");
    match reports::correlation_matrix(&data) {
        Ok(matrix) => println!("{}\n", output::render_correlation(&matrix)),
        Err(e) => render_correlation_error(&e),
    }
}

fn prompt_district(data: &Dataset) -> Option<DistrictFilter> {
    let mut choices = vec![DistrictFilter::ALL_LABEL.to_string()];
    choices.extend(reports::districts(data));
    println!("Select District:");
    for (i, c) in choices.iter().enumerate() {
        println!("[{}] {}", i, c);
    }
    loop {
        let input = read_line("Enter choice: ")?;
        // Index 0 is the sentinel, so a district literally named "All" stays selectable.
        match input.parse::<usize>().ok() {
            Some(0) => return Some(DistrictFilter::All),
            Some(i) if i < choices.len() => {
                return Some(DistrictFilter::District(choices[i].clone()))
            }
            _ => println!("Invalid choice. Please enter 0-{}.", choices.len() - 1),
        }
    }
}

fn prompt_metric() -> Option<MetricKind> {
    println!("Select Metric to Visualize:");
    for (i, m) in MetricKind::ALL.iter().enumerate() {
        println!("[{}] {}", i + 1, m);
    }
    loop {
        let input = read_line("Enter choice: ")?;
        let by_number = input
            .parse::<usize>()
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| MetricKind::ALL.get(i).copied());
        match by_number.or_else(|| input.parse::<MetricKind>().ok()) {
            Some(m) => return Some(m),
            None => println!("Invalid choice. Please enter 1-3."),
        }
    }
}

/// Handle option [7]: district/metric drill-down.
fn handle_explorer(session: &Session) {
    let Some(data) = session.data() else { return };
    heading("Interactive Data Explorer");
    let Some(filter) = prompt_district(&data) else { return };
    let Some(metric) = prompt_metric() else { return };
    println!();
    heading(&explorer_title(metric, &filter));
    let filtered = reports::filter_by_district(&data, &filter);
    let rows = output::mandal_rows(&reports::metric_by_mandal(&filtered, metric));
    println!("{}\n", output::render_table(&rows, session.config.preview_rows));
}

/// Handle option [8]: write CSV reports and `summary.json`.
fn handle_export(session: &Session) {
    let Some(data) = session.data() else { return };
    let summary = reports::summarize(&data);
    let result = output::export_reports(
        &session.config.export_dir,
        &summary,
        &reports::by_district(&data),
        &reports::by_mandal(&data),
        &reports::sla_by_mandal(&data),
    );
    match result {
        Ok(files) => {
            info!(dir = %session.config.export_dir.display(), "reports exported");
            println!("Outputs saved:");
            for p in [&files.districts, &files.mandals, &files.sla_by_mandal, &files.summary] {
                println!("  {}", p.display());
            }
            println!();
        }
        Err(e) => render_output_error(&e),
    }
}

fn main() {
    let config = Config::parse();
    logging::init_logging(config.verbose);
    let mut session = Session::new(config);

    println!("Building Permission Analysis Dashboard\n");
    loop {
        println!("[1] Load the file");
        println!("[2] Key metrics overview");
        println!("[3] Applications by district");
        println!("[4] SLA compliance");
        println!("[5] Applications by mandal");
        println!("[6] Correlation matrix");
        println!("[7] Interactive data explorer");
        println!("[8] Export reports");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            println!("\nExiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&mut session),
            "2" => handle_overview(&session),
            "3" => handle_by_district(&session),
            "4" => handle_sla(&session),
            "5" => handle_by_mandal(&session),
            "6" => handle_correlation(&session),
            "7" => handle_explorer(&session),
            "8" => handle_export(&session),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-8.\n"),
        }
    }
}
