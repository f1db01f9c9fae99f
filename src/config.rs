//! Command-line and environment configuration.

use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_DATA_FILE: &str = "building_permission_data_01-11-2024_30-11-2024.csv";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "permit_dashboard",
    about = "Building permission analysis dashboard for the terminal"
)]
pub struct Config {
    /// CSV of building permission records
    #[arg(long = "data", env = "PERMIT_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data_path: PathBuf,

    /// Directory that report exports are written to
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Rows shown per table preview
    #[arg(long, default_value_t = 10)]
    pub preview_rows: usize,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
