use std::path::PathBuf;

use clap::Parser;

/// Rows shown per "five (more) lines" answer.
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Parser, Debug)]
#[command(
    name = "bikeshare-explorer",
    version,
    about = "Explore US bike-share trip data for chicago, new york city and washington"
)]
pub struct Cli {
    /// Directory holding chicago.csv, new_york_city.csv and washington.csv
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Raw trip rows printed per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

/// Resolved, immutable run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub page_size: usize,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            data_dir: cli.data_dir,
            page_size: cli.page_size.max(1),
        }
    }
}
