mod app;
mod config;
mod data;
mod prompt;
mod report;
mod state;
mod stats;


use std::io;

use app::Session;
use clap::Parser;
use config::{Cli, Config};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from(Cli::parse());
    log::info!("data directory: {}", config.data_dir.display());

    let stdin = io::stdin();
    let mut session = Session::new(config, stdin.lock(), io::stdout());
    session.run()
}
