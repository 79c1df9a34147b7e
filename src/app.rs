use std::io::{BufRead, Write};

use anyhow::Result;
use log::info;

use crate::config::Config;
use crate::data::loader::load_data;
use crate::prompt::Prompter;
use crate::report;
use crate::state::Pager;
use crate::stats::AggregateReport;

/// Pagination question for pages of `page_size` rows.
pub fn more_rows_question(page_size: usize) -> String {
    let count = match page_size {
        5 => "five".to_string(),
        n => n.to_string(),
    };
    format!("Would you like to see {count} (more) lines of individual trip data?")
}

// ---------------------------------------------------------------------------
// Interactive session: Selector → Loader → Aggregator → Reporter, repeated
// ---------------------------------------------------------------------------

pub struct Session<R, W> {
    config: Config,
    prompter: Prompter<R, W>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(config: Config, input: R, output: W) -> Self {
        Session {
            config,
            prompter: Prompter::new(input, output),
        }
    }

    /// Run filter cycles until the user declines to restart.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.run_cycle()?;
            if !self.prompter.confirm("Would you like to restart?")? {
                return Ok(());
            }
            info!("restarting");
        }
    }

    /// One full cycle up to, but not including, the restart prompt.
    pub fn run_cycle(&mut self) -> Result<()> {
        let selection = self.prompter.get_filters()?;
        let filter = selection.filter()?;
        let table = load_data(&self.config.data_dir, selection.city, &filter)?;

        if table.is_empty() {
            writeln!(
                self.prompter.output(),
                "No Data available for selected city, month and weekday"
            )?;
            return Ok(());
        }

        let aggregates = AggregateReport::compute(&table);
        report::write_report(self.prompter.output(), &aggregates)?;

        let question = more_rows_question(self.config.page_size);
        let mut pager = Pager::new(self.config.page_size);
        while self.prompter.confirm(&question)? {
            let page = pager.next_page(&table);
            report::write_page(self.prompter.output(), page, &table)?;
        }
        Ok(())
    }
}
