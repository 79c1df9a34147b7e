use std::io::{BufRead, ErrorKind, Write};

use anyhow::Result;
use log::debug;

use crate::data::DataError;
use crate::data::model::{City, MONTHS, TripFilter, WEEKDAYS};
use crate::report::separator;

/// The validated (city, month, weekday) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub city: City,
    /// "all" or one of [`MONTHS`].
    pub month: String,
    /// "all" or one of [`WEEKDAYS`].
    pub weekday: String,
}

impl Selection {
    pub fn filter(&self) -> Result<TripFilter, DataError> {
        TripFilter::from_names(&self.month, &self.weekday)
    }
}

/// Line-based prompting over any input / output pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Read one line without its terminator. End of input is an error: no
    /// later answer could ever arrive.
    fn read_line(&mut self) -> std::io::Result<String> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    /// Ask until the answer is exactly one of `options`.
    pub fn choose(&mut self, question: &str, options: &[&str]) -> std::io::Result<String> {
        writeln!(self.output, "{question}")?;
        loop {
            write!(self.output, "> ")?;
            let answer = self.read_line()?;
            if options.contains(&answer.as_str()) {
                return Ok(answer);
            }
            debug!("rejected {answer:?}, expected one of {options:?}");
            writeln!(self.output, "invalid input {answer}")?;
        }
    }

    /// Ask for a city, month and weekday.
    pub fn get_filters(&mut self) -> Result<Selection> {
        writeln!(self.output, "Hello! Let's explore some US bikeshare data!")?;

        let cities = City::ALL.map(City::name);
        let city = self
            .choose("Choose a city between chicago, new york city and washington:", &cities)?
            .parse::<City>()?;

        let mut months = vec!["all"];
        months.extend(MONTHS);
        let month = self.choose("Choose a month between all, january, february, ... , june", &months)?;

        let mut weekdays = vec!["all"];
        weekdays.extend(WEEKDAYS);
        let weekday =
            self.choose("Choose a weekday between all, monday, tuesday, ... sunday", &weekdays)?;

        separator(&mut self.output)?;
        Ok(Selection {
            city,
            month,
            weekday,
        })
    }

    /// Yes / no question; only "yes" (any case) counts as yes.
    pub fn confirm(&mut self, question: &str) -> std::io::Result<bool> {
        writeln!(self.output, "\n{question} Enter yes or no.")?;
        let answer = self.read_line()?;
        Ok(answer.to_lowercase() == "yes")
    }
}
