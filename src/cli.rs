use clap::ArgMatches;
use anyhow::{anyhow, Result};

use crate::extractor::{ExtractionConfig, DEFAULT_TOLERANCE};

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub input_file: String,
    pub output_file: Option<String>,
    pub output_format: OutputFormat,
    pub config: ExtractionConfig,
    pub validate: bool,
    pub verbose_level: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl CliArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let input_file = matches
            .get_one::<String>("input")
            .ok_or_else(|| anyhow!("Input file is required"))?
            .clone();

        let output_file = matches.get_one::<String>("output").cloned();

        let verbose_level = matches.get_count("verbose");

        let output_format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("csv") | None => OutputFormat::Csv,
            Some("json") => OutputFormat::Json,
            Some(other) => return Err(anyhow!("Invalid output format: {}", other)),
        };

        let tolerance = match matches.get_one::<String>("tolerance") {
            Some(value) => parse_distance_value(value)?,
            None => DEFAULT_TOLERANCE,
        };
        let config = ExtractionConfig::with_tolerance(tolerance)?;

        let validate = matches.get_flag("validate");

        Ok(CliArgs {
            input_file,
            output_file,
            output_format,
            config,
            validate,
            verbose_level,
        })
    }

    /// Log filter matching the number of `-v` flags
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose_level {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Parse a canvas distance, optionally suffixed with "px" (e.g. "10", "2.5px")
fn parse_distance_value(value: &str) -> Result<f64> {
    let value = value.trim().to_lowercase();
    let number = value.strip_suffix("px").unwrap_or(&value).trim();

    number
        .parse::<f64>()
        .map_err(|e| anyhow!("Invalid distance '{}': {}", value, e))
}
