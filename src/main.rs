use clap::{Arg, ArgAction, Command};
use colored::*;
use log::{error, info, warn};
use std::path::Path;

use nettrace::cli::{self, CliArgs};
use nettrace::output::export_results;
use nettrace::validation::{SchematicValidator, Severity};
use nettrace::{validate_all_pins_have_nets, NetExtractor, Schematic};

fn main() {
    let matches = create_cli().get_matches();

    let args = match CliArgs::from_matches(&matches) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            std::process::exit(2);
        }
    };

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    if let Err(e) = run_application(&args) {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn create_cli() -> Command {
    Command::new("nettrace")
        .version(nettrace::VERSION)
        .about("Resolve the nets of a hand-drawn schematic snapshot")
        .arg(
            Arg::new("input")
                .help("Input schematic snapshot (.json)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output file for the pin-to-net table"),
        )
        .arg(
            Arg::new("tolerance")
                .short('t')
                .long("tolerance")
                .value_name("DISTANCE")
                .help("Touch radius in canvas units (default 10)"),
        )
        .arg(
            Arg::new("validate")
                .long("validate")
                .action(ArgAction::SetTrue)
                .help("Run schematic checks after extraction"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase verbosity level"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .default_value("csv")
                .value_parser(["csv", "json"])
                .help("Output format"),
        )
}

fn run_application(args: &CliArgs) -> anyhow::Result<()> {
    info!("{}", "Starting nettrace".green().bold());
    info!("Input file: {}", args.input_file.bright_blue());

    if !Path::new(&args.input_file).exists() {
        return Err(anyhow::anyhow!("Input file '{}' not found", args.input_file));
    }

    let mut model = Schematic::from_json_file(&args.input_file)?;
    let report = NetExtractor::with_config(args.config.clone()).extract(&mut model);

    let (all_assigned, unconnected) = validate_all_pins_have_nets(&model);
    if !all_assigned {
        return Err(anyhow::anyhow!("Pins left without a net: {}", unconnected.join(", ")));
    }

    if args.validate {
        let (valid, issues) = SchematicValidator::new().check(&model);
        for issue in &issues {
            match issue.severity {
                Severity::Error => println!("{}", issue.to_string().red()),
                Severity::Warning => println!("{}", issue.to_string().yellow()),
            }
        }
        if !valid {
            warn!("Schematic has validation errors");
        }
    }

    if let Some(output_file) = &args.output_file {
        export_results(&report, &model, output_file, &args.output_format)?;
        info!("Results exported to: {}", output_file.bright_green());
    } else {
        model.print_summary();
        report.print_summary();
    }

    if matches!(args.output_format, cli::OutputFormat::Json) && args.output_file.is_none() {
        warn!("--format json only applies together with --output");
    }

    info!("{}", "Net extraction completed successfully!".green().bold());
    Ok(())
}
