/**
 * fakegen - Fake test-double generator CLI
 *
 * Reads a host-facts JSON document, runs the fake-synthesis pipeline over
 * it, and writes generated files plus the signature cache to disk.
 */
use clap::{Arg, Command};
use std::path::PathBuf;
use std::process;

use fakegen_cli::document;
use fakegen_core::telemetry::LogLevel;
use fakegen_core::Config;

fn main() {
    let matches = Command::new("fakegen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates @Fake test doubles from host-compiler facts")
        .arg(
            Arg::new("facts")
                .short('f')
                .long("facts")
                .value_name("PATH")
                .required(true)
                .help("Path to the host-facts JSON document"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("PATH")
                .help("Directory for emitted files and the signature cache"),
        )
        .arg(Arg::new("debug").long("debug").num_args(0).help("Verbose logging"))
        .arg(
            Arg::new("annotation")
                .long("annotation")
                .value_name("NAME")
                .action(clap::ArgAction::Append)
                .help("Additional annotation name(s) that trigger processing"),
        )
        .get_matches();

    let facts_path = PathBuf::from(matches.get_one::<String>("facts").expect("required"));
    let output_dir = matches.get_one::<String>("output-dir").map(PathBuf::from);
    let debug = matches.get_flag("debug");
    let extra_annotations: Vec<String> = matches.get_many::<String>("annotation").map(|v| v.cloned().collect()).unwrap_or_default();

    let mut config = Config::default();
    config.debug = debug;
    config.output_dir = output_dir;
    if !extra_annotations.is_empty() {
        config.annotation_names.extend(extra_annotations);
    }

    fakegen_cli::logging::init(config.effective_log_level(LogLevel::Info));

    let document = match document::load(&facts_path) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };

    match fakegen_cli::runner::run(&document, &config) {
        Ok(outcome) => {
            println!("{}", outcome.summary);
            for diagnostic in &outcome.diagnostics {
                if !diagnostic.code.is_warning() {
                    eprintln!("{diagnostic}");
                }
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}
