/**
 * fakegen-collect - standalone collector task
 *
 * Copies freshly emitted fake files from a producer unit's scratch
 * directory into whichever consumer source set's name matches the
 * emitted file's package segments most specifically (shortest
 * "Main"-suffixed name wins; see fakegen_core::collector).
 */
use clap::{Arg, Command};
use std::path::PathBuf;
use std::process;

use fakegen_core::collector::{collect, SourceSetTarget};

fn main() {
    let matches = Command::new("fakegen-collect")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Collects emitted fake files into consumer source sets")
        .arg(
            Arg::new("from")
                .long("from")
                .value_name("PATH")
                .required(true)
                .help("Producer unit's emitted-files directory"),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .value_name("NAME=DIR")
                .action(clap::ArgAction::Append)
                .required(true)
                .help("A candidate consumer source set, e.g. iosMain=src/iosMain/kotlin"),
        )
        .arg(
            Arg::new("fallback")
                .long("fallback")
                .value_name("NAME=DIR")
                .help("Common source set used when no target matches"),
        )
        .get_matches();

    let from = PathBuf::from(matches.get_one::<String>("from").expect("required"));
    let targets: Vec<SourceSetTarget> = matches
        .get_many::<String>("target")
        .expect("required")
        .map(|s| parse_target(s).unwrap_or_else(|e| fail(&e)))
        .collect();
    let fallback = matches.get_one::<String>("fallback").map(|s| parse_target(s).unwrap_or_else(|e| fail(&e)));

    match collect(&from, &targets, fallback.as_ref()) {
        Ok(copied) => {
            for path in &copied {
                println!("{}", path.display());
            }
            println!("collected {} file(s)", copied.len());
        }
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

fn parse_target(spec: &str) -> Result<SourceSetTarget, String> {
    let mut parts = spec.splitn(2, '=');
    let name = parts.next().ok_or("missing source-set name")?;
    let directory = parts.next().ok_or("missing directory")?;
    Ok(SourceSetTarget { name: name.to_string(), directory: PathBuf::from(directory) })
}

fn fail(message: &str) -> ! {
    eprintln!("error: invalid --target/--fallback spec: {message}");
    process::exit(1);
}
