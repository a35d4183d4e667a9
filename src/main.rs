use clap::{Arg, ArgAction, Command};
use sanskrit::{repl, runner};
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let matches = Command::new("sanskrit")
        .about("Interpreter for a language written in Latin or Devanagari script")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .help("Print the token stream instead of running")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .help("Print the syntax tree instead of running")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let file = matches.get_one::<String>("file");

    match file {
        Some(path) if !matches.get_flag("interactive") => {
            let source = read_source(path);
            let filename = Some(path.as_str());

            let ok = if matches.get_flag("tokens") {
                runner::dump_tokens(&source, filename)
            } else if matches.get_flag("ast") {
                runner::dump_ast(&source, filename)
            } else {
                runner::run_script(&source, filename)
            };

            if !ok {
                process::exit(1);
            }
        }
        _ => repl::start(),
    }
}

fn read_source(path: &str) -> String {
    let file = Path::new(path);

    if !file.exists() {
        eprintln!("Error: File '{}' not found", file.display());
        process::exit(1);
    }

    match fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            process::exit(1);
        }
    }
}
